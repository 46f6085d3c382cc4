//! # Encryption Boundary
//!
//! ChaCha20-Poly1305 authenticated encryption around stored secret values.
//! Every value is encrypted here before it reaches either store and decrypted
//! here on the way out; the boundary is crossed exactly twice per secret
//! lifetime. The key is supplied at startup and used opaquely, with no
//! rotation and no derivation; no component other than this one ever sees
//! plaintext key material.

use base64::{engine::general_purpose::URL_SAFE, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use crate::errors::{CinderError, Result};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Process-wide symmetric cipher for secret values.
///
/// Tokens are `base64(nonce ‖ ciphertext ‖ tag)`, so each one is
/// self-contained and self-authenticating; anything not produced by
/// [`SecretCipher::encrypt`] under the same key fails decryption with
/// [`CinderError::CorruptCiphertext`].
pub struct SecretCipher {
    cipher: ChaCha20Poly1305,
}

impl SecretCipher {
    /// Build a cipher from a url-safe base64 encoding of a 32-byte key.
    ///
    /// The decoded key bytes are wiped from memory once the cipher has
    /// absorbed them.
    pub fn from_base64_key(key: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            URL_SAFE
                .decode(key)
                .map_err(|_| CinderError::config("Encryption key must be url-safe base64"))?,
        );

        if bytes.len() != KEY_LEN {
            return Err(CinderError::config(format!(
                "Encryption key must decode to {} bytes, got {}",
                KEY_LEN,
                bytes.len()
            )));
        }

        let cipher = ChaCha20Poly1305::new_from_slice(&bytes)
            .map_err(|_| CinderError::config("Encryption key rejected by cipher"))?;

        Ok(Self { cipher })
    }

    /// Generate a fresh key in the encoding `from_base64_key` accepts.
    pub fn generate_key() -> String {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut key[..]);
        URL_SAFE.encode(&key[..])
    }

    /// Encrypt a plaintext value into an opaque token.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CinderError::internal("Encryption failed"))?;

        let mut token = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&ciphertext);
        Ok(URL_SAFE.encode(token))
    }

    /// Decrypt a token produced by [`SecretCipher::encrypt`].
    ///
    /// Fails with [`CinderError::CorruptCiphertext`] for malformed tokens,
    /// tampered ciphertext, or tokens produced under a different key.
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>> {
        let raw = URL_SAFE
            .decode(token)
            .map_err(|_| CinderError::corrupt_ciphertext("Token is not valid base64"))?;

        if raw.len() < NONCE_LEN {
            return Err(CinderError::corrupt_ciphertext("Token shorter than nonce"));
        }

        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CinderError::corrupt_ciphertext("Authentication failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cipher() -> SecretCipher {
        SecretCipher::from_base64_key(&SecretCipher::generate_key()).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let cipher = cipher();
        let token = cipher.encrypt(b"hello").unwrap();
        assert_eq!(cipher.decrypt(&token).unwrap(), b"hello");
    }

    #[test]
    fn test_empty_plaintext_round_trip() {
        let cipher = cipher();
        let token = cipher.encrypt(b"").unwrap();
        assert_eq!(cipher.decrypt(&token).unwrap(), b"");
    }

    #[test]
    fn test_tokens_are_nondeterministic() {
        let cipher = cipher();
        let a = cipher.encrypt(b"same input").unwrap();
        let b = cipher.encrypt(b"same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let cipher = cipher();
        let token = cipher.encrypt(b"payload").unwrap();

        let mut raw = URL_SAFE.decode(&token).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = URL_SAFE.encode(raw);

        let err = cipher.decrypt(&tampered).unwrap_err();
        assert!(matches!(err, CinderError::CorruptCiphertext(_)));
    }

    #[test]
    fn test_foreign_key_is_rejected() {
        let token = cipher().encrypt(b"payload").unwrap();
        let err = cipher().decrypt(&token).unwrap_err();
        assert!(matches!(err, CinderError::CorruptCiphertext(_)));
    }

    #[test]
    fn test_garbage_tokens_are_rejected() {
        let cipher = cipher();
        assert!(matches!(
            cipher.decrypt("not base64!").unwrap_err(),
            CinderError::CorruptCiphertext(_)
        ));
        assert!(matches!(
            cipher.decrypt("AAAA").unwrap_err(),
            CinderError::CorruptCiphertext(_)
        ));
    }

    #[test]
    fn test_bad_keys_are_rejected() {
        assert!(SecretCipher::from_base64_key("not base64!").is_err());
        assert!(SecretCipher::from_base64_key("c2hvcnQ=").is_err());
    }

    proptest! {
        #[test]
        fn prop_round_trip_any_bytes(payload in proptest::collection::vec(any::<u8>(), 0..1024)) {
            let cipher = cipher();
            let token = cipher.encrypt(&payload).unwrap();
            prop_assert_eq!(cipher.decrypt(&token).unwrap(), payload);
        }
    }
}

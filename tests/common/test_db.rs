//! Test database utilities for integration tests.
//!
//! Provides file-based SQLite databases under `data/test/` for test isolation
//! and easier debugging of test failures.

#![allow(clippy::duplicate_mod)]
#![allow(dead_code)]

use cinder::config::DatabaseConfig;
use cinder::storage::{create_pool, run_migrations, DbPool};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Counter for generating unique database names within a test run
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Get the test database directory path
fn test_db_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(manifest_dir).join("data").join("test")
}

/// Generate a unique database filename for a test
fn unique_db_name(prefix: &str) -> String {
    let counter = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let uuid_short = &Uuid::new_v4().to_string()[..8];
    format!("{}_{}_{}_{}.db", prefix, std::process::id(), counter, uuid_short)
}

/// A test database that automatically cleans up on drop.
pub struct TestDatabase {
    pub pool: DbPool,
    pub path: PathBuf,
}

impl TestDatabase {
    /// Create a new test database with migrations applied.
    ///
    /// The database file is created under `data/test/` with a unique name and
    /// is deleted when this struct is dropped.
    pub async fn new(prefix: &str) -> Self {
        let db_dir = test_db_dir();
        std::fs::create_dir_all(&db_dir).expect("create test database directory");

        let db_name = unique_db_name(prefix);
        let path = db_dir.join(&db_name);

        let config = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            max_connections: 5,
            auto_migrate: false,
            ..Default::default()
        };

        let pool = create_pool(&config).await.expect("create test database pool");
        run_migrations(&pool).await.expect("apply schema to test database");

        Self { pool, path }
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

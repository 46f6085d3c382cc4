//! OpenAPI documentation for the secret API.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cinder",
        description = "Burn-after-read secret exchange: store a secret, share its handle, redeem it exactly once."
    ),
    paths(
        handlers::create_secret_handler,
        handlers::redeem_secret_handler,
        handlers::delete_secret_handler,
    ),
    components(schemas(
        handlers::CreateSecretBody,
        handlers::CreateSecretResponse,
        handlers::RedeemResponse,
        handlers::DeleteSecretResponse,
    )),
    tags((name = "secrets", description = "Secret lifecycle operations"))
)]
pub struct ApiDoc;

pub fn docs_router() -> Router {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()).into()
}

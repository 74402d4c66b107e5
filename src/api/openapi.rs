//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use super::handlers;
use crate::auth::PublicUser;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register::register,
        handlers::login::login,
        handlers::me::me,
        handlers::health::health,
    ),
    components(schemas(
        handlers::register::RegisterRequest,
        handlers::register::RegisterResponse,
        handlers::login::LoginRequest,
        handlers::login::LoginResponse,
        handlers::login::LoginData,
        handlers::me::MeResponse,
        handlers::ErrorResponse,
        PublicUser,
    )),
    tags(
        (name = "auth", description = "Registration, login and session endpoints"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        let paths = json.get("paths").unwrap().as_object().unwrap();
        assert!(paths.contains_key("/v1/register"));
        assert!(paths.contains_key("/v1/login"));
        assert!(paths.contains_key("/v1/me"));
        assert!(paths.contains_key("/health"));
    }
}

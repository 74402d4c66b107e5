use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{error, instrument};
use utoipa::ToSchema;

use super::principal::require_auth;
use crate::api::{handlers::ErrorResponse, AppState};
use crate::auth::PublicUser;

#[derive(ToSchema, Serialize, Debug)]
pub struct MeResponse {
    success: bool,
    data: PublicUser,
}

#[utoipa::path(
    get,
    path = "/v1/me",
    responses(
        (status = 200, description = "The authenticated user", body = MeResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(headers, state))]
pub async fn me(headers: HeaderMap, state: Extension<AppState>) -> impl IntoResponse {
    let principal = match require_auth(&headers, state.sessions.as_ref()) {
        Ok(principal) => principal,
        Err(rejection) => return rejection.into_response(),
    };

    match state.store.find_by_id(principal.user_id) {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(MeResponse {
                success: true,
                data: user.public(),
            }),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("User not found")),
        )
            .into_response(),
        Err(err) => {
            error!("Error looking up current user: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Server error retrieving user data")),
            )
                .into_response()
        }
    }
}

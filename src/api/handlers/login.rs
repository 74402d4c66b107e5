use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};
use utoipa::ToSchema;

use crate::api::{handlers::ErrorResponse, AppState};
use crate::auth::{password::verify_password, PublicUser};

/// One message for unknown email and wrong password, so a caller cannot
/// probe which accounts exist.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct LoginResponse {
    success: bool,
    data: LoginData,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct LoginData {
    token: String,
    user: PublicUser,
}

#[utoipa::path(
    post,
    path = "/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn login(
    state: Extension<AppState>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing payload")),
        )
            .into_response();
    };

    let email = request.email.trim().to_string();
    if email.is_empty() || request.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Email and password are required")),
        )
            .into_response();
    }

    let user = match state.store.find_by_email(&email) {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized(),
        Err(err) => {
            error!("Error looking up user: {err}");
            return internal_error();
        }
    };

    // CPU-bound verification runs on the blocking pool, same as hashing.
    let password = request.password;
    let stored_hash = user.password_hash.clone();
    let verified = match tokio::task::spawn_blocking(move || {
        verify_password(&password, &stored_hash)
    })
    .await
    {
        Ok(verified) => verified,
        Err(err) => {
            error!("Verification task failed: {err}");
            return internal_error();
        }
    };

    if !verified {
        return unauthorized();
    }

    let token = match state.sessions.issue(user.id) {
        Ok(token) => token,
        Err(err) => {
            error!("Error issuing session token: {err}");
            return internal_error();
        }
    };

    (
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            data: LoginData {
                token,
                user: user.public(),
            },
        }),
    )
        .into_response()
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(INVALID_CREDENTIALS)),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Server error during login")),
    )
        .into_response()
}

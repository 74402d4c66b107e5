use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use crate::api::{
    handlers::{valid_email, ErrorResponse},
    AppState,
};
use crate::auth::{password::hash_password, StoreError};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct RegisterResponse {
    success: bool,
}

#[utoipa::path(
    post,
    path = "/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = RegisterResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 409, description = "User with the specified email already exists", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn register(
    state: Extension<AppState>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return bad_request("Missing payload");
    };

    let name = request.name.trim().to_string();
    let email = request.email.trim().to_string();

    if name.is_empty() {
        return bad_request("Missing name");
    }

    if !valid_email(&email) {
        return bad_request("Invalid email");
    }

    if request.password.is_empty() {
        return bad_request("Missing password");
    }

    // Argon2 is CPU-bound; keep it off the async workers so concurrent
    // requests are not serialized behind each other's hash computation.
    let password = request.password;
    let password_hash =
        match tokio::task::spawn_blocking(move || hash_password(&password)).await {
            Ok(Ok(hash)) => hash,
            Ok(Err(err)) => {
                error!("Error hashing password: {err}");
                return internal_error();
            }
            Err(err) => {
                error!("Hashing task failed: {err}");
                return internal_error();
            }
        };

    match state.store.create(&name, &email, &password_hash) {
        Ok(user) => {
            debug!("user created: {}", user.id);
            (StatusCode::CREATED, Json(RegisterResponse { success: true })).into_response()
        }
        Err(StoreError::DuplicateEmail) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new("User with this email already exists")),
        )
            .into_response(),
        Err(err) => {
            error!("Error inserting user: {err}");
            internal_error()
        }
    }
}

fn bad_request(message: &str) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Server error during registration")),
    )
        .into_response()
}

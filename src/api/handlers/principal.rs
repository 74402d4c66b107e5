//! Access-control gate for protected handlers.
//!
//! Reads the bearer token from the standard authorization carrier, verifies
//! it, and returns a principal downstream handlers can trust. The verified
//! token is the only identity source; nothing client-supplied is believed
//! independently of it.

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::api::handlers::ErrorResponse;
use crate::auth::{SessionSigner, VerifyError};

/// Authenticated user context derived from the bearer token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: Uuid,
}

/// Why a request was rejected before reaching its handler.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    MissingToken,
    Malformed,
    InvalidSignature,
    Expired,
}

impl AuthRejection {
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingToken => "Access token required",
            Self::Malformed => "Malformed token",
            Self::InvalidSignature => "Invalid token",
            Self::Expired => "Token expired",
        }
    }
}

impl From<VerifyError> for AuthRejection {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Malformed => Self::Malformed,
            VerifyError::InvalidSignature => Self::InvalidSignature,
            VerifyError::Expired => Self::Expired,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(self.message())),
        )
            .into_response()
    }
}

/// Gate a protected operation on a valid session.
///
/// # Errors
///
/// Returns [`AuthRejection::MissingToken`] when no bearer token is present,
/// otherwise the rejection matching the verifier's error.
pub fn require_auth(
    headers: &HeaderMap,
    sessions: &dyn SessionSigner,
) -> Result<Principal, AuthRejection> {
    let Some(token) = extract_bearer_token(headers) else {
        return Err(AuthRejection::MissingToken);
    };
    let user_id = sessions.verify(&token)?;
    Ok(Principal { user_id })
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(
            extract_bearer_token(&headers),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn accepts_lowercase_scheme_and_trims() {
        let headers = headers_with("bearer   token  ");
        assert_eq!(extract_bearer_token(&headers), Some("token".to_string()));
    }

    #[test]
    fn rejects_missing_or_empty() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
        assert_eq!(extract_bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(extract_bearer_token(&headers_with("Basic dXNlcg==")), None);
    }

    #[test]
    fn rejection_maps_verifier_errors() {
        assert_eq!(
            AuthRejection::from(VerifyError::Malformed),
            AuthRejection::Malformed
        );
        assert_eq!(
            AuthRejection::from(VerifyError::InvalidSignature),
            AuthRejection::InvalidSignature
        );
        assert_eq!(
            AuthRejection::from(VerifyError::Expired),
            AuthRejection::Expired
        );
    }
}

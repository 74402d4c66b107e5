//! Stateless session tokens.
//!
//! A token is `header.claims.signature`: base64url-unpadded JSON segments
//! with an HMAC-SHA256 over the signing input. No session state is kept
//! server-side; verification is a pure function of the token and the secret.

use anyhow::{anyhow, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use super::now_unix;

pub const TOKEN_VERSION: u8 = 1;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionTokenHeader {
    pub alg: String,
    pub typ: String,
}

impl SessionTokenHeader {
    fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionTokenClaims {
    pub v: u8,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

/// Mints and validates session tokens bound to a user identity.
///
/// Behind a trait so the signing scheme stays orthogonal to storage.
pub trait SessionSigner: Send + Sync {
    /// Mint a signed, expiring token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the signing subsystem faults.
    fn issue(&self, user_id: Uuid) -> Result<String>;

    /// Validate a token and recover the subject.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Malformed`], [`VerifyError::InvalidSignature`]
    /// or [`VerifyError::Expired`]; the checks run in that order.
    fn verify(&self, token: &str) -> Result<Uuid, VerifyError>;
}

/// HMAC-SHA256 signer with a process-wide secret and a fixed lifetime window.
pub struct HmacSigner {
    key: Vec<u8>,
    ttl_seconds: i64,
}

impl HmacSigner {
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            key: secret.to_vec(),
            ttl_seconds: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Mint a token with an explicit issue time. [`SessionSigner::issue`]
    /// supplies the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if claims encoding or signing fails.
    pub fn issue_at(&self, user_id: Uuid, now: i64) -> Result<String> {
        let claims = SessionTokenClaims {
            v: TOKEN_VERSION,
            sub: user_id.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
        };

        let header_b64 = b64e_json(&SessionTokenHeader::hs256())?;
        let claims_b64 = b64e_json(&claims)?;
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac =
            HmacSha256::new_from_slice(&self.key).map_err(|_| anyhow!("invalid signing key"))?;
        mac.update(signing_input.as_bytes());
        let signature_b64 = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature_b64}"))
    }

    /// Verify a token against an explicit clock: structure, then signature,
    /// then expiry, then subject.
    ///
    /// # Errors
    ///
    /// See [`SessionSigner::verify`].
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Uuid, VerifyError> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().ok_or(VerifyError::Malformed)?;
        let claims_b64 = parts.next().ok_or(VerifyError::Malformed)?;
        let sig_b64 = parts.next().ok_or(VerifyError::Malformed)?;
        if parts.next().is_some() {
            return Err(VerifyError::Malformed);
        }

        let header: SessionTokenHeader = b64d_json(header_b64)?;
        if header.alg != "HS256" {
            return Err(VerifyError::Malformed);
        }

        let signature =
            Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| VerifyError::Malformed)?;
        let signing_input = format!("{header_b64}.{claims_b64}");
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|_| VerifyError::InvalidSignature)?;
        mac.update(signing_input.as_bytes());
        // verify_slice compares in constant time
        mac.verify_slice(&signature)
            .map_err(|_| VerifyError::InvalidSignature)?;

        let claims: SessionTokenClaims = b64d_json(claims_b64)?;
        if claims.v != TOKEN_VERSION {
            return Err(VerifyError::Malformed);
        }
        if claims.exp <= now {
            return Err(VerifyError::Expired);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| VerifyError::Malformed)
    }
}

impl SessionSigner for HmacSigner {
    fn issue(&self, user_id: Uuid) -> Result<String> {
        self.issue_at(user_id, now_unix())
    }

    fn verify(&self, token: &str) -> Result<Uuid, VerifyError> {
        self.verify_at(token, now_unix())
    }
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, VerifyError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| VerifyError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| VerifyError::Malformed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;
    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn signer(ttl_seconds: u64) -> HmacSigner {
        HmacSigner::new(SECRET, Duration::from_secs(ttl_seconds))
    }

    #[test]
    fn issue_verify_round_trip() {
        let signer = signer(60);
        let user_id = Uuid::new_v4();
        let token = signer.issue_at(user_id, NOW).unwrap();
        assert_eq!(signer.verify_at(&token, NOW), Ok(user_id));
    }

    #[test]
    fn system_clock_round_trip() {
        let signer = signer(60);
        let user_id = Uuid::new_v4();
        let token = signer.issue(user_id).unwrap();
        assert_eq!(signer.verify(&token), Ok(user_id));
    }

    #[test]
    fn one_second_lifetime_expires() {
        let signer = signer(1);
        let token = signer.issue_at(Uuid::new_v4(), NOW).unwrap();

        // valid strictly before exp, rejected from exp onward
        assert!(signer.verify_at(&token, NOW).is_ok());
        assert_eq!(signer.verify_at(&token, NOW + 1), Err(VerifyError::Expired));
        assert_eq!(signer.verify_at(&token, NOW + 2), Err(VerifyError::Expired));
    }

    #[test]
    fn tampered_signature_rejected() {
        let signer = signer(60);
        let token = signer.issue_at(Uuid::new_v4(), NOW).unwrap();

        let (input, signature) = token.rsplit_once('.').unwrap();
        // flip one character anywhere in the signature segment
        for position in 0..signature.len() {
            let mut bytes = signature.as_bytes().to_vec();
            bytes[position] = if bytes[position] == b'A' { b'B' } else { b'A' };
            let tampered = format!("{input}.{}", String::from_utf8(bytes).unwrap());
            let result = signer.verify_at(&tampered, NOW);
            assert!(
                matches!(
                    result,
                    Err(VerifyError::InvalidSignature | VerifyError::Malformed)
                ),
                "flipping signature byte {position} must not verify"
            );
        }
    }

    #[test]
    fn tampered_claims_rejected() {
        let signer = signer(60);
        let victim = Uuid::new_v4();
        let forged_subject = Uuid::new_v4();
        let token = signer.issue_at(victim, NOW).unwrap();

        let mut parts = token.split('.');
        let header_b64 = parts.next().unwrap();
        let sig_b64 = parts.nth(1).unwrap();

        // re-encode claims with a different subject but keep the old MAC
        let forged_claims = SessionTokenClaims {
            v: TOKEN_VERSION,
            sub: forged_subject.to_string(),
            iat: NOW,
            exp: NOW + 60,
        };
        let forged_b64 = b64e_json(&forged_claims).unwrap();
        let forged = format!("{header_b64}.{forged_b64}.{sig_b64}");

        assert_eq!(
            signer.verify_at(&forged, NOW),
            Err(VerifyError::InvalidSignature)
        );
    }

    #[test]
    fn wrong_key_rejected() {
        let signer = signer(60);
        let other = HmacSigner::new(b"another-secret-another-secret-32", Duration::from_secs(60));
        let token = signer.issue_at(Uuid::new_v4(), NOW).unwrap();
        assert_eq!(
            other.verify_at(&token, NOW),
            Err(VerifyError::InvalidSignature)
        );
    }

    #[test]
    fn malformed_tokens_rejected() {
        let signer = signer(60);
        for garbage in ["", "abc", "a.b", "a.b.c.d", "!!!.???.###"] {
            assert_eq!(
                signer.verify_at(garbage, NOW),
                Err(VerifyError::Malformed),
                "{garbage:?} must be malformed"
            );
        }
    }

    #[test]
    fn unsigned_payload_is_not_a_credential() {
        // a bare base64 payload with no MAC must never verify
        let signer = signer(60);
        let claims = SessionTokenClaims {
            v: TOKEN_VERSION,
            sub: Uuid::new_v4().to_string(),
            iat: NOW,
            exp: NOW + 60,
        };
        let payload = b64e_json(&claims).unwrap();
        assert_eq!(signer.verify_at(&payload, NOW), Err(VerifyError::Malformed));
    }

    #[test]
    fn wrong_version_rejected() {
        let signer = signer(60);
        let token = signer.issue_at(Uuid::new_v4(), NOW).unwrap();
        let claims_b64 = token.split('.').nth(1).unwrap();
        let mut claims: SessionTokenClaims = b64d_json(claims_b64).unwrap();
        claims.v = 2;

        // re-sign with the real key so only the version check can fail
        let header_b64 = b64e_json(&SessionTokenHeader::hs256()).unwrap();
        let forged_claims_b64 = b64e_json(&claims).unwrap();
        let signing_input = format!("{header_b64}.{forged_claims_b64}");
        let mut mac = HmacSha256::new_from_slice(SECRET).unwrap();
        mac.update(signing_input.as_bytes());
        let sig = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());
        let forged = format!("{signing_input}.{sig}");

        assert_eq!(signer.verify_at(&forged, NOW), Err(VerifyError::Malformed));
    }
}

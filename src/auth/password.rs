//! Password hashing with Argon2id.
//!
//! Output is a PHC string that encodes algorithm, version, params and salt,
//! so verification is self-describing and params can be raised later without
//! re-hashing existing records.

use anyhow::{anyhow, Result};
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

fn argon2() -> Argon2<'static> {
    Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2::Params::default(),
    )
}

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
///
/// Returns an error if the hashing subsystem itself faults; never for
/// well-formed input.
pub fn hash_password(plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|_| anyhow!("failed to hash password"))?
        .to_string();
    Ok(hash)
}

/// Verify a plaintext password against a stored PHC hash.
///
/// A malformed stored hash counts as a verification failure, not an error:
/// a corrupted record must not crash a login. The digest comparison inside
/// `verify_password` is constant time.
#[must_use]
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    argon2()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("CorrectHorseBatteryStaple").unwrap();
        assert!(verify_password("CorrectHorseBatteryStaple", &hash));
        assert!(!verify_password("WrongHorse", &hash));
    }

    #[test]
    fn distinct_salts_distinct_hashes() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same-password", &first));
        assert!(verify_password("same-password", &second));
    }

    #[test]
    fn hash_is_self_describing() {
        let hash = hash_password("p").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$"));
    }

    #[test]
    fn malformed_stored_hash_fails_closed() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", "$argon2id$v=19$truncated"));
    }
}

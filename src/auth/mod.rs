pub mod password;
pub mod store;
pub mod token;

pub use self::store::{MemoryStore, PublicUser, StoreError, User, UserStore};
pub use self::token::{SessionSigner, VerifyError};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in seconds.
#[must_use]
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::now_unix;

    #[test]
    fn now_unix_is_recent() {
        // 2021-01-01 as a floor, far future as a ceiling
        let now = now_unix();
        assert!(now > 1_609_459_200);
        assert!(now < 4_102_444_800);
    }
}

use crate::api;
use crate::auth::{MemoryStore, SessionSigner, UserStore};
use crate::auth::token::HmacSigner;
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;
use secrecy::ExposeSecret;
use std::{sync::Arc, time::Duration};

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, session_ttl } => {
            // One store and one signer for the process lifetime, injected into
            // the request handlers. Rotating the secret on restart invalidates
            // all outstanding sessions.
            let store: Arc<dyn UserStore> = Arc::new(MemoryStore::new());
            let sessions: Arc<dyn SessionSigner> = Arc::new(HmacSigner::new(
                globals.signing_secret.expose_secret().as_bytes(),
                Duration::from_secs(session_ttl),
            ));

            api::new(port, store, sessions).await?;
        }
    }

    Ok(())
}

//! Startup orchestration.
//!
//! Builds the shared application state from a validated config. The backend
//! mode picks both the store and the auth provider, so the two always agree
//! on where accounts live.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::auth::{Auth, AuthError, HostedAuth, LocalAuth};
use crate::config::{BackendMode, HubConfig};
use crate::http::AppState;
use crate::providers::Providers;
use crate::store::{MemoryStore, RestStore, Store, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("store initialization failed: {0}")]
    Store(#[from] StoreError),

    #[error("auth initialization failed: {0}")]
    Auth(#[from] AuthError),
}

/// Assemble store, auth and providers for `config`.
pub fn build_state(config: &HubConfig) -> Result<AppState, StartupError> {
    let timeout = Duration::from_secs(config.providers.request_timeout_secs.max(1));

    let (store, auth) = match config.backend.mode {
        BackendMode::Memory => {
            let store = match &config.backend.snapshot_path {
                Some(path) => MemoryStore::load_from_file(path)?,
                None => MemoryStore::new(None),
            };
            let auth = LocalAuth::with_accounts(store.accounts());
            (Store::Memory(store), Auth::local(auth))
        }
        BackendMode::Hosted => {
            let store = RestStore::new(&config.backend.url, &config.backend.anon_key, timeout)?;
            let auth = HostedAuth::new(&config.backend.url, &config.backend.anon_key, timeout)?;
            (Store::Hosted(store), Auth::hosted(auth))
        }
    };

    let providers = Arc::new(Providers::new(config.providers.clone()));
    let modes = providers.modes();
    tracing::info!(
        backend = store.mode(),
        llm = modes.llm.as_str(),
        serp = modes.serp.as_str(),
        "Application state initialized"
    );

    Ok(AppState {
        store,
        auth,
        providers,
        rank: config.rank.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserContext;
    use crate::providers::Mode;
    use crate::store::{NewProduct, Product};

    #[test]
    fn test_memory_backend_defaults_to_stub_providers() {
        let state = build_state(&HubConfig::default()).unwrap();
        assert_eq!(state.store.mode(), "memory");
        assert_eq!(state.providers.modes().llm, Mode::Stub);
        assert_eq!(state.rank.stub_max_position, 50);
    }

    #[test]
    fn test_missing_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HubConfig::default();
        config.backend.snapshot_path = Some(dir.path().join("hub.json").to_string_lossy().into_owned());
        let state = build_state(&config).unwrap();
        assert_eq!(state.store.mode(), "memory");
    }

    #[tokio::test]
    async fn test_restart_keeps_accounts_and_their_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HubConfig::default();
        config.backend.snapshot_path = Some(dir.path().join("hub.json").to_string_lossy().into_owned());

        let state = build_state(&config).unwrap();
        let session = state.auth.sign_up("owner@example.com", "hunter22").await.unwrap();
        let user = UserContext::from(&session);
        let new = NewProduct {
            title: "Fraction Worksheets".into(),
            ..Default::default()
        };
        state
            .store
            .insert_products(&user, vec![Product::create(user.user_id, new)])
            .await
            .unwrap();
        state.store.flush().unwrap();

        let restarted = build_state(&config).unwrap();
        let again = restarted.auth.sign_in("owner@example.com", "hunter22").await.unwrap();
        assert_eq!(again.user_id, session.user_id);
        let products = restarted.store.list_products(&UserContext::from(&again)).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Fraction Worksheets");
    }
}

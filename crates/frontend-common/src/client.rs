//! Client configuration and initialization

use crate::auth::{Navigator, SessionContext};
use campus_core::{ClientConfig, CredentialStore, FileTokenStorage};
use campus_http::{CampusClient, ClientError};
use reqwest::cookie::Jar;
use std::sync::Arc;

/// Credential store for the given configuration
///
/// With `persist_token`, the access token is kept in `storage.json` inside
/// the data directory.
pub fn create_store(config: &ClientConfig) -> CredentialStore {
    if config.persist_token {
        CredentialStore::with_storage(Arc::new(FileTokenStorage::in_dir(&config.data_dir)))
    } else {
        CredentialStore::new()
    }
}

/// API client reading tokens from `store`
pub fn create_client(
    config: &ClientConfig,
    store: CredentialStore,
    cookie_jar: Option<Arc<Jar>>,
) -> Result<CampusClient, ClientError> {
    let mut builder = CampusClient::builder()
        .base_url(&config.base_url)
        .timeout(config.timeout())
        .store(store);

    if let Some(jar) = cookie_jar {
        builder = builder.cookie_jar(jar);
    }

    builder.build()
}

/// Session context wired to `client`, with routes and policy from `config`
pub fn create_session_context(
    config: &ClientConfig,
    client: CampusClient,
    navigator: Arc<dyn Navigator>,
) -> SessionContext {
    let store = client.store().clone();
    SessionContext::builder(store, Arc::new(client), navigator)
        .policy(config.revalidation)
        .login_route(config.login_route.as_str())
        .public_route(config.public_route.as_str())
        .build()
}

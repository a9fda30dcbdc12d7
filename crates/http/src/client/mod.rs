//! Campus API client
//!
//! Every request goes through [`CampusClient::execute`], which attaches the
//! bearer token from the [`CredentialStore`] right before sending when the
//! endpoint requires it. The token is never captured when the request is
//! built, so a refresh that lands in between is picked up.

pub mod auth;
pub mod error;

use campus_core::CredentialStore;
use error::ClientError;
use reqwest::cookie::Jar;
use reqwest::{Client, ClientBuilder, header};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Authentication requirement of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Never send the access token
    None,
    /// Send the access token when one is held
    Bearer,
}

/// Campus API client
#[derive(Clone)]
pub struct CampusClient {
    client: Client,
    base_url: String,
    store: CredentialStore,
}

impl CampusClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>, store: CredentialStore) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).store(store).build()
    }

    /// Create a new client builder
    pub fn builder() -> CampusClientBuilder {
        CampusClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credential store the client reads tokens from
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Create an undecorated request builder
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Attach the current access token if the endpoint requires one
    pub fn authorize(&self, request: reqwest::RequestBuilder, auth: Auth) -> reqwest::RequestBuilder {
        match (auth, self.store.access_token()) {
            (Auth::Bearer, Some(token)) => {
                request.header(header::AUTHORIZATION, format!("Bearer {token}"))
            }
            _ => request,
        }
    }

    /// Execute a request and decode the JSON body
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        auth: Auth,
    ) -> Result<T, ClientError> {
        let response = self.send(request, auth).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Execute a request whose body is irrelevant
    pub async fn execute_unit(
        &self,
        request: reqwest::RequestBuilder,
        auth: Auth,
    ) -> Result<(), ClientError> {
        self.send(request, auth).await.map(drop)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        auth: Auth,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self.authorize(request, auth).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            debug!(status = status.as_u16(), "Request rejected");
            Err(ClientError::from_status(status, message))
        }
    }
}

/// Builder for CampusClient
#[derive(Default)]
pub struct CampusClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    cookie_jar: Option<Arc<Jar>>,
    store: Option<CredentialStore>,
}

impl CampusClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Share a cookie jar holding the long-lived credential
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Set the credential store read by the request pipeline
    pub fn store(mut self, store: CredentialStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<CampusClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is empty".into()));
        }

        let mut client_builder = ClientBuilder::new()
            .user_agent(
                self.user_agent
                    .unwrap_or_else(|| "campus-client/0.1.0".to_string()),
            )
            .cookie_provider(self.cookie_jar.unwrap_or_default());

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(CampusClient {
            client,
            base_url,
            store: self.store.unwrap_or_default(),
        })
    }
}

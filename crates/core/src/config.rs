//! Client configuration

use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Whether a locally held identity may skip server re-validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevalidationPolicy {
    /// Always exchange the long-lived credential before a protected view
    #[default]
    Always,
    /// Trust an identity already present in the credential store
    TrustLocal,
}

/// Campus client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL, including the version prefix
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Persist the access token in local storage
    pub persist_token: bool,

    /// Guard re-validation policy
    pub revalidation: RevalidationPolicy,

    /// Route of the login entry point
    pub login_route: String,

    /// Public route shown after logout
    pub public_route: String,

    /// Directory for local storage and the cookie jar
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            timeout_secs: 30,
            persist_token: true,
            revalidation: RevalidationPolicy::default(),
            login_route: "/login".to_string(),
            public_route: "/".to_string(),
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("campus"),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load configuration from file, with `CAMPUS_*` environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> CoreResult<Self> {
        Self::load(None)
    }

    /// Load defaults, then the optional file, then the environment
    ///
    /// # Errors
    ///
    /// Returns an error if any source cannot be read or deserialized
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("persist_token", defaults.persist_token)?
            .set_default("revalidation", "always")?
            .set_default("login_route", defaults.login_route)?
            .set_default("public_route", defaults.public_route)?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("CAMPUS"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

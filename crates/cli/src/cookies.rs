//! Cookie jar persisted between CLI runs
//!
//! The long-lived credential is a server-set cookie. The jar is saved as the
//! cookie pairs the server would receive on the refresh endpoint, scoped to
//! the API origin.

use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use url::Url;

const COOKIE_FILE: &str = "cookies.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SavedCookies {
    cookies: Vec<String>,
}

/// Cookie jar bound to a file in the data directory
pub struct PersistentJar {
    jar: Arc<Jar>,
    path: PathBuf,
    scope: Url,
}

impl PersistentJar {
    /// Open the jar for `base_url`, loading cookies saved by a previous run
    pub fn open(data_dir: &Path, base_url: &str) -> Result<Self> {
        let scope = refresh_url(base_url)?;
        let path = data_dir.join(COOKIE_FILE);
        let jar = Arc::new(Jar::default());

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let saved: SavedCookies = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            for cookie in &saved.cookies {
                jar.add_cookie_str(&format!("{cookie}; Path=/"), &scope);
            }
            debug!(count = saved.cookies.len(), "Loaded saved cookies");
        }

        Ok(Self { jar, path, scope })
    }

    pub fn jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    /// Write the cookies currently held for the API
    pub fn save(&self) -> Result<()> {
        let cookies = self
            .jar
            .cookies(&self.scope)
            .and_then(|header| header.to_str().ok().map(str::to_string))
            .map(|header| {
                header
                    .split("; ")
                    .filter(|pair| !pair.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&SavedCookies { cookies })?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

fn refresh_url(base_url: &str) -> Result<Url> {
    let url = format!("{}/auth/refresh", base_url.trim_end_matches('/'));
    Url::parse(&url).with_context(|| format!("Invalid base URL: {base_url}"))
}

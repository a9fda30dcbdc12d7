//! CLI configuration utilities

use anyhow::{Context, Result};
use campus_core::ClientConfig;
use std::path::{Path, PathBuf};

/// Load client configuration; `data_dir` from the command line wins
pub fn load(path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(path).with_context(|| match path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;

    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }
    Ok(config)
}

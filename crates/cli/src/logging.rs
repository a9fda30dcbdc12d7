use anyhow::Result;
use campus_core::tracing::{InstrumentationConfig, init_tracing};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "cli.log";

/// Initialize logging for the CLI
pub fn init_logging(log_level: Level, data_dir: &Path, no_file_log: bool) -> Result<()> {
    let filter = default_filter(log_level);

    if no_file_log {
        // Only log to stderr, format chosen by CAMPUS_LOG_FORMAT
        init_tracing(&InstrumentationConfig::from_env().with_log_level(filter))?;
        Ok(())
    } else {
        init_file_logging(&filter, data_dir)
    }
}

fn default_filter(level: Level) -> String {
    let level_str = level.as_str().to_lowercase();
    format!(
        "campus={level_str},campus_core={level_str},campus_http={level_str},campus_frontend_common={level_str}"
    )
}

fn init_file_logging(filter: &str, data_dir: &Path) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    std::fs::create_dir_all(data_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

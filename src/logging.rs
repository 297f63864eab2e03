use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber when a log file is configured. The
/// terminal belongs to the UI, so nothing is logged without one.
///
/// Returns whether a subscriber was installed.
pub fn init_logging(config: &AppConfig) -> AppResult<bool> {
    let Some(path) = &config.log_file else {
        return Ok(false);
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(&config.log_level)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    tracing::info!(path = %path.display(), level = %config.log_level, "logging started");
    Ok(true)
}

fn build_filter(level: &str) -> AppResult<EnvFilter> {
    EnvFilter::try_new(level).map_err(|e| AppError::Logging(format!("bad log level {level:?}: {e}")))
}

//! Webhook server command — `sentry-autofix serve`.

use std::path::Path;

use anyhow::{Context, Result};

use sentry_autofix::autofix::server::{ServerConfig, start_server};
use sentry_autofix::config::{AutofixConfig, CliOverrides};
use sentry_autofix::logging::init_logging;

pub async fn cmd_serve(config_path: &Path, overrides: &CliOverrides) -> Result<()> {
    let config = AutofixConfig::resolve(config_path, overrides)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    // Held until the server exits so the file appender flushes.
    let _log_guard = init_logging(&config.logging)?;

    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    start_server(ServerConfig::from(&config)).await
}

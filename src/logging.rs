//! Tracing subscriber setup.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use crate::config::LoggingSection;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// When a log directory is configured, output is teed into a daily-rolling
/// file; the returned guard must live until exit so buffered lines flush.
pub fn init_logging(config: &LoggingSection) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "sentry-autofix.log");
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            let writer = std::io::stderr.and(file_writer);
            let installed = if config.json {
                builder.json().with_writer(writer).try_init()
            } else {
                builder.compact().with_writer(writer).try_init()
            };
            installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;
            Ok(Some(guard))
        }
        None => {
            let installed = if config.json {
                builder.json().with_writer(std::io::stderr).try_init()
            } else {
                builder.compact().with_writer(std::io::stderr).try_init()
            };
            installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;
            Ok(None)
        }
    }
}

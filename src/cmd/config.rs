//! Configuration view and init commands — `sentry-autofix config`.

use std::path::Path;

use anyhow::{Context, Result};

use sentry_autofix::config::{AutofixConfig, CliOverrides};

use super::super::ConfigCommands;

pub fn cmd_config(config_path: &Path, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            if config_path.exists() {
                println!("# Config file: {}", config_path.display());
            } else {
                println!("# No config file at {}; using defaults", config_path.display());
            }
            println!("# Effective values (with env overrides)");
            println!();

            let config = AutofixConfig::resolve(config_path, &CliOverrides::default())?;
            let rendered =
                toml::to_string_pretty(&config).context("Failed to serialize configuration")?;
            println!("{}", rendered);

            let warnings = config.validate();
            if !warnings.is_empty() {
                println!("# Warnings:");
                for warning in warnings {
                    println!("#   - {}", warning);
                }
            }
        }
        Some(ConfigCommands::Init { force }) => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    config_path.display()
                );
            }
            AutofixConfig::default().save(config_path)?;
            println!("Created {}", config_path.display());
        }
    }
    Ok(())
}

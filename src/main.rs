use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "sentry-autofix")]
#[command(version, about = "Receive Sentry alerts, classify errors and draft fix PRs")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file
    #[arg(long, global = true, default_value = sentry_autofix::config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the webhook server
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to serve on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable dev mode (permissive CORS, bind on all interfaces unless --host is given)
        #[arg(long)]
        dev: bool,
    },
    /// Classify an error type and print the suggested fix
    Classify {
        /// Error type as reported by Sentry, e.g. ZeroDivisionError
        error_type: String,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { host, port, dev } => {
            let overrides = sentry_autofix::config::CliOverrides {
                host: host.clone(),
                port: *port,
                dev_mode: *dev,
                verbose: cli.verbose,
            };
            cmd::cmd_serve(&cli.config, &overrides).await?;
        }
        Commands::Classify { error_type, format } => {
            cmd::cmd_classify(error_type, *format)?;
        }
        Commands::Config { command } => {
            cmd::cmd_config(&cli.config, command.clone())?;
        }
    }

    Ok(())
}

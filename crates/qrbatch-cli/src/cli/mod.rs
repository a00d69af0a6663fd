//! CLI for qrbatch.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use qrbatch_core::config;
use std::path::PathBuf;

use commands::{run_check, run_config, run_generate, run_url};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "qrbatch")]
#[command(about = "Turn a list of numeric identifiers into zipped batches of QR codes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Generate QR code archives for every identifier in a file.
    Generate {
        /// Text file with one numeric identifier per line.
        file: PathBuf,
        /// Hashing secret (required when secret_mode = "user").
        #[arg(long)]
        secret: Option<String>,
        /// Directory for the zip archives (default: config output_dir, else current dir).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Validate an input file without generating anything.
    Check {
        /// Text file with one numeric identifier per line.
        file: PathBuf,
    },

    /// Print the verification URL for a single identifier.
    Url {
        /// Numeric identifier.
        identifier: String,
        /// Hashing secret (required when secret_mode = "user").
        #[arg(long)]
        secret: Option<String>,
        /// Also print the QR code as a PNG data URI.
        #[arg(long)]
        data_uri: bool,
    },

    /// Show the config file location and effective settings.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Generate {
                file,
                secret,
                output_dir,
            } => {
                let output_dir = match output_dir.or_else(|| cfg.output_dir.clone()) {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                run_generate(&cfg, &file, secret.as_deref(), &output_dir).await?;
            }
            CliCommand::Check { file } => run_check(&file)?,
            CliCommand::Url {
                identifier,
                secret,
                data_uri,
            } => run_url(&cfg, &identifier, secret.as_deref(), data_uri)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

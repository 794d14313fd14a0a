// SPDX-FileCopyrightText: 2026 Fechadura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fechadura - two-factor unlock client for a remotely controlled door lock.
//!
//! This is the binary entry point.

mod console;
mod encrypt;
mod reset;
mod status;
mod stores;
mod unlock;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fechadura_vault::UnlockState;

/// Fechadura - two-factor unlock client for a remotely controlled door lock.
#[derive(Parser, Debug)]
#[command(name = "fechadura", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Unlock the stored credentials and send the unlock command.
    Unlock {
        /// Payload to send instead of the configured one.
        #[arg(long)]
        payload: Option<String>,
    },
    /// Encrypt an identifier/secret pair under a new password.
    Encrypt,
    /// Forget the wrapped key so the next unlock asks for the password again.
    Reset,
    /// Show the stored unlock state and publish target.
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => fechadura_config::load_and_validate_path(path),
        None => fechadura_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            fechadura_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.log.level);
    let use_color = !cli.plain && std::io::stdout().is_terminal();

    let result = match cli.command {
        Commands::Unlock { payload } => unlock::run_unlock(&config, payload, use_color)
            .await
            .map(|state| state == UnlockState::Unlocked),
        Commands::Encrypt => encrypt::run_encrypt().map(|()| true),
        Commands::Reset => reset::run_reset(&config).await.map(|()| true),
        Commands::Status => status::run_status(&config, use_color).await.map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("fechadura: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fechadura={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

//! CLI module for the sdui host.
//!
//! Parses flags and runs the commands that finish before the terminal UI
//! starts:
//!
//! ```ignore
//! use sdui::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args())?;
//! if let Some(result) = run_cli_command(&command, &config).await {
//!     result?;
//!     return Ok(());
//! }
//! // No CLI command, continue to the terminal host
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand, CliOptions, USAGE};
pub use version::{handle_version_command, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::bff::BffClient;
use crate::config::AppConfig;

/// Run a CLI command if applicable.
///
/// * `None` - the command is `Run` (start the terminal host)
/// * `Some(Ok(()))` - a CLI command executed successfully
/// * `Some(Err(e))` - a CLI command failed
///
/// `Version` never returns; it exits the process.
pub async fn run_cli_command(command: &CliCommand, config: &AppConfig) -> Option<Result<()>> {
    match command {
        CliCommand::Version => handle_version_command(),
        CliCommand::Help => {
            println!("{}", USAGE);
            Some(Ok(()))
        }
        CliCommand::Health(_) => Some(handle_health_command(config).await),
        CliCommand::Run(_) => None,
    }
}

async fn handle_health_command(config: &AppConfig) -> Result<()> {
    let client = BffClient::new(config.base_url.clone());
    match client.health_check().await {
        Ok(true) => {
            println!("BFF at {} is healthy", config.base_url);
            Ok(())
        }
        Ok(false) => Err(eyre!("BFF at {} answered with an error status", config.base_url)),
        Err(e) => Err(eyre!("BFF at {} is unreachable: {}", config.base_url, e.user_message())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_returns_none() {
        let result = run_cli_command(&CliCommand::Run(CliOptions::default()), &AppConfig::default()).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_help_succeeds() {
        let result = run_cli_command(&CliCommand::Help, &AppConfig::default()).await;
        assert!(matches!(result, Some(Ok(()))));
    }
}

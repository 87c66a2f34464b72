//! Command-line argument parsing for the sdui host.
//!
//! Flags override the environment:
//!
//! ```text
//! sdui [--url <BFF_URL>] [--screen <SCREEN>] [--texts <FILE>]
//! sdui --health [--url <BFF_URL>]
//! sdui --version | --help
//! ```

use std::path::PathBuf;

use crate::config::AppConfig;
use crate::error::{SduiError, SduiResult};

/// Overrides given on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub url: Option<String>,
    pub screen: Option<String>,
    pub texts: Option<PathBuf>,
}

impl CliOptions {
    /// Layer these options over `config`.
    pub fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(url) = self.url {
            config.base_url = url;
        }
        if let Some(screen) = self.screen {
            config.initial_screen = screen;
        }
        if let Some(texts) = self.texts {
            config.texts_path = Some(texts);
        }
        config
    }
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Probe the BFF's health endpoint and exit
    Health(CliOptions),
    /// Run the terminal host (default)
    Run(CliOptions),
}

pub const USAGE: &str = "\
Usage: sdui [OPTIONS]

Options:
  --url <URL>       BFF base URL (env: SDUI_BFF_URL)
  --screen <NAME>   Screen to open first (env: SDUI_INITIAL_SCREEN)
  --texts <FILE>    Local text catalog JSON (env: SDUI_TEXTS_PATH)
  --health          Check that the BFF is reachable and exit
  -V, --version     Print version
  -h, --help        Print this help";

/// Parse command-line arguments (program name first).
///
/// # Examples
///
/// ```
/// use sdui::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["sdui".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).unwrap(), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> SduiResult<CliCommand>
where
    I: Iterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut health = false;
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        match flag.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--health" => health = true,
            "--url" => options.url = Some(value_for(&flag, inline, &mut args)?),
            "--screen" => options.screen = Some(value_for(&flag, inline, &mut args)?),
            "--texts" => options.texts = Some(PathBuf::from(value_for(&flag, inline, &mut args)?)),
            _ => {
                return Err(SduiError::Config {
                    message: format!("unknown argument '{}'\n\n{}", arg, USAGE),
                })
            }
        }
    }

    Ok(if health {
        CliCommand::Health(options)
    } else {
        CliCommand::Run(options)
    })
}

fn value_for<I>(flag: &str, inline: Option<String>, args: &mut I) -> SduiResult<String>
where
    I: Iterator<Item = String>,
{
    inline
        .or_else(|| args.next())
        .filter(|value| !value.is_empty() && !value.starts_with("--"))
        .ok_or_else(|| SduiError::Config {
            message: format!("{} requires a value", flag),
        })
}

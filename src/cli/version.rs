//! Version command for the sdui host.

/// The current version of sdui, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Handle the --version command.
///
/// Prints the version string and exits successfully.
pub fn handle_version_command() -> ! {
    println!("sdui {}", VERSION);
    std::process::exit(0)
}

//! Logging initialization for the Basecamp CLI

use anyhow::Result;
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Level for the `-q` / `-v` flags. Quiet wins over verbose.
pub fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Initialize stderr logging for the CLI.
///
/// `RUST_LOG` applies unless `-v` or `-q` was given explicitly.
pub fn init_cli_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = log_level(verbose, quiet);

    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stderr)
        .format_timestamp_secs()
        .format_module_path(false);
    if verbose > 0 || quiet || std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(level);
    }
    builder.try_init()?;

    // Initialize panic logging
    #[cfg(debug_assertions)]
    log_panics::init();

    log::debug!("Logging initialized with level: {:?}", level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_selection() {
        assert_eq!(log_level(0, true), LevelFilter::Error);
        assert_eq!(log_level(3, true), LevelFilter::Error);
        assert_eq!(log_level(0, false), LevelFilter::Warn);
        assert_eq!(log_level(1, false), LevelFilter::Debug);
        assert_eq!(log_level(2, false), LevelFilter::Trace);
    }
}

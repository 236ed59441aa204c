//! Subscriber setup for binaries and demos.
//!
//! Library code only emits `tracing` events. Call [`init`] once from `main`
//! to see them. When a log file is configured, output goes there so the
//! fullscreen terminal host is not overdrawn.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{Config, LOG_VAR};
use crate::error::{Error, Result};

/// Install the global `fmt` subscriber described by `config`.
///
/// A second call is a no-op.
pub fn init(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_filter).map_err(|err| Error::Config {
        key: LOG_VAR,
        message: err.to_string(),
    })?;

    let installed = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_rejected() {
        let config = Config { log_filter: "redactio=loudest".to_string(), ..Config::default() };
        assert!(matches!(init(&config), Err(Error::Config { key: LOG_VAR, .. })));
    }

    #[test]
    fn test_init_twice_is_ok() {
        let config = Config::default();
        init(&config).unwrap();
        init(&config).unwrap();
    }
}

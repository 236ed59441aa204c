//! Runtime configuration read from the environment.
//!
//! | Variable               | Meaning                               | Default |
//! |------------------------|---------------------------------------|---------|
//! | `REDACTIO_LOG`         | `tracing` filter directive            | `warn`  |
//! | `REDACTIO_LOG_FILE`    | write logs to this file               | stderr  |
//! | `REDACTIO_CLIPBOARD`   | `internal` or `system`                | `internal` |
//! | `REDACTIO_INPUT_WIDTH` | columns drawn for a text input        | `20`    |

use std::path::PathBuf;

use crate::clipboard::ClipboardBackend;
use crate::error::{Error, Result};

pub const LOG_VAR: &str = "REDACTIO_LOG";
pub const LOG_FILE_VAR: &str = "REDACTIO_LOG_FILE";
pub const CLIPBOARD_VAR: &str = "REDACTIO_CLIPBOARD";
pub const INPUT_WIDTH_VAR: &str = "REDACTIO_INPUT_WIDTH";

/// How the terminal host lays out the live tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Columns drawn for text inputs; longer values show their tail.
    pub input_width: usize,
    /// Columns added per nested list.
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { input_width: 20, indent: 2 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
    pub clipboard: ClipboardBackend,
    pub render: RenderOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            log_file: None,
            clipboard: ClipboardBackend::Internal,
            render: RenderOptions::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(filter) = get(LOG_VAR) {
            config.log_filter = filter;
        }
        config.log_file = get(LOG_FILE_VAR).map(PathBuf::from);
        if let Some(backend) = get(CLIPBOARD_VAR) {
            config.clipboard = backend
                .parse()
                .map_err(|message| Error::Config { key: CLIPBOARD_VAR, message })?;
        }
        if let Some(width) = get(INPUT_WIDTH_VAR) {
            config.render.input_width = match width.trim().parse::<usize>() {
                Ok(width) if width > 0 => width,
                _ => {
                    return Err(Error::Config {
                        key: INPUT_WIDTH_VAR,
                        message: format!("expected a positive integer, got `{width}`"),
                    });
                }
            };
        }
        Ok(config)
    }

    /// Install process-wide settings that live outside the config value.
    pub fn apply(&self) {
        crate::clipboard::set_backend(self.clipboard);
    }
}

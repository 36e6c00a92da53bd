//! Layered configuration for the trellis host.
//!
//! [`Config`] is assembled by `ortho_config` from, in increasing precedence:
//! built-in defaults, a TOML file named by `--config-path` or
//! `TRELLIS_CONFIG_PATH`, `TRELLIS_*` environment variables and command-line
//! flags.
//!
//! | Field                | Flag                   | Environment                   |
//! |----------------------|------------------------|-------------------------------|
//! | `root`               | `--root`               | `TRELLIS_ROOT`                |
//! | `resource_extension` | `--resource-extension` | `TRELLIS_RESOURCE_EXTENSION`  |
//! | `controllers`        | `--controllers`        | `TRELLIS_CONTROLLERS`         |
//! | `log_filter`         | `--log-filter`         | `TRELLIS_LOG_FILTER`          |
//! | `log_format`         | `--log-format`         | `TRELLIS_LOG_FORMAT`          |

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_RESOURCE_EXTENSION, DEFAULT_ROOT, default_log_filter,
    default_log_filter_string, default_log_format, default_resource_extension, default_root,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TRELLIS")]
pub struct Config {
    /// Directory that `controllers/` and `modules/` resources live under.
    #[serde(default = "defaults::default_root")]
    pub root: Utf8PathBuf,
    /// Extension appended to controller and module resource paths.
    #[serde(default = "defaults::default_resource_extension")]
    pub resource_extension: String,
    /// Comma-separated controllers to include at initialisation.
    #[serde(default)]
    pub controllers: String,
    /// `tracing` filter expression.
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "defaults::default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: default_root(),
            resource_extension: default_resource_extension(),
            controllers: String::new(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Resource root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Resource file extension, without the leading dot.
    #[must_use]
    pub fn resource_extension(&self) -> &str {
        self.resource_extension.trim_start_matches('.')
    }

    /// Initial controller names, in the order given, blanks dropped.
    #[must_use]
    pub fn initial_controllers(&self) -> Vec<String> {
        self.controllers
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

#[cfg(test)]
mod tests;

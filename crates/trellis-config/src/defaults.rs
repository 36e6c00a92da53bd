//! Built-in configuration defaults.

use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Default root directory that controller and module paths are resolved against.
pub const DEFAULT_ROOT: &str = ".";

/// Default file extension of controller and module resources.
pub const DEFAULT_RESOURCE_EXTENSION: &str = "js";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default resource root.
#[must_use]
pub fn default_root() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_ROOT)
}

/// Owned resource extension, used where serde needs a default value.
#[must_use]
pub fn default_resource_extension() -> String {
    DEFAULT_RESOURCE_EXTENSION.to_owned()
}

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

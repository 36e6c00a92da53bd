//! Process-wide log output for the host and its loader.
//!
//! The host logs under three targets: [`ENGINE_TARGET`] for requests and
//! cascades, [`HOST_TARGET`] for initialisation and stage changes, and
//! [`LIFECYCLE_TARGET`] for the reporter's events. A configured filter that
//! is a bare `warn` or `error` level would hide page lifecycle progress, so
//! the lifecycle and host targets keep an `info` floor unless the filter
//! names them explicitly.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::{EnvFilter, fmt};

use trellis_config::{Config, LogFormat};

/// Target used by the loader engine.
pub const ENGINE_TARGET: &str = "trellis_loader::engine";
/// Target used by the host façade.
pub const HOST_TARGET: &str = "trellis::host";
/// Target used by [`StructuredLifecycleReporter`](crate::StructuredLifecycleReporter).
pub const LIFECYCLE_TARGET: &str = "trellis::lifecycle";

const INFO_FLOOR_TARGETS: [&str; 2] = [LIFECYCLE_TARGET, HOST_TARGET];

static INSTALLED: OnceCell<Settings> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    filter: String,
    format: LogFormat,
}

/// Describes the subscriber serving this process.
///
/// Only the first [`initialise`] call installs a subscriber. Every handle
/// reports the settings of that installation, so a caller can tell when its
/// own configuration was not the one applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryHandle {
    settings: Settings,
    installed_here: bool,
}

impl TelemetryHandle {
    /// Filter directives in effect, host floors included.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.settings.filter
    }

    /// Output format in effect.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.settings.format
    }

    /// Returns `true` when this call installed the subscriber.
    #[must_use]
    pub const fn installed_here(&self) -> bool {
        self.installed_here
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter is not a valid directive list.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Effective filter that failed to parse.
        filter: String,
        /// Parser message.
        message: String,
    },
    /// Another subscriber already owns the process.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the process-wide subscriber on first use.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an invalid filter and
/// [`TelemetryError::Subscriber`] when a subscriber from elsewhere is
/// already installed.
///
/// # Examples
///
/// ```rust
/// use trellis::telemetry;
/// use trellis_config::Config;
///
/// # fn main() -> Result<(), trellis::telemetry::TelemetryError> {
/// let handle = telemetry::initialise(&Config::default())?;
/// assert!(handle.filter().starts_with("info"));
/// let again = telemetry::initialise(&Config::default())?;
/// assert!(!again.installed_here());
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let mut installed_here = false;
    let settings = INSTALLED.get_or_try_init(|| {
        let settings = Settings {
            filter: effective_filter(config.log_filter()),
            format: config.log_format(),
        };
        install(&settings)?;
        installed_here = true;
        Ok::<_, TelemetryError>(settings)
    })?;
    Ok(TelemetryHandle {
        settings: settings.clone(),
        installed_here,
    })
}

/// Adds the host's `info` floors to a configured filter.
///
/// Floors are added only when the filter's default level is `warn` or
/// `error` and the filter has no directive of its own for the target.
pub(crate) fn effective_filter(configured: &str) -> String {
    let configured = configured.trim();
    let directives: Vec<&str> = configured
        .split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .collect();
    let default_level = directives
        .iter()
        .filter(|directive| !directive.contains('='))
        .find_map(|directive| directive.parse::<LevelFilter>().ok());

    let quiet = default_level
        .is_some_and(|level| level > LevelFilter::OFF && level < LevelFilter::INFO);
    if !quiet {
        return configured.to_owned();
    }

    let mut filter = directives.join(",");
    for target in INFO_FLOOR_TARGETS {
        let named = directives
            .iter()
            .any(|directive| directive.starts_with(target));
        if !named {
            filter.push(',');
            filter.push_str(target);
            filter.push_str("=info");
        }
    }
    filter
}

fn install(settings: &Settings) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&settings.filter).map_err(|error| TelemetryError::Filter {
        filter: settings.filter.clone(),
        message: error.to_string(),
    })?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match settings.format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

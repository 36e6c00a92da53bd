//! Page lifecycle stages and structured lifecycle reporting.

use std::fmt;
use std::sync::Arc;

use trellis_config::Config;
use trellis_loader::{Name, StallReport};

use crate::bootstrap::BootstrapError;
use crate::telemetry::LIFECYCLE_TARGET as TARGET;

/// Position of the host in the page lifecycle. Stages only move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// The document is still loading.
    #[default]
    Booting,
    /// The document is parsed and ready.
    DomReady,
    /// The document and its resources have fully loaded.
    Loaded,
    /// The page is going away.
    Unloaded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Booting => "booting",
            Self::DomReady => "dom_ready",
            Self::Loaded => "loaded",
            Self::Unloaded => "unloaded",
        })
    }
}

/// Observer trait used to surface host lifecycle events to telemetry sinks.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked after a module or controller has been created.
    fn artifact_created(&self, name: &Name);

    /// Invoked when the host enters a new stage.
    fn stage_entered(&self, stage: Stage, controllers: usize);

    /// Invoked when a diagnosis finds unresolved entries.
    fn stalled(&self, report: &StallReport);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn artifact_created(&self, name: &Name) {
        (**self).artifact_created(name);
    }

    fn stage_entered(&self, stage: Stage, controllers: usize) {
        (**self).stage_entered(stage, controllers);
    }

    fn stalled(&self, report: &StallReport) {
        (**self).stalled(report);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: TARGET,
            event = "bootstrap_starting",
            "starting host bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: TARGET,
            event = "bootstrap_succeeded",
            root = %config.root(),
            resource_extension = config.resource_extension(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "host bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: TARGET,
            event = "bootstrap_failed",
            error = %error,
            "host bootstrap failed"
        );
    }

    fn artifact_created(&self, name: &Name) {
        tracing::debug!(
            target: TARGET,
            event = "artifact_created",
            name = %name,
            "artifact created"
        );
    }

    fn stage_entered(&self, stage: Stage, controllers: usize) {
        tracing::info!(
            target: TARGET,
            event = "stage_entered",
            stage = %stage,
            controllers,
            "lifecycle stage entered"
        );
    }

    fn stalled(&self, report: &StallReport) {
        let unfetched: Vec<String> = report.unfetched().iter().map(ToString::to_string).collect();
        let cycles: Vec<String> = report
            .cycles()
            .iter()
            .map(|cycle| {
                cycle
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" -> ")
            })
            .collect();
        tracing::warn!(
            target: TARGET,
            event = "stalled",
            summary = %report,
            unfetched = ?unfetched,
            cycles = ?cycles,
            "unresolved artifacts remain"
        );
    }
}

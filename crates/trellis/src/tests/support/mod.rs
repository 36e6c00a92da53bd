//! Test doubles shared by the host suites.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Mutex;

use trellis_config::Config;
use trellis_loader::{Name, StallReport};

use crate::artifact::{ArtifactError, Context, Controller};
use crate::bootstrap::BootstrapError;
use crate::lifecycle::{LifecycleReporter, Stage};

/// Ordered record of controller hook calls, as `name:hook` strings.
pub(crate) type Log = Rc<RefCell<Vec<String>>>;

/// Controller that writes every hook call to a shared [`Log`].
pub(crate) struct Probe {
    name: String,
    log: Log,
}

impl Probe {
    fn record(&self, hook: &str) {
        self.log.borrow_mut().push(format!("{}:{hook}", self.name));
    }
}

impl Controller for Probe {
    fn on_create(&mut self, _context: &Context<'_>) {
        self.record("create");
    }

    fn init(&mut self) {
        self.record("init");
    }

    fn on_load(&mut self) {
        self.record("load");
    }

    fn on_unload(&mut self) {
        self.record("unload");
    }

    fn done(&mut self) {
        self.record("done");
    }
}

/// Factory building a [`Probe`] named after the controller being created.
pub(crate) fn probe(log: &Log) -> impl FnOnce(&Context<'_>) -> Result<Probe, ArtifactError> + 'static {
    let log = Rc::clone(log);
    move |context: &Context<'_>| {
        Ok(Probe {
            name: context.name().local().to_owned(),
            log,
        })
    }
}

/// Snapshot of a [`Log`].
pub(crate) fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// Lifecycle events tracked during tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LifecycleEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ArtifactCreated(String),
    StageEntered(Stage),
    Stalled(String),
}

/// Records lifecycle events for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingLifecycleReporter {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingLifecycleReporter {
    pub(crate) fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .expect("lifecycle reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: LifecycleEvent) {
        self.events
            .lock()
            .expect("lifecycle reporter mutex poisoned")
            .push(event);
    }
}

impl LifecycleReporter for RecordingLifecycleReporter {
    fn bootstrap_starting(&self) {
        self.record(LifecycleEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(LifecycleEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(LifecycleEvent::BootstrapFailed(error.to_string()));
    }

    fn artifact_created(&self, name: &Name) {
        self.record(LifecycleEvent::ArtifactCreated(name.to_string()));
    }

    fn stage_entered(&self, stage: Stage, _controllers: usize) {
        self.record(LifecycleEvent::StageEntered(stage));
    }

    fn stalled(&self, report: &StallReport) {
        self.record(LifecycleEvent::Stalled(report.to_string()));
    }
}

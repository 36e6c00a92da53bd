//! Loader engine: requests, declarations and creation cascades.
//!
//! The [`Loader`] owns one [`Ledger`] and drives it through three regimes:
//!
//! - **Preloading**: declarations made before [`Loader::initialise`] are
//!   buffered in FIFO order and drained once by [`Loader::create_preloaded`].
//! - **Live declarations**: [`Loader::loaded`] declares an artifact, usually
//!   after the fetch requested through [`LoaderHooks::include`] completed.
//! - **Creation**: once an entry has no unresolved dependency left, the
//!   engine hands its payload to [`LoaderHooks::create`] and resolves it,
//!   which may make further entries ready.
//!
//! Cascades run on an explicit work queue, so arbitrarily deep dependency
//! chains do not grow the call stack. Entries made ready by the same
//! resolution are created in declaration order.

mod preload;

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::deps::DependencySet;
use crate::error::{LedgerError, LoaderError};
use crate::ledger::{Ledger, StallReport};
use crate::name::Name;

use self::preload::{Declaration, PreloadBuffer};

const TARGET: &str = "trellis_loader::engine";

/// Callbacks injected into the [`Loader`].
///
/// # Example
///
/// ```
/// use trellis_loader::{LoaderHooks, Name};
///
/// #[derive(Default)]
/// struct Recorder {
///     requested: Vec<Name>,
///     created: Vec<Name>,
/// }
///
/// impl LoaderHooks<()> for Recorder {
///     type Error = std::convert::Infallible;
///
///     fn include(&mut self, name: &Name) -> Result<(), Self::Error> {
///         self.requested.push(name.clone());
///         Ok(())
///     }
///
///     fn create(&mut self, name: &Name, _payload: ()) -> Result<(), Self::Error> {
///         self.created.push(name.clone());
///         Ok(())
///     }
/// }
/// ```
pub trait LoaderHooks<P> {
    /// Error returned by the hooks; propagated unchanged by the loader.
    type Error;

    /// Starts fetching `name`.
    ///
    /// The fetch must eventually lead to exactly one [`Loader::loaded`] call
    /// for `name`. The hook should return without waiting for it.
    ///
    /// # Errors
    ///
    /// Any error aborts the current loader call.
    fn include(&mut self, name: &Name) -> Result<(), Self::Error>;

    /// Materialises `name` from its declared payload.
    ///
    /// # Errors
    ///
    /// Any error aborts the current loader call; the entry stays pending.
    fn create(&mut self, name: &Name, payload: P) -> Result<(), Self::Error>;
}

enum Step<P> {
    Declare(Declaration<P>),
    Create(Name),
}

/// Dependency-graph loader.
///
/// # Example
///
/// ```
/// use trellis_loader::{normalize, Loader, LoaderHooks, Name, Namespace};
///
/// #[derive(Default)]
/// struct Recorder(Vec<String>);
///
/// impl LoaderHooks<&'static str> for Recorder {
///     type Error = std::convert::Infallible;
///
///     fn include(&mut self, _name: &Name) -> Result<(), Self::Error> {
///         Ok(())
///     }
///
///     fn create(&mut self, _name: &Name, payload: &'static str) -> Result<(), Self::Error> {
///         self.0.push(payload.to_owned());
///         Ok(())
///     }
/// }
///
/// let mut loader = Loader::new(Recorder::default());
/// let a = Name::new(Namespace::Module, "A").expect("valid name");
/// let b = Name::new(Namespace::Module, "B").expect("valid name");
///
/// loader
///     .preload(a, normalize(&"B".into(), Namespace::Module).expect("valid"), "A")
///     .expect("before init");
/// loader.initialise().expect("first initialisation");
/// loader.create_preloaded().expect("drain");
/// loader
///     .loaded(b, Default::default(), "B")
///     .expect("declare B");
///
/// assert_eq!(loader.hooks().0, ["B", "A"]);
/// ```
#[derive(Debug)]
pub struct Loader<P, H> {
    ledger: Ledger<P>,
    preload: PreloadBuffer<P>,
    hooks: H,
    initialised: bool,
    drained: bool,
}

impl<P, H> Loader<P, H> {
    /// Creates an uninitialised loader around the given hooks.
    #[must_use]
    pub fn new(hooks: H) -> Self {
        Self {
            ledger: Ledger::new(),
            preload: PreloadBuffer::default(),
            hooks,
            initialised: false,
            drained: false,
        }
    }

    /// Read access to the resolution ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger<P> {
        &self.ledger
    }

    /// Read access to the hooks.
    #[must_use]
    pub const fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Mutable access to the hooks.
    #[must_use]
    pub const fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Returns whether [`Loader::initialise`] has run.
    #[must_use]
    pub const fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Number of declarations still waiting in the preload buffer.
    #[must_use]
    pub fn preloaded_len(&self) -> usize {
        self.preload.buffered()
    }

    /// Describes every entry that has not resolved yet.
    #[must_use]
    pub fn stall_report(&self) -> StallReport {
        self.ledger.stall_report()
    }
}

impl<P, H> Loader<P, H>
where
    H: LoaderHooks<P>,
{
    /// Buffers a declaration made before initialisation.
    ///
    /// The ledger is not touched; redeclaration is detected when the buffer
    /// is drained.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::PreloadAfterInit`] once the loader is
    /// initialised.
    pub fn preload(
        &mut self,
        name: Name,
        dependencies: DependencySet,
        payload: P,
    ) -> Result<(), LoaderError<H::Error>> {
        if self.initialised {
            return Err(LoaderError::PreloadAfterInit { name });
        }
        debug!(target: TARGET, name = %name, dependencies = dependencies.len(), "buffered preload");
        self.preload.push(Declaration {
            name,
            dependencies,
            payload,
        });
        Ok(())
    }

    /// Marks the loader initialised; live declarations are accepted from now.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::AlreadyInitialised`] on a second call.
    pub fn initialise(&mut self) -> Result<(), LoaderError<H::Error>> {
        if self.initialised {
            return Err(LoaderError::AlreadyInitialised);
        }
        self.initialised = true;
        Ok(())
    }

    /// Requests every name not requested yet.
    ///
    /// After initialisation a name still sitting in the preload buffer is
    /// declared from there instead of being fetched. Completion of a fetch
    /// arrives later through [`Loader::loaded`].
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Include`] when the includer fails, and any
    /// error raised by a cascade triggered from the preload buffer.
    pub fn include<'a, I>(&mut self, names: I) -> Result<(), LoaderError<H::Error>>
    where
        I: IntoIterator<Item = &'a Name>,
    {
        let mut queue = VecDeque::new();
        self.request_all(names, &mut queue)?;
        self.run(queue)
    }

    /// Declares `name` after initialisation.
    ///
    /// Every dependency is requested first. When all of them are already
    /// resolved the artifact is created and resolved synchronously, together
    /// with everything that becomes ready as a consequence.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::LiveDeclareBeforeInit`] before initialisation,
    /// [`LoaderError::Ledger`] on redeclaration, and hook failures from the
    /// includes and creations this call triggers.
    pub fn loaded(
        &mut self,
        name: Name,
        dependencies: DependencySet,
        payload: P,
    ) -> Result<(), LoaderError<H::Error>> {
        if !self.initialised {
            return Err(LoaderError::LiveDeclareBeforeInit { name });
        }
        self.run(VecDeque::from([Step::Declare(Declaration {
            name,
            dependencies,
            payload,
        })]))
    }

    /// Drains the preload buffer once, in FIFO order.
    ///
    /// Entries already declared through an earlier cascade are skipped. A
    /// failure aborts the drain; the remaining buffered entries are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::NotInitialised`] before [`Loader::initialise`],
    /// [`LoaderError::AlreadyInitialised`] on a second drain, and the first
    /// error raised while declaring a buffered entry.
    pub fn create_preloaded(&mut self) -> Result<(), LoaderError<H::Error>> {
        if !self.initialised {
            return Err(LoaderError::NotInitialised);
        }
        if self.drained {
            return Err(LoaderError::AlreadyInitialised);
        }
        self.drained = true;
        let outcome = self.drain_preloaded();
        self.preload.clear();
        outcome
    }

    fn drain_preloaded(&mut self) -> Result<(), LoaderError<H::Error>> {
        let mut declared = 0_usize;
        let mut skipped = 0_usize;
        for position in 0..self.preload.len() {
            let Some(declaration) = self.preload.take_at(position) else {
                skipped += 1;
                continue;
            };
            self.run(VecDeque::from([Step::Declare(declaration)]))?;
            declared += 1;
        }
        info!(target: TARGET, declared, skipped, "preload buffer drained");
        Ok(())
    }

    fn request_all<'a, I>(
        &mut self,
        names: I,
        queue: &mut VecDeque<Step<P>>,
    ) -> Result<(), LoaderError<H::Error>>
    where
        I: IntoIterator<Item = &'a Name>,
    {
        for name in names {
            if !self.ledger.mark_requested(name) {
                continue;
            }
            if self.initialised
                && let Some(declaration) = self.preload.take(name)
            {
                debug!(target: TARGET, name = %name, "satisfied from preload buffer");
                queue.push_back(Step::Declare(declaration));
                continue;
            }
            debug!(target: TARGET, name = %name, "requesting");
            self.hooks
                .include(name)
                .map_err(|source| LoaderError::Include {
                    name: name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    fn run(&mut self, mut queue: VecDeque<Step<P>>) -> Result<(), LoaderError<H::Error>> {
        while let Some(step) = queue.pop_front() {
            match step {
                Step::Declare(declaration) => self.declare(declaration, &mut queue)?,
                Step::Create(name) => self.create(&name, &mut queue)?,
            }
        }
        Ok(())
    }

    fn declare(
        &mut self,
        declaration: Declaration<P>,
        queue: &mut VecDeque<Step<P>>,
    ) -> Result<(), LoaderError<H::Error>> {
        let Declaration {
            name,
            dependencies,
            payload,
        } = declaration;
        self.ledger.ensure_declarable(&name)?;
        self.request_all(dependencies.iter(), queue)?;

        debug!(target: TARGET, name = %name, dependencies = dependencies.len(), "declared");
        if self.ledger.declare(name.clone(), dependencies, payload)? {
            queue.push_back(Step::Create(name));
        }
        Ok(())
    }

    fn create(
        &mut self,
        name: &Name,
        queue: &mut VecDeque<Step<P>>,
    ) -> Result<(), LoaderError<H::Error>> {
        let payload = self
            .ledger
            .take_payload(name)
            .ok_or_else(|| LedgerError::NotDeclared { name: name.clone() })?;
        debug!(target: TARGET, name = %name, "creating");
        self.hooks
            .create(name, payload)
            .map_err(|source| LoaderError::Create {
                name: name.clone(),
                source,
            })?;
        let cascade = self.ledger.resolve(name)?;
        debug!(target: TARGET, name = %name, released = cascade.len(), "resolved");
        queue.extend(cascade.into_iter().map(Step::Create));
        Ok(())
    }
}

//! Behaviour-driven tests for dependency resolution.

use std::cell::RefCell;
use std::convert::Infallible;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::RecordingHooks;
use crate::{DependencySet, Loader, LoaderError, Name, Namespace, normalize};

#[derive(Default)]
struct TestWorld {
    loader: Option<Loader<(), RecordingHooks>>,
    last_error: Option<LoaderError<Infallible>>,
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches('"')
}

fn parse_name(raw: &str) -> Name {
    strip_quotes(raw).parse().expect("valid artifact name")
}

fn parse_dependencies(raw: &str) -> DependencySet {
    normalize(&strip_quotes(raw).into(), Namespace::Module).expect("valid dependencies")
}

fn created(world: &TestWorld) -> Vec<String> {
    world
        .loader
        .as_ref()
        .expect("loader should be configured")
        .hooks()
        .created
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn record(world: &RefCell<TestWorld>, name: Name, dependencies: DependencySet, preload: bool) {
    let mut state = world.borrow_mut();
    let loader = state.loader.as_mut().expect("loader should be configured");
    let outcome = if preload {
        loader.preload(name, dependencies, ())
    } else {
        loader.loaded(name, dependencies, ())
    };
    state.last_error = outcome.err();
}

#[given("a fresh loader")]
fn given_fresh_loader(world: &RefCell<TestWorld>) {
    world.borrow_mut().loader = Some(Loader::new(RecordingHooks::default()));
}

#[given("an initialised loader")]
fn given_initialised_loader(world: &RefCell<TestWorld>) {
    let mut loader = Loader::new(RecordingHooks::default());
    loader.initialise().expect("initialise");
    loader.create_preloaded().expect("drain");
    world.borrow_mut().loader = Some(loader);
}

#[given("{name} is preloaded with dependencies {dependencies}")]
fn given_preloaded(world: &RefCell<TestWorld>, name: String, dependencies: String) {
    record(world, parse_name(&name), parse_dependencies(&dependencies), true);
}

#[given("{name} is preloaded with no dependencies")]
fn given_preloaded_leaf(world: &RefCell<TestWorld>, name: String) {
    record(world, parse_name(&name), DependencySet::empty(), true);
}

#[when("{name} is declared with dependencies {dependencies}")]
fn when_declared(world: &RefCell<TestWorld>, name: String, dependencies: String) {
    record(world, parse_name(&name), parse_dependencies(&dependencies), false);
}

#[when("{name} is declared with no dependencies")]
fn when_declared_leaf(world: &RefCell<TestWorld>, name: String) {
    record(world, parse_name(&name), DependencySet::empty(), false);
}

#[when("the loader is initialised and drained")]
fn when_initialised(world: &RefCell<TestWorld>) {
    let mut state = world.borrow_mut();
    let loader = state.loader.as_mut().expect("loader should be configured");
    loader.initialise().expect("initialise");
    let outcome = loader.create_preloaded();
    state.last_error = outcome.err();
}

#[then("the creation order is {order}")]
fn then_creation_order(world: &RefCell<TestWorld>, order: String) {
    let expected: Vec<String> = strip_quotes(&order)
        .split(',')
        .map(|token| token.trim().to_owned())
        .collect();
    assert_eq!(created(&world.borrow()), expected);
}

#[then("{name} has not been created")]
fn then_not_created(world: &RefCell<TestWorld>, name: String) {
    let token = strip_quotes(&name);
    assert!(!created(&world.borrow()).iter().any(|created| created == token));
}

#[then("nothing has been created")]
fn then_nothing_created(world: &RefCell<TestWorld>) {
    assert!(created(&world.borrow()).is_empty());
}

#[then("nothing was requested")]
fn then_nothing_requested(world: &RefCell<TestWorld>) {
    let state = world.borrow();
    let loader = state.loader.as_ref().expect("loader should be configured");
    assert!(loader.hooks().requested.is_empty());
}

#[then("the last declaration failed as a redeclaration")]
fn then_redeclaration(world: &RefCell<TestWorld>) {
    let state = world.borrow();
    match state.last_error.as_ref() {
        Some(LoaderError::Ledger(error)) => assert!(error.is_redeclaration()),
        other => panic!("expected a redeclaration error, got {other:?}"),
    }
}

#[then("the stall report lists {count} cycle")]
fn then_cycles(world: &RefCell<TestWorld>, count: usize) {
    let state = world.borrow();
    let loader = state.loader.as_ref().expect("loader should be configured");
    assert_eq!(loader.stall_report().cycles().len(), count);
}

#[scenario(
    path = "tests/features/loader_resolution.feature",
    name = "Dependencies are created before their dependents"
)]
fn dependencies_first(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/loader_resolution.feature",
    name = "Preloaded artifacts are created once the loader is initialised"
)]
fn preloaded_artifacts(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/loader_resolution.feature",
    name = "Declaring the same artifact twice fails"
)]
fn redeclaration(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/loader_resolution.feature",
    name = "A dependency cycle stalls and is reported"
)]
fn stalled_cycle(world: RefCell<TestWorld>) {
    let _ = world;
}

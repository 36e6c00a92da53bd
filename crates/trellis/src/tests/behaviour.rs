//! Behaviour-driven tests for the host lifecycle.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use trellis_loader::DependencySpec;

use super::support::{Log, entries, probe};
use crate::artifact::Context;
use crate::error::HostError;
use crate::host::{Host, InitParams};
use crate::transport::{QueuedTransport, Request};

#[derive(Default)]
struct TestWorld {
    host: Option<Host<QueuedTransport>>,
    log: Log,
    last_error: Option<HostError>,
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

fn host_mut(world: &mut TestWorld) -> &mut Host<QueuedTransport> {
    world.host.as_mut().expect("host should be configured")
}

fn split(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect()
}

#[given("a host that is not initialised")]
fn given_fresh_host(world: &RefCell<TestWorld>) {
    world.borrow_mut().host = Some(Host::new(QueuedTransport::new()));
}

#[given("an initialised host with root \"{root}\"")]
fn given_initialised_host(world: &RefCell<TestWorld>, root: String) {
    let mut host = Host::new(QueuedTransport::new());
    host.init(InitParams::new().with_root(root))
        .expect("initialise");
    world.borrow_mut().host = Some(host);
}

#[when("module \"{name}\" is declared")]
fn when_module_declared(world: &RefCell<TestWorld>, name: String) {
    let mut state = world.borrow_mut();
    let outcome = host_mut(&mut state).module(&name, "", |_: &Context<'_>| Ok(()));
    state.last_error = outcome.err();
}

#[when("controller \"{name}\" is declared")]
fn when_controller_declared(world: &RefCell<TestWorld>, name: String) {
    let mut state = world.borrow_mut();
    let factory = probe(&state.log);
    let outcome = host_mut(&mut state).controller(&name, "", factory);
    state.last_error = outcome.err();
}

#[when("controller \"{name}\" is declared depending on library \"{library}\" and extension \"{extension}\"")]
fn when_controller_with_leaves(
    world: &RefCell<TestWorld>,
    name: String,
    library: String,
    extension: String,
) {
    let mut state = world.borrow_mut();
    let factory = probe(&state.log);
    let dependencies = DependencySpec::by_namespace([("libs", [library]), ("go", [extension])]);
    let outcome = host_mut(&mut state).controller(&name, dependencies, factory);
    state.last_error = outcome.err();
}

#[when("the host is initialised with root \"{root}\" and controllers \"{controllers}\"")]
fn when_initialised(world: &RefCell<TestWorld>, root: String, controllers: String) {
    let params = split(&controllers)
        .into_iter()
        .fold(InitParams::new().with_root(root), InitParams::with_controller);
    let mut state = world.borrow_mut();
    let outcome = host_mut(&mut state).init(params);
    state.last_error = outcome.err();
}

#[when("library \"{name}\" finishes loading")]
fn when_library_loaded(world: &RefCell<TestWorld>, name: String) {
    let mut state = world.borrow_mut();
    let outcome = host_mut(&mut state).library_loaded(&name);
    state.last_error = outcome.err();
}

#[when("extension \"{name}\" finishes loading")]
fn when_extension_loaded(world: &RefCell<TestWorld>, name: String) {
    let mut state = world.borrow_mut();
    let outcome = host_mut(&mut state).extension_loaded(&name);
    state.last_error = outcome.err();
}

#[when("the document becomes ready")]
fn when_dom_ready(world: &RefCell<TestWorld>) {
    host_mut(&mut world.borrow_mut()).dom_ready();
}

#[when("the page finishes loading")]
fn when_full_load(world: &RefCell<TestWorld>) {
    host_mut(&mut world.borrow_mut()).full_load();
}

#[when("the page unloads")]
fn when_unload(world: &RefCell<TestWorld>) {
    host_mut(&mut world.borrow_mut()).unload();
}

#[then("the transport received \"{requests}\"")]
fn then_transport_received(world: &RefCell<TestWorld>, requests: String) {
    let expected: Vec<Request> = split(&requests)
        .into_iter()
        .map(|item| match item.split_once(' ') {
            Some(("file", path)) => Request::File(path.into()),
            Some(("library", name)) => Request::Library(name.to_owned()),
            Some(("extension", name)) => Request::Extension(name.to_owned()),
            _ => panic!("unknown request description: {item}"),
        })
        .collect();
    let mut state = world.borrow_mut();
    assert_eq!(host_mut(&mut state).transport_mut().drain(), expected);
}

#[then("module \"{name}\" exists")]
fn then_module_exists(world: &RefCell<TestWorld>, name: String) {
    let mut state = world.borrow_mut();
    assert!(host_mut(&mut state).module_ref::<()>(&name).is_some());
}

#[then("controller \"{name}\" exists")]
fn then_controller_exists(world: &RefCell<TestWorld>, name: String) {
    let mut state = world.borrow_mut();
    assert!(host_mut(&mut state).has_controller(&name));
}

#[then("controller \"{name}\" does not exist")]
fn then_controller_missing(world: &RefCell<TestWorld>, name: String) {
    let mut state = world.borrow_mut();
    assert!(!host_mut(&mut state).has_controller(&name));
}

#[then("the controller log is \"{log}\"")]
fn then_controller_log(world: &RefCell<TestWorld>, log: String) {
    assert_eq!(entries(&world.borrow().log), split(&log));
}

#[then("the last declaration failed as a redeclaration")]
fn then_redeclaration(world: &RefCell<TestWorld>) {
    let state = world.borrow();
    match state.last_error.as_ref() {
        Some(error) => assert!(error.is_redeclaration(), "unexpected error: {error}"),
        None => panic!("expected the last declaration to fail"),
    }
}

#[scenario(
    path = "tests/features/host_lifecycle.feature",
    name = "Controllers wait for their libraries and extensions"
)]
fn controllers_wait_for_leaves(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/host_lifecycle.feature",
    name = "Preloaded declarations are created at initialisation"
)]
fn preloaded_declarations(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/host_lifecycle.feature",
    name = "Late controllers catch up with the page lifecycle"
)]
fn late_controllers(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/host_lifecycle.feature",
    name = "Unloading tears controllers down in creation order"
)]
fn unloading(world: RefCell<TestWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/host_lifecycle.feature",
    name = "Redeclaring a created module fails"
)]
fn module_redeclaration(world: RefCell<TestWorld>) {
    let _ = world;
}

//! Crate-level integration and BDD tests.

use std::convert::Infallible;

use crate::{DependencySpec, Loader, LoaderHooks, Name, Namespace, Status, normalize};

mod behaviour;

/// Hooks recording every request and creation, in call order.
#[derive(Debug, Default)]
struct RecordingHooks {
    requested: Vec<Name>,
    created: Vec<Name>,
}

impl LoaderHooks<()> for RecordingHooks {
    type Error = Infallible;

    fn include(&mut self, name: &Name) -> Result<(), Self::Error> {
        self.requested.push(name.clone());
        Ok(())
    }

    fn create(&mut self, name: &Name, _payload: ()) -> Result<(), Self::Error> {
        self.created.push(name.clone());
        Ok(())
    }
}

#[test]
fn declarations_parsed_from_json_resolve_end_to_end() {
    let page: Vec<(String, DependencySpec)> = serde_json::from_str(
        r#"[
            ["c:menu", {"libs": ["jquery-ui"], "go": ["Ext"], "modules": ["storage"]}],
            ["mo:storage", "l:json"],
            ["go:Ext", null],
            ["l:json", []],
            ["l:jquery-ui", ""]
        ]"#,
    )
    .expect("valid page description");

    let mut loader = Loader::new(RecordingHooks::default());
    loader.initialise().expect("initialise");
    loader.create_preloaded().expect("drain");

    for (token, spec) in &page {
        let name: Name = token.parse().expect("valid name");
        let dependencies = normalize(spec, name.namespace()).expect("valid dependencies");
        loader.loaded(name, dependencies, ()).expect("declare");
    }

    let created: Vec<String> = loader
        .hooks()
        .created
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        created,
        ["go:Ext", "l:json", "mo:storage", "l:jquery-ui", "c:menu"]
    );
    assert!(loader.stall_report().is_empty());
    assert!(
        loader
            .ledger()
            .iter()
            .all(|(_, entry)| entry.status() == Status::Resolved)
    );
    assert_eq!(
        loader.hooks().requested.first().map(Name::namespace),
        Some(Namespace::Module)
    );
}

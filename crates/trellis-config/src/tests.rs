//! Unit tests for configuration accessors.

use rstest::rstest;

use super::*;

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.root().as_str(), DEFAULT_ROOT);
    assert_eq!(config.resource_extension(), "js");
    assert!(config.initial_controllers().is_empty());
    assert_eq!(config.log_filter(), default_log_filter());
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[rstest]
#[case("", &[])]
#[case("menu", &["menu"])]
#[case(" menu , , admin.users ", &["menu", "admin.users"])]
fn initial_controllers_split_on_commas(#[case] raw: &str, #[case] expected: &[&str]) {
    let config = Config {
        controllers: raw.to_owned(),
        ..Config::default()
    };
    assert_eq!(config.initial_controllers(), expected);
}

#[test]
fn resource_extension_drops_a_leading_dot() {
    let config = Config {
        resource_extension: ".mjs".to_owned(),
        ..Config::default()
    };
    assert_eq!(config.resource_extension(), "mjs");
}

#[rstest]
#[case("json", LogFormat::Json)]
#[case("COMPACT", LogFormat::Compact)]
fn log_format_parses_case_insensitively(#[case] raw: &str, #[case] expected: LogFormat) {
    assert_eq!(raw.parse::<LogFormat>(), Ok(expected));
}

#[test]
fn unknown_log_format_is_rejected() {
    assert!("pretty".parse::<LogFormat>().is_err());
}

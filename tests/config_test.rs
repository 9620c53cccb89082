//! Integration tests for Settings config loading with layered merge semantics.
//!
//! These tests run without a global config (temp directories only), so they
//! test local config merging onto compiled defaults.

use std::fs;

use tempfile::TempDir;

use rigsmith::config::{local_config_path, OutputFormat, Settings};

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
widget_prefix = "WGT_"
output = "json"

[super_copy]
widget_type = "diamond"
make_deform = false
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.widget_prefix, "WGT_");
    assert_eq!(settings.output, OutputFormat::Json);
    assert_eq!(settings.super_copy.widget_type, "diamond");
    assert!(!settings.super_copy.make_deform);
    assert!(settings.super_copy.make_control, "unspecified keys keep defaults");
}

#[test]
fn given_directory_without_config_when_load_then_uses_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.super_copy, Settings::default().super_copy);
}

#[test]
fn given_malformed_local_config_when_load_then_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "[super_copy\n").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(result.is_err());
}

//! Tests for layered settings loading

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use treeselect::application::{ApplicationError, TreeSelector};
use treeselect::config::{SelectorConfig, Settings};
use treeselect::domain::Forest;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("treeselect.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn given_local_file_when_loading_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[selector]
multiple = true
delimiter = "|"
max_length = 3

[selector.fields]
value_field = "id"
"#,
    );

    let settings = Settings::load(Some(path.as_path())).unwrap();

    assert!(settings.selector.multiple);
    assert_eq!(settings.selector.delimiter, "|");
    assert_eq!(settings.selector.max_length, Some(3));
    assert_eq!(settings.selector.fields.value_field, "id");
    assert_eq!(settings.selector.fields.label_field, "label");
    assert!(settings.selector.self_disabled_affect_children);
}

#[test]
fn given_missing_local_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();

    let err = Settings::load(Some(dir.path().join("absent.toml").as_path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_empty_field_name_when_loading_then_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[selector.fields]\nlabel_field = \"\"\n");

    let err = Settings::load(Some(path.as_path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Domain(_)));
}

#[test]
fn given_loaded_settings_when_showing_then_toml_round_trips() {
    let settings = Settings {
        selector: SelectorConfig {
            only_children: true,
            root_label: "All".into(),
            ..SelectorConfig::default()
        },
    };

    let text = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&text).unwrap();

    assert_eq!(parsed, settings);
}

#[test]
fn given_renamed_fields_when_selecting_then_engine_uses_them() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[selector]
multiple = true

[selector.fields]
label_field = "name"
value_field = "id"
"#,
    );
    let settings = Settings::load(Some(path.as_path())).unwrap();
    let forest = Forest::from_json(&json!([
        {"name": "One", "id": 1},
        {"name": "Two", "id": 2}
    ]))
    .unwrap();

    let sel = TreeSelector::new(settings.selector, forest, &json!("2"), ()).unwrap();

    assert_eq!(sel.value(), json!("2"));
    assert_eq!(sel.view().nodes[1].label, "Two");
    assert!(sel.view().nodes[1].state.checked);
}

use std::fs;

use serde_json::json;
use tempfile::tempdir;

use crate::kernel::error::Error;
use crate::loader::{Group, Manifest, ManifestValidator, ModuleId};

#[test]
fn test_valid_manifest() {
    let manifest = ManifestValidator::validate(&json!({
        "core": {
            "controllers": { "router": "ctl/router" },
            "modules": { "b": "mod/b", "a": "mod/a" }
        },
        "widgets": { "clock": "wdg/clock" }
    }))
    .unwrap();

    assert_eq!(manifest.groups(), vec![Group::Controllers, Group::Modules, Group::Widgets]);
    assert_eq!(manifest.len(), 4);
    let modules = manifest.section(Group::Modules).unwrap();
    let names: Vec<&String> = modules.keys().collect();
    assert_eq!(names, vec!["b", "a"], "Manifest order is preserved");
    assert_eq!(modules.get("a"), Some(&ModuleId::new("mod/a")));
}

#[test]
fn test_null_and_empty_groups_are_absent() {
    let manifest = Manifest::from_value(&json!({ "core": null, "plugins": {}, "widgets": null })).unwrap();
    assert!(manifest.is_empty());
    assert!(manifest.groups().is_empty());

    assert!(Manifest::from_value(&json!(null)).unwrap().is_empty());
}

#[test]
fn test_non_string_identifier_is_rejected() {
    let err = ManifestValidator::validate(&json!({ "core": { "services": { "clock": ["svc"] } } })).unwrap_err();

    match err {
        Error::ManifestValidation { group, entry, message } => {
            assert_eq!(group, "core.services");
            assert_eq!(entry.as_deref(), Some("clock"));
            assert!(message.contains("a list"), "message was: {}", message);
        }
        other => panic!("Expected ManifestValidation, got {:?}", other),
    }
}

#[test]
fn test_group_must_be_a_mapping() {
    let err = ManifestValidator::validate(&json!({ "plugins": ["a", "b"] })).unwrap_err();
    assert!(matches!(err, Error::ManifestValidation { ref group, entry: None, .. } if group == "plugins"));

    let err = ManifestValidator::validate(&json!("plugins")).unwrap_err();
    assert!(matches!(err, Error::ManifestValidation { ref group, .. } if group == "manifest"));

    let err = ManifestValidator::validate(&json!({ "core": 7 })).unwrap_err();
    assert!(matches!(err, Error::ManifestValidation { ref group, .. } if group == "core"));
}

#[test]
fn test_unknown_sections_are_rejected() {
    let err = ManifestValidator::validate(&json!({ "gadgets": {} })).unwrap_err();
    assert!(matches!(err, Error::UnknownSection { ref section } if section == "gadgets"));

    let err = ManifestValidator::validate(&json!({ "core": { "daemons": {} } })).unwrap_err();
    assert!(matches!(err, Error::UnknownSection { ref section } if section == "daemons"));

    // Plugins and widgets are not core groups
    let err = ManifestValidator::validate(&json!({ "core": { "plugins": {} } })).unwrap_err();
    assert!(matches!(err, Error::UnknownSection { ref section } if section == "core.plugins"));
}

#[test]
fn test_group_names_round_trip() {
    for group in Group::ALL {
        assert_eq!(group.as_str().parse::<Group>().unwrap(), group);
    }
    assert!("gizmos".parse::<Group>().is_err());
    assert_eq!(Group::Objects.manifest_path(), "core.objects");
    assert_eq!(Group::Widgets.manifest_path(), "widgets");
    assert_eq!(Group::Plugins.to_string(), "plugins");
}

#[test]
fn test_builder_replaces_repeated_names() {
    let manifest = Manifest::new()
        .with(Group::Plugins, "search", "v1")
        .with(Group::Plugins, "search", "v2");

    assert_eq!(manifest.len(), 1);
    assert_eq!(
        manifest.section(Group::Plugins).and_then(|s| s.get("search")),
        Some(&ModuleId::new("v2"))
    );
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_from_yaml_path() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("manifest.yaml");
    fs::write(
        &path,
        "core:\n  modules:\n    settings: mod/settings\nplugins:\n  search: plg/search\n",
    )
    .unwrap();

    let manifest = Manifest::from_path(&path).unwrap();
    assert_eq!(manifest.groups(), vec![Group::Modules, Group::Plugins]);
}

#[test]
fn test_from_json_path_validates() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("manifest.json");
    fs::write(&path, r#"{ "widgets": { "clock": true } }"#).unwrap();

    let err = Manifest::from_path(&path).unwrap_err();
    assert!(matches!(err, Error::ManifestValidation { .. }));
}

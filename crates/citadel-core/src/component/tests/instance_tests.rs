use serde_json::json;

use crate::component::{Grant, Instance, SpawnedChild};
use crate::registry::BarbarianKind;
use crate::tests::common::{Marker, Probe, TokenView, journal, marker};

#[test]
fn test_capability_is_fixed_at_construction() {
    let j = journal();
    let active = Probe::new("p", &j).into_instance();
    let passive = marker("m");

    assert!(active.is_activatable());
    assert!(active.activatable().is_some());
    assert!(!passive.is_activatable());
    assert!(passive.activatable().is_none());
}

#[test]
fn test_downcasting() {
    let instance = marker("m");

    assert!(instance.is::<Marker>());
    assert_eq!(instance.downcast_ref::<Marker>(), Some(&Marker("m")));
    assert!(instance.downcast_ref::<Probe>().is_none());
    let arc = instance.downcast::<Marker>().unwrap();
    assert_eq!(*arc, Marker("m"));
    assert!(instance.type_name().ends_with("Marker"));
}

#[test]
fn test_ptr_eq_tracks_identity() {
    let a = marker("same");
    let b = marker("same");

    assert!(a.ptr_eq(&a.clone()));
    assert!(!a.ptr_eq(&b));
}

#[test]
fn test_default_trigger_does_not_expose_methods() {
    let instance = marker("m");
    assert!(instance.component().trigger("refresh", &json!({})).is_none());
}

#[test]
fn test_barbarian_grant_exposes_only_hardened_view() {
    let options = json!({ "theme": "dark" });
    let grant = Grant::Barbarian {
        registry: TokenView::new("t"),
        options: &options,
    };
    assert!(grant.hardened().is_some());
    assert!(grant.elevated().is_none());
    assert!(grant.application().is_none());
    assert_eq!(grant.options()["theme"], "dark");
}

#[test]
fn test_spawned_child_naming() {
    let child = SpawnedChild::new("3", marker("c"), TokenView::new("t"));
    assert_eq!(child.qualified_for("parent"), "parent-3");
    assert_eq!(child.kind, None);

    let child = child.named("panel").into_kind(BarbarianKind::Widget);
    assert_eq!(child.qualified_for("parent"), "parent-panel");
    assert_eq!(child.kind, Some(BarbarianKind::Widget));
}

#[test]
fn test_instance_debug_names_type() {
    let rendered = format!("{:?}", Instance::passive(Marker("x")));
    assert!(rendered.contains("Marker"));
    assert!(rendered.contains("activatable: false"));
}

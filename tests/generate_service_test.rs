//! Tests for GenerateService: metarig in, generated armature out.

use std::sync::Arc;

use serde_json::json;

use rigsmith::application::services::{GenerateService, GeneratedRig};
use rigsmith::application::{ApplicationError, BuiltinWidgets};
use rigsmith::config::Settings;
use rigsmith::domain::{Armature, Bone, Constraint, ConstraintKind, WidgetShape};
use rigsmith::util::testing;

fn service(settings: Settings) -> GenerateService {
    testing::init_test_setup();
    let widgets = Arc::new(BuiltinWidgets::new(settings.widget_prefix.clone()));
    GenerateService::new(Arc::new(settings), widgets)
}

fn metarig(params: serde_json::Value) -> Armature {
    let mut arm = Armature::new();
    arm.new_bone(Bone::new("Bone").with_rig("basic.super_copy", params), None)
        .unwrap();
    arm
}

#[test]
fn given_sample_metarig_when_generating_then_produces_org_ctrl_and_deform() {
    let report = service(Settings::default())
        .generate(&metarig(serde_json::Value::Null))
        .unwrap();

    let arm = &report.armature;
    let mut names: Vec<&str> = arm.names();
    names.sort();
    assert_eq!(names, vec!["Bone", "DEF-Bone", "ORG-Bone"]);

    assert_eq!(
        report.rigs,
        vec![GeneratedRig {
            rig_type: "basic.super_copy".to_string(),
            base_bone: "ORG-Bone".to_string(),
        }]
    );
    assert_eq!(report.widgets, vec!["WGT-Bone".to_string()]);

    let mut created = report.created_bones.clone();
    created.sort();
    assert_eq!(created, vec!["Bone".to_string(), "DEF-Bone".to_string()]);

    // rig metadata is consumed by generation
    assert!(arm.iter().all(|(_, node)| node.bone.rig.is_none()));
}

#[test]
fn given_metarig_when_generating_then_input_is_not_modified() {
    let input = metarig(serde_json::Value::Null);

    service(Settings::default()).generate(&input).unwrap();

    assert_eq!(input.names(), vec!["Bone"]);
    assert!(input.bone("Bone").unwrap().rig.is_some());
}

#[test]
fn given_bone_params_when_generating_then_they_override_settings() {
    let mut settings = Settings::default();
    settings.super_copy.make_deform = false;
    settings.widget_prefix = "W_".to_string();

    let report = service(settings)
        .generate(&metarig(json!({"widget_type": "cube"})))
        .unwrap();

    let arm = &report.armature;
    assert!(!arm.contains("DEF-Bone"));
    let widget = arm.bone("Bone").unwrap().widget.clone().unwrap();
    assert_eq!(widget.shape, WidgetShape::Cube);
    assert_eq!(widget.object_name, "W_Bone");
}

#[test]
fn given_constraint_targets_when_renaming_to_org_then_targets_follow() {
    let mut arm = Armature::new();
    arm.new_bone(Bone::new("root"), None).unwrap();
    arm.new_bone(
        Bone::new("Bone")
            .with_constraint(
                Constraint::new("DEF:Copy Location", ConstraintKind::CopyLocation)
                    .with_target("root"),
            )
            .with_rig("basic.super_copy", serde_json::Value::Null),
        Some("root"),
    )
    .unwrap();

    let report = service(Settings::default()).generate(&arm).unwrap();

    let arm = &report.armature;
    assert_eq!(arm.parent_of("ORG-Bone").unwrap(), Some("ORG-root"));
    let deform = arm.bone("DEF-Bone").unwrap();
    assert_eq!(deform.constraints[0].targets, vec!["ORG-root".to_string()]);
}

#[test]
fn given_unknown_rig_type_when_generating_then_fails_before_any_stage() {
    let mut arm = Armature::new();
    arm.new_bone(Bone::new("arm").with_rig("limbs.arm", serde_json::Value::Null), None)
        .unwrap();

    let result = service(Settings::default()).generate(&arm);

    assert!(matches!(
        result,
        Err(ApplicationError::UnknownRigType { bone, rig_type })
            if bone == "ORG-arm" && rig_type == "limbs.arm"
    ));
}

#[test]
fn given_malformed_params_when_generating_then_reports_bone() {
    let result = service(Settings::default()).generate(&metarig(json!({"make_deform": "yes"})));

    assert!(matches!(
        result,
        Err(ApplicationError::InvalidParams { bone, .. }) if bone == "ORG-Bone"
    ));
}

#[test]
fn given_two_rigs_when_parent_spec_is_derived_then_generation_succeeds() {
    let mut arm = Armature::new();
    arm.new_bone(Bone::new("P").with_rig("basic.super_copy", serde_json::Value::Null), None)
        .unwrap();
    arm.new_bone(
        Bone::new("Bone").with_rig(
            "basic.super_copy",
            json!({"relink_constraints": true, "parent_bone": "DEF"}),
        ),
        Some("P"),
    )
    .unwrap();

    let report = service(Settings::default()).generate(&arm).unwrap();

    let arm = &report.armature;
    assert_eq!(arm.parent_of("ORG-Bone").unwrap(), Some("DEF-P"));
    assert_eq!(arm.parent_of("Bone").unwrap(), Some("DEF-P"));
    assert_eq!(report.rigs.len(), 2);
    assert_eq!(report.widgets.len(), 2);
}

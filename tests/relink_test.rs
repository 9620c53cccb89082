//! Tests for the default relink strategy on a hand-built rig context.

use rigsmith::application::relink::{ConstraintRelinker, RelinkConstraints, RelinkParams};
use rigsmith::application::{BuiltinWidgets, DerivedBones, RigContext};
use rigsmith::domain::{Armature, Bone, Constraint, ConstraintKind, DomainError};

fn relinker(parent_bone: &str) -> RelinkConstraints {
    RelinkConstraints::new(RelinkParams {
        relink_constraints: true,
        parent_bone: parent_bone.to_string(),
    })
}

/// `ORG-P` with derived `P` and `DEF-P`, plus `ORG-a` under `ORG-P`.
fn setup() -> (Armature, DerivedBones) {
    let mut arm = Armature::new();
    arm.new_bone(Bone::new("ORG-P"), None).unwrap();
    arm.new_bone(Bone::new("ORG-a"), Some("ORG-P")).unwrap();
    let mut derived = DerivedBones::default();
    {
        let widgets = BuiltinWidgets::default();
        let mut ctx = RigContext::new(&mut arm, &mut derived, &widgets);
        ctx.copy_bone("ORG-P", "P", true, false).unwrap();
        ctx.copy_bone("ORG-P", "DEF-P", false, true).unwrap();
    }
    (arm, derived)
}

#[test]
fn given_ctrl_spec_when_relinking_parent_then_uses_derived_control() {
    let (mut arm, mut derived) = setup();
    let widgets = BuiltinWidgets::default();
    let mut ctx = RigContext::new(&mut arm, &mut derived, &widgets);

    let parent = relinker("CTRL")
        .relink_bone_parent(&mut ctx, "ORG-a")
        .unwrap();

    assert_eq!(parent.as_deref(), Some("P"));
    assert_eq!(arm.parent_of("ORG-a").unwrap(), Some("P"));
}

#[test]
fn given_spec_without_derived_bone_when_relinking_parent_then_fails() {
    let (mut arm, mut derived) = setup();
    let widgets = BuiltinWidgets::default();
    let mut ctx = RigContext::new(&mut arm, &mut derived, &widgets);

    let result = relinker("MCH").relink_bone_parent(&mut ctx, "ORG-a");

    assert!(matches!(
        result,
        Err(DomainError::RelinkTarget { spec, bone, .. }) if spec == "MCH" && bone == "ORG-P"
    ));
    assert_eq!(arm.parent_of("ORG-a").unwrap(), Some("ORG-P"));
}

#[test]
fn given_taken_derived_name_when_relinking_then_falls_back_to_prefixed_derived_bone() {
    let mut arm = Armature::new();
    arm.new_bone(Bone::new("ORG-P"), None).unwrap();
    // Unrelated bone squatting on the conventional name
    arm.new_bone(Bone::new("DEF-P"), None).unwrap();
    arm.new_bone(
        Bone::new("ORG-a").with_constraint(
            Constraint::new("Copy Location@DEF", ConstraintKind::CopyLocation).with_target("ORG-P"),
        ),
        None,
    )
    .unwrap();

    let mut derived = DerivedBones::default();
    let widgets = BuiltinWidgets::default();
    let mut ctx = RigContext::new(&mut arm, &mut derived, &widgets);
    let copy = ctx.copy_bone("ORG-P", "DEF-P", false, true).unwrap();
    assert_eq!(copy, "DEF-P.001");

    relinker("").relink_bone_constraints(&mut ctx, "ORG-a").unwrap();

    let constraint = &arm.bone("ORG-a").unwrap().constraints[0];
    assert_eq!(constraint.targets, vec!["DEF-P.001".to_string()]);
    assert_eq!(constraint.name, "Copy Location@DEF");
}

#[test]
fn given_armature_spec_count_mismatch_when_relinking_then_rejected() {
    let (mut arm, mut derived) = setup();
    arm.bone_mut("ORG-a").unwrap().constraints = vec![Constraint::new(
        "Armature@DEF@CTRL",
        ConstraintKind::Armature,
    )
    .with_target("ORG-P")
    .with_target("ORG-P")
    .with_target("ORG-P")];
    let widgets = BuiltinWidgets::default();
    let mut ctx = RigContext::new(&mut arm, &mut derived, &widgets);

    let result = relinker("").relink_bone_constraints(&mut ctx, "ORG-a");

    assert!(matches!(result, Err(DomainError::InvalidConstraint { .. })));
}

#[test]
fn given_armature_spec_per_target_when_relinking_then_each_target_resolves() {
    let (mut arm, mut derived) = setup();
    arm.bone_mut("ORG-a").unwrap().constraints = vec![Constraint::new(
        "Armature@DEF@CTRL",
        ConstraintKind::Armature,
    )
    .with_target("ORG-P")
    .with_target("ORG-P")];
    let widgets = BuiltinWidgets::default();
    let mut ctx = RigContext::new(&mut arm, &mut derived, &widgets);

    relinker("").relink_bone_constraints(&mut ctx, "ORG-a").unwrap();

    assert_eq!(
        arm.bone("ORG-a").unwrap().constraints[0].targets,
        vec!["DEF-P".to_string(), "P".to_string()]
    );
}

#[test]
fn given_targetless_constraint_with_spec_when_relinking_then_skipped() {
    let (mut arm, mut derived) = setup();
    arm.bone_mut("ORG-a").unwrap().constraints =
        vec![Constraint::new("Limit Scale@DEF", ConstraintKind::LimitScale)];
    let widgets = BuiltinWidgets::default();
    let mut ctx = RigContext::new(&mut arm, &mut derived, &widgets);

    relinker("").relink_bone_constraints(&mut ctx, "ORG-a").unwrap();

    assert!(arm.bone("ORG-a").unwrap().constraints[0].targets.is_empty());
}

#[test]
fn given_missing_destination_when_moving_then_source_is_untouched() {
    let (mut arm, mut derived) = setup();
    arm.bone_mut("ORG-a").unwrap().constraints =
        vec![Constraint::new("CTRL:Limit", ConstraintKind::LimitRotation)];
    let widgets = BuiltinWidgets::default();
    let mut ctx = RigContext::new(&mut arm, &mut derived, &widgets);

    let result = relinker("").relink_move_constraints(&mut ctx, "ORG-a", "nowhere", "CTRL:");

    assert!(matches!(result, Err(DomainError::BoneNotFound(name)) if name == "nowhere"));
    assert_eq!(arm.bone("ORG-a").unwrap().constraint_names(), vec!["CTRL:Limit"]);
}

#[test]
fn given_name_collision_on_destination_when_moving_then_moved_name_is_uniquified() {
    let (mut arm, mut derived) = setup();
    arm.bone_mut("ORG-a").unwrap().constraints =
        vec![Constraint::new("DEF:Stretch", ConstraintKind::StretchTo).with_target("ORG-P")];
    arm.bone_mut("DEF-P").unwrap().constraints =
        vec![Constraint::new("DEF:Stretch", ConstraintKind::StretchTo).with_target("ORG-P")];
    let widgets = BuiltinWidgets::default();
    let mut ctx = RigContext::new(&mut arm, &mut derived, &widgets);

    relinker("").relink_move_constraints(&mut ctx, "ORG-a", "DEF-P", "DEF:").unwrap();

    assert_eq!(
        arm.bone("DEF-P").unwrap().constraint_names(),
        vec!["DEF:Stretch", "DEF:Stretch.001"]
    );
    assert!(arm.bone("ORG-a").unwrap().constraints.is_empty());
}

//! Constraint relinking capability shared by rig types.
//!
//! Constraint names carry relink instructions after an `@`:
//! - `Copy Location@hand.L` retargets to the bone `hand.L`
//! - `Copy Location@DEF` retargets to the `DEF-` bone derived from the
//!   current target (`CTRL` and `MCH` work the same way)
//! - `Armature@DEF@MCH` gives one spec per armature target

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::rig::RigContext;
use crate::application::ui::{UiIcon, UiItem};
use crate::domain::naming::{make_derived_name, BoneKind};
use crate::domain::{Constraint, DomainError, DomainResult, TargetArity};

/// Relink options added to every rig type that supports relinking.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelinkParams {
    /// Rewrite `name@spec` constraint targets after all bones exist
    pub relink_constraints: bool,
    /// Replacement parent spec; `CTRL`, `DEF` or `MCH` swap the prefix
    pub parent_bone: String,
}

/// Relink operations consumed by rig components.
pub trait ConstraintRelinker {
    /// Apply the parent replacement to `bone`, returning the new parent.
    ///
    /// `None` means relinking is off or no replacement was configured; the
    /// parent is then untouched.
    fn relink_bone_parent(
        &self,
        ctx: &mut RigContext<'_>,
        bone: &str,
    ) -> DomainResult<Option<String>>;

    /// Rewrite constraint targets on `bone`. Never adds or removes entries.
    fn relink_bone_constraints(&self, ctx: &mut RigContext<'_>, bone: &str) -> DomainResult<()>;

    /// Move every constraint whose name starts with `prefix` from `from` to
    /// the end of `to`'s stack, keeping their relative order.
    ///
    /// Moves run whether or not `relink_constraints` is set.
    fn relink_move_constraints(
        &self,
        ctx: &mut RigContext<'_>,
        from: &str,
        to: &str,
        prefix: &str,
    ) -> DomainResult<()>;
}

/// Default relink strategy driven by [`RelinkParams`].
#[derive(Debug, Clone, Default)]
pub struct RelinkConstraints {
    params: RelinkParams,
}

impl RelinkConstraints {
    pub fn new(params: RelinkParams) -> Self {
        Self { params }
    }

    /// Resolve a relink spec against the bone it replaces.
    fn find_relink_target(
        &self,
        ctx: &RigContext<'_>,
        spec: &str,
        old_target: &str,
    ) -> DomainResult<String> {
        if spec.is_empty() {
            return Ok(old_target.to_string());
        }

        if let Some(kind) = BoneKind::from_relink_spec(spec) {
            return choose_derived_bone(ctx, old_target, kind).ok_or_else(|| {
                DomainError::RelinkTarget {
                    spec: spec.to_string(),
                    bone: old_target.to_string(),
                    reason: format!("no derived {} bone", spec),
                }
            });
        }

        if !ctx.armature.contains(spec) {
            return Err(DomainError::RelinkTarget {
                spec: spec.to_string(),
                bone: old_target.to_string(),
                reason: "bone does not exist".to_string(),
            });
        }
        Ok(spec.to_string())
    }

    fn relink_constraint(
        &self,
        ctx: &RigContext<'_>,
        bone: &str,
        constraint: &mut Constraint,
        specs: &[String],
    ) -> DomainResult<()> {
        let invalid = |message: String| DomainError::InvalidConstraint {
            bone: bone.to_string(),
            constraint: constraint.name.clone(),
            message,
        };

        match constraint.kind.target_arity() {
            TargetArity::Multiple => {
                let targets = &constraint.targets;
                if specs.len() != 1 && specs.len() != targets.len() {
                    return Err(invalid(format!(
                        "constraint actually has {} targets",
                        targets.len()
                    )));
                }
                let mut relinked = Vec::with_capacity(targets.len());
                for (i, target) in targets.iter().enumerate() {
                    let spec = if specs.len() == 1 { &specs[0] } else { &specs[i] };
                    relinked.push(self.find_relink_target(ctx, spec, target)?);
                }
                constraint.targets = relinked;
            }
            TargetArity::Single => {
                if specs.len() > 1 {
                    return Err(invalid(
                        "only armature constraints can have multiple '@' targets".to_string(),
                    ));
                }
                let old = constraint.targets.first().map(String::as_str).unwrap_or("");
                let new = self.find_relink_target(ctx, &specs[0], old)?;
                constraint.targets = if new.is_empty() { Vec::new() } else { vec![new] };
            }
            TargetArity::None => {}
        }
        Ok(())
    }
}

/// Pick the bone of `kind` generated from `original`.
///
/// The conventional derived name wins; otherwise the first derived bone with
/// the right prefix is used.
fn choose_derived_bone(ctx: &RigContext<'_>, original: &str, kind: BoneKind) -> Option<String> {
    let names = ctx.derived.find(original, true);

    let direct = make_derived_name(original, kind);
    if names.contains(&direct) && ctx.armature.contains(&direct) {
        return Some(direct);
    }

    names
        .into_iter()
        .find(|name| BoneKind::of_name(name) == kind && ctx.armature.contains(name))
}

/// Relink specs encoded in a constraint name, if any.
fn relink_specs(name: &str) -> Option<Vec<String>> {
    let mut parts = name.split('@');
    parts.next();
    let specs: Vec<String> = parts.map(str::to_string).collect();
    (!specs.is_empty()).then_some(specs)
}

impl ConstraintRelinker for RelinkConstraints {
    #[instrument(level = "debug", skip(self, ctx))]
    fn relink_bone_parent(
        &self,
        ctx: &mut RigContext<'_>,
        bone: &str,
    ) -> DomainResult<Option<String>> {
        let spec = &self.params.parent_bone;
        if !self.params.relink_constraints || spec.is_empty() {
            return Ok(None);
        }

        let old_parent = ctx.armature.parent_of(bone)?.unwrap_or("").to_string();
        let new_parent = self.find_relink_target(ctx, spec, &old_parent)?;
        let new_parent = (!new_parent.is_empty()).then_some(new_parent);

        debug!("parent of {}: {:?} -> {:?}", bone, old_parent, new_parent);
        ctx.set_bone_parent(bone, new_parent.as_deref(), false)?;
        Ok(new_parent)
    }

    #[instrument(level = "debug", skip(self, ctx))]
    fn relink_bone_constraints(&self, ctx: &mut RigContext<'_>, bone: &str) -> DomainResult<()> {
        if !self.params.relink_constraints {
            return Ok(());
        }

        let mut constraints = ctx.armature.bone(bone)?.constraints.clone();
        for constraint in constraints.iter_mut() {
            if let Some(specs) = relink_specs(&constraint.name) {
                self.relink_constraint(ctx, bone, constraint, &specs)?;
            }
        }
        ctx.armature.bone_mut(bone)?.constraints = constraints;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, ctx))]
    fn relink_move_constraints(
        &self,
        ctx: &mut RigContext<'_>,
        from: &str,
        to: &str,
        prefix: &str,
    ) -> DomainResult<()> {
        // fail before touching the source stack
        ctx.armature.bone(to)?;

        let moved = ctx.armature.take_constraints_with_prefix(from, prefix)?;
        debug!("moving {} constraints {} -> {}", moved.len(), from, to);
        for constraint in moved {
            ctx.armature.push_constraint(to, constraint)?;
        }
        Ok(())
    }
}

/// Append the relink options to a parameter panel.
pub fn relink_ui(params: &RelinkParams, layout: &mut Vec<UiItem>) {
    layout.push(UiItem::Toggle {
        field: "relink_constraints",
        label: "Relink Constraints",
        value: params.relink_constraints,
        enabled: true,
    });

    if params.relink_constraints {
        layout.push(UiItem::Text {
            field: "parent_bone",
            label: "Parent",
            value: params.parent_bone.clone(),
            enabled: true,
        });
        layout.push(UiItem::Label {
            text: "Constraint names have special meanings.".to_string(),
            icon: UiIcon::Error,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relink_specs_from_name() {
        assert_eq!(relink_specs("Copy Location"), None);
        assert_eq!(relink_specs("Copy@DEF"), Some(vec!["DEF".to_string()]));
        assert_eq!(
            relink_specs("Armature@a@MCH"),
            Some(vec!["a".to_string(), "MCH".to_string()])
        );
        assert_eq!(relink_specs("Copy@"), Some(vec![String::new()]));
    }

    #[test]
    fn test_relink_ui_hides_parent_when_disabled() {
        let mut layout = Vec::new();
        relink_ui(&RelinkParams::default(), &mut layout);
        assert_eq!(layout.len(), 1);

        let mut layout = Vec::new();
        relink_ui(
            &RelinkParams {
                relink_constraints: true,
                parent_bone: "DEF".into(),
            },
            &mut layout,
        );
        assert_eq!(layout[1].field(), Some("parent_bone"));
        assert!(matches!(layout[2], UiItem::Label { icon: UiIcon::Error, .. }));
    }
}

//! `basic.super_copy`: duplicate one bone into a control and/or a deform bone.
//!
//! The original bone follows the control through a copy-transforms
//! constraint, and the deform bone rides rigidly under the original.
//! Constraints prefixed `CTRL:` / `DEF:` are handed over to the control and
//! deform bone respectively.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::relink::{relink_ui, ConstraintRelinker, RelinkConstraints, RelinkParams};
use crate::application::rig::{RigComponent, RigContext};
use crate::application::ui::{UiIcon, UiItem};
use crate::application::widgets::{BuiltinWidgets, DEFAULT_WIDGET_TYPE};
use crate::domain::naming::{make_deformer_name, strip_org};
use crate::domain::{
    Armature, Bone, ConstraintKind, ConstraintRoute, DomainResult, RigAssignment, RotationMode,
};

/// Registered rig type name.
pub const RIG_TYPE: &str = "basic.super_copy";

/// Parameters of a super copy rig.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperCopyParams {
    /// Create a control bone for the copy
    pub make_control: bool,
    /// Choose a widget for the bone control
    pub make_widget: bool,
    /// Type of the widget to create
    pub widget_type: String,
    /// Create a deform bone for the copy
    pub make_deform: bool,
    #[serde(flatten)]
    pub relink: RelinkParams,
}

impl Default for SuperCopyParams {
    fn default() -> Self {
        Self {
            make_control: true,
            make_widget: true,
            widget_type: DEFAULT_WIDGET_TYPE.to_string(),
            make_deform: true,
            relink: RelinkParams::default(),
        }
    }
}

/// Bones owned by one rig instance, by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoneSet {
    pub org: String,
    pub ctrl: Option<String>,
    pub deform: Option<String>,
}

pub struct SuperCopy {
    params: SuperCopyParams,
    relinker: Box<dyn ConstraintRelinker>,
    bones: BoneSet,
    org_name: String,
    make_control: bool,
    make_widget: bool,
    make_deform: bool,
}

impl SuperCopy {
    pub fn new(bone: &str, params: SuperCopyParams) -> Self {
        let relinker = Box::new(RelinkConstraints::new(params.relink.clone()));
        Self::with_relinker(bone, params, relinker)
    }

    /// Build the rig with an explicit relink strategy.
    pub fn with_relinker(
        bone: &str,
        params: SuperCopyParams,
        relinker: Box<dyn ConstraintRelinker>,
    ) -> Self {
        Self {
            params,
            relinker,
            bones: BoneSet {
                org: Self::find_org_bones(bone),
                ..BoneSet::default()
            },
            org_name: String::new(),
            make_control: false,
            make_widget: false,
            make_deform: false,
        }
    }

    /// A super copy manages exactly the bone it is placed on.
    pub fn find_org_bones(bone: &str) -> String {
        bone.to_string()
    }
}

impl RigComponent for SuperCopy {
    fn rig_type(&self) -> &'static str {
        RIG_TYPE
    }

    fn base_bone(&self) -> &str {
        &self.bones.org
    }

    fn initialize(&mut self, _ctx: &mut RigContext<'_>) -> DomainResult<()> {
        self.org_name = strip_org(&self.bones.org).to_string();

        self.make_control = self.params.make_control;
        self.make_widget = self.params.make_widget;
        self.make_deform = self.params.make_deform;
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(org = %self.bones.org))]
    fn generate_bones(&mut self, ctx: &mut RigContext<'_>) -> DomainResult<()> {
        let bones = &mut self.bones;

        if self.make_control {
            bones.ctrl = Some(ctx.copy_bone(&bones.org, &self.org_name, true, false)?);
        }

        if self.make_deform {
            let name = make_deformer_name(&self.org_name);
            bones.deform = Some(ctx.copy_bone(&bones.org, &name, false, true)?);
        }

        debug!("ctrl={:?} deform={:?}", bones.ctrl, bones.deform);
        Ok(())
    }

    fn parent_bones(&mut self, ctx: &mut RigContext<'_>) -> DomainResult<()> {
        let bones = &self.bones;

        if let Some(deform) = &bones.deform {
            ctx.set_bone_parent(deform, Some(&bones.org), false)?;
        }

        let new_parent = self.relinker.relink_bone_parent(ctx, &bones.org)?;

        if let (Some(ctrl), Some(parent)) = (&bones.ctrl, &new_parent) {
            ctx.set_bone_parent(ctrl, Some(parent), false)?;
        }
        Ok(())
    }

    fn configure_bones(&mut self, ctx: &mut RigContext<'_>) -> DomainResult<()> {
        if let Some(ctrl) = &self.bones.ctrl {
            ctx.copy_bone_properties(&self.bones.org, ctrl)?;
        }
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(org = %self.bones.org))]
    fn rig_bones(&mut self, ctx: &mut RigContext<'_>) -> DomainResult<()> {
        let bones = &self.bones;

        self.relinker.relink_bone_constraints(ctx, &bones.org)?;

        if let Some(ctrl) = &bones.ctrl {
            self.relinker.relink_move_constraints(
                ctx,
                &bones.org,
                ctrl,
                ConstraintRoute::Control.prefix(),
            )?;

            // Constrain the original bone
            ctx.make_constraint(&bones.org, ConstraintKind::CopyTransforms, ctrl, Some(0))?;
        }

        if let Some(deform) = &bones.deform {
            self.relinker.relink_move_constraints(
                ctx,
                &bones.org,
                deform,
                ConstraintRoute::Deform.prefix(),
            )?;
        }
        Ok(())
    }

    fn generate_widgets(&mut self, ctx: &mut RigContext<'_>) -> DomainResult<()> {
        let Some(ctrl) = &self.bones.ctrl else {
            return Ok(());
        };

        let widgets = ctx.widgets;
        if self.make_widget {
            let widget_type = match self.params.widget_type.as_str() {
                "" => DEFAULT_WIDGET_TYPE,
                other => other,
            };
            widgets.create_registered_widget(ctx.armature, ctrl, widget_type)
        } else {
            widgets.create_default_widget(ctx.armature, ctrl)
        }
    }
}

/// Parameter panel for a super copy rig.
pub fn parameters_ui(params: &SuperCopyParams) -> Vec<UiItem> {
    let mut layout = vec![
        UiItem::Toggle {
            field: "make_control",
            label: "Control",
            value: params.make_control,
            enabled: true,
        },
        UiItem::Toggle {
            field: "make_widget",
            label: "Widget",
            value: params.make_widget,
            enabled: params.make_control,
        },
        UiItem::Dropdown {
            field: "widget_type",
            label: "Widget Type",
            value: params.widget_type.clone(),
            options: BuiltinWidgets::keys().into_iter().map(String::from).collect(),
            enabled: params.make_control && params.make_widget,
        },
        UiItem::Toggle {
            field: "make_deform",
            label: "Deform",
            value: params.make_deform,
            enabled: true,
        },
    ];

    relink_ui(&params.relink, &mut layout);

    if params.relink.relink_constraints {
        if params.make_control {
            layout.push(UiItem::Label {
                text: "'CTRL:...' constraints are moved to the control bone.".to_string(),
                icon: UiIcon::Info,
            });
        }
        if params.make_deform {
            layout.push(UiItem::Label {
                text: "'DEF:...' constraints are moved to the deform bone.".to_string(),
                icon: UiIcon::Info,
            });
        }
    }
    layout
}

/// Add a sample metarig bone for this rig type.
///
/// Returns the mapping from sample role name to created bone name.
pub fn create_sample(armature: &mut Armature) -> DomainResult<BTreeMap<String, String>> {
    let mut bones = BTreeMap::new();

    let mut bone = Bone::new("Bone").with_geometry(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.2), 0.0);
    bone.use_connect = false;
    bone.pose.rotation_mode = RotationMode::Quaternion;
    bone.pose.lock_location = [false; 3];
    bone.pose.lock_rotation = [false; 3];
    bone.pose.lock_rotation_w = false;
    bone.pose.lock_scale = [false; 3];
    bone.rig = Some(RigAssignment {
        rig_type: RIG_TYPE.to_string(),
        params: serde_json::Value::Null,
    });

    let name = armature.new_bone(bone, None)?;
    bones.insert("Bone".to_string(), name);
    Ok(bones)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = SuperCopyParams::default();
        assert!(params.make_control);
        assert!(params.make_widget);
        assert!(params.make_deform);
        assert_eq!(params.widget_type, "circle");
        assert!(!params.relink.relink_constraints);
        assert!(params.relink.parent_bone.is_empty());
    }

    #[test]
    fn test_params_from_partial_json() {
        let params: SuperCopyParams =
            serde_json::from_str(r#"{"make_deform": false, "relink_constraints": true}"#).unwrap();
        assert!(params.make_control);
        assert!(!params.make_deform);
        assert!(params.relink.relink_constraints);
    }

    #[test]
    fn test_find_org_bones_is_identity() {
        assert_eq!(SuperCopy::find_org_bones("ORG-hand.L"), "ORG-hand.L");
    }

    #[test]
    fn test_ui_disables_widget_without_control() {
        let params = SuperCopyParams {
            make_control: false,
            ..SuperCopyParams::default()
        };
        let layout = parameters_ui(&params);
        let widget = layout
            .iter()
            .find(|item| item.field() == Some("make_widget"))
            .unwrap();
        assert!(!widget.is_enabled());
        let dropdown = layout
            .iter()
            .find(|item| item.field() == Some("widget_type"))
            .unwrap();
        assert!(!dropdown.is_enabled());
    }

    #[test]
    fn test_ui_hints_follow_relink_and_flags() {
        let mut params = SuperCopyParams::default();
        assert!(!parameters_ui(&params)
            .iter()
            .any(|item| matches!(item, UiItem::Label { icon: UiIcon::Info, .. })));

        params.relink.relink_constraints = true;
        params.make_deform = false;
        let hints: Vec<_> = parameters_ui(&params)
            .into_iter()
            .filter_map(|item| match item {
                UiItem::Label {
                    text,
                    icon: UiIcon::Info,
                } => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(
            hints,
            vec!["'CTRL:...' constraints are moved to the control bone.".to_string()]
        );
    }

    #[test]
    fn test_create_sample() {
        let mut armature = Armature::new();
        let bones = create_sample(&mut armature).unwrap();
        assert_eq!(bones["Bone"], "Bone");

        let bone = armature.bone("Bone").unwrap();
        assert_eq!(bone.tail, Vec3::new(0.0, 0.0, 0.2));
        assert_eq!(bone.rig.as_ref().unwrap().rig_type, RIG_TYPE);
    }
}

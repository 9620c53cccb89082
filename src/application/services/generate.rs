//! Rig generation service
//!
//! Turns a metarig into a generated armature: original bones are renamed to
//! `ORG-`, every rig assignment becomes a rig component, and all components
//! run stage by stage over the shared armature.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::application::rig::{run_pipeline, DerivedBones, RigComponent, RigContext};
use crate::application::rigs::super_copy::{self, SuperCopy, SuperCopyParams};
use crate::application::widgets::WidgetCatalog;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::naming::{make_original_name, ORG_PREFIX};
use crate::domain::{Armature, RigAssignment};

/// One instantiated rig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRig {
    pub rig_type: String,
    pub base_bone: String,
}

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Generated armature, rig metadata cleared
    pub armature: Armature,
    /// Rigs in execution order
    pub rigs: Vec<GeneratedRig>,
    /// Bones that did not exist in the metarig, in preorder
    pub created_bones: Vec<String>,
    /// Widget object names
    pub widgets: Vec<String>,
}

/// Service for generating rigs from metarigs.
pub struct GenerateService {
    settings: Arc<Settings>,
    widgets: Arc<dyn WidgetCatalog>,
}

impl GenerateService {
    pub fn new(settings: Arc<Settings>, widgets: Arc<dyn WidgetCatalog>) -> Self {
        Self { settings, widgets }
    }

    #[instrument(level = "debug", skip_all, fields(bones = metarig.len()))]
    pub fn generate(&self, metarig: &Armature) -> ApplicationResult<GenerationReport> {
        let mut armature = metarig.clone();
        rename_to_original(&mut armature)?;

        let (mut rigs, summary) = self.instantiate_rigs(&armature)?;
        let before: HashSet<String> = armature.names().into_iter().map(String::from).collect();

        let mut derived = DerivedBones::default();
        {
            let mut ctx = RigContext::new(&mut armature, &mut derived, self.widgets.as_ref());
            run_pipeline(&mut rigs, &mut ctx)?;
        }

        let names: Vec<String> = armature.names().into_iter().map(String::from).collect();
        let mut widgets = Vec::new();
        for name in &names {
            let bone = armature.bone_mut(name)?;
            bone.rig = None;
            if let Some(widget) = &bone.widget {
                widgets.push(widget.object_name.clone());
            }
        }
        let created_bones: Vec<String> = names
            .into_iter()
            .filter(|name| !before.contains(name))
            .collect();

        info!(
            "generated {} rigs, {} new bones, {} widgets",
            summary.len(),
            created_bones.len(),
            widgets.len()
        );
        Ok(GenerationReport {
            armature,
            rigs: summary,
            created_bones,
            widgets,
        })
    }

    /// Build one rig component per bone with a rig assignment, in preorder.
    fn instantiate_rigs(
        &self,
        armature: &Armature,
    ) -> ApplicationResult<(Vec<Box<dyn RigComponent>>, Vec<GeneratedRig>)> {
        let mut rigs: Vec<Box<dyn RigComponent>> = Vec::new();
        let mut summary = Vec::new();

        for (_, node) in armature.iter() {
            let Some(assignment) = &node.bone.rig else {
                continue;
            };
            let rig = self.instantiate(&node.bone.name, assignment)?;
            debug!("rig {} on {}", rig.rig_type(), rig.base_bone());
            summary.push(GeneratedRig {
                rig_type: rig.rig_type().to_string(),
                base_bone: rig.base_bone().to_string(),
            });
            rigs.push(rig);
        }
        Ok((rigs, summary))
    }

    fn instantiate(
        &self,
        bone: &str,
        assignment: &RigAssignment,
    ) -> ApplicationResult<Box<dyn RigComponent>> {
        match assignment.rig_type.as_str() {
            super_copy::RIG_TYPE => {
                let params = self.super_copy_params(bone, &assignment.params)?;
                Ok(Box::new(SuperCopy::new(bone, params)))
            }
            other => Err(ApplicationError::UnknownRigType {
                bone: bone.to_string(),
                rig_type: other.to_string(),
            }),
        }
    }

    /// Bone parameters overlaid on the configured defaults.
    pub fn super_copy_params(
        &self,
        bone: &str,
        overrides: &Value,
    ) -> ApplicationResult<SuperCopyParams> {
        let invalid = |source| ApplicationError::InvalidParams {
            bone: bone.to_string(),
            source,
        };

        let mut merged = serde_json::to_value(&self.settings.super_copy).map_err(invalid)?;
        match overrides {
            Value::Null => {}
            Value::Object(fields) => {
                if let Value::Object(base) = &mut merged {
                    base.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
            other => merged = other.clone(),
        }
        serde_json::from_value(merged).map_err(invalid)
    }
}

/// Rename every metarig bone `X` to `ORG-X`; constraint targets follow.
fn rename_to_original(armature: &mut Armature) -> ApplicationResult<()> {
    let names: Vec<String> = armature.names().into_iter().map(String::from).collect();
    for name in names.iter().filter(|n| !n.starts_with(ORG_PREFIX)) {
        armature.rename_bone(name, &make_original_name(name))?;
    }
    Ok(())
}

//! Rig component protocol: generation stages, shared context and the
//! stage-by-stage pipeline driver.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, instrument};

use crate::application::widgets::WidgetCatalog;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Armature, ConstraintKind, DomainResult};

/// Generation stages, in execution order.
///
/// Every rig finishes a stage before any rig starts the next one, so a rig may
/// reference bones created by other rigs in an earlier stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Initialize,
    GenerateBones,
    ParentBones,
    ConfigureBones,
    RigBones,
    GenerateWidgets,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Initialize,
        Stage::GenerateBones,
        Stage::ParentBones,
        Stage::ConfigureBones,
        Stage::RigBones,
        Stage::GenerateWidgets,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Initialize => "initialize",
            Stage::GenerateBones => "generate_bones",
            Stage::ParentBones => "parent_bones",
            Stage::ConfigureBones => "configure_bones",
            Stage::RigBones => "rig_bones",
            Stage::GenerateWidgets => "generate_widgets",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Records which generated bones were copied from which source bone.
#[derive(Debug, Clone, Default)]
pub struct DerivedBones {
    map: BTreeMap<String, Vec<String>>,
}

impl DerivedBones {
    pub fn register(&mut self, source: &str, derived: &str) {
        self.map
            .entry(source.to_string())
            .or_default()
            .push(derived.to_string());
    }

    /// Bones derived from `source`, in creation order.
    ///
    /// With `recursive`, bones derived from derived bones follow their
    /// immediate source.
    pub fn find(&self, source: &str, recursive: bool) -> Vec<String> {
        let mut result = Vec::new();
        self.collect(source, recursive, &mut result);
        result
    }

    fn collect(&self, source: &str, recursive: bool, out: &mut Vec<String>) {
        if let Some(direct) = self.map.get(source) {
            for name in direct {
                if out.contains(name) {
                    continue;
                }
                out.push(name.clone());
                if recursive {
                    self.collect(name, recursive, out);
                }
            }
        }
    }
}

/// Mutable state shared by all rigs during one generation run.
pub struct RigContext<'a> {
    pub armature: &'a mut Armature,
    pub derived: &'a mut DerivedBones,
    pub widgets: &'a dyn WidgetCatalog,
}

impl<'a> RigContext<'a> {
    pub fn new(
        armature: &'a mut Armature,
        derived: &'a mut DerivedBones,
        widgets: &'a dyn WidgetCatalog,
    ) -> Self {
        Self {
            armature,
            derived,
            widgets,
        }
    }

    /// Copy `source` into a new bone and remember it as derived from `source`.
    pub fn copy_bone(
        &mut self,
        source: &str,
        name: &str,
        parent: bool,
        bbone: bool,
    ) -> DomainResult<String> {
        let new_name = self.armature.copy_bone(source, name, parent, bbone)?;
        self.derived.register(source, &new_name);
        Ok(new_name)
    }

    pub fn set_bone_parent(
        &mut self,
        child: &str,
        parent: Option<&str>,
        use_connect: bool,
    ) -> DomainResult<()> {
        self.armature.set_bone_parent(child, parent, use_connect)
    }

    pub fn copy_bone_properties(&mut self, source: &str, dest: &str) -> DomainResult<()> {
        self.armature.copy_bone_properties(source, dest)
    }

    pub fn make_constraint(
        &mut self,
        bone: &str,
        kind: ConstraintKind,
        target: &str,
        insert_index: Option<usize>,
    ) -> DomainResult<String> {
        self.armature
            .add_constraint(bone, kind, Some(target), insert_index)
    }
}

/// A rig component: one callback per generation stage.
///
/// All callbacks default to no-ops. Failures are collaborator errors and are
/// passed through unchanged.
pub trait RigComponent {
    /// Registered rig type, e.g. `basic.super_copy`
    fn rig_type(&self) -> &'static str;

    /// Bone the rig was instantiated on.
    fn base_bone(&self) -> &str;

    fn initialize(&mut self, _ctx: &mut RigContext<'_>) -> DomainResult<()> {
        Ok(())
    }

    fn generate_bones(&mut self, _ctx: &mut RigContext<'_>) -> DomainResult<()> {
        Ok(())
    }

    fn parent_bones(&mut self, _ctx: &mut RigContext<'_>) -> DomainResult<()> {
        Ok(())
    }

    fn configure_bones(&mut self, _ctx: &mut RigContext<'_>) -> DomainResult<()> {
        Ok(())
    }

    fn rig_bones(&mut self, _ctx: &mut RigContext<'_>) -> DomainResult<()> {
        Ok(())
    }

    fn generate_widgets(&mut self, _ctx: &mut RigContext<'_>) -> DomainResult<()> {
        Ok(())
    }

    fn run_stage(&mut self, stage: Stage, ctx: &mut RigContext<'_>) -> DomainResult<()> {
        match stage {
            Stage::Initialize => self.initialize(ctx),
            Stage::GenerateBones => self.generate_bones(ctx),
            Stage::ParentBones => self.parent_bones(ctx),
            Stage::ConfigureBones => self.configure_bones(ctx),
            Stage::RigBones => self.rig_bones(ctx),
            Stage::GenerateWidgets => self.generate_widgets(ctx),
        }
    }
}

/// Run every stage over every rig, with a full barrier between stages.
///
/// The first failure aborts the run and is reported with the rig and stage
/// that raised it.
#[instrument(level = "debug", skip_all, fields(rigs = rigs.len()))]
pub fn run_pipeline(
    rigs: &mut [Box<dyn RigComponent>],
    ctx: &mut RigContext<'_>,
) -> ApplicationResult<()> {
    for stage in Stage::ALL {
        debug!("stage {}", stage);
        for rig in rigs.iter_mut() {
            rig.run_stage(stage, ctx)
                .map_err(|source| ApplicationError::Rig {
                    bone: rig.base_bone().to_string(),
                    rig_type: rig.rig_type().to_string(),
                    stage,
                    source,
                })?;
        }
    }
    Ok(())
}

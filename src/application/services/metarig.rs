//! Metarig document service
//!
//! Reads and writes armatures as JSON documents through the filesystem
//! boundary.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::rigs::super_copy;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Armature, ArmatureBuilder, ArmatureDocument};
use crate::infrastructure::traits::FileSystem;

/// Service for loading, saving and creating metarigs.
pub struct MetarigService {
    fs: Arc<dyn FileSystem>,
}

impl MetarigService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Parse a JSON metarig document into an armature.
    pub fn parse(&self, json: &str) -> ApplicationResult<Armature> {
        let document: ArmatureDocument =
            serde_json::from_str(json).map_err(|e| ApplicationError::InvalidMetarig {
                message: e.to_string(),
            })?;
        Ok(ArmatureBuilder::new().build(document)?)
    }

    /// Serialize an armature as pretty JSON, bones in preorder.
    pub fn to_json(&self, armature: &Armature) -> ApplicationResult<String> {
        let document = ArmatureDocument::from(armature);
        serde_json::to_string_pretty(&document).map_err(|e| ApplicationError::OperationFailed {
            context: "serialize armature".to_string(),
            source: Box::new(e),
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Armature> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::InvalidMetarig {
                message: format!("not a file: {}", path.display()),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read metarig", path)?;
        let armature = self.parse(&content)?;
        debug!("loaded {} bones from {}", armature.len(), path.display());
        Ok(armature)
    }

    #[instrument(level = "debug", skip(self, armature))]
    pub fn save(&self, armature: &Armature, path: &Path) -> ApplicationResult<()> {
        let json = self.to_json(armature)?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;
        self.fs
            .write(path, &json)
            .with_path_context("write armature", path)
    }

    /// A metarig holding the sample bone of every rig type.
    pub fn sample(&self) -> ApplicationResult<Armature> {
        let mut armature = Armature::new();
        super_copy::create_sample(&mut armature)?;
        Ok(armature)
    }
}

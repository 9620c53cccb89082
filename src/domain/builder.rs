//! Armature builder: turns serialized bone records into an arena hierarchy.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::domain::armature::Armature;
use crate::domain::entities::{ArmatureDocument, BoneRecord};
use crate::domain::error::{DomainError, DomainResult};

/// Constructs an [`Armature`] from bone records listed in any order.
///
/// Records may reference parents that appear later in the list. Duplicate
/// names, dangling parents and parent cycles are rejected.
#[derive(Default)]
pub struct ArmatureBuilder {
    relationship_cache: HashMap<String, Vec<String>>,
    records: HashMap<String, BoneRecord>,
    order: Vec<String>,
}

impl ArmatureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "debug", skip(self, document), fields(bones = document.bones.len()))]
    pub fn build(&mut self, document: ArmatureDocument) -> DomainResult<Armature> {
        // Reset state for a fresh build
        self.relationship_cache.clear();
        self.records.clear();
        self.order.clear();

        self.scan_records(document.bones)?;

        let roots = self.find_root_bones();
        if roots.is_empty() && !self.records.is_empty() {
            // every bone has a parent: the hierarchy must be cyclic
            let first = self.order[0].clone();
            return Err(DomainError::CycleDetected(first));
        }

        let mut armature = Armature::new();
        let mut visited = HashSet::new();
        for root in roots {
            self.insert_subtree(&mut armature, &root, &mut visited)?;
        }

        // Bones unreachable from any root sit on a cycle
        if let Some(orphan) = self.order.iter().find(|n| !visited.contains(*n)) {
            return Err(DomainError::CycleDetected(orphan.clone()));
        }

        debug!("built armature with {} bones", armature.len());
        Ok(armature)
    }

    fn scan_records(&mut self, records: Vec<BoneRecord>) -> DomainResult<()> {
        for record in records {
            let name = record.bone.name.clone();
            if name.is_empty() {
                return Err(DomainError::InvalidName(name));
            }
            if self.records.contains_key(&name) {
                return Err(DomainError::DuplicateBone(name));
            }
            if let Some(parent) = &record.parent {
                self.relationship_cache
                    .entry(parent.clone())
                    .or_default()
                    .push(name.clone());
            }
            self.order.push(name.clone());
            self.records.insert(name, record);
        }

        for name in &self.order {
            if let Some(parent) = &self.records[name].parent {
                if !self.records.contains_key(parent) {
                    return Err(DomainError::MissingParent {
                        bone: name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn find_root_bones(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| self.records[*name].parent.is_none())
            .cloned()
            .collect()
    }

    fn insert_subtree(
        &self,
        armature: &mut Armature,
        root: &str,
        visited: &mut HashSet<String>,
    ) -> DomainResult<()> {
        let mut stack = vec![(root.to_string(), None::<String>)];

        while let Some((current, parent)) = stack.pop() {
            if !visited.insert(current.clone()) {
                return Err(DomainError::CycleDetected(current));
            }

            let bone = self.records[&current].bone.clone();
            armature.new_bone(bone, parent.as_deref())?;

            // Reverse so siblings keep their document order
            if let Some(children) = self.relationship_cache.get(&current) {
                for child in children.iter().rev() {
                    stack.push((child.clone(), Some(current.clone())));
                }
            }
        }
        Ok(())
    }
}

impl From<&Armature> for ArmatureDocument {
    fn from(armature: &Armature) -> Self {
        let bones = armature
            .iter()
            .map(|(_, node)| BoneRecord {
                bone: node.bone.clone(),
                parent: armature
                    .parent_of(&node.bone.name)
                    .ok()
                    .flatten()
                    .map(str::to_string),
            })
            .collect();
        Self { bones }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Bone;

    fn record(name: &str, parent: Option<&str>) -> BoneRecord {
        BoneRecord {
            bone: Bone::new(name),
            parent: parent.map(str::to_string),
        }
    }

    #[test]
    fn test_build_accepts_children_before_parents() {
        let document = ArmatureDocument {
            bones: vec![
                record("hand", Some("forearm")),
                record("forearm", Some("upper_arm")),
                record("upper_arm", None),
            ],
        };
        let armature = ArmatureBuilder::new().build(document).unwrap();
        assert_eq!(armature.names(), vec!["upper_arm", "forearm", "hand"]);
        assert_eq!(armature.parent_of("hand").unwrap(), Some("forearm"));
    }

    #[test]
    fn test_build_rejects_missing_parent() {
        let document = ArmatureDocument {
            bones: vec![record("hand", Some("ghost"))],
        };
        let result = ArmatureBuilder::new().build(document);
        assert!(matches!(result, Err(DomainError::MissingParent { .. })));
    }

    #[test]
    fn test_build_rejects_duplicates() {
        let document = ArmatureDocument {
            bones: vec![record("a", None), record("a", None)],
        };
        let result = ArmatureBuilder::new().build(document);
        assert!(matches!(result, Err(DomainError::DuplicateBone(n)) if n == "a"));
    }

    #[test]
    fn test_build_detects_cycles() {
        let document = ArmatureDocument {
            bones: vec![
                record("root", None),
                record("a", Some("b")),
                record("b", Some("a")),
            ],
        };
        let result = ArmatureBuilder::new().build(document);
        assert!(matches!(result, Err(DomainError::CycleDetected(_))));
    }

    #[test]
    fn test_document_round_trip_keeps_parents() {
        let document = ArmatureDocument {
            bones: vec![record("root", None), record("spine", Some("root"))],
        };
        let armature = ArmatureBuilder::new().build(document.clone()).unwrap();
        assert_eq!(ArmatureDocument::from(&armature), document);
    }
}

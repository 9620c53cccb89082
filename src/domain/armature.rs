//! Arena-backed armature: bone store and constraint store.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::{instrument, trace};

use crate::domain::entities::{Bone, Constraint, ConstraintKind};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::naming::unique_name;

/// Bone node in the arena-based hierarchy.
#[derive(Debug, Clone)]
pub struct BoneNode {
    pub bone: Bone,
    /// Index of parent node in the arena, None for root bones
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena
    pub children: Vec<Index>,
}

/// Arena-based skeleton.
///
/// Bones are addressed by name; the name index is kept in sync with the arena
/// on every insert and rename. Multiple root bones are allowed.
#[derive(Debug, Clone, Default)]
pub struct Armature {
    arena: Arena<BoneNode>,
    names: HashMap<String, Index>,
    roots: Vec<Index>,
}

impl Armature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    fn index_of(&self, name: &str) -> DomainResult<Index> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| DomainError::BoneNotFound(name.to_string()))
    }

    fn node(&self, idx: Index) -> &BoneNode {
        &self.arena[idx]
    }

    pub fn bone(&self, name: &str) -> DomainResult<&Bone> {
        let idx = self.index_of(name)?;
        Ok(&self.node(idx).bone)
    }

    pub fn bone_mut(&mut self, name: &str) -> DomainResult<&mut Bone> {
        let idx = self.index_of(name)?;
        Ok(&mut self.arena[idx].bone)
    }

    pub fn parent_of(&self, name: &str) -> DomainResult<Option<&str>> {
        let idx = self.index_of(name)?;
        Ok(self
            .node(idx)
            .parent
            .map(|p| self.node(p).bone.name.as_str()))
    }

    pub fn children_of(&self, name: &str) -> DomainResult<Vec<&str>> {
        let idx = self.index_of(name)?;
        Ok(self
            .node(idx)
            .children
            .iter()
            .map(|&c| self.node(c).bone.name.as_str())
            .collect())
    }

    pub fn root_names(&self) -> Vec<&str> {
        self.roots
            .iter()
            .map(|&r| self.node(r).bone.name.as_str())
            .collect()
    }

    /// Insert a bone, uniquifying its name. Returns the final name.
    #[instrument(level = "trace", skip(self, bone), fields(name = %bone.name))]
    pub fn new_bone(&mut self, mut bone: Bone, parent: Option<&str>) -> DomainResult<String> {
        if bone.name.is_empty() {
            return Err(DomainError::InvalidName(bone.name));
        }
        let parent_idx = parent.map(|p| self.index_of(p)).transpose()?;
        bone.name = unique_name(&bone.name, |n| self.names.contains_key(n));
        let name = bone.name.clone();

        let idx = self.arena.insert(BoneNode {
            bone,
            parent: parent_idx,
            children: Vec::new(),
        });
        match parent_idx {
            Some(p) => self.arena[p].children.push(idx),
            None => self.roots.push(idx),
        }
        self.names.insert(name.clone(), idx);
        trace!("new bone {}", name);
        Ok(name)
    }

    /// Duplicate the rest geometry of `source` into a new bone.
    ///
    /// With `parent`, the copy shares the source's parent and connect flag;
    /// otherwise it is created as a root. With `bbone`, segmentation is copied.
    /// Pose properties, constraints and widgets are not copied.
    #[instrument(level = "debug", skip(self))]
    pub fn copy_bone(
        &mut self,
        source: &str,
        new_name: &str,
        parent: bool,
        bbone: bool,
    ) -> DomainResult<String> {
        let src = self.bone(source)?;
        let mut copy = Bone::new(new_name).with_geometry(src.head, src.tail, src.roll);
        copy.use_deform = src.use_deform;
        if bbone {
            copy.bbone_segments = src.bbone_segments;
        }
        if parent {
            copy.use_connect = src.use_connect;
        }

        let parent_name = if parent {
            self.parent_of(source)?.map(str::to_string)
        } else {
            None
        };
        self.new_bone(copy, parent_name.as_deref())
    }

    /// Re-parent `child`. `None` makes it a root.
    #[instrument(level = "debug", skip(self))]
    pub fn set_bone_parent(
        &mut self,
        child: &str,
        parent: Option<&str>,
        use_connect: bool,
    ) -> DomainResult<()> {
        let child_idx = self.index_of(child)?;
        let parent_idx = parent.map(|p| self.index_of(p)).transpose()?;

        if let Some(p) = parent_idx {
            if self.is_ancestor_or_self(child_idx, p) {
                return Err(DomainError::ParentCycle {
                    child: child.to_string(),
                    parent: self.node(p).bone.name.clone(),
                });
            }
        }

        match self.arena[child_idx].parent {
            Some(old) => self.arena[old].children.retain(|&c| c != child_idx),
            None => self.roots.retain(|&r| r != child_idx),
        }
        match parent_idx {
            Some(p) => self.arena[p].children.push(child_idx),
            None => self.roots.push(child_idx),
        }

        let node = &mut self.arena[child_idx];
        node.parent = parent_idx;
        node.bone.use_connect = parent_idx.is_some() && use_connect;
        Ok(())
    }

    /// True if `ancestor` is `node` or lies on the parent chain of `node`.
    fn is_ancestor_or_self(&self, ancestor: Index, node: Index) -> bool {
        let mut current = Some(node);
        while let Some(idx) = current {
            if idx == ancestor {
                return true;
            }
            current = self.node(idx).parent;
        }
        false
    }

    /// Rename a bone, rewriting every constraint subtarget that pointed at it.
    #[instrument(level = "debug", skip(self))]
    pub fn rename_bone(&mut self, old: &str, desired: &str) -> DomainResult<String> {
        let idx = self.index_of(old)?;
        if desired.is_empty() {
            return Err(DomainError::InvalidName(desired.to_string()));
        }
        let new = unique_name(desired, |n| n != old && self.names.contains_key(n));
        if new == old {
            return Ok(new);
        }

        self.names.remove(old);
        self.names.insert(new.clone(), idx);
        self.arena[idx].bone.name = new.clone();

        for (_, node) in self.arena.iter_mut() {
            for constraint in &mut node.bone.constraints {
                for target in &mut constraint.targets {
                    if target == old {
                        *target = new.clone();
                    }
                }
            }
        }
        Ok(new)
    }

    /// Copy pose-level editing properties from `source` to `dest`.
    #[instrument(level = "debug", skip(self))]
    pub fn copy_bone_properties(&mut self, source: &str, dest: &str) -> DomainResult<()> {
        let pose = self.bone(source)?.pose.clone();
        self.bone_mut(dest)?.pose = pose;
        Ok(())
    }

    /// Add a constraint named after its kind at `insert_index` (end if None).
    ///
    /// The index is clamped to the stack length.
    #[instrument(level = "debug", skip(self))]
    pub fn add_constraint(
        &mut self,
        bone: &str,
        kind: ConstraintKind,
        target: Option<&str>,
        insert_index: Option<usize>,
    ) -> DomainResult<String> {
        if let Some(target) = target {
            self.index_of(target)?;
        }
        let mut constraint = Constraint::new(kind.display_name(), kind);
        if let Some(target) = target {
            constraint.targets.push(target.to_string());
        }
        self.insert_constraint(bone, constraint, insert_index)
    }

    /// Append an existing constraint, uniquifying its name within the stack.
    pub fn push_constraint(&mut self, bone: &str, constraint: Constraint) -> DomainResult<String> {
        self.insert_constraint(bone, constraint, None)
    }

    fn insert_constraint(
        &mut self,
        bone: &str,
        mut constraint: Constraint,
        insert_index: Option<usize>,
    ) -> DomainResult<String> {
        let stack = &mut self.bone_mut(bone)?.constraints;
        constraint.name = unique_name(&constraint.name, |n| stack.iter().any(|c| c.name == n));
        let name = constraint.name.clone();
        let at = insert_index.unwrap_or(stack.len()).min(stack.len());
        stack.insert(at, constraint);
        Ok(name)
    }

    /// Remove and return every constraint whose name starts with `prefix`,
    /// in stack order.
    pub fn take_constraints_with_prefix(
        &mut self,
        bone: &str,
        prefix: &str,
    ) -> DomainResult<Vec<Constraint>> {
        let stack = &mut self.bone_mut(bone)?.constraints;
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(stack)
            .into_iter()
            .partition(|c| c.name.starts_with(prefix));
        *stack = kept;
        Ok(taken)
    }

    /// Bone names in preorder: roots in insertion order, children in order.
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|(_, node)| node.bone.name.as_str()).collect()
    }

    pub fn iter(&self) -> BoneIterator<'_> {
        BoneIterator::new(self)
    }

    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&r| self.calculate_depth(r))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, idx: Index) -> usize {
        1 + self
            .node(idx)
            .children
            .iter()
            .map(|&child| self.calculate_depth(child))
            .max()
            .unwrap_or(0)
    }

    /// Render the hierarchy, labelling each bone with `label`.
    pub fn to_tree_with<F>(&self, title: &str, label: F) -> Tree<String>
    where
        F: Fn(&Bone) -> String,
    {
        fn build<F: Fn(&Bone) -> String>(arm: &Armature, idx: Index, label: &F) -> Tree<String> {
            let node = arm.node(idx);
            let leaves: Vec<_> = node.children.iter().map(|&c| build(arm, c, label)).collect();
            Tree::new(label(&node.bone)).with_leaves(leaves)
        }

        let leaves: Vec<_> = self.roots.iter().map(|&r| build(self, r, &label)).collect();
        Tree::new(title.to_string()).with_leaves(leaves)
    }

    pub fn to_tree(&self, title: &str) -> Tree<String> {
        self.to_tree_with(title, |bone| bone.name.clone())
    }
}

/// Preorder traversal over all bones.
pub struct BoneIterator<'a> {
    armature: &'a Armature,
    stack: Vec<Index>,
}

impl<'a> BoneIterator<'a> {
    fn new(armature: &'a Armature) -> Self {
        // Reverse so roots come out in insertion order
        let stack = armature.roots.iter().rev().copied().collect();
        Self { armature, stack }
    }
}

impl<'a> Iterator for BoneIterator<'a> {
    type Item = (Index, &'a BoneNode);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let node = self.armature.arena.get(current)?;
        for &child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some((current, node))
    }
}

//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Pose-mode rotation representation of a bone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RotationMode {
    #[default]
    Quaternion,
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
    AxisAngle,
}

/// Pose-level editing properties carried by a bone.
///
/// These never influence the rest geometry; they describe how the bone is
/// manipulated by an animator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseProperties {
    pub rotation_mode: RotationMode,
    pub lock_location: [bool; 3],
    pub lock_rotation: [bool; 3],
    pub lock_rotation_w: bool,
    pub lock_scale: [bool; 3],
    /// User-defined custom properties
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, serde_json::Value>,
}

/// How many bone subtargets a constraint type takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetArity {
    None,
    Single,
    Multiple,
}

/// Constraint type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    CopyTransforms,
    CopyLocation,
    CopyRotation,
    CopyScale,
    ChildOf,
    DampedTrack,
    LockedTrack,
    StretchTo,
    TrackTo,
    Transform,
    Armature,
    Ik,
    LimitDistance,
    LimitLocation,
    LimitRotation,
    LimitScale,
    MaintainVolume,
}

impl ConstraintKind {
    /// Default name given to a freshly added constraint of this kind.
    pub fn display_name(self) -> &'static str {
        match self {
            ConstraintKind::CopyTransforms => "Copy Transforms",
            ConstraintKind::CopyLocation => "Copy Location",
            ConstraintKind::CopyRotation => "Copy Rotation",
            ConstraintKind::CopyScale => "Copy Scale",
            ConstraintKind::ChildOf => "Child Of",
            ConstraintKind::DampedTrack => "Damped Track",
            ConstraintKind::LockedTrack => "Locked Track",
            ConstraintKind::StretchTo => "Stretch To",
            ConstraintKind::TrackTo => "Track To",
            ConstraintKind::Transform => "Transformation",
            ConstraintKind::Armature => "Armature",
            ConstraintKind::Ik => "IK",
            ConstraintKind::LimitDistance => "Limit Distance",
            ConstraintKind::LimitLocation => "Limit Location",
            ConstraintKind::LimitRotation => "Limit Rotation",
            ConstraintKind::LimitScale => "Limit Scale",
            ConstraintKind::MaintainVolume => "Maintain Volume",
        }
    }

    pub fn target_arity(self) -> TargetArity {
        match self {
            ConstraintKind::Armature => TargetArity::Multiple,
            ConstraintKind::LimitLocation
            | ConstraintKind::LimitRotation
            | ConstraintKind::LimitScale
            | ConstraintKind::MaintainVolume => TargetArity::None,
            _ => TargetArity::Single,
        }
    }
}

/// Intended final owner of a constraint, encoded as a name prefix.
///
/// `CTRL:` routes to the control bone, `DEF:` to the deform bone; anything
/// else stays on the bone that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintRoute {
    Control,
    Deform,
    Owner,
}

impl ConstraintRoute {
    pub const CONTROL_PREFIX: &'static str = "CTRL:";
    pub const DEFORM_PREFIX: &'static str = "DEF:";

    /// Classify a constraint name by its prefix.
    pub fn of(name: &str) -> Self {
        if name.starts_with(Self::CONTROL_PREFIX) {
            ConstraintRoute::Control
        } else if name.starts_with(Self::DEFORM_PREFIX) {
            ConstraintRoute::Deform
        } else {
            ConstraintRoute::Owner
        }
    }

    /// Name prefix selecting this route. `Owner` has none.
    pub fn prefix(self) -> &'static str {
        match self {
            ConstraintRoute::Control => Self::CONTROL_PREFIX,
            ConstraintRoute::Deform => Self::DEFORM_PREFIX,
            ConstraintRoute::Owner => "",
        }
    }
}

/// One entry of a bone's constraint stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    /// Bone subtargets inside the same armature
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
    /// Type-specific settings, opaque to rig generation
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, serde_json::Value>,
}

impl Constraint {
    pub fn new(name: impl Into<String>, kind: ConstraintKind) -> Self {
        Self {
            name: name.into(),
            kind,
            targets: Vec::new(),
            settings: BTreeMap::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    pub fn route(&self) -> ConstraintRoute {
        ConstraintRoute::of(&self.name)
    }
}

/// Registered widget shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetShape {
    Bone,
    Circle,
    Cube,
    Diamond,
    Sphere,
    Limb,
    Gear,
    Arrow,
    Pivot,
    Square,
    Triangle,
    Line,
}

impl WidgetShape {
    pub const ALL: [WidgetShape; 12] = [
        WidgetShape::Bone,
        WidgetShape::Circle,
        WidgetShape::Cube,
        WidgetShape::Diamond,
        WidgetShape::Sphere,
        WidgetShape::Limb,
        WidgetShape::Gear,
        WidgetShape::Arrow,
        WidgetShape::Pivot,
        WidgetShape::Square,
        WidgetShape::Triangle,
        WidgetShape::Line,
    ];

    pub fn key(self) -> &'static str {
        match self {
            WidgetShape::Bone => "bone",
            WidgetShape::Circle => "circle",
            WidgetShape::Cube => "cube",
            WidgetShape::Diamond => "diamond",
            WidgetShape::Sphere => "sphere",
            WidgetShape::Limb => "limb",
            WidgetShape::Gear => "gear",
            WidgetShape::Arrow => "arrow",
            WidgetShape::Pivot => "pivot",
            WidgetShape::Square => "square",
            WidgetShape::Triangle => "triangle",
            WidgetShape::Line => "line",
        }
    }
}

impl fmt::Display for WidgetShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for WidgetShape {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetShape::ALL
            .into_iter()
            .find(|shape| shape.key() == s)
            .ok_or_else(|| DomainError::UnknownWidget(s.to_string()))
    }
}

/// Proxy shape displayed for a bone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    /// Name of the widget object, e.g. `WGT-hand.L`
    pub object_name: String,
    pub shape: WidgetShape,
}

/// Rig component assignment on a metarig bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigAssignment {
    pub rig_type: String,
    /// Raw parameters; interpreted by the rig type
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

/// A bone payload. Parent links live in the armature, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bone {
    pub name: String,
    pub head: Vec3,
    pub tail: Vec3,
    pub roll: f32,
    pub use_connect: bool,
    pub use_deform: bool,
    pub bbone_segments: u32,
    pub pose: PoseProperties,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget: Option<Widget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rig: Option<RigAssignment>,
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            name: String::new(),
            head: Vec3::ZERO,
            tail: Vec3::new(0.0, 0.0, 1.0),
            roll: 0.0,
            use_connect: false,
            use_deform: true,
            bbone_segments: 1,
            pose: PoseProperties::default(),
            constraints: Vec::new(),
            widget: None,
            rig: None,
        }
    }
}

impl Bone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_geometry(mut self, head: Vec3, tail: Vec3, roll: f32) -> Self {
        self.head = head;
        self.tail = tail;
        self.roll = roll;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_rig(mut self, rig_type: impl Into<String>, params: serde_json::Value) -> Self {
        self.rig = Some(RigAssignment {
            rig_type: rig_type.into(),
            params,
        });
        self
    }

    pub fn constraint_names(&self) -> Vec<&str> {
        self.constraints.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Serialized form of one bone: payload plus parent name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneRecord {
    #[serde(flatten)]
    pub bone: Bone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Serialized armature, bones listed parents-first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArmatureDocument {
    #[serde(default)]
    pub bones: Vec<BoneRecord>,
}

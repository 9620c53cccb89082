//! Bone naming conventions
//!
//! Generated rigs tag every bone with a role prefix:
//! - `ORG-`: original metarig bone
//! - `MCH-`: mechanism bone
//! - `DEF-`: deformation bone
//! - no prefix: animator-facing control

/// Prefix of original (metarig) bones.
pub const ORG_PREFIX: &str = "ORG-";
/// Prefix of mechanism bones.
pub const MCH_PREFIX: &str = "MCH-";
/// Prefix of deformation bones.
pub const DEF_PREFIX: &str = "DEF-";
/// Prefix of widget objects.
pub const WGT_PREFIX: &str = "WGT-";

/// Maximum bone name length in bytes.
pub const MAX_NAME_LEN: usize = 63;

/// Role of a bone, derived from its name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoneKind {
    Org,
    Ctrl,
    Mch,
    Def,
}

impl BoneKind {
    pub fn prefix(self) -> &'static str {
        match self {
            BoneKind::Org => ORG_PREFIX,
            BoneKind::Ctrl => "",
            BoneKind::Mch => MCH_PREFIX,
            BoneKind::Def => DEF_PREFIX,
        }
    }

    /// Classify a bone name by its prefix.
    pub fn of_name(name: &str) -> Self {
        if name.starts_with(ORG_PREFIX) {
            BoneKind::Org
        } else if name.starts_with(MCH_PREFIX) {
            BoneKind::Mch
        } else if name.starts_with(DEF_PREFIX) {
            BoneKind::Def
        } else {
            BoneKind::Ctrl
        }
    }

    /// Parse the `CTRL` / `DEF` / `MCH` keywords used in relink specs.
    pub fn from_relink_spec(spec: &str) -> Option<Self> {
        match spec {
            "CTRL" => Some(BoneKind::Ctrl),
            "DEF" => Some(BoneKind::Def),
            "MCH" => Some(BoneKind::Mch),
            _ => None,
        }
    }
}

/// Remove a leading `ORG-` prefix.
pub fn strip_org(name: &str) -> &str {
    name.strip_prefix(ORG_PREFIX).unwrap_or(name)
}

/// Remove any leading role prefix.
pub fn strip_prefix(name: &str) -> &str {
    [ORG_PREFIX, MCH_PREFIX, DEF_PREFIX]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

pub fn make_original_name(name: &str) -> String {
    format!("{}{}", ORG_PREFIX, name)
}

pub fn make_mechanism_name(name: &str) -> String {
    format!("{}{}", MCH_PREFIX, name)
}

pub fn make_deformer_name(name: &str) -> String {
    format!("{}{}", DEF_PREFIX, name)
}

/// Name of the bone of `kind` derived from `name`, e.g. `ORG-arm` → `DEF-arm`.
pub fn make_derived_name(name: &str, kind: BoneKind) -> String {
    format!("{}{}", kind.prefix(), strip_prefix(name))
}

/// Truncate a name to [`MAX_NAME_LEN`] bytes on a char boundary.
pub fn clamp_name(name: &str) -> &str {
    clamp_name_to(name, MAX_NAME_LEN)
}

/// Split a trailing `.NNN` counter off a name.
fn split_counter(name: &str) -> (&str, Option<u32>) {
    match name.rsplit_once('.') {
        Some((base, digits))
            if !base.is_empty()
                && !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            (base, digits.parse().ok())
        }
        _ => (name, None),
    }
}

/// Return `desired` if free, otherwise the first free `base.001`, `base.002`, ...
///
/// A trailing counter on `desired` is replaced, not extended, so `Bone.001`
/// collides into `Bone.002` rather than `Bone.001.001`.
pub fn unique_name<F>(desired: &str, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let desired = clamp_name(desired);
    if !is_taken(desired) {
        return desired.to_string();
    }

    let (base, _) = split_counter(desired);
    let mut counter: u32 = 1;
    loop {
        let suffix = format!(".{:03}", counter);
        let base = clamp_name_to(base, MAX_NAME_LEN - suffix.len());
        let candidate = format!("{}{}", base, suffix);
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn clamp_name_to(name: &str, len: usize) -> &str {
    if name.len() <= len {
        return name;
    }
    let mut end = len;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

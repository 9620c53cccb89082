//! Widget catalog: proxy shapes bound to control bones.

use tracing::debug;

use crate::domain::naming::{strip_org, WGT_PREFIX};
use crate::domain::{Armature, DomainResult, Widget, WidgetShape};

/// Widget type used when a rig asks for a widget without naming one.
pub const DEFAULT_WIDGET_TYPE: &str = "circle";

/// Source of widget shapes.
pub trait WidgetCatalog: Send + Sync {
    /// Bind the registered shape `widget_type` to `bone`.
    fn create_registered_widget(
        &self,
        armature: &mut Armature,
        bone: &str,
        widget_type: &str,
    ) -> DomainResult<()>;

    /// Bind the catalog's default bone-proxy shape to `bone`.
    fn create_default_widget(&self, armature: &mut Armature, bone: &str) -> DomainResult<()>;
}

/// Catalog backed by the built-in [`WidgetShape`] registry.
#[derive(Debug, Clone)]
pub struct BuiltinWidgets {
    prefix: String,
}

impl Default for BuiltinWidgets {
    fn default() -> Self {
        Self::new(WGT_PREFIX)
    }
}

impl BuiltinWidgets {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Registered widget keys, in display order.
    pub fn keys() -> Vec<&'static str> {
        WidgetShape::ALL.iter().map(|shape| shape.key()).collect()
    }

    pub fn is_registered(key: &str) -> bool {
        key.parse::<WidgetShape>().is_ok()
    }

    fn object_name(&self, bone: &str) -> String {
        format!("{}{}", self.prefix, strip_org(bone))
    }

    fn assign(&self, armature: &mut Armature, bone: &str, shape: WidgetShape) -> DomainResult<()> {
        let object_name = self.object_name(bone);
        debug!("widget {} ({}) -> {}", object_name, shape, bone);
        armature.bone_mut(bone)?.widget = Some(Widget { object_name, shape });
        Ok(())
    }
}

impl WidgetCatalog for BuiltinWidgets {
    fn create_registered_widget(
        &self,
        armature: &mut Armature,
        bone: &str,
        widget_type: &str,
    ) -> DomainResult<()> {
        let shape = widget_type.parse::<WidgetShape>()?;
        self.assign(armature, bone, shape)
    }

    fn create_default_widget(&self, armature: &mut Armature, bone: &str) -> DomainResult<()> {
        self.assign(armature, bone, WidgetShape::Bone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bone, DomainError};

    #[test]
    fn test_registered_widget_is_bound_to_bone() {
        let mut arm = Armature::new();
        arm.new_bone(Bone::new("hand.L"), None).unwrap();

        BuiltinWidgets::default()
            .create_registered_widget(&mut arm, "hand.L", "cube")
            .unwrap();

        let widget = arm.bone("hand.L").unwrap().widget.clone().unwrap();
        assert_eq!(widget.object_name, "WGT-hand.L");
        assert_eq!(widget.shape, WidgetShape::Cube);
    }

    #[test]
    fn test_unknown_widget_type_fails() {
        let mut arm = Armature::new();
        arm.new_bone(Bone::new("a"), None).unwrap();
        let result = BuiltinWidgets::default().create_registered_widget(&mut arm, "a", "teapot");
        assert!(matches!(result, Err(DomainError::UnknownWidget(k)) if k == "teapot"));
        assert!(arm.bone("a").unwrap().widget.is_none());
    }

    #[test]
    fn test_default_widget_uses_bone_shape_and_prefix() {
        let mut arm = Armature::new();
        arm.new_bone(Bone::new("a"), None).unwrap();
        BuiltinWidgets::new("W_")
            .create_default_widget(&mut arm, "a")
            .unwrap();
        let widget = arm.bone("a").unwrap().widget.clone().unwrap();
        assert_eq!(widget.object_name, "W_a");
        assert_eq!(widget.shape, WidgetShape::Bone);
    }

    #[test]
    fn test_catalog_keys_include_default() {
        assert!(BuiltinWidgets::keys().contains(&DEFAULT_WIDGET_TYPE));
        assert!(BuiltinWidgets::is_registered("gear"));
        assert!(!BuiltinWidgets::is_registered(""));
    }
}

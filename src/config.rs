//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rigsmith/rigsmith.toml`
//! 3. Local config: `<metarig_dir>/.rigsmith.toml`
//! 4. Environment variables: `RIGSMITH_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::rigs::SuperCopyParams;
use crate::application::ApplicationError;
use crate::domain::naming::WGT_PREFIX;

/// How generated armatures are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tree => f.write_str("tree"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Raw super copy defaults for intermediate parsing.
///
/// `None` means not specified, inherit from the lower layer.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSuperCopy {
    pub make_control: Option<bool>,
    pub make_widget: Option<bool>,
    pub widget_type: Option<String>,
    pub make_deform: Option<bool>,
    pub relink_constraints: Option<bool>,
    pub parent_bone: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub widget_prefix: Option<String>,
    pub output: Option<OutputFormat>,
    pub super_copy: RawSuperCopy,
}

/// Unified configuration for rigsmith.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Name prefix of widget objects (default: `WGT-`)
    pub widget_prefix: String,
    /// Default output format of `generate`
    pub output: OutputFormat,
    /// Defaults for `basic.super_copy` rigs; bone parameters override them
    pub super_copy: SuperCopyParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            widget_prefix: WGT_PREFIX.to_string(),
            output: OutputFormat::default(),
            super_copy: SuperCopyParams::default(),
        }
    }
}

/// Get the XDG config directory for rigsmith.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rigsmith").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rigsmith.toml"))
}

/// Get the path to the local config file next to a metarig.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".rigsmith.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let base = &self.super_copy;
        let raw = &overlay.super_copy;

        let mut super_copy = base.clone();
        super_copy.make_control = raw.make_control.unwrap_or(base.make_control);
        super_copy.make_widget = raw.make_widget.unwrap_or(base.make_widget);
        super_copy.make_deform = raw.make_deform.unwrap_or(base.make_deform);
        if let Some(widget_type) = &raw.widget_type {
            super_copy.widget_type = widget_type.clone();
        }
        super_copy.relink.relink_constraints = raw
            .relink_constraints
            .unwrap_or(base.relink.relink_constraints);
        if let Some(parent_bone) = &raw.parent_bone {
            super_copy.relink.parent_bone = parent_bone.clone();
        }

        Self {
            widget_prefix: overlay
                .widget_prefix
                .clone()
                .unwrap_or_else(|| self.widget_prefix.clone()),
            output: overlay.output.unwrap_or(self.output),
            super_copy,
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.rigsmith.toml`,
    ///   usually the metarig's directory
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        Self::apply_env_overrides(current)
    }

    /// Apply RIGSMITH_* environment variables as explicit overrides.
    ///
    /// Nested keys use `__`: `RIGSMITH_SUPER_COPY__MAKE_DEFORM=false`.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RIGSMITH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("widget_prefix") {
            settings.widget_prefix = val;
        }
        if let Ok(val) = config.get_string("output") {
            settings.output =
                OutputFormat::from_str(&val, true).map_err(|e| ApplicationError::Config {
                    message: format!("RIGSMITH_OUTPUT: {e}"),
                })?;
        }

        let sc = &mut settings.super_copy;
        if let Ok(val) = config.get_bool("super_copy.make_control") {
            sc.make_control = val;
        }
        if let Ok(val) = config.get_bool("super_copy.make_widget") {
            sc.make_widget = val;
        }
        if let Ok(val) = config.get_string("super_copy.widget_type") {
            sc.widget_type = val;
        }
        if let Ok(val) = config.get_bool("super_copy.make_deform") {
            sc.make_deform = val;
        }
        if let Ok(val) = config.get_bool("super_copy.relink_constraints") {
            sc.relink.relink_constraints = val;
        }
        if let Ok(val) = config.get_string("super_copy.parent_bone") {
            sc.relink.parent_bone = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

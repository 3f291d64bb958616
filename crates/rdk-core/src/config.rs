//! Loader configuration
//!
//! Settings can be built in code or loaded from a RON file. Every field has a
//! default, so a config file only needs to name what it overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{
    ASSET_ROOT_ENV, BASE_CORRECTION_DEG, DEFAULT_ASSET_ROOT, DEFAULT_COLOR, MESH_CORRECTION_DEG,
};
use crate::error::ConfigError;
use crate::frame::{BasePlacement, rpy_degrees_to_quat};
use crate::mesh::MeshUnit;
use crate::resolve::PrefixRemap;

/// Options for loading robot descriptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory prepended to mesh references that match no remap rule
    pub asset_root: String,
    /// Known-wrong vendor prefixes and their local replacements (first match wins)
    pub prefix_remaps: Vec<PrefixRemap>,
    /// Explicit roots for `package://<name>/...` references
    pub package_paths: HashMap<String, PathBuf>,
    /// Root used to absolutise resolved paths (None = environment or current directory)
    pub filesystem_root: Option<PathBuf>,
    /// Base color for visuals without a material (RGB)
    pub default_color: [f32; 3],
    /// Unit of imported mesh files
    pub mesh_unit: MeshUnit,
    /// Fail the load when more than one link has no parent
    pub strict_single_root: bool,
    /// Z-up to Y-up correction (roll, pitch, yaw in degrees)
    pub base_correction_deg: [f32; 3],
    /// Mesh orientation correction (roll, pitch, yaw in degrees)
    pub mesh_correction_deg: [f32; 3],
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            asset_root: DEFAULT_ASSET_ROOT.to_string(),
            prefix_remaps: vec![PrefixRemap::new(
                "drake_models/iiwa_description/",
                "assets/kuka/",
            )],
            package_paths: HashMap::new(),
            filesystem_root: None,
            default_color: DEFAULT_COLOR,
            mesh_unit: MeshUnit::Meters,
            strict_single_root: false,
            base_correction_deg: BASE_CORRECTION_DEG,
            mesh_correction_deg: MESH_CORRECTION_DEG,
        }
    }
}

impl LoaderConfig {
    /// Parse a config from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a config from a RON file
    pub fn from_ron_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&text)
    }

    /// Add a package path mapping
    pub fn add_package_path(&mut self, package_name: impl Into<String>, path: impl Into<PathBuf>) {
        self.package_paths.insert(package_name.into(), path.into());
    }

    /// Filesystem root: the environment override, then the configured root, then the
    /// current directory
    pub fn effective_filesystem_root(&self) -> PathBuf {
        if let Ok(root) = std::env::var(ASSET_ROOT_ENV)
            && !root.is_empty()
        {
            return PathBuf::from(root);
        }
        self.filesystem_root
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn default_color(&self) -> Vec3 {
        Vec3::from_array(self.default_color)
    }

    pub fn base_placement(&self, position: Vec3) -> BasePlacement {
        BasePlacement::new(position, rpy_degrees_to_quat(self.base_correction_deg))
    }

    pub fn mesh_correction(&self) -> Quat {
        rpy_degrees_to_quat(self.mesh_correction_deg)
    }
}

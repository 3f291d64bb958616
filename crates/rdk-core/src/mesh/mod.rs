//! Mesh import (STL, OBJ formats)
//!
//! The kinematic core treats geometry as opaque: it asks a [`GeometryLoader`]
//! for a handle per resolved path and never looks inside. [`MeshImporter`] is
//! the default loader, producing [`MeshData`] and sharing handles between
//! visuals that reference the same file.

mod obj;
mod stl;

use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::Vec3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

pub use obj::load_obj;
pub use stl::load_stl;

/// Renderable geometry produced by a [`GeometryLoader`]
pub trait Geometry: std::fmt::Debug + Send + Sync {
    /// Whether the geometry carries its own texture (otherwise the visual's color is used)
    fn has_texture(&self) -> bool;

    /// File the geometry was imported from, if any
    fn source_path(&self) -> Option<&Path>;

    /// Downcast hook for renderers that know the concrete type
    fn as_any(&self) -> &dyn Any;
}

/// Shared, immutable geometry handle
pub type GeometryHandle = Arc<dyn Geometry>;

/// Mesh-import collaborator: one handle per resolved file path
pub trait GeometryLoader {
    fn load_geometry(&self, path: &Path) -> Result<GeometryHandle, MeshError>;

    /// Called once before each description load
    fn begin_load(&self) {}
}

/// Mesh import scale unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeshUnit {
    /// Meters (no scaling)
    #[default]
    Meters,
    /// Millimeters (scale by 0.001)
    Millimeters,
    /// Centimeters (scale by 0.01)
    Centimeters,
    /// Inches (scale by 0.0254)
    Inches,
}

impl MeshUnit {
    pub fn scale_factor(&self) -> f32 {
        match self {
            MeshUnit::Meters => 1.0,
            MeshUnit::Millimeters => 0.001,
            MeshUnit::Centimeters => 0.01,
            MeshUnit::Inches => 0.0254,
        }
    }
}

/// Triangle mesh imported from a file
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: String,
    pub source: Option<PathBuf>,
    pub vertices: Vec<[f32; 3]>,
    /// One normal per triangle
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub bbox_min: [f32; 3],
    pub bbox_max: [f32; 3],
    /// Diffuse texture referenced by the mesh's material, if any
    pub texture: Option<PathBuf>,
}

impl MeshData {
    /// Assemble mesh data, computing the bounding box
    pub(crate) fn new(
        path: &Path,
        vertices: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        indices: Vec<u32>,
    ) -> Self {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();

        let mut mesh = Self {
            name,
            source: Some(path.to_path_buf()),
            vertices,
            normals,
            indices,
            ..Self::default()
        };
        mesh.calculate_bounding_box();
        mesh
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn calculate_bounding_box(&mut self) {
        if self.vertices.is_empty() {
            self.bbox_min = [0.0; 3];
            self.bbox_max = [0.0; 3];
            return;
        }

        let (min, max) = self.vertices.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), v| {
                let v = Vec3::from_array(*v);
                (min.min(v), max.max(v))
            },
        );
        self.bbox_min = min.to_array();
        self.bbox_max = max.to_array();
    }
}

impl Geometry for MeshData {
    fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Calculate one normal per triangle
pub(crate) fn calculate_face_normals(vertices: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    indices
        .chunks_exact(3)
        .map(|tri| {
            let [a, b, c] =
                [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(vertices[i as usize]));
            (b - a)
                .cross(c - a)
                .try_normalize()
                .unwrap_or(Vec3::Z)
                .to_array()
        })
        .collect()
}

/// Detect mesh format from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
    Dae,
    Unknown,
}

impl MeshFormat {
    /// Detect format from file path
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("stl") => MeshFormat::Stl,
            Some("obj") => MeshFormat::Obj,
            Some("dae") => MeshFormat::Dae,
            _ => MeshFormat::Unknown,
        }
    }

    /// Check if the format is supported
    pub fn is_supported(&self) -> bool {
        matches!(self, MeshFormat::Stl | MeshFormat::Obj)
    }

    /// Get format name
    pub fn name(&self) -> &'static str {
        match self {
            MeshFormat::Stl => "STL",
            MeshFormat::Obj => "OBJ",
            MeshFormat::Dae => "DAE (COLLADA)",
            MeshFormat::Unknown => "Unknown",
        }
    }
}

/// Load any supported mesh format
pub fn load_mesh(path: impl AsRef<Path>, unit: MeshUnit) -> Result<MeshData, MeshError> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path);

    match format {
        MeshFormat::Stl => load_stl(path, unit),
        MeshFormat::Obj => load_obj(path, unit),
        MeshFormat::Dae | MeshFormat::Unknown => Err(MeshError::UnsupportedFormat(format!(
            "{} ({})",
            path.display(),
            format.name()
        ))),
    }
}

/// Default geometry loader backed by the STL/OBJ importers
///
/// Handles are cached by path for the duration of one description load, so
/// every visual referencing the same file shares one reference-counted mesh.
/// The cache is dropped when the next load begins, which picks up files
/// changed on disk in between.
#[derive(Debug, Default)]
pub struct MeshImporter {
    unit: MeshUnit,
    cache: Mutex<HashMap<PathBuf, GeometryHandle>>,
}

impl MeshImporter {
    pub fn new(unit: MeshUnit) -> Self {
        Self {
            unit,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached handles
    pub fn cached_count(&self) -> usize {
        self.cache.lock().len()
    }

    /// Drop all cached handles (live handles stay valid)
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}

impl GeometryLoader for MeshImporter {
    fn load_geometry(&self, path: &Path) -> Result<GeometryHandle, MeshError> {
        if let Some(handle) = self.cache.lock().get(path) {
            tracing::debug!("Geometry cache hit: {}", path.display());
            return Ok(Arc::clone(handle));
        }

        tracing::debug!("Geometry cache miss: {}", path.display());
        let mesh = load_mesh(path, self.unit)?;
        let handle: GeometryHandle = Arc::new(mesh);
        self.cache
            .lock()
            .insert(path.to_path_buf(), Arc::clone(&handle));
        Ok(handle)
    }

    fn begin_load(&self) {
        self.clear_cache();
    }
}

/// Mesh-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty mesh: no geometry found")]
    EmptyMesh,
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

//! Link and visual records consumed by rendering

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::frame::Pose;
use crate::mesh::GeometryHandle;

/// Index of a link in its robot's link arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId(pub(crate) usize);

impl LinkId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Joint type
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JointKind {
    Revolute,
    Continuous,
    Prismatic,
    #[default]
    Fixed,
    Floating,
    Planar,
    /// Any other type string (e.g. SDF `ball`, `universal`)
    Other(String),
}

impl JointKind {
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "revolute" => JointKind::Revolute,
            "continuous" => JointKind::Continuous,
            "prismatic" => JointKind::Prismatic,
            "fixed" | "" => JointKind::Fixed,
            "floating" => JointKind::Floating,
            "planar" => JointKind::Planar,
            other => JointKind::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            JointKind::Revolute => "revolute",
            JointKind::Continuous => "continuous",
            JointKind::Prismatic => "prismatic",
            JointKind::Fixed => "fixed",
            JointKind::Floating => "floating",
            JointKind::Planar => "planar",
            JointKind::Other(name) => name,
        }
    }
}

/// Joint limits as declared in the description (radians / meters)
///
/// Informational only: clamping is up to whoever drives the angles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointLimits {
    pub lower: f32,
    pub upper: f32,
    pub effort: f32,
    pub velocity: f32,
}

impl JointLimits {
    /// Position range in degrees, for angle controls
    pub fn degrees_range(&self) -> (f32, f32) {
        (self.lower.to_degrees(), self.upper.to_degrees())
    }
}

/// The joint connecting a link to its parent
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JointInfo {
    pub name: String,
    pub kind: JointKind,
    /// Joint frame relative to the parent's joint frame
    pub origin: Pose,
    /// Rotation axis (zero = no animated rotation)
    pub axis: Vec3,
    pub limits: Option<JointLimits>,
}

/// One renderable mesh attached to a link
#[derive(Debug, Clone)]
pub struct VisualEntry {
    pub name: Option<String>,
    pub geometry: GeometryHandle,
    /// Local transform relative to the owning link's joint frame
    pub offset: Pose,
    pub scale: Vec3,
    /// Base color used when the geometry has no texture (RGB)
    pub color: Vec3,
}

impl VisualEntry {
    pub fn has_texture(&self) -> bool {
        self.geometry.has_texture()
    }
}

/// A link in the kinematic tree
#[derive(Debug, Clone)]
pub struct LinkRecord {
    pub name: String,
    /// Draw order only
    pub visuals: Vec<VisualEntry>,
    pub(crate) parent: Option<LinkId>,
    pub(crate) children: Vec<LinkId>,
    /// Identity for the root
    pub joint: JointInfo,
    /// Externally driven joint angle in degrees
    pub current_angle: f32,
}

impl LinkRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visuals: Vec::new(),
            parent: None,
            children: Vec::new(),
            joint: JointInfo::default(),
            current_angle: 0.0,
        }
    }

    pub fn parent(&self) -> Option<LinkId> {
        self.parent
    }

    pub fn children(&self) -> &[LinkId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

//! Global constants for rdk-core

/// URI scheme stripped from ROS-style mesh references
pub const PACKAGE_SCHEME: &str = "package://";

/// URI scheme stripped from plain file mesh references
pub const FILE_SCHEME: &str = "file://";

/// Default asset directory prepended to mesh references that match no remap rule
pub const DEFAULT_ASSET_ROOT: &str = "assets";

/// Environment variable overriding the filesystem root used to absolutise asset paths
pub const ASSET_ROOT_ENV: &str = "RDK_ASSET_ROOT";

/// Default base color for visuals without a material (RGB)
pub const DEFAULT_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

/// Joint axes shorter than this are treated as "no axis"
pub const AXIS_EPSILON: f32 = 0.01;

/// Global correction from the description's Z-up frame to the renderer's Y-up frame
/// (roll, pitch, yaw in degrees)
pub const BASE_CORRECTION_DEG: [f32; 3] = [-90.0, 0.0, 0.0];

/// Correction for the authoring tool's default mesh orientation
/// (roll, pitch, yaw in degrees)
pub const MESH_CORRECTION_DEG: [f32; 3] = [90.0, 0.0, 0.0];

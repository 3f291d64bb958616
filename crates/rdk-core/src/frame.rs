//! Rigid transform frames and their composition rules

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::AXIS_EPSILON;

/// Pose (position and orientation)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub xyz: Vec3,
    pub rpy: Vec3, // roll, pitch, yaw in radians
}

impl Pose {
    pub fn new(xyz: Vec3, rpy: Vec3) -> Self {
        Self { xyz, rpy }
    }

    pub fn from_position(xyz: Vec3) -> Self {
        Self { xyz, rpy: Vec3::ZERO }
    }

    /// Build from the six-float `x y z roll pitch yaw` encoding
    pub fn from_six(values: [f32; 6]) -> Self {
        let [x, y, z, roll, pitch, yaw] = values;
        Self::new(Vec3::new(x, y, z), Vec3::new(roll, pitch, yaw))
    }

    /// Orientation as a quaternion
    pub fn rotation(&self) -> Quat {
        rpy_to_quat(self.rpy)
    }

    /// Translate by `xyz`, then rotate yaw(Z) -> pitch(Y) -> roll(X)
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.xyz)
    }

    pub fn is_identity(&self) -> bool {
        self.xyz == Vec3::ZERO && self.rpy == Vec3::ZERO
    }
}

/// Roll-pitch-yaw (radians) to a rotation.
///
/// Applied as successive rotations about Z, then Y, then X, which is the
/// extrinsic X-Y-Z convention of URDF written in composition order.
pub fn rpy_to_quat(rpy: Vec3) -> Quat {
    Quat::from_rotation_z(rpy.z) * Quat::from_rotation_y(rpy.y) * Quat::from_rotation_x(rpy.x)
}

/// Roll-pitch-yaw given in degrees
pub fn rpy_degrees_to_quat(rpy_deg: [f32; 3]) -> Quat {
    rpy_to_quat(Vec3::from_array(rpy_deg.map(f32::to_radians)))
}

/// Rotation of `degrees` about `axis`, or `None` when the axis is negligible
pub fn axis_rotation(axis: Vec3, degrees: f32) -> Option<Quat> {
    if axis.length() > AXIS_EPSILON {
        Some(Quat::from_axis_angle(axis.normalize(), degrees.to_radians()))
    } else {
        None
    }
}

/// Local transform of a joint: origin pose followed by the animated axis rotation
pub fn joint_transform(origin: &Pose, axis: Vec3, angle_deg: f32) -> Mat4 {
    let base = origin.to_mat4();
    match axis_rotation(axis, angle_deg) {
        Some(rotation) => base * Mat4::from_quat(rotation),
        None => base,
    }
}

/// Local transform of a visual: offset pose, mesh orientation correction, then scale
pub fn visual_transform(offset: &Pose, mesh_correction: Quat, scale: Vec3) -> Mat4 {
    offset.to_mat4() * Mat4::from_quat(mesh_correction) * Mat4::from_scale(scale)
}

/// Placement of the whole robot in the renderer's world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasePlacement {
    pub position: Vec3,
    /// Fixed correction from the description's Z-up convention to the renderer's Y-up
    pub correction: Quat,
}

impl BasePlacement {
    pub fn new(position: Vec3, correction: Quat) -> Self {
        Self {
            position,
            correction,
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.correction, self.position)
    }
}

impl Default for BasePlacement {
    fn default() -> Self {
        Self::new(
            Vec3::ZERO,
            rpy_degrees_to_quat(crate::constants::BASE_CORRECTION_DEG),
        )
    }
}

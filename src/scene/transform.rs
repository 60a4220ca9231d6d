//! Rigid-body transform description and its matrix encoding.
//!
//! Rotation uses Euler angles in degrees, composed intrinsically in X, Y, Z
//! order: the encoded rotation is `R = Rx · Ry · Rz` (glam
//! [`EulerRot::XYZ`]). The order cannot be recovered from a matrix, so both
//! ends of the engine boundary must agree on it.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::highlight::same_f32;

/// A point or angle triple.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Xyz {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Xyz {
    /// Construct from components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl PartialEq for Xyz {
    fn eq(&self, other: &Self) -> bool {
        same_f32(self.x, other.x)
            && same_f32(self.y, other.y)
            && same_f32(self.z, other.z)
    }
}

impl From<Xyz> for Vec3 {
    fn from(v: Xyz) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Placement of a whole structure: translation plus Euler rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    /// Translation in scene units.
    pub position: Xyz,
    /// Euler angles in degrees (intrinsic XYZ).
    pub rotation: Xyz,
}

impl RigidTransform {
    /// Construct from a position and rotation in degrees.
    #[must_use]
    pub const fn new(position: Xyz, rotation: Xyz) -> Self {
        Self { position, rotation }
    }

    /// Rotation as a unit quaternion.
    #[must_use]
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        )
    }

    /// Encode as a column-major homogeneous matrix with no scale or shear.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation_quat(), self.position.into())
    }
}

/// Translation component of an encoded transform.
#[must_use]
pub fn translation_of(matrix: &Mat4) -> Vec3 {
    matrix.w_axis.truncate()
}

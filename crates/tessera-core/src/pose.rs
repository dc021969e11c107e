//! Local pose (translation, rotation, scale) of a transform

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position, rotation, and scale relative to a parent (or to the world for roots)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a new pose at the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Create a new pose with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Compute the model matrix for this pose
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X in local space)
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y in local space)
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Translate by the given offset
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Rotate by the given quaternion
    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation = (rotation * self.rotation).normalize();
    }

    /// Turn so that `forward()` points at `target`.
    ///
    /// Leaves the rotation untouched when the target coincides with the
    /// position or lies along `up`.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let Some(back) = (self.position - target).try_normalize() else {
            return;
        };
        let Some(right) = up.cross(back).try_normalize() else {
            return;
        };
        let up = back.cross(right);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, back));
    }

    /// Interpolate between two poses
    pub fn lerp(a: &Pose, b: &Pose, t: f32) -> Pose {
        Pose {
            position: a.position.lerp(b.position, t),
            rotation: a.rotation.slerp(b.rotation, t),
            scale: a.scale.lerp(b.scale, t),
        }
    }

    /// Express `child` (given relative to `parent`) in the space `parent` lives in.
    ///
    /// Scale is combined per axis, which is exact as long as no ancestor
    /// mixes non-uniform scale with rotation.
    pub fn compose(parent: &Pose, child: &Pose) -> Pose {
        Pose {
            position: parent.transform_point(child.position),
            rotation: (parent.rotation * child.rotation).normalize(),
            scale: parent.scale * child.scale,
        }
    }

    /// Map a point from this pose's local space into its parent space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * point)
    }

    /// Map a point from parent space into this pose's local space.
    ///
    /// Returns `None` when any scale axis is zero.
    pub fn inverse_transform_point(&self, point: Vec3) -> Option<Vec3> {
        if self.scale.cmpeq(Vec3::ZERO).any() {
            return None;
        }
        Some((self.rotation.inverse() * (point - self.position)) / self.scale)
    }
}

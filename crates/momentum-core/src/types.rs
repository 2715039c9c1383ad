//! Core types shared by the motor and the movement core

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a character
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
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

    /// Rotation whose forward axis points along `forward` with `up` as the roll reference.
    ///
    /// Degenerate input (zero forward, or forward parallel to up) yields the identity.
    pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
        let back = -forward.normalize_or_zero();
        let right = up.cross(back).normalize_or_zero();
        if back == Vec3::ZERO || right == Vec3::ZERO {
            return Quat::IDENTITY;
        }
        let up = back.cross(right);
        Quat::from_mat3(&Mat3::from_cols(right, up, back))
    }
}

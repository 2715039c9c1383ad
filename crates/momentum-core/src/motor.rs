//! The character motor collaborator
//!
//! The movement core never resolves collisions itself. It reads grounding and
//! orientation from a [`Motor`], asks it for overlap counts and short probe
//! raycasts, and tells it when to change capsule size or leave the ground.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Result of the motor's most recent ground probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundingStatus {
    /// Any ground was found below the character, stable or not
    pub found_any_ground: bool,
    /// The ground found is walkable (within the slope limit)
    pub is_stable_on_ground: bool,
    /// Normal of the ground surface (character up when airborne)
    pub ground_normal: Vec3,
}

impl GroundingStatus {
    /// Status of a character touching nothing
    pub fn airborne() -> Self {
        Self {
            found_any_ground: false,
            is_stable_on_ground: false,
            ground_normal: Vec3::Y,
        }
    }

    /// Status of a character standing on walkable ground
    pub fn stable(ground_normal: Vec3) -> Self {
        Self {
            found_any_ground: true,
            is_stable_on_ground: true,
            ground_normal,
        }
    }

    /// Status of a character touching ground too steep to stand on
    pub fn unstable(ground_normal: Vec3) -> Self {
        Self {
            found_any_ground: true,
            is_stable_on_ground: false,
            ground_normal,
        }
    }
}

impl Default for GroundingStatus {
    fn default() -> Self {
        Self::airborne()
    }
}

/// Capsule shape of the character collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapsuleDimensions {
    /// Capsule radius
    pub radius: f32,
    /// Total capsule height including the hemispheres
    pub height: f32,
    /// Vertical offset of the capsule center above the character origin
    pub y_offset: f32,
}

impl Default for CapsuleDimensions {
    fn default() -> Self {
        Self {
            radius: 0.5,
            height: 2.0,
            y_offset: 1.0,
        }
    }
}

/// Which set of surfaces a probe ray should consider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeLayer {
    /// Surfaces the character can stand on
    Ground,
    /// Surfaces the character can wall-run and wall-jump from
    Wall,
}

/// A probe ray hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the ray to the hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Surface normal at the hit point
    pub normal: Vec3,
}

/// Character motor consumed by the movement core.
///
/// Implementations own the collider and perform the actual move. All methods
/// are queries or deferred requests; none of them move the character.
pub trait Motor {
    /// Grounding found by the latest move
    fn grounding_status(&self) -> GroundingStatus;

    /// Grounding found by the move before the latest one
    fn last_grounding_status(&self) -> GroundingStatus;

    /// Character up axis
    fn character_up(&self) -> Vec3;

    /// Character forward axis
    fn character_forward(&self) -> Vec3;

    /// Character right axis
    fn character_right(&self) -> Vec3;

    /// Character origin (feet)
    fn position(&self) -> Vec3;

    /// Character orientation
    fn rotation(&self) -> Quat;

    /// Resize the character collider
    fn set_capsule_dimensions(&mut self, dimensions: CapsuleDimensions);

    /// Number of colliders the current capsule would overlap at the given pose
    fn overlap_count(&self, position: Vec3, rotation: Quat) -> usize;

    /// Skip ground snapping on the next move so the character can leave the ground
    fn force_unground(&mut self);

    /// Cast a probe ray against one surface layer
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layer: ProbeLayer,
    ) -> Option<RayHit>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grounding_constructors() {
        let air = GroundingStatus::airborne();
        assert!(!air.found_any_ground);
        assert!(!air.is_stable_on_ground);

        let slope = GroundingStatus::unstable(Vec3::new(0.0, 0.5, 0.5).normalize());
        assert!(slope.found_any_ground);
        assert!(!slope.is_stable_on_ground);
    }

    #[test]
    fn test_capsule_default() {
        let capsule = CapsuleDimensions::default();
        assert_eq!(capsule.height, 2.0);
        assert_eq!(capsule.y_offset, 1.0);
    }
}

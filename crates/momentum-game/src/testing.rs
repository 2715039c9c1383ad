//! Scripted motor and stamina used by the unit tests

use glam::{Quat, Vec3};

use momentum_core::{CapsuleDimensions, GroundingStatus, Motor, ProbeLayer, RayHit};

use crate::stamina::StaminaSource;

/// A motor whose grounding, walls and ceiling are set directly by the test
#[derive(Debug, Clone)]
pub struct TestMotor {
    pub grounding: GroundingStatus,
    pub last_grounding: GroundingStatus,
    pub position: Vec3,
    pub rotation: Quat,
    pub capsule: CapsuleDimensions,
    /// Walls as (direction from the character, distance)
    pub walls: Vec<(Vec3, f32)>,
    /// Distance to the ground straight below
    pub ground_below: Option<f32>,
    /// Overlaps reported whenever the capsule is taller than this height
    pub ceiling: Option<f32>,
    pub unground_requests: u32,
    pub capsule_updates: u32,
}

impl TestMotor {
    pub fn grounded() -> Self {
        Self {
            grounding: GroundingStatus::stable(Vec3::Y),
            last_grounding: GroundingStatus::stable(Vec3::Y),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            capsule: CapsuleDimensions::default(),
            walls: Vec::new(),
            ground_below: Some(0.0),
            ceiling: None,
            unground_requests: 0,
            capsule_updates: 0,
        }
    }

    pub fn airborne() -> Self {
        Self {
            grounding: GroundingStatus::airborne(),
            last_grounding: GroundingStatus::airborne(),
            ground_below: None,
            ..Self::grounded()
        }
    }

    pub fn add_wall(&mut self, direction: Vec3, distance: f32) {
        self.walls.push((direction.normalize(), distance));
    }

    /// Move to a new grounding, remembering the previous one
    pub fn set_grounding(&mut self, grounding: GroundingStatus) {
        self.last_grounding = self.grounding;
        self.grounding = grounding;
    }
}

impl Motor for TestMotor {
    fn grounding_status(&self) -> GroundingStatus {
        self.grounding
    }

    fn last_grounding_status(&self) -> GroundingStatus {
        self.last_grounding
    }

    fn character_up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    fn character_forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    fn character_right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_capsule_dimensions(&mut self, dimensions: CapsuleDimensions) {
        self.capsule = dimensions;
        self.capsule_updates += 1;
    }

    fn overlap_count(&self, _position: Vec3, _rotation: Quat) -> usize {
        match self.ceiling {
            Some(height) if self.capsule.height > height => 1,
            _ => 0,
        }
    }

    fn force_unground(&mut self) {
        self.unground_requests += 1;
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layer: ProbeLayer,
    ) -> Option<RayHit> {
        match layer {
            ProbeLayer::Wall => self
                .walls
                .iter()
                .find(|(dir, distance)| dir.dot(direction) > 0.999 && *distance <= max_distance)
                .map(|&(dir, distance)| RayHit {
                    distance,
                    point: origin + dir * distance,
                    normal: -dir,
                }),
            ProbeLayer::Ground => self
                .ground_below
                .filter(|distance| *distance <= max_distance)
                .map(|distance| RayHit {
                    distance,
                    point: origin + direction * distance,
                    normal: -direction,
                }),
        }
    }
}

/// Stamina with a plain charge count and a log of consumption
#[derive(Debug, Clone, Default)]
pub struct TestStamina {
    pub charges: u32,
    pub consumed: u32,
}

impl TestStamina {
    pub fn with_charges(charges: u32) -> Self {
        Self { charges, consumed: 0 }
    }
}

impl StaminaSource for TestStamina {
    fn can_consume(&self) -> bool {
        self.charges > 0
    }

    fn consume(&mut self) -> bool {
        if self.charges == 0 {
            return false;
        }
        self.charges -= 1;
        self.consumed += 1;
        true
    }
}

//! Crouch capsule control
//!
//! Height and vertical offset glide between the standing and crouched shapes.
//! The movement core sets targets and reads the current values; the motor only
//! ever sees the interpolated dimensions.

use momentum_core::{CapsuleDimensions, Ease, Motor, Tween};

use super::config::MovementConfig;

/// Character capsule with eased crouch transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    standing: CapsuleDimensions,
    crouched: CapsuleDimensions,
    height: Tween,
    y_offset: Tween,
    transition_time: f32,
}

impl Capsule {
    /// A standing capsule built from the movement config
    pub fn new(config: &MovementConfig) -> Self {
        let standing = config.standing_capsule();
        Self {
            standing,
            crouched: config.crouched_capsule(),
            height: Tween::settled(standing.height),
            y_offset: Tween::settled(standing.y_offset),
            transition_time: config.crouch.transition_time,
        }
    }

    /// Start shrinking to the crouched shape
    pub fn crouch(&mut self) {
        self.retarget(self.crouched);
    }

    /// Start growing back to the standing shape
    pub fn stand(&mut self) {
        self.retarget(self.standing);
    }

    fn retarget(&mut self, target: CapsuleDimensions) {
        self.height
            .retarget(target.height, self.transition_time, Ease::InOutSine);
        self.y_offset
            .retarget(target.y_offset, self.transition_time, Ease::InOutSine);
    }

    /// Advance both tweens
    pub fn advance(&mut self, dt: f32) {
        self.height.advance(dt);
        self.y_offset.advance(dt);
    }

    /// Current interpolated dimensions
    pub fn dimensions(&self) -> CapsuleDimensions {
        CapsuleDimensions {
            radius: self.standing.radius,
            height: self.height.value(),
            y_offset: self.y_offset.value(),
        }
    }

    /// Dimensions the capsule is heading to
    pub fn target(&self) -> CapsuleDimensions {
        CapsuleDimensions {
            radius: self.standing.radius,
            height: self.height.target(),
            y_offset: self.y_offset.target(),
        }
    }

    /// Whether the capsule is heading to the crouched shape
    pub fn is_crouched(&self) -> bool {
        self.height.target() < self.standing.height
    }

    /// Push the current dimensions to the motor.
    ///
    /// Offset convergence is never checked, so this runs every tick whether or
    /// not the height has settled.
    pub fn sync(&self, motor: &mut dyn Motor) {
        motor.set_capsule_dimensions(self.dimensions());
    }

    /// Whether a standing capsule would fit at the character's current pose.
    ///
    /// Temporarily gives the motor the standing shape, asks for overlaps, then
    /// restores the current shape.
    pub fn can_uncrouch(&self, motor: &mut dyn Motor) -> bool {
        motor.set_capsule_dimensions(self.standing);
        let overlaps = motor.overlap_count(motor.position(), motor.rotation());
        motor.set_capsule_dimensions(self.dimensions());
        overlaps == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestMotor;

    #[test]
    fn test_crouch_tween_reaches_target() {
        let config = MovementConfig::default();
        let mut capsule = Capsule::new(&config);
        assert!(!capsule.is_crouched());

        capsule.crouch();
        assert!(capsule.is_crouched());
        capsule.advance(config.crouch.transition_time / 2.0);
        let midway = capsule.dimensions().height;
        assert!(midway < 2.0 && midway > 1.0);

        capsule.advance(config.crouch.transition_time);
        assert_eq!(capsule.dimensions(), config.crouched_capsule());
    }

    #[test]
    fn test_can_uncrouch_restores_dimensions() {
        let config = MovementConfig::default();
        let mut capsule = Capsule::new(&config);
        capsule.crouch();
        capsule.advance(1.0);

        let mut motor = TestMotor::grounded();
        motor.ceiling = Some(1.5);
        capsule.sync(&mut motor);

        assert!(!capsule.can_uncrouch(&mut motor));
        assert_eq!(motor.capsule, config.crouched_capsule());

        motor.ceiling = None;
        assert!(capsule.can_uncrouch(&mut motor));
    }

    #[test]
    fn test_stand_mid_crouch_starts_from_current() {
        let config = MovementConfig::default();
        let mut capsule = Capsule::new(&config);
        capsule.crouch();
        capsule.advance(config.crouch.transition_time / 2.0);
        let before = capsule.dimensions().height;

        capsule.stand();
        assert_eq!(capsule.dimensions().height, before);
        capsule.advance(1.0);
        assert_eq!(capsule.dimensions(), config.standing_capsule());
    }
}

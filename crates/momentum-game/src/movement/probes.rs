//! Wall and ground probes, refreshed once per tick

use glam::Vec3;

use momentum_core::math::project;
use momentum_core::{Motor, ProbeLayer, RayHit};

use super::config::ProbeConfig;

/// Results of the four horizontal wall rays
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WallProbe {
    pub right: Option<RayHit>,
    pub left: Option<RayHit>,
    pub front: Option<RayHit>,
    pub back: Option<RayHit>,
}

impl WallProbe {
    /// Cast the four rays from the character origin along its right and forward axes
    pub fn cast(motor: &dyn Motor, config: &ProbeConfig) -> Self {
        let origin = motor.position();
        let right = motor.character_right();
        let forward = motor.character_forward();
        let reach = config.wall_check_distance;
        let ray = |direction: Vec3| motor.cast_ray(origin, direction, reach, ProbeLayer::Wall);

        Self {
            right: ray(right),
            left: ray(-right),
            front: ray(forward),
            back: ray(-forward),
        }
    }

    /// A wall is within reach on either side
    pub fn is_close_to_side_wall(&self) -> bool {
        self.right.is_some() || self.left.is_some()
    }

    /// A wall is within reach in any direction
    pub fn is_close_to_wall(&self) -> bool {
        self.is_close_to_side_wall() || self.front.is_some() || self.back.is_some()
    }

    /// The closest side wall is on the right
    pub fn is_right_side(&self) -> bool {
        self.right.is_some()
    }

    /// Normal of the nearest wall, side walls first. Zero when no wall is in reach.
    pub fn closest_normal(&self) -> Vec3 {
        let hit = if self.is_close_to_side_wall() {
            self.right.or(self.left)
        } else {
            self.front.or(self.back)
        };
        hit.map_or(Vec3::ZERO, |hit| hit.normal)
    }

    /// Direction along the nearest wall, pointing the way the character is travelling
    pub fn closest_forward(&self, horizontal_velocity: Vec3, up: Vec3) -> Vec3 {
        let along = self.closest_normal().cross(up).normalize_or_zero();
        if horizontal_velocity.dot(along) > 0.0 {
            along
        } else {
            -along
        }
    }

    /// Speed along the nearest wall
    pub fn speed_along_wall(&self, velocity: Vec3, horizontal_velocity: Vec3, up: Vec3) -> f32 {
        project(velocity, self.closest_forward(horizontal_velocity, up)).length()
    }
}

/// Distance to the ground straight below the character, `None` past the probe reach
pub fn ground_distance(motor: &dyn Motor, config: &ProbeConfig) -> Option<f32> {
    motor
        .cast_ray(
            motor.position(),
            -motor.character_up(),
            config.ground_check_distance,
            ProbeLayer::Ground,
        )
        .map(|hit| hit.distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestMotor;

    #[test]
    fn test_no_walls() {
        let motor = TestMotor::grounded();
        let probe = WallProbe::cast(&motor, &ProbeConfig::default());
        assert!(!probe.is_close_to_wall());
        assert_eq!(probe.closest_normal(), Vec3::ZERO);
        assert_eq!(probe.closest_forward(Vec3::Z, Vec3::Y), Vec3::ZERO);
    }

    #[test]
    fn test_side_wall_wins_over_front() {
        let mut motor = TestMotor::airborne();
        motor.add_wall(Vec3::NEG_Z, 0.3);
        motor.add_wall(Vec3::X, 0.4);

        let probe = WallProbe::cast(&motor, &ProbeConfig::default());
        assert!(probe.is_close_to_wall());
        assert!(probe.is_right_side());
        assert_eq!(probe.closest_normal(), Vec3::NEG_X);
    }

    #[test]
    fn test_wall_out_of_reach() {
        let mut motor = TestMotor::airborne();
        motor.add_wall(Vec3::X, 2.0);
        let probe = WallProbe::cast(&motor, &ProbeConfig::default());
        assert!(!probe.is_close_to_wall());
    }

    #[test]
    fn test_closest_forward_follows_travel() {
        let mut motor = TestMotor::airborne();
        motor.add_wall(Vec3::X, 0.4);
        let probe = WallProbe::cast(&motor, &ProbeConfig::default());

        let ahead = probe.closest_forward(Vec3::NEG_Z * 5.0, Vec3::Y);
        assert!((ahead - Vec3::NEG_Z).length() < 1e-5);
        let behind = probe.closest_forward(Vec3::Z * 5.0, Vec3::Y);
        assert!((behind - Vec3::Z).length() < 1e-5);

        let speed = probe.speed_along_wall(Vec3::new(1.0, -2.0, -12.0), Vec3::new(1.0, 0.0, -12.0), Vec3::Y);
        assert!((speed - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_ground_distance() {
        let mut motor = TestMotor::airborne();
        let config = ProbeConfig::default();
        assert_eq!(ground_distance(&motor, &config), None);

        motor.ground_below = Some(4.0);
        assert_eq!(ground_distance(&motor, &config), Some(4.0));

        motor.ground_below = Some(20.0);
        assert_eq!(ground_distance(&motor, &config), None);
    }
}

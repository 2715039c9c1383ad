//! Guard evaluation
//!
//! Two priority lists, one for stable ground and one for everything else.
//! They are re-evaluated from the top every tick and the first satisfied
//! guard names the desired state.

use glam::Vec3;

use momentum_core::Motor;

use crate::stamina::StaminaSource;

use super::controller::MovementController;
use super::state::MovementState;

impl MovementController {
    /// The state the guards ask for this tick
    pub(super) fn select_state(&self, motor: &dyn Motor, stamina: &dyn StaminaSource) -> MovementState {
        if motor.grounding_status().is_stable_on_ground {
            self.select_grounded(motor, stamina)
        } else {
            self.select_airborne(motor, stamina)
        }
    }

    fn select_grounded(&self, motor: &dyn Motor, stamina: &dyn StaminaSource) -> MovementState {
        let jump = &self.config.jump;
        let slide = &self.config.slide;
        let dash = &self.config.dash;

        let jump_ready = self.jumps.is_positive()
            && self.jump_request.is_fresh(jump.buffer)
            && self.jump_cooldown.is_ready();

        let slide_threshold = if self.state == MovementState::Sliding {
            slide.speed_exit_threshold
        } else {
            slide.speed_threshold
        };
        let fast_enough = self.horizontal_velocity().length() >= slide_threshold;

        if jump_ready {
            MovementState::GroundJump
        } else if self.crouch_held && (fast_enough || self.is_moving_downhill(motor)) {
            MovementState::Sliding
        } else if self.crouch_held {
            MovementState::Crouching
        } else if stamina.can_consume()
            && self.dash_request.is_fresh(dash.buffer)
            && self.dash_cooldown.is_ready()
        {
            MovementState::GroundDashing
        } else if self.sprint.can_sprint(&self.config.sprint) {
            MovementState::Sprinting
        } else {
            MovementState::Stable
        }
    }

    fn select_airborne(&self, motor: &dyn Motor, stamina: &dyn StaminaSource) -> MovementState {
        let jump = &self.config.jump;
        let grounding = motor.grounding_status();
        let jump_fresh = self.jump_request.is_fresh(jump.buffer);

        let coyote = (jump.allow_jump_while_sliding && grounding.found_any_ground)
            || self.time_since_jump_allowed <= jump.coyote_time;
        let off_ground = if jump.allow_jump_while_sliding {
            !grounding.found_any_ground
        } else {
            !grounding.is_stable_on_ground
        };

        if self.jumps.is_positive() && jump_fresh && coyote {
            MovementState::GroundJump
        } else if jump_fresh
            && self.wall_jump_cooldown.is_ready()
            && self.config.wall_jump.enabled
            && self.walls.is_close_to_wall()
        {
            MovementState::WallJump
        } else if self.jumps.is_positive()
            && jump_fresh
            && self.jump_cooldown.is_ready()
            && off_ground
            && stamina.can_consume()
        {
            MovementState::AirJump
        } else if self.can_wall_run() {
            MovementState::WallRunning
        } else if stamina.can_consume()
            && self.dash_request.is_fresh(self.config.dash.buffer)
            && !self.air_dashes.is_full()
            && self.dash_cooldown.is_ready()
        {
            MovementState::AirDashing
        } else if stamina.can_consume()
            && self.downward_dash_request.is_fresh(self.config.downward_dash.buffer)
            && !self.downward_dashes.is_full()
            && self.dash_cooldown.is_ready()
        {
            MovementState::DownwardsDash
        } else {
            MovementState::InAir
        }
    }

    fn can_wall_run(&self) -> bool {
        let wall_run = &self.config.wall_run;
        if !wall_run.enabled || !self.walls.is_close_to_side_wall() {
            return false;
        }

        let high_enough = self
            .ground_distance
            .map_or(true, |distance| distance >= wall_run.height_threshold);

        let threshold = if self.state == MovementState::WallRunning {
            wall_run.velocity_exit_threshold
        } else {
            wall_run.velocity_threshold
        };
        let speed_along_wall =
            self.walls
                .speed_along_wall(self.velocity, self.horizontal_velocity(), self.up);

        !self.crouch_held
            && self.input_vector != Vec3::ZERO
            && self.is_falling()
            && high_enough
            && speed_along_wall >= threshold
    }
}

#[cfg(test)]
mod tests {
    use momentum_core::GroundingStatus;

    use super::*;
    use crate::movement::probes::WallProbe;
    use crate::testing::{TestMotor, TestStamina};

    #[test]
    fn test_grounded_defaults_to_stable() {
        let controller = MovementController::default();
        let motor = TestMotor::grounded();
        let stamina = TestStamina::with_charges(3);
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::Stable);
    }

    #[test]
    fn test_crouch_below_slide_threshold() {
        let mut controller = MovementController::default();
        controller.crouch_held = true;
        controller.velocity = Vec3::new(0.0, 0.0, -8.0);
        let motor = TestMotor::grounded();
        let stamina = TestStamina::default();
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::Crouching);

        controller.velocity = Vec3::new(0.0, 0.0, -10.0);
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::Sliding);
    }

    #[test]
    fn test_slide_hysteresis_band() {
        let mut controller = MovementController::default();
        controller.crouch_held = true;
        controller.state = MovementState::Sliding;
        let motor = TestMotor::grounded();
        let stamina = TestStamina::default();

        // Between the exit (6) and enter (10) thresholds
        controller.velocity = Vec3::new(0.0, 0.0, -7.0);
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::Sliding);

        controller.velocity = Vec3::new(0.0, 0.0, -5.0);
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::Crouching);
    }

    #[test]
    fn test_downhill_crouch_slides_at_any_speed() {
        let mut controller = MovementController::default();
        controller.crouch_held = true;
        let normal = Vec3::new(0.0, 1.0, 1.0).normalize();
        let mut motor = TestMotor::grounded();
        motor.grounding = GroundingStatus::stable(normal);
        // The normal leans toward +Z, so +Z is downhill
        controller.velocity = Vec3::new(0.0, -1.0, 1.0);
        let stamina = TestStamina::default();
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::Sliding);
    }

    #[test]
    fn test_jump_beats_crouch_on_ground() {
        let mut controller = MovementController::default();
        controller.crouch_held = true;
        controller.jump_request.request();
        let motor = TestMotor::grounded();
        let stamina = TestStamina::default();
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::GroundJump);
    }

    #[test]
    fn test_ground_dash_needs_stamina() {
        let mut controller = MovementController::default();
        controller.dash_request.request();
        let motor = TestMotor::grounded();

        let empty = TestStamina::default();
        assert_eq!(controller.select_state(&motor, &empty), MovementState::Stable);

        let stamina = TestStamina::with_charges(1);
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::GroundDashing);
    }

    #[test]
    fn test_coyote_jump_then_air_jump() {
        let mut controller = MovementController::default();
        controller.jump_request.request();
        let motor = TestMotor::airborne();
        let stamina = TestStamina::with_charges(1);

        controller.time_since_jump_allowed = 0.1;
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::GroundJump);

        controller.time_since_jump_allowed = 0.5;
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::AirJump);
    }

    #[test]
    fn test_wall_jump_before_air_jump() {
        let mut controller = MovementController::default();
        controller.jump_request.request();
        controller.time_since_jump_allowed = 1.0;
        let mut motor = TestMotor::airborne();
        motor.add_wall(Vec3::NEG_Z, 0.3);
        controller.walls = WallProbe::cast(&motor, &controller.config.probes);
        let stamina = TestStamina::with_charges(1);
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::WallJump);
    }

    #[test]
    fn test_wall_run_requirements() {
        let mut controller = MovementController::default();
        controller.time_since_jump_allowed = 1.0;
        controller.input_vector = Vec3::NEG_Z;
        controller.velocity = Vec3::new(0.0, -1.0, -12.0);
        let mut motor = TestMotor::airborne();
        motor.add_wall(Vec3::X, 0.4);
        controller.walls = WallProbe::cast(&motor, &controller.config.probes);
        let stamina = TestStamina::default();
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::WallRunning);

        // Too close to the ground
        controller.ground_distance = Some(1.0);
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::InAir);
        controller.ground_distance = None;

        // Rising
        controller.velocity = Vec3::new(0.0, 3.0, -12.0);
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::InAir);

        // Too slow to start, fast enough to continue
        controller.velocity = Vec3::new(0.0, -1.0, -8.0);
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::InAir);
        controller.state = MovementState::WallRunning;
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::WallRunning);
    }

    #[test]
    fn test_air_dash_limit() {
        let mut controller = MovementController::default();
        controller.time_since_jump_allowed = 1.0;
        controller.dash_request.request();
        let motor = TestMotor::airborne();
        let stamina = TestStamina::with_charges(3);
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::AirDashing);

        controller.air_dashes.set(controller.config.dash.air_dash_limit);
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::InAir);

        controller.downward_dash_request.request();
        assert_eq!(controller.select_state(&motor, &stamina), MovementState::DownwardsDash);
    }
}

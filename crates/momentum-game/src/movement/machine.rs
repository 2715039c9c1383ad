//! State transitions
//!
//! `transition` asks the current state to exit, and only if it agrees runs the
//! new state's entry effects and commits. Entry effects rewrite the integrator
//! coefficients and queue one-shot velocity modifiers.

use glam::Vec3;
use tracing::debug;

use momentum_core::math::project_on_plane;
use momentum_core::Motor;

use crate::stamina::StaminaSource;

use super::controller::MovementController;
use super::events::MovementEvent;
use super::modifiers::VelocityModifier;
use super::state::{Coefficients, MovementState};

/// Whether the current state lets the machine leave it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Allow,
    Refuse,
}

impl MovementController {
    /// Move to `next` if the current state allows it.
    ///
    /// Returns true when the state changed to `next`. Transitioning to the
    /// current state does nothing.
    pub fn transition(
        &mut self,
        next: MovementState,
        motor: &mut dyn Motor,
        stamina: &mut dyn StaminaSource,
    ) -> bool {
        if next == self.state {
            return false;
        }

        let previous = self.state;
        match self.exit(next, motor, stamina) {
            ExitDecision::Refuse => {
                debug!("{:?} refused exit to {:?}", previous, next);
                false
            }
            ExitDecision::Allow => {
                self.enter(next, motor, stamina);
                self.state = next;
                debug!("Movement state {:?} -> {:?}", previous, next);
                true
            }
        }
    }

    fn exit(
        &mut self,
        next: MovementState,
        motor: &mut dyn Motor,
        stamina: &mut dyn StaminaSource,
    ) -> ExitDecision {
        let grounding = motor.grounding_status();

        match self.state {
            MovementState::Crouching => {
                if !self.capsule.can_uncrouch(motor) {
                    return ExitDecision::Refuse;
                }
                self.capsule.stand();
            }
            MovementState::Sliding => {
                // Holds unless a jump was requested within the buffer
                if self.slide_stun.is_active()
                    && grounding.found_any_ground
                    && !self.jump_request.is_fresh(self.config.jump.buffer)
                {
                    return ExitDecision::Refuse;
                }

                // No room to stand: end the slide in a crouch instead
                if !self.capsule.can_uncrouch(motor) {
                    self.enter(MovementState::Crouching, motor, stamina);
                    self.state = MovementState::Crouching;
                    self.events.push(MovementEvent::SlideEnded);
                    debug!("Slide ended under a ceiling, crouching");
                    return ExitDecision::Refuse;
                }

                self.capsule.stand();
                self.events.push(MovementEvent::SlideEnded);
            }
            MovementState::GroundDashing => {
                if self.dash_stun.is_active() {
                    return ExitDecision::Refuse;
                }
                self.finish_dash(0.5);
                self.events.push(MovementEvent::GroundDashEnded);
            }
            MovementState::AirDashing => {
                if self.dash_stun.is_active() && !self.bounce_pad_taken {
                    return ExitDecision::Refuse;
                }
                self.finish_dash(1.0);
                self.events.push(MovementEvent::AirDashEnded);
            }
            MovementState::DownwardsDash => {
                if self.dash_stun.is_active() && next != MovementState::InAir {
                    return ExitDecision::Refuse;
                }
                self.input_suppressed = false;
            }
            MovementState::WallRunning => {
                self.coefficients = Coefficients::stable(&self.config);
                self.drag_enabled = true;
                self.gravity_enabled = true;
                self.tangential_lock = false;
                self.events.push(MovementEvent::WallRunEnded);
            }
            MovementState::Stable
            | MovementState::Sprinting
            | MovementState::InAir
            | MovementState::GroundJump
            | MovementState::AirJump
            | MovementState::WallJump => {}
        }

        ExitDecision::Allow
    }

    /// Take back dash overspeed without reversing, then scale the horizontal velocity.
    ///
    /// `correction_mult` damps the correction; ground dashes halve it to
    /// allow for friction.
    fn finish_dash(&mut self, correction_mult: f32) {
        let dash = &self.config.dash;
        let horizontal = self.horizontal_velocity();
        let speed = horizontal.length();
        let overspeed_floor = dash.force * dash.velocity_to_decrease_mult;
        let end_mult = dash.end_velocity_mult;

        if speed > overspeed_floor {
            let correction = (-overspeed_floor + (self.dash_enter_speed - speed)) * correction_mult;
            // The scale lands first, so clamp against the scaled speed
            let correction = correction.max(-speed * end_mult);
            self.add_horizontal_velocity(horizontal.normalize_or_zero() * correction);
        }

        self.multiply_horizontal_velocity(end_mult);
        self.input_suppressed = false;
        self.vertical_locked = false;
    }

    fn enter(&mut self, next: MovementState, motor: &mut dyn Motor, stamina: &mut dyn StaminaSource) {
        self.coefficients = next.coefficients(&self.config);
        let up = motor.character_up();

        match next {
            MovementState::Stable | MovementState::Sprinting => {
                self.air_rotation_restriction.clear();
            }
            MovementState::Crouching => {
                self.capsule.crouch();
                self.sprint.stop();
                self.air_rotation_restriction.clear();
            }
            MovementState::GroundDashing => self.enter_dash(false, up, stamina),
            MovementState::AirDashing => self.enter_dash(true, up, stamina),
            MovementState::DownwardsDash => self.enter_downward_dash(up, stamina),
            MovementState::Sliding => self.enter_slide(),
            MovementState::WallRunning => self.enter_wall_run(up),
            MovementState::GroundJump => self.enter_ground_jump(motor, up),
            MovementState::AirJump => self.enter_air_jump(motor, up, stamina),
            MovementState::WallJump => self.enter_wall_jump(motor, up),
            MovementState::InAir => {}
        }
    }

    fn enter_dash(&mut self, air: bool, up: Vec3, stamina: &mut dyn StaminaSource) {
        let dash = self.config.dash.clone();

        // No input: dash where the camera looks
        if self.input_vector == Vec3::ZERO {
            self.input_vector = project_on_plane(self.look_vector, up);
        }

        if stamina.consume() {
            if air {
                self.vertical_locked = true;
            }
            self.input_suppressed = true;
            self.dash_stun.start(dash.stun);
            self.add_velocity_in_input_direction(dash.force);
        }

        self.zero_movement();
        self.dash_enter_speed = self.horizontal_velocity().length() + dash.force;
        self.dash_cooldown.start(dash.cooldown);
        self.air_rotation_restriction.clear();

        if air {
            self.air_dashes.increment();
            self.events.push(MovementEvent::AirDashStarted);
        } else {
            self.events.push(MovementEvent::GroundDashStarted);
        }
    }

    fn enter_downward_dash(&mut self, up: Vec3, stamina: &mut dyn StaminaSource) {
        let downward = self.config.downward_dash.clone();

        if stamina.consume() {
            self.input_suppressed = true;
            self.dash_stun.start(downward.stun);
            self.add_vertical_velocity(-downward.force);
            if self.velocity.dot(up) > 0.0 {
                self.pending.push(VelocityModifier::ZeroVertical);
            }
        }

        self.dash_cooldown.start(downward.stun);
        self.downward_dash_request.consume(downward.buffer);
        self.downward_dashes.increment();
        self.air_rotation_restriction.clear();
        self.events.push(MovementEvent::DownwardDashStarted);
    }

    fn enter_slide(&mut self) {
        let slide = &self.config.slide;
        self.slide_stun.start(slide.stun_duration);
        self.capsule.crouch();

        // Sliding right after landing keeps some momentum
        if self.slide_boost_window.is_active() {
            let boost = (self.velocity.length() * slide.conditional_speed_mult).clamp(0.0, slide.force_max);
            self.add_velocity(self.velocity.normalize_or_zero() * boost);
        }

        self.air_rotation_restriction.clear();
        self.events.push(MovementEvent::SlideStarted);
    }

    fn enter_wall_run(&mut self, up: Vec3) {
        let wall_run = &self.config.wall_run;
        let horizontal = self.horizontal_velocity();
        let boost = (wall_run.initial_hor_velocity_mult * horizontal.length())
            .clamp(0.0, wall_run.initial_velocity_max);
        let forward = self.walls.closest_forward(horizontal, up);
        self.add_velocity(forward * boost);

        self.reset_air_jumps();
        self.drag_enabled = false;
        self.gravity_enabled = false;
        self.initial_vertical_drag = true;
        self.tangential_lock = true;
        self.air_rotation_restriction.clear();
        self.events.push(MovementEvent::WallRunStarted {
            right_side: self.walls.is_right_side(),
        });
    }

    fn enter_ground_jump(&mut self, motor: &mut dyn Motor, up: Vec3) {
        let jump = self.config.jump.clone();
        let grounding = motor.grounding_status();

        // Off steep ground, jump away from the slope
        let direction = if grounding.found_any_ground && !grounding.is_stable_on_ground {
            grounding.ground_normal
        } else {
            up
        };

        motor.force_unground();
        self.add_velocity(direction * jump.force);
        self.jump_request.consume(jump.buffer);
        self.jumps.decrement();
        self.jump_cooldown.start(jump.cooldown);
        self.jumped_this_frame = true;
        self.time_since_jump_allowed = jump.coyote_time + 0.1;
        self.events.push(MovementEvent::GroundJumped);
    }

    fn enter_air_jump(&mut self, motor: &mut dyn Motor, up: Vec3, stamina: &mut dyn StaminaSource) {
        let jump = self.config.jump.clone();
        motor.force_unground();

        if stamina.consume() {
            if self.velocity.dot(up) < jump.air_force {
                self.pending.push(VelocityModifier::ZeroVertical);
                self.add_velocity(up * jump.air_force);
            } else {
                self.add_velocity(up * jump.air_force / 2.0);
            }
            self.jumps.decrement();
        }

        self.jump_request.consume(jump.buffer);
        self.jump_cooldown.start(jump.cooldown);
        self.jumped_this_frame = true;
        self.events.push(MovementEvent::AirJumped);
    }

    fn enter_wall_jump(&mut self, motor: &mut dyn Motor, up: Vec3) {
        let wall_jump = self.config.wall_jump.clone();
        let jump = &self.config.jump;
        let (buffer, cooldown) = (jump.buffer, jump.cooldown);
        motor.force_unground();

        let horizontal = self.horizontal_velocity();
        let normal = self.walls.closest_normal().normalize_or_zero();
        let forward = self.walls.closest_forward(horizontal, up);
        let direction = normal * wall_jump.direction_normal + forward * wall_jump.direction_forwards;

        self.change_velocity_direction(direction);
        self.add_velocity(
            direction.normalize_or_zero() * wall_jump.additional_force + up * wall_jump.force_upwards,
        );
        self.reset_air_jumps();

        self.wall_jump_cooldown.start(wall_jump.cooldown);
        self.jump_request.consume(buffer);
        self.jump_cooldown.start(cooldown);
        self.jumped_this_frame = true;
        self.air_rotation_restriction
            .start(wall_jump.restrict_air_rotation_time);
        self.events.push(MovementEvent::WallJumped);
    }
}

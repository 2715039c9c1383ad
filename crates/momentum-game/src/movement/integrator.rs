//! Velocity integration
//!
//! Two branches: stable ground, and air or unstable ground. Both read the
//! active state's coefficients. The sliding branch may rewrite those
//! coefficients mid-tick through its profile.

use glam::Vec3;

use momentum_core::math::{
    clamp_magnitude, exp_smoothing, from_to_rotation, lerp_clamped, project, project_on_plane,
};
use momentum_core::GroundingStatus;

use super::config::{GravityConfig, MovementConfig};
use super::slide;
use super::state::{Coefficients, MovementState};

/// Everything the integrator reads for one tick
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    pub config: &'a MovementConfig,
    pub state: MovementState,
    pub grounding: GroundingStatus,
    pub up: Vec3,
    /// World-space input direction, zero when input is suppressed
    pub input: Vec3,
    /// Wall forward when movement is locked along a wall
    pub tangential_lock: Option<Vec3>,
    pub restrict_air_rotation: bool,
    pub gravity_enabled: bool,
    pub drag_enabled: bool,
    pub moving_downhill: bool,
    pub dt: f32,
}

impl Step<'_> {
    fn inputting(&self) -> bool {
        self.input != Vec3::ZERO
    }
}

/// Integrate one tick on stable ground
pub fn grounded(step: &Step, coefficients: &mut Coefficients, velocity: Vec3) -> Vec3 {
    let config = step.config;
    let normal = step.grounding.ground_normal;

    // Keep the input magnitude but lay it along the ground surface
    let input_right = step.input.cross(step.up);
    let reoriented = normal.cross(input_right).normalize_or_zero() * step.input.length();
    let mut target = reoriented * config.stable.base_movespeed;

    if step.state == MovementState::Sliding {
        let (shaped, profile) = slide::shape(
            config,
            velocity,
            target,
            step.inputting(),
            step.moving_downhill,
            step.dt,
        );
        profile.apply(coefficients, config);
        target = shaped;
    }

    let target = target * coefficients.movement_mult;
    let horizontal_speed = project_on_plane(velocity, step.up).length();
    let sprint_speed = config.sprint.speed_mult * config.stable.base_movespeed;

    if step.inputting() {
        let turned = from_to_rotation(velocity, target) * velocity;
        let t = if horizontal_speed >= sprint_speed {
            coefficients.deceleration * step.dt
        } else {
            exp_smoothing(coefficients.acceleration, step.dt)
        };
        lerp_clamped(turned, target, t)
    } else {
        lerp_clamped(
            velocity,
            target,
            exp_smoothing(coefficients.deceleration_to_stop, step.dt),
        )
    }
}

/// Integrate one tick in the air or on ground too steep to stand on
pub fn airborne(step: &Step, coefficients: &Coefficients, mut velocity: Vec3) -> Vec3 {
    let config = step.config;
    let up = step.up;
    let mut control_rate = config.air.control_rate;
    let mut target = Vec3::ZERO;

    if step.inputting() {
        target = step.input * config.stable.base_movespeed * config.air.base_speed_mult;

        // No climbing steep slopes from the air
        if step.grounding.found_any_ground {
            let obstruction = up
                .cross(step.grounding.ground_normal)
                .cross(up)
                .normalize_or_zero();
            target = project_on_plane(target, obstruction);
        }

        if let Some(wall_forward) = step.tangential_lock {
            target = wall_forward * (config.wall_run.velocity_exit_threshold - 1.0);
        }

        if step.restrict_air_rotation {
            control_rate *= config.wall_jump.air_rotation_mult;
        }
    }

    let mut horizontal = project_on_plane(velocity, up);
    if target.length() < horizontal.length() {
        // Steering only: drop the part of the target that would add speed
        let heading = horizontal.normalize_or_zero();
        let along = target.dot(heading);
        if along > 0.0 {
            target -= heading * along;
        }
        velocity += target * (step.dt * control_rate * 0.75);

        let gravity = coefficients.gravity;
        let planar = project_on_plane(velocity, gravity);
        velocity = lerp_clamped(
            planar,
            planar.normalize_or_zero() * target.length(),
            coefficients.deceleration * step.dt,
        ) + project(velocity, gravity);
    } else {
        horizontal += target * (step.dt * coefficients.acceleration);
        horizontal = clamp_magnitude(horizontal, target.length());
        velocity = horizontal + project(velocity, up);
    }

    if step.gravity_enabled {
        velocity += gravity_contribution(
            &config.gravity,
            config.jump.hang_interval,
            coefficients.gravity,
            velocity.dot(up),
            step.dt,
        );
    }

    if step.drag_enabled {
        velocity *= 1.0 / (1.0 + config.air.drag * step.dt);
    }

    velocity
}

/// Gravity for one tick, heavier while falling and lighter around the apex
pub fn gravity_contribution(
    shaping: &GravityConfig,
    hang_interval: f32,
    gravity: Vec3,
    vertical_speed: f32,
    dt: f32,
) -> Vec3 {
    let base = gravity * dt;
    if vertical_speed < -hang_interval {
        base * shaping.falling_mult
    } else if vertical_speed < hang_interval {
        base * shaping.jump_hang_mult
    } else {
        base
    }
}

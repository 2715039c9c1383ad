//! First-person movement controller
//!
//! Owns the movement state, the velocity and every support timer. The host
//! drives it once per tick:
//!
//! 1. [`MovementController::before_update`] feeds input, runs timers and
//!    probes, and evaluates the state machine
//! 2. [`MovementController::update_velocity`] integrates the velocity
//! 3. [`MovementController::update_rotation`] returns the facing
//! 4. the host moves the character with the motor
//! 5. [`MovementController::after_update`] handles jump refill and landing
//! 6. the host drains [`MovementController::drain_events`]

use glam::{Quat, Vec3};
use tracing::warn;

use momentum_core::math::{angle_degrees, project, project_on_plane};
use momentum_core::{Motor, Transform};

use crate::input::MovementInput;
use crate::stamina::StaminaSource;

use super::capsule::Capsule;
use super::config::MovementConfig;
use super::events::MovementEvent;
use super::integrator::{self, Step};
use super::modifiers::{PendingModifiers, VelocityModifier};
use super::probes::{self, WallProbe};
use super::state::{Coefficients, MovementState};
use super::timers::{Cooldown, Counter, RequestBuffer, SprintTimer, Stun};

/// Ground tilt in degrees below which the ground counts as flat
const SLOPE_ANGLE_EPSILON: f32 = 0.1;

/// Vertical speed below which the character counts as falling
const FALLING_SPEED: f32 = 0.1;

/// Movement state machine and velocity integrator for one character
#[derive(Debug, Clone)]
pub struct MovementController {
    pub(super) config: MovementConfig,
    pub(super) state: MovementState,
    pub(super) coefficients: Coefficients,
    pub(super) velocity: Vec3,
    pub(super) velocity_last_frame: Vec3,
    pub(super) pending: PendingModifiers,
    pub(super) events: Vec<MovementEvent>,

    // Input, refreshed every tick
    pub(super) up: Vec3,
    pub(super) input_vector: Vec3,
    pub(super) look_vector: Vec3,
    pub(super) crouch_held: bool,

    // Request buffers
    pub(super) jump_request: RequestBuffer,
    pub(super) dash_request: RequestBuffer,
    pub(super) downward_dash_request: RequestBuffer,

    // Cooldowns, stuns and windows
    pub(super) jump_cooldown: Cooldown,
    pub(super) wall_jump_cooldown: Cooldown,
    pub(super) dash_cooldown: Cooldown,
    pub(super) dash_stun: Stun,
    pub(super) slide_stun: Stun,
    pub(super) slide_boost_window: Stun,
    pub(super) air_rotation_restriction: Stun,
    pub(super) sprint: SprintTimer,
    /// Seconds since a ground jump was last allowed (coyote clock)
    pub(super) time_since_jump_allowed: f32,
    pub(super) jumped_this_frame: bool,

    // Resources
    pub(super) jumps: Counter,
    pub(super) air_dashes: Counter,
    pub(super) downward_dashes: Counter,
    pub(super) dash_enter_speed: f32,

    // Integrator switches
    pub(super) input_suppressed: bool,
    pub(super) vertical_locked: bool,
    pub(super) gravity_enabled: bool,
    pub(super) drag_enabled: bool,
    pub(super) tangential_lock: bool,
    pub(super) initial_vertical_drag: bool,
    pub(super) unground_requested: bool,
    pub(super) bounce_pad_taken: bool,

    // Probes
    pub(super) walls: WallProbe,
    pub(super) ground_distance: Option<f32>,

    pub(super) capsule: Capsule,
}

impl Default for MovementController {
    fn default() -> Self {
        Self::new(MovementConfig::default())
    }
}

impl MovementController {
    /// Create a controller in the `Stable` state
    pub fn new(config: MovementConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!("Invalid movement config: {}", e);
        }

        Self {
            state: MovementState::Stable,
            coefficients: Coefficients::stable(&config),
            velocity: Vec3::ZERO,
            velocity_last_frame: Vec3::ZERO,
            pending: PendingModifiers::default(),
            events: Vec::new(),
            up: Vec3::Y,
            input_vector: Vec3::ZERO,
            look_vector: Vec3::NEG_Z,
            crouch_held: false,
            jump_request: RequestBuffer::idle(),
            dash_request: RequestBuffer::idle(),
            downward_dash_request: RequestBuffer::idle(),
            jump_cooldown: Cooldown::default(),
            wall_jump_cooldown: Cooldown::default(),
            dash_cooldown: Cooldown::default(),
            dash_stun: Stun::default(),
            slide_stun: Stun::default(),
            slide_boost_window: Stun::default(),
            air_rotation_restriction: Stun::default(),
            sprint: SprintTimer::default(),
            time_since_jump_allowed: 0.0,
            jumped_this_frame: false,
            jumps: Counter::full(config.jump.max_jumps),
            air_dashes: Counter::empty(config.dash.air_dash_limit),
            downward_dashes: Counter::empty(config.downward_dash.limit),
            dash_enter_speed: 0.0,
            input_suppressed: false,
            vertical_locked: false,
            gravity_enabled: true,
            drag_enabled: true,
            tangential_lock: false,
            initial_vertical_drag: false,
            unground_requested: false,
            bounce_pad_taken: false,
            walls: WallProbe::default(),
            ground_distance: None,
            capsule: Capsule::new(&config),
            config,
        }
    }

    // ---- Tick protocol ----

    /// Feed input, update timers and probes, and run the state machine
    pub fn before_update(
        &mut self,
        motor: &mut dyn Motor,
        stamina: &mut dyn StaminaSource,
        input: &MovementInput,
        dt: f32,
    ) {
        self.feed_input(motor, input);
        self.update_timers(motor, dt);

        self.capsule.advance(dt);
        self.capsule.sync(motor);

        self.walls = WallProbe::cast(motor, &self.config.probes);
        self.ground_distance = probes::ground_distance(motor, &self.config.probes);

        let next = self.select_state(motor, stamina);
        self.transition(next, motor, stamina);

        if self.unground_requested {
            motor.force_unground();
            self.unground_requested = false;
        }

        self.bounce_pad_taken = false;
        self.velocity_last_frame = self.velocity;
    }

    /// Integrate the velocity for this tick and apply pending modifiers
    pub fn update_velocity(&mut self, motor: &dyn Motor, dt: f32) -> Vec3 {
        let up = motor.character_up();
        let grounding = motor.grounding_status();
        let frame_start_speed = self.velocity.length();
        let mut velocity = self.velocity;

        if self.input_suppressed {
            self.input_vector = Vec3::ZERO;
        }

        // Wall run entry damps the vertical speed once
        if self.initial_vertical_drag {
            let vertical = project(velocity, up);
            velocity += vertical * (self.config.wall_run.initial_vert_velocity_mult - 1.0);
            self.initial_vertical_drag = false;
        }

        let horizontal = project_on_plane(self.velocity, up);
        let tangential_lock = self
            .tangential_lock
            .then(|| self.walls.closest_forward(horizontal, up));
        let moving_downhill = self.is_moving_downhill(motor);

        let step = Step {
            config: &self.config,
            state: self.state,
            grounding,
            up,
            input: self.input_vector,
            tangential_lock,
            restrict_air_rotation: self.air_rotation_restriction.is_active(),
            gravity_enabled: self.gravity_enabled,
            drag_enabled: self.drag_enabled,
            moving_downhill,
            dt,
        };

        velocity = if grounding.is_stable_on_ground {
            integrator::grounded(&step, &mut self.coefficients, velocity)
        } else {
            integrator::airborne(&step, &self.coefficients, velocity)
        };

        self.sprint.update(
            &self.config.sprint,
            grounding.is_stable_on_ground && self.state != MovementState::Sliding,
            project_on_plane(velocity, up).length(),
            dt,
        );

        if self.vertical_locked {
            velocity = project_on_plane(velocity, up);
        }

        velocity = self.pending.apply(velocity, up, frame_start_speed);
        self.velocity = velocity;
        velocity
    }

    /// Face the camera's heading on the character plane
    pub fn update_rotation(&self, motor: &dyn Motor) -> Quat {
        if self.look_vector == Vec3::ZERO {
            return motor.rotation();
        }
        Transform::look_rotation(self.look_vector, motor.character_up())
    }

    /// Jump refill, coyote clock and landing, after the motor has moved
    pub fn after_update(&mut self, motor: &dyn Motor, dt: f32) {
        let grounding = motor.grounding_status();
        let may_refill = if self.config.jump.allow_jump_while_sliding {
            grounding.found_any_ground
        } else {
            grounding.is_stable_on_ground
        };

        if may_refill {
            if !self.jumped_this_frame {
                self.jumps.refill();
                self.time_since_jump_allowed = 0.0;
            }
        } else {
            self.time_since_jump_allowed += dt;
        }

        if grounding.is_stable_on_ground && !motor.last_grounding_status().is_stable_on_ground {
            // Hand back part of the horizontal speed lost on impact
            let up = motor.character_up();
            let lost = project_on_plane(self.velocity_last_frame, up) - project_on_plane(self.velocity, up);
            self.add_velocity(lost * self.config.jump.landing_slow_down_mult);
            self.events.push(MovementEvent::Landed);
        }
    }

    /// Take the notifications raised since the last drain
    pub fn drain_events(&mut self) -> Vec<MovementEvent> {
        std::mem::take(&mut self.events)
    }

    fn feed_input(&mut self, motor: &dyn Motor, input: &MovementInput) {
        let up = motor.character_up();
        self.up = up;

        let camera = input.camera_rotation;
        let mut planar = project_on_plane(camera * Vec3::NEG_Z, up).normalize_or_zero();
        if planar == Vec3::ZERO {
            // Looking straight up or down: use the camera's up as heading
            planar = project_on_plane(camera * Vec3::Y, up).normalize_or_zero();
        }

        let planar_rotation = Transform::look_rotation(planar, up);
        let raw = Vec3::new(input.movement.x, 0.0, -input.movement.y);
        self.input_vector = (planar_rotation * raw).normalize_or_zero();
        self.look_vector = planar;

        if input.jump_pressed {
            self.jump_request.request();
        }
        if input.dash_pressed {
            self.dash_request.request();
        }
        if input.downward_dash_pressed {
            self.downward_dash_request.request();
        }
        if input.crouch_pressed {
            self.crouch_held = true;
        }
        if input.crouch_released {
            self.crouch_held = false;
        }
    }

    fn update_timers(&mut self, motor: &dyn Motor, dt: f32) {
        let grounding = motor.grounding_status();

        // Slide
        if !grounding.found_any_ground {
            self.slide_boost_window.start(self.config.slide.speed_mult_buffer);
        }
        self.slide_boost_window.tick(dt);
        self.slide_stun.tick(dt);

        // Dash
        self.dash_stun.tick(dt);
        self.dash_request.tick(dt);
        self.downward_dash_request.tick(dt);
        self.dash_cooldown.tick(dt);
        if grounding.is_stable_on_ground {
            let air = self.air_dashes.reset();
            let downward = self.downward_dashes.reset();
            if air || downward {
                self.events.push(MovementEvent::DashesRefreshed);
            }
        }

        // Jump
        self.jump_request.tick(dt);
        self.jumped_this_frame = false;
        self.jump_cooldown.tick(dt);
        self.wall_jump_cooldown.tick(dt);

        self.air_rotation_restriction.tick(dt);
    }

    // ---- Derived queries ----

    /// Velocity with the vertical component removed
    pub fn horizontal_velocity(&self) -> Vec3 {
        project_on_plane(self.velocity, self.up)
    }

    /// Vertical speed is below the falling threshold
    pub fn is_falling(&self) -> bool {
        self.velocity.dot(self.up) < FALLING_SPEED
    }

    /// Touching tilted ground and moving down it
    pub fn is_moving_downhill(&self, motor: &dyn Motor) -> bool {
        let grounding = motor.grounding_status();
        let up = motor.character_up();
        grounding.found_any_ground
            && angle_degrees(up, grounding.ground_normal) > SLOPE_ANGLE_EPSILON
            && project_on_plane(self.velocity, grounding.ground_normal).dot(up) < -0.01
    }

    // ---- Accessors ----

    pub fn state(&self) -> MovementState {
        self.state
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Overwrite the velocity, e.g. after the motor clipped it against geometry
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    pub fn velocity_last_frame(&self) -> Vec3 {
        self.velocity_last_frame
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn pending_modifiers(&self) -> &PendingModifiers {
        &self.pending
    }

    /// Remaining jumps
    pub fn jumps(&self) -> u32 {
        self.jumps.value()
    }

    /// Air dashes used since last touching stable ground
    pub fn air_dashes(&self) -> u32 {
        self.air_dashes.value()
    }

    /// Downward dashes used since last touching stable ground
    pub fn downward_dashes(&self) -> u32 {
        self.downward_dashes.value()
    }

    pub fn capsule(&self) -> &Capsule {
        &self.capsule
    }

    pub fn ground_distance(&self) -> Option<f32> {
        self.ground_distance
    }

    /// Remaining dash stun in seconds
    pub fn dash_stun(&self) -> f32 {
        self.dash_stun.remaining()
    }

    /// Remaining slide stun in seconds
    pub fn slide_stun(&self) -> f32 {
        self.slide_stun.remaining()
    }

    pub fn is_input_suppressed(&self) -> bool {
        self.input_suppressed
    }

    pub fn is_gravity_enabled(&self) -> bool {
        self.gravity_enabled
    }

    /// Input direction in world space for the current tick
    pub fn input_vector(&self) -> Vec3 {
        self.input_vector
    }

    // ---- Mutators for other gameplay systems ----

    /// Add a velocity on the next integration
    pub fn add_velocity(&mut self, velocity: Vec3) {
        self.pending.push(VelocityModifier::Additive(velocity));
    }

    /// Multiply the horizontal velocity on the next integration
    pub fn multiply_horizontal_velocity(&mut self, factor: f32) {
        self.pending.push(VelocityModifier::Scale(factor));
    }

    /// Add only the horizontal part of a velocity
    pub fn add_horizontal_velocity(&mut self, velocity: Vec3) {
        self.add_velocity(project_on_plane(velocity, self.up));
    }

    /// Add speed along the current input direction
    pub fn add_velocity_in_input_direction(&mut self, force: f32) {
        self.add_velocity(self.input_vector.normalize_or_zero() * force);
    }

    /// Add vertical speed and leave the ground
    pub fn add_vertical_velocity(&mut self, force: f32) {
        self.unground_requested = true;
        self.add_velocity(self.up.normalize_or_zero() * force);
    }

    /// Replace the vertical speed and leave the ground
    pub fn zero_and_add_vertical_velocity(&mut self, force: f32) {
        self.unground_requested = true;
        self.pending.push(VelocityModifier::ZeroVertical);
        self.add_velocity(self.up.normalize_or_zero() * force);
    }

    /// Keep the speed but travel along `direction`
    pub fn change_velocity_direction(&mut self, direction: Vec3) {
        self.pending.push(VelocityModifier::Redirect(direction));
    }

    pub fn enable_gravity(&mut self) {
        self.gravity_enabled = true;
    }

    pub fn disable_gravity(&mut self) {
        self.gravity_enabled = false;
    }

    /// Stop all movement on the next integration
    pub fn zero_movement(&mut self) {
        self.pending.push(VelocityModifier::ZeroAll);
    }

    /// Cancel a pending [`Self::zero_movement`]
    pub fn enable_movement(&mut self) {
        self.pending.cancel_zero_all();
    }

    /// Refill every jump
    pub fn reset_jumps(&mut self) {
        self.jumps.refill();
        self.events.push(MovementEvent::AirJumpsRefreshed);
    }

    /// Give back every air dash
    pub fn reset_dashes(&mut self) {
        self.air_dashes.reset();
        self.events.push(MovementEvent::DashesRefreshed);
    }

    /// Let an air dash end early on the next transition
    pub fn take_bounce_pad(&mut self) {
        self.bounce_pad_taken = true;
    }

    /// Refill jumps except the ground jump
    pub(super) fn reset_air_jumps(&mut self) {
        self.jumps.set(self.config.jump.max_jumps.saturating_sub(1));
        self.events.push(MovementEvent::AirJumpsRefreshed);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use momentum_core::GroundingStatus;

    use super::*;
    use crate::testing::{TestMotor, TestStamina};

    const DT: f32 = 1.0 / 60.0;

    fn tick(
        controller: &mut MovementController,
        motor: &mut TestMotor,
        stamina: &mut TestStamina,
        input: &MovementInput,
    ) -> Vec3 {
        controller.before_update(motor, stamina, input, DT);
        let velocity = controller.update_velocity(motor, DT);
        controller.after_update(motor, DT);
        velocity
    }

    #[test]
    fn test_input_follows_camera_heading() {
        let mut controller = MovementController::default();
        let mut motor = TestMotor::grounded();
        let mut stamina = TestStamina::default();
        let input = MovementInput {
            camera_rotation: Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2),
            ..MovementInput::moving(Vec2::new(0.0, 1.0))
        };

        controller.before_update(&mut motor, &mut stamina, &input, DT);
        assert!((controller.input_vector() - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_ground_dash_round_trip() {
        let mut controller = MovementController::default();
        let mut motor = TestMotor::grounded();
        let mut stamina = TestStamina::with_charges(1);
        let dash = MovementInput {
            dash_pressed: true,
            ..MovementInput::moving(Vec2::new(0.0, 1.0))
        };

        let velocity = tick(&mut controller, &mut motor, &mut stamina, &dash);
        assert_eq!(controller.state(), MovementState::GroundDashing);
        assert!((velocity - Vec3::new(0.0, 0.0, -30.0)).length() < 1e-3);
        assert!(controller.dash_stun() > 0.0);
        assert_eq!(stamina.charges, 0);

        // Held in the dash while stunned
        let idle = MovementInput::default();
        tick(&mut controller, &mut motor, &mut stamina, &idle);
        assert_eq!(controller.state(), MovementState::GroundDashing);

        let mut exited = false;
        for _ in 0..30 {
            controller.before_update(&mut motor, &mut stamina, &idle, DT);
            if controller.state() != MovementState::GroundDashing {
                exited = true;
                break;
            }
            controller.update_velocity(&motor, DT);
            controller.after_update(&motor, DT);
        }
        assert!(exited);
        assert_eq!(controller.pending_modifiers().scale(), 0.65);
        assert!(!controller.is_input_suppressed());

        let velocity = controller.update_velocity(&motor, DT);
        assert!(velocity.length() < 20.0);
        assert!(controller.drain_events().contains(&MovementEvent::GroundDashEnded));
    }

    #[test]
    fn test_air_jump_after_coyote_time() {
        let mut controller = MovementController::default();
        let mut motor = TestMotor::airborne();
        let mut stamina = TestStamina::with_charges(1);
        let idle = MovementInput::default();

        for _ in 0..12 {
            tick(&mut controller, &mut motor, &mut stamina, &idle);
        }
        assert!(controller.velocity().y < 0.0);

        let jump = MovementInput {
            jump_pressed: true,
            ..MovementInput::default()
        };
        let velocity = tick(&mut controller, &mut motor, &mut stamina, &jump);

        assert_eq!(controller.state(), MovementState::AirJump);
        assert_eq!(controller.jumps(), 1);
        assert_eq!(stamina.charges, 0);
        assert!((velocity.y - controller.config().jump.air_force).abs() < 1e-3);
        assert!(controller.drain_events().contains(&MovementEvent::AirJumped));
    }

    #[test]
    fn test_coyote_jump_just_after_leaving_ground() {
        let mut controller = MovementController::default();
        let mut motor = TestMotor::airborne();
        let mut stamina = TestStamina::default();
        let jump = MovementInput {
            jump_pressed: true,
            ..MovementInput::default()
        };

        tick(&mut controller, &mut motor, &mut stamina, &jump);
        assert_eq!(controller.state(), MovementState::GroundJump);
        assert_eq!(motor.unground_requests, 1);
    }

    #[test]
    fn test_landing_returns_lost_speed() {
        let mut controller = MovementController::default();
        let mut motor = TestMotor::airborne();
        let mut stamina = TestStamina::default();
        controller.set_velocity(Vec3::new(0.0, -5.0, -10.0));

        controller.before_update(&mut motor, &mut stamina, &MovementInput::default(), DT);
        controller.drain_events();

        // The motor clipped the horizontal speed on impact
        controller.set_velocity(Vec3::new(0.0, 0.0, -6.0));
        motor.set_grounding(GroundingStatus::stable(Vec3::Y));
        controller.after_update(&motor, DT);

        let expected = Vec3::new(0.0, 0.0, -4.0) * controller.config().jump.landing_slow_down_mult;
        assert!((controller.pending_modifiers().additive() - expected).length() < 1e-4);
        assert_eq!(controller.drain_events(), vec![MovementEvent::Landed]);
        assert_eq!(controller.jumps(), controller.config().jump.max_jumps);
    }

    #[test]
    fn test_dashes_refreshed_only_on_change() {
        let mut controller = MovementController::default();
        let mut motor = TestMotor::grounded();
        let mut stamina = TestStamina::default();
        let idle = MovementInput::default();

        tick(&mut controller, &mut motor, &mut stamina, &idle);
        assert!(!controller.drain_events().contains(&MovementEvent::DashesRefreshed));

        controller.air_dashes.set(1);
        tick(&mut controller, &mut motor, &mut stamina, &idle);
        assert_eq!(controller.drain_events(), vec![MovementEvent::DashesRefreshed]);
        assert_eq!(controller.air_dashes(), 0);
    }

    #[test]
    fn test_zero_additive_changes_nothing() {
        let mut motor = TestMotor::grounded();
        let mut stamina = TestStamina::default();
        let input = MovementInput::moving(Vec2::new(1.0, 0.0));

        let mut plain = MovementController::default();
        plain.set_velocity(Vec3::new(0.0, 0.0, -5.0));
        let mut nudged = plain.clone();
        nudged.add_velocity(Vec3::ZERO);

        let a = tick(&mut plain, &mut motor.clone(), &mut stamina.clone(), &input);
        let b = tick(&mut nudged, &mut motor, &mut stamina, &input);
        assert!((a - b).length() < 1e-6);
    }

    #[test]
    fn test_jump_does_not_refill_same_tick() {
        let mut controller = MovementController::default();
        let mut motor = TestMotor::grounded();
        let mut stamina = TestStamina::default();
        let jump = MovementInput {
            jump_pressed: true,
            ..MovementInput::default()
        };

        tick(&mut controller, &mut motor, &mut stamina, &jump);
        assert_eq!(controller.state(), MovementState::GroundJump);
        // Still touching ground this tick, but the spent jump stays spent
        assert_eq!(controller.jumps(), 1);
    }
}

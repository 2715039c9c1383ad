//! Movement configuration and tuning constants
//!
//! Defaults are the shipped tuning. Every section is `#[serde(default)]`
//! so a settings file only needs to list the values it changes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use momentum_core::CapsuleDimensions;

/// Movement configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub stable: StableConfig,
    pub sprint: SprintConfig,
    pub slide: SlideConfig,
    pub air: AirConfig,
    pub dash: DashConfig,
    pub downward_dash: DownwardDashConfig,
    pub jump: JumpConfig,
    pub wall_run: WallRunConfig,
    pub wall_jump: WallJumpConfig,
    pub crouch: CrouchConfig,
    pub gravity: GravityConfig,
    pub capsule: CapsuleDimensions,
    pub probes: ProbeConfig,
}

/// Stable ground movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StableConfig {
    /// Base movement speed in meters per second
    pub base_movespeed: f32,
    /// How fast the character accelerates on stable ground
    pub acceleration: f32,
    /// How fast the character slows to target speed while inputting
    pub deceleration: f32,
    /// How fast the character stops when not inputting
    pub deceleration_to_stop: f32,
}

impl Default for StableConfig {
    fn default() -> Self {
        Self {
            base_movespeed: 8.0,
            acceleration: 15.0,
            deceleration: 1.2,
            deceleration_to_stop: 15.0,
        }
    }
}

/// Sprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SprintConfig {
    /// Sprint speed relative to base movespeed; also the threshold above which
    /// grounded steering switches to the slow turn blend
    pub speed_mult: f32,
    /// Acceleration while sprinting
    pub acceleration: f32,
    /// Time above the running threshold before sprinting is allowed
    pub time_til_sprint: f32,
    /// Time sprint stays available after dropping below the running threshold
    pub expire_time: f32,
    /// Horizontal speed that counts as running
    pub running_threshold: f32,
}

impl Default for SprintConfig {
    fn default() -> Self {
        Self {
            speed_mult: 1.0,
            acceleration: 3.0,
            time_til_sprint: 0.01,
            expire_time: 0.1,
            running_threshold: 5.0,
        }
    }
}

/// Sliding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    /// Fraction of current speed added when a slide starts right after landing
    pub conditional_speed_mult: f32,
    /// Upper limit of the landing slide boost
    pub force_max: f32,
    /// How long after touching ground the landing boost is still granted
    pub speed_mult_buffer: f32,
    /// Speed multiplier while sliding downhill
    pub slope_speed_mult: f32,
    /// How long a slide refuses to end after starting
    pub stun_duration: f32,
    /// Horizontal speed needed to start a slide
    pub speed_threshold: f32,
    /// Horizontal speed below which an ongoing slide ends
    pub speed_exit_threshold: f32,
    /// How much the slide direction can be steered
    pub rotation_smoothing: f32,
    /// Smoothing of the slide slowdown on flat or uphill ground
    pub drag_smoothing: f32,
    /// Smoothing of the speed build-up downhill
    pub build_up_smoothing: f32,
    /// Speed multiplier while sliding on flat or uphill ground
    pub slow_down: f32,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            conditional_speed_mult: 0.05,
            force_max: 2.0,
            speed_mult_buffer: 0.1,
            slope_speed_mult: 4.0,
            stun_duration: 0.6,
            speed_threshold: 10.0,
            speed_exit_threshold: 6.0,
            rotation_smoothing: 2.0,
            drag_smoothing: 3.0,
            build_up_smoothing: 1.0,
            slow_down: 0.85,
        }
    }
}

/// Airborne movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AirConfig {
    /// Air speed relative to base movespeed
    pub base_speed_mult: f32,
    /// Acceleration toward air speed
    pub acceleration: f32,
    /// Deceleration toward air speed
    pub deceleration: f32,
    /// How easily direction changes in the air
    pub control_rate: f32,
    /// Air drag
    pub drag: f32,
}

impl Default for AirConfig {
    fn default() -> Self {
        Self {
            base_speed_mult: 1.0,
            acceleration: 7.0,
            deceleration: 0.5,
            control_rate: 5.0,
            drag: 0.01,
        }
    }
}

/// Ground and air dashes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// Velocity added at the start of a dash
    pub force: f32,
    /// Fraction of the dash force removed when the dash ends
    pub velocity_to_decrease_mult: f32,
    /// Horizontal velocity multiplier applied when the dash ends
    pub end_velocity_mult: f32,
    /// How long the dash direction is locked
    pub stun: f32,
    /// Time between dashes
    pub cooldown: f32,
    /// Input buffer for the dash request
    pub buffer: f32,
    /// Air dashes allowed before landing
    pub air_dash_limit: u32,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            force: 30.0,
            velocity_to_decrease_mult: 0.45,
            end_velocity_mult: 0.65,
            stun: 0.2,
            cooldown: 0.5,
            buffer: 0.2,
            air_dash_limit: 2,
        }
    }
}

/// Downward dash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownwardDashConfig {
    /// Downward velocity added by the dash
    pub force: f32,
    /// How long the dash is locked in
    pub stun: f32,
    /// Input buffer for the downward dash request
    pub buffer: f32,
    /// Downward dashes allowed before landing
    pub limit: u32,
}

impl Default for DownwardDashConfig {
    fn default() -> Self {
        Self {
            force: 25.0,
            stun: 0.8,
            buffer: 0.5,
            limit: 4,
        }
    }
}

/// Jumping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Allow ground jumps while touching unstable ground
    pub allow_jump_while_sliding: bool,
    /// Ground jump velocity
    pub force: f32,
    /// Fraction of lost horizontal speed given back on landing
    pub landing_slow_down_mult: f32,
    /// Air jump velocity
    pub air_force: f32,
    /// Input buffer for the jump request
    pub buffer: f32,
    /// Time before another jump is allowed
    pub cooldown: f32,
    /// Grace period after leaving ground where a ground jump is still allowed
    pub coyote_time: f32,
    /// Vertical speed band around the apex where hang gravity applies
    pub hang_interval: f32,
    /// Total jumps (ground plus air)
    pub max_jumps: u32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            allow_jump_while_sliding: true,
            force: 10.0,
            landing_slow_down_mult: 0.85,
            air_force: 14.0,
            buffer: 0.3,
            cooldown: 0.05,
            coyote_time: 0.15,
            hang_interval: 0.3,
            max_jumps: 2,
        }
    }
}

/// Wall running
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallRunConfig {
    /// Enable wall running
    pub enabled: bool,
    /// Fraction of horizontal speed added along the wall on entry
    pub initial_hor_velocity_mult: f32,
    /// Vertical velocity multiplier applied once on entry
    pub initial_vert_velocity_mult: f32,
    /// Upper limit of the entry speed boost
    pub initial_velocity_max: f32,
    /// Speed along the wall needed to start a wall run
    pub velocity_threshold: f32,
    /// Speed along the wall below which a wall run ends
    pub velocity_exit_threshold: f32,
    /// Minimum height above ground to start a wall run
    pub height_threshold: f32,
    /// Speed loss smoothing while wall running
    pub drag_smoothing: f32,
    /// Gravity while wall running
    pub gravity: Vec3,
}

impl Default for WallRunConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_hor_velocity_mult: 0.5,
            initial_vert_velocity_mult: 0.5,
            initial_velocity_max: 6.0,
            velocity_threshold: 11.0,
            velocity_exit_threshold: 6.0,
            height_threshold: 2.0,
            drag_smoothing: 0.5,
            gravity: Vec3::new(0.0, -5.0, 0.0),
        }
    }
}

/// Wall jumping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallJumpConfig {
    /// Enable wall jumping
    pub enabled: bool,
    /// Weight of the wall normal in the new direction
    pub direction_normal: f32,
    /// Weight of the wall forward in the new direction
    pub direction_forwards: f32,
    /// Upward velocity added
    pub force_upwards: f32,
    /// Extra speed along the new horizontal direction
    pub additional_force: f32,
    /// Time before another wall jump is allowed
    pub cooldown: f32,
    /// How long air control is restricted after a wall jump
    pub restrict_air_rotation_time: f32,
    /// Air control multiplier while restricted
    pub air_rotation_mult: f32,
}

impl Default for WallJumpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            direction_normal: 0.5,
            direction_forwards: 0.5,
            force_upwards: 0.5,
            additional_force: 2.0,
            cooldown: 0.4,
            restrict_air_rotation_time: 1.0,
            air_rotation_mult: 1.0,
        }
    }
}

/// Crouching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrouchConfig {
    /// Crouch speed relative to base movespeed
    pub speed_mult: f32,
    /// Time to crouch or stand up
    pub transition_time: f32,
    /// Capsule height multiplier while crouched
    pub capsule_height_mult: f32,
    /// Capsule offset multiplier while crouched
    pub capsule_y_offset_mult: f32,
}

impl Default for CrouchConfig {
    fn default() -> Self {
        Self {
            speed_mult: 0.5,
            transition_time: 0.2,
            capsule_height_mult: 0.5,
            capsule_y_offset_mult: 0.5,
        }
    }
}

/// Gravity shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    /// Base gravity
    pub base: Vec3,
    /// Gravity multiplier while falling
    pub falling_mult: f32,
    /// Gravity multiplier around the jump apex
    pub jump_hang_mult: f32,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            base: Vec3::new(0.0, -30.0, 0.0),
            falling_mult: 1.15,
            jump_hang_mult: 0.9,
        }
    }
}

/// Wall and ground probes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Reach of the four wall probes
    pub wall_check_distance: f32,
    /// Reach of the ground distance probe
    pub ground_check_distance: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            wall_check_distance: 0.5,
            ground_check_distance: 15.0,
        }
    }
}

/// Setup-time configuration defects
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be positive, got {1}")]
    NotPositive(&'static str, f32),

    #[error("{0} must be within [0, 1], got {1}")]
    OutOfUnitRange(&'static str, f32),

    #[error("slide exit threshold {exit} is above the enter threshold {enter}")]
    SlideHysteresisInverted { enter: f32, exit: f32 },

    #[error("wall run exit threshold {exit} is above the enter threshold {enter}")]
    WallRunHysteresisInverted { enter: f32, exit: f32 },

    #[error("max_jumps must be at least 1")]
    NoJumps,
}

impl MovementConfig {
    /// Check the tuning for values that break movement invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("stable.base_movespeed", self.stable.base_movespeed),
            ("capsule.radius", self.capsule.radius),
            ("capsule.height", self.capsule.height),
            ("probes.wall_check_distance", self.probes.wall_check_distance),
            ("probes.ground_check_distance", self.probes.ground_check_distance),
        ];
        for (name, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(ConfigError::NotPositive(name, value));
            }
        }

        let unit = [
            ("slide.conditional_speed_mult", self.slide.conditional_speed_mult),
            ("dash.velocity_to_decrease_mult", self.dash.velocity_to_decrease_mult),
            ("dash.end_velocity_mult", self.dash.end_velocity_mult),
            ("jump.landing_slow_down_mult", self.jump.landing_slow_down_mult),
            ("wall_run.initial_vert_velocity_mult", self.wall_run.initial_vert_velocity_mult),
            ("wall_jump.direction_normal", self.wall_jump.direction_normal),
            ("wall_jump.direction_forwards", self.wall_jump.direction_forwards),
            ("wall_jump.air_rotation_mult", self.wall_jump.air_rotation_mult),
            ("crouch.capsule_height_mult", self.crouch.capsule_height_mult),
            ("crouch.capsule_y_offset_mult", self.crouch.capsule_y_offset_mult),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange(name, value));
            }
        }

        if self.slide.speed_exit_threshold > self.slide.speed_threshold {
            return Err(ConfigError::SlideHysteresisInverted {
                enter: self.slide.speed_threshold,
                exit: self.slide.speed_exit_threshold,
            });
        }

        if self.wall_run.velocity_exit_threshold > self.wall_run.velocity_threshold {
            return Err(ConfigError::WallRunHysteresisInverted {
                enter: self.wall_run.velocity_threshold,
                exit: self.wall_run.velocity_exit_threshold,
            });
        }

        if self.jump.max_jumps == 0 {
            return Err(ConfigError::NoJumps);
        }

        Ok(())
    }

    /// Standing capsule
    pub fn standing_capsule(&self) -> CapsuleDimensions {
        self.capsule
    }

    /// Crouched capsule
    pub fn crouched_capsule(&self) -> CapsuleDimensions {
        CapsuleDimensions {
            radius: self.capsule.radius,
            height: self.capsule.height * self.crouch.capsule_height_mult,
            y_offset: self.capsule.y_offset * self.crouch.capsule_y_offset_mult,
        }
    }
}

//! Movement states and their tuning coefficients

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::config::MovementConfig;

/// Discrete movement state. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementState {
    /// Walking or standing on stable ground
    #[default]
    Stable,
    /// Running above the sprint threshold
    Sprinting,
    /// Crouch-sliding along the ground
    Sliding,
    /// Falling or rising without any other action
    InAir,
    /// Committed dash on the ground
    GroundDashing,
    /// Committed dash in the air
    AirDashing,
    /// Crouched on the ground
    Crouching,
    /// Running along a side wall
    WallRunning,
    /// Jump from the ground (or coyote time)
    GroundJump,
    /// Extra jump in the air
    AirJump,
    /// Jump off a nearby wall
    WallJump,
    /// Committed dash straight down
    DownwardsDash,
}

impl MovementState {
    /// All states, in declaration order
    pub const ALL: [MovementState; 12] = [
        MovementState::Stable,
        MovementState::Sprinting,
        MovementState::Sliding,
        MovementState::InAir,
        MovementState::GroundDashing,
        MovementState::AirDashing,
        MovementState::Crouching,
        MovementState::WallRunning,
        MovementState::GroundJump,
        MovementState::AirJump,
        MovementState::WallJump,
        MovementState::DownwardsDash,
    ];

    /// Whether steering is disabled for the duration of the state
    pub fn is_committed(self) -> bool {
        matches!(
            self,
            MovementState::GroundDashing | MovementState::AirDashing | MovementState::DownwardsDash
        )
    }

    /// Coefficients the integrator uses while this state is active
    pub fn coefficients(self, config: &MovementConfig) -> Coefficients {
        let stable = Coefficients::stable(config);
        match self {
            MovementState::Stable
            | MovementState::GroundJump
            | MovementState::AirJump
            | MovementState::WallJump => stable,
            MovementState::Crouching => Coefficients {
                movement_mult: config.crouch.speed_mult,
                ..stable
            },
            MovementState::Sprinting => Coefficients {
                movement_mult: config.sprint.speed_mult,
                acceleration: config.sprint.acceleration,
                ..stable
            },
            MovementState::GroundDashing
            | MovementState::AirDashing
            | MovementState::DownwardsDash => Coefficients {
                movement_mult: 1.0,
                acceleration: 0.0,
                deceleration: 0.0,
                deceleration_to_stop: 0.0,
                gravity: config.gravity.base,
            },
            MovementState::Sliding => Coefficients {
                movement_mult: config.slide.slow_down,
                acceleration: config.slide.drag_smoothing,
                deceleration: config.slide.drag_smoothing,
                deceleration_to_stop: config.slide.drag_smoothing,
                gravity: config.gravity.base,
            },
            MovementState::WallRunning => Coefficients {
                movement_mult: 1.0,
                acceleration: config.wall_run.drag_smoothing,
                deceleration: config.wall_run.drag_smoothing,
                deceleration_to_stop: config.stable.deceleration_to_stop,
                gravity: config.wall_run.gravity,
            },
            MovementState::InAir => Coefficients {
                acceleration: config.air.acceleration,
                deceleration: config.air.deceleration,
                ..stable
            },
        }
    }
}

/// Per-state integrator tuning, rewritten wholesale on every state entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Multiplier on the grounded target velocity
    pub movement_mult: f32,
    /// Acceleration rate
    pub acceleration: f32,
    /// Deceleration rate while inputting
    pub deceleration: f32,
    /// Deceleration rate with no input
    pub deceleration_to_stop: f32,
    /// Gravity vector
    pub gravity: Vec3,
}

impl Coefficients {
    /// Baseline stable-ground coefficients
    pub fn stable(config: &MovementConfig) -> Self {
        Self {
            movement_mult: 1.0,
            acceleration: config.stable.acceleration,
            deceleration: config.stable.deceleration,
            deceleration_to_stop: config.stable.deceleration_to_stop,
            gravity: config.gravity.base,
        }
    }
}

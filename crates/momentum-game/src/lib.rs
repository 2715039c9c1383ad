//! Momentum Game - First-person movement
//!
//! Provides the movement controller and state machine, the stamina pool that
//! gates dashes and air jumps, and the input snapshot the controller reads.

pub mod input;
pub mod movement;
pub mod stamina;

#[cfg(test)]
pub(crate) mod testing;

pub use input::{InputAction, InputState, MovementInput};
pub use movement::{
    Coefficients, ExitDecision, MovementConfig, MovementController, MovementEvent, MovementState,
    VelocityModifier,
};
pub use stamina::{StaminaConfig, StaminaEvent, StaminaPool, StaminaSource};

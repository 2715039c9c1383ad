//! Action-based input state
//!
//! Hosts translate device events into [`InputAction`] presses and releases.
//! Once per tick the state is condensed into a [`MovementInput`] snapshot that
//! the movement controller buffers into its own timers.

use std::collections::HashSet;

use glam::{Quat, Vec2};
use serde::{Deserialize, Serialize};

/// Game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    Jump,
    Dash,
    DownwardDash,
    /// Held to crouch or slide
    Crouch,
}

/// Current state of all inputs for a frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Actions currently held down
    pub held: HashSet<InputAction>,
    /// Actions that were just pressed this frame
    pub just_pressed: HashSet<InputAction>,
    /// Actions that were just released this frame
    pub just_released: HashSet<InputAction>,
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a press. Repeated presses while held do not retrigger.
    pub fn press(&mut self, action: InputAction) {
        if self.held.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    /// Register a release
    pub fn release(&mut self, action: InputAction) {
        if self.held.remove(&action) {
            self.just_released.insert(action);
        }
    }

    /// Check if an action is currently held
    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this frame
    pub fn is_just_released(&self, action: InputAction) -> bool {
        self.just_released.contains(&action)
    }

    /// Movement axis from the four move actions: x is right, y is forward
    pub fn movement_axis(&self) -> Vec2 {
        let axis = |positive, negative| {
            (self.is_held(positive) as i32 - self.is_held(negative) as i32) as f32
        };
        Vec2::new(
            axis(InputAction::MoveRight, InputAction::MoveLeft),
            axis(InputAction::MoveForward, InputAction::MoveBackward),
        )
    }

    /// Condense this frame into a movement snapshot
    pub fn snapshot(&self, camera_rotation: Quat) -> MovementInput {
        MovementInput {
            movement: self.movement_axis(),
            camera_rotation,
            jump_pressed: self.is_just_pressed(InputAction::Jump),
            dash_pressed: self.is_just_pressed(InputAction::Dash),
            downward_dash_pressed: self.is_just_pressed(InputAction::DownwardDash),
            crouch_pressed: self.is_just_pressed(InputAction::Crouch),
            crouch_released: self.is_just_released(InputAction::Crouch),
        }
    }

    /// Clear frame-specific data (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

/// Per-tick input consumed by the movement controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementInput {
    /// Raw 2D movement: x is right, y is forward
    pub movement: Vec2,
    /// Camera orientation; only its heading on the character plane is used
    pub camera_rotation: Quat,
    pub jump_pressed: bool,
    pub dash_pressed: bool,
    pub downward_dash_pressed: bool,
    pub crouch_pressed: bool,
    pub crouch_released: bool,
}

impl Default for MovementInput {
    fn default() -> Self {
        Self {
            movement: Vec2::ZERO,
            camera_rotation: Quat::IDENTITY,
            jump_pressed: false,
            dash_pressed: false,
            downward_dash_pressed: false,
            crouch_pressed: false,
            crouch_released: false,
        }
    }
}

impl MovementInput {
    /// Snapshot with only a movement vector
    pub fn moving(movement: Vec2) -> Self {
        Self {
            movement,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_state() {
        let mut state = InputState::new();
        state.press(InputAction::MoveForward);
        state.press(InputAction::Jump);

        assert!(state.is_held(InputAction::MoveForward));
        assert!(state.is_just_pressed(InputAction::Jump));
        assert!(!state.is_held(InputAction::Dash));

        state.clear_frame();
        assert!(state.is_held(InputAction::MoveForward));
        assert!(!state.is_just_pressed(InputAction::Jump));

        // Held key repeat does not count as a new press
        state.press(InputAction::Jump);
        assert!(!state.is_just_pressed(InputAction::Jump));
    }

    #[test]
    fn test_movement_axis() {
        let mut state = InputState::new();
        state.press(InputAction::MoveForward);
        state.press(InputAction::MoveLeft);
        assert_eq!(state.movement_axis(), Vec2::new(-1.0, 1.0));

        state.press(InputAction::MoveRight);
        assert_eq!(state.movement_axis(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_snapshot_edges() {
        let mut state = InputState::new();
        state.press(InputAction::Crouch);
        state.press(InputAction::Dash);
        let snapshot = state.snapshot(Quat::IDENTITY);
        assert!(snapshot.crouch_pressed);
        assert!(snapshot.dash_pressed);
        assert!(!snapshot.jump_pressed);

        state.clear_frame();
        state.release(InputAction::Crouch);
        let snapshot = state.snapshot(Quat::IDENTITY);
        assert!(snapshot.crouch_released);
        assert!(!snapshot.dash_pressed);
    }
}

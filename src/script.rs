//! Timed input script for headless runs
//!
//! A script is a list of commands stamped with the simulated time they fire
//! at. The default script runs the course: crouch through the tunnel, strafe
//! to the wall, dash and jump off the deck, then finish with a slide.

use glam::Quat;
use serde::{Deserialize, Serialize};

use momentum_game::input::{InputAction, InputState};

/// What a script step does to the input state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Start holding an action
    Press(InputAction),
    /// Stop holding an action
    Release(InputAction),
    /// Press and release within one tick
    Tap(InputAction),
    /// Turn the camera to a heading, in degrees counterclockwise from -Z
    Look(f32),
}

/// One command and when it fires
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Simulated seconds since the start of the run
    pub at: f32,
    pub command: Command,
}

/// Ordered input commands with a playback cursor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<ScriptStep>", into = "Vec<ScriptStep>")]
pub struct InputScript {
    steps: Vec<ScriptStep>,
    cursor: usize,
}

impl From<Vec<ScriptStep>> for InputScript {
    fn from(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { steps, cursor: 0 }
    }
}

impl From<InputScript> for Vec<ScriptStep> {
    fn from(script: InputScript) -> Self {
        script.steps
    }
}

impl Default for InputScript {
    fn default() -> Self {
        use Command::*;
        use InputAction::*;

        let step = |at, command| ScriptStep { at, command };
        Self::from(vec![
            step(0.0, Press(MoveForward)),
            step(1.0, Press(Crouch)),
            // Still under the tunnel roof, so standing is refused for a while
            step(2.5, Release(Crouch)),
            step(4.0, Press(MoveRight)),
            step(4.6, Tap(Dash)),
            step(5.0, Tap(Jump)),
            step(5.4, Tap(Jump)),
            step(6.5, Release(MoveRight)),
            step(7.0, Tap(Jump)),
            step(7.2, Tap(DownwardDash)),
            step(9.0, Press(Crouch)),
            step(10.0, Release(Crouch)),
            step(11.0, Look(180.0)),
            step(11.5, Release(MoveForward)),
        ])
    }
}

impl InputScript {
    /// Apply every step due at or before `time`. Returns how many fired.
    pub fn advance(&mut self, time: f32, input: &mut InputState, camera: &mut Quat) -> usize {
        let start = self.cursor;
        while let Some(step) = self.steps.get(self.cursor) {
            if step.at > time {
                break;
            }
            match step.command {
                Command::Press(action) => input.press(action),
                Command::Release(action) => input.release(action),
                Command::Tap(action) => {
                    input.press(action);
                    input.release(action);
                }
                Command::Look(degrees) => *camera = Quat::from_rotation_y(degrees.to_radians()),
            }
            self.cursor += 1;
        }
        self.cursor - start
    }

    /// Whether every step has fired
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_fire_in_time_order() {
        let mut script = InputScript::from(vec![
            ScriptStep { at: 1.0, command: Command::Release(InputAction::MoveForward) },
            ScriptStep { at: 0.0, command: Command::Press(InputAction::MoveForward) },
        ]);
        let mut input = InputState::new();
        let mut camera = Quat::IDENTITY;

        assert_eq!(script.advance(0.5, &mut input, &mut camera), 1);
        assert!(input.is_held(InputAction::MoveForward));

        input.clear_frame();
        assert_eq!(script.advance(0.9, &mut input, &mut camera), 0);
        assert_eq!(script.advance(1.0, &mut input, &mut camera), 1);
        assert!(!input.is_held(InputAction::MoveForward));
        assert!(script.is_finished());
    }

    #[test]
    fn test_tap_is_pressed_for_one_frame() {
        let mut script = InputScript::from(vec![ScriptStep {
            at: 0.0,
            command: Command::Tap(InputAction::Jump),
        }]);
        let mut input = InputState::new();
        let mut camera = Quat::IDENTITY;
        script.advance(0.0, &mut input, &mut camera);

        assert!(input.is_just_pressed(InputAction::Jump));
        assert!(!input.is_held(InputAction::Jump));
        assert!(input.snapshot(camera).jump_pressed);

        input.clear_frame();
        assert!(!input.snapshot(camera).jump_pressed);
    }

    #[test]
    fn test_look_turns_camera() {
        let mut script = InputScript::from(vec![ScriptStep {
            at: 0.0,
            command: Command::Look(90.0),
        }]);
        let mut input = InputState::new();
        let mut camera = Quat::IDENTITY;
        script.advance(0.0, &mut input, &mut camera);

        // Counterclockwise from -Z looking down on the course is -X
        let forward = camera * glam::Vec3::NEG_Z;
        assert!((forward - glam::Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_default_script_is_sorted() {
        let script = InputScript::default();
        assert!(script.len() > 0);
        let steps: Vec<ScriptStep> = script.into();
        assert!(steps.windows(2).all(|w| w[0].at <= w[1].at));
    }

    #[test]
    fn test_script_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            script: InputScript,
        }
        let content = r#"
            [[script]]
            at = 0.5
            command = { Tap = "Dash" }

            [[script]]
            at = 0.0
            command = { Press = "MoveForward" }
        "#;
        let wrapper: Wrapper = toml::from_str(content).unwrap();
        assert_eq!(wrapper.script.len(), 2);
    }
}

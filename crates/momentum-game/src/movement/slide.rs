//! Slide target shaping
//!
//! Downhill slides build speed and may be steered; slides on flat or uphill
//! ground can only be steered and otherwise decay.

use glam::Vec3;

use momentum_core::math::{exp_smoothing, lerp_clamped};

use super::config::MovementConfig;
use super::state::Coefficients;

/// Which slide coefficients are active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideProfile {
    /// Sliding downhill, speed builds up
    Building,
    /// Flat or uphill, speed only decays
    Slowing,
}

impl SlideProfile {
    /// Overwrite the sliding coefficients with this profile
    pub fn apply(self, coefficients: &mut Coefficients, config: &MovementConfig) {
        let slide = &config.slide;
        let (mult, smoothing) = match self {
            SlideProfile::Building => (slide.slope_speed_mult, slide.build_up_smoothing),
            SlideProfile::Slowing => (slide.slow_down, slide.drag_smoothing),
        };
        coefficients.movement_mult = mult;
        coefficients.acceleration = smoothing;
        coefficients.deceleration_to_stop = smoothing;
    }
}

/// Replace the grounded target velocity while sliding.
///
/// Returns the new target and the profile the integrator should switch to.
pub fn shape(
    config: &MovementConfig,
    velocity: Vec3,
    target: Vec3,
    inputting: bool,
    moving_downhill: bool,
    dt: f32,
) -> (Vec3, SlideProfile) {
    let steer = exp_smoothing(config.slide.rotation_smoothing, dt);

    if moving_downhill {
        let shaped = if inputting {
            lerp_clamped(velocity, target, steer).normalize_or_zero() * target.length()
        } else {
            velocity.normalize_or_zero() * config.stable.base_movespeed
        };
        (shaped, SlideProfile::Building)
    } else {
        let shaped = if inputting {
            lerp_clamped(velocity, target, steer).normalize_or_zero() * velocity.length()
        } else {
            velocity
        };
        (shaped, SlideProfile::Slowing)
    }
}

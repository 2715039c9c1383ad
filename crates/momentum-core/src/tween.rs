//! Eased scalar tweens
//!
//! Used for values that should glide to a target over a fixed duration, such
//! as capsule height while crouching. Retargeting mid-flight restarts from the
//! current value.

use serde::{Deserialize, Serialize};

/// Easing curve applied to tween progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ease {
    /// Constant rate
    Linear,
    /// Slow start and end, sinusoidal
    #[default]
    InOutSine,
}

impl Ease {
    /// Map linear progress `t` in `[0, 1]` to eased progress
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::InOutSine => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// A scalar moving from `from` to `to` over `duration` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    ease: Ease,
}

impl Tween {
    /// A tween already resting at `value`
    pub fn settled(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            duration: 0.0,
            elapsed: 0.0,
            ease: Ease::default(),
        }
    }

    /// Start moving from the current value to `target`
    pub fn retarget(&mut self, target: f32, duration: f32, ease: Ease) {
        self.from = self.value();
        self.to = target;
        self.duration = duration.max(0.0);
        self.elapsed = 0.0;
        self.ease = ease;
    }

    /// Advance by `dt` seconds and return the new value
    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.is_alive() {
            self.elapsed = (self.elapsed + dt).min(self.duration);
        }
        self.value()
    }

    /// Jump straight to the target
    pub fn complete(&mut self) {
        self.elapsed = self.duration;
        self.from = self.to;
    }

    /// Current interpolated value
    pub fn value(&self) -> f32 {
        if self.elapsed >= self.duration {
            return self.to;
        }
        let progress = self.ease.apply(self.elapsed / self.duration);
        self.from + (self.to - self.from) * progress
    }

    /// Value the tween is heading to
    pub fn target(&self) -> f32 {
        self.to
    }

    /// Whether the tween is still moving
    pub fn is_alive(&self) -> bool {
        self.elapsed < self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_endpoints() {
        for ease in [Ease::Linear, Ease::InOutSine] {
            assert!(ease.apply(0.0).abs() < 1e-6);
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-6);
        }
        assert!((Ease::InOutSine.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_tween_reaches_target() {
        let mut tween = Tween::settled(2.0);
        tween.retarget(1.0, 0.2, Ease::InOutSine);
        assert!(tween.is_alive());

        let mid = tween.advance(0.1);
        assert!(mid < 2.0 && mid > 1.0);

        assert_eq!(tween.advance(0.5), 1.0);
        assert!(!tween.is_alive());
    }

    #[test]
    fn test_retarget_starts_from_current() {
        let mut tween = Tween::settled(2.0);
        tween.retarget(1.0, 1.0, Ease::Linear);
        tween.advance(0.5);
        tween.retarget(2.0, 1.0, Ease::Linear);
        assert!((tween.value() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_zero_duration() {
        let mut tween = Tween::settled(0.0);
        tween.retarget(3.0, 0.0, Ease::InOutSine);
        assert_eq!(tween.value(), 3.0);
        assert!(!tween.is_alive());
    }
}

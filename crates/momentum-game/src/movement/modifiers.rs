//! One-shot velocity modifiers
//!
//! State side effects and outside systems queue modifiers during a tick. The
//! integrator applies them once, after the kinematic update, in a fixed order:
//! zero all, zero vertical, horizontal scale, redirect, additive. The queue is
//! empty again afterwards.

use glam::Vec3;

use momentum_core::math::project_on_plane;

/// A single queued velocity change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VelocityModifier {
    /// Add a vector
    Additive(Vec3),
    /// Multiply the horizontal components
    Scale(f32),
    /// Keep the speed, replace the direction
    Redirect(Vec3),
    /// Set the whole velocity to zero
    ZeroAll,
    /// Set the vertical component to zero
    ZeroVertical,
}

/// Modifiers waiting for the next integration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingModifiers {
    zero_all: bool,
    zero_vertical: bool,
    scale: f32,
    redirect: Option<Vec3>,
    additive: Vec3,
}

impl Default for PendingModifiers {
    fn default() -> Self {
        Self {
            zero_all: false,
            zero_vertical: false,
            scale: 1.0,
            redirect: None,
            additive: Vec3::ZERO,
        }
    }
}

impl PendingModifiers {
    /// Queue a modifier. Additives accumulate, scales compose, the latest redirect wins.
    pub fn push(&mut self, modifier: VelocityModifier) {
        match modifier {
            VelocityModifier::Additive(v) => self.additive += v,
            VelocityModifier::Scale(f) => self.scale *= f,
            VelocityModifier::Redirect(dir) => self.redirect = Some(dir),
            VelocityModifier::ZeroAll => self.zero_all = true,
            VelocityModifier::ZeroVertical => self.zero_vertical = true,
        }
    }

    /// Drop a queued zero-all request
    pub fn cancel_zero_all(&mut self) {
        self.zero_all = false;
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Queued additive vector
    pub fn additive(&self) -> Vec3 {
        self.additive
    }

    /// Queued horizontal scale (1.0 when none)
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Queued redirect direction
    pub fn redirect(&self) -> Option<Vec3> {
        self.redirect
    }

    /// Whether a zero-all is queued
    pub fn zeroes_all(&self) -> bool {
        self.zero_all
    }

    /// Whether a zero-vertical is queued
    pub fn zeroes_vertical(&self) -> bool {
        self.zero_vertical
    }

    /// Apply every queued modifier to `velocity` and clear the queue.
    ///
    /// `up` defines the vertical axis; a redirect keeps `reference_speed`.
    pub fn apply(&mut self, mut velocity: Vec3, up: Vec3, reference_speed: f32) -> Vec3 {
        let pending = std::mem::take(self);

        if pending.zero_all {
            velocity = Vec3::ZERO;
        }

        if pending.zero_vertical {
            velocity = project_on_plane(velocity, up);
        }

        if pending.scale != 1.0 {
            let horizontal = project_on_plane(velocity, up);
            velocity = velocity - horizontal + horizontal * pending.scale;
        }

        if let Some(direction) = pending.redirect {
            velocity = direction.normalize_or_zero() * reference_speed;
        }

        velocity + pending.additive
    }
}

//! Support timers and resource counters
//!
//! Each timer type owns its comparison: request buffers count up and are fresh
//! while `elapsed <= window`, cooldowns count down and are ready at `<= 0`,
//! stuns count down and are active while `> 0`.

use serde::{Deserialize, Serialize};

use super::config::SprintConfig;

/// Time since an edge-triggered request, counting up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestBuffer {
    elapsed: f32,
}

impl RequestBuffer {
    /// Elapsed value of a buffer that has never been requested
    const IDLE: f32 = 100.0;

    /// A buffer with no pending request
    pub fn idle() -> Self {
        Self { elapsed: Self::IDLE }
    }

    /// Register a new request
    pub fn request(&mut self) {
        self.elapsed = 0.0;
    }

    /// Advance the clock
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    /// Whether the request is still inside the buffer window
    pub fn is_fresh(&self, window: f32) -> bool {
        self.elapsed <= window
    }

    /// Mark the request as used so it cannot trigger again
    pub fn consume(&mut self, window: f32) {
        self.elapsed = window + 1.0;
    }
}

impl Default for RequestBuffer {
    fn default() -> Self {
        Self::idle()
    }
}

/// Countdown that permits an action once it reaches zero
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cooldown {
    remaining: f32,
}

impl Cooldown {
    /// Start the countdown
    pub fn start(&mut self, duration: f32) {
        self.remaining = duration;
    }

    /// Advance the clock
    pub fn tick(&mut self, dt: f32) {
        if self.remaining > 0.0 {
            self.remaining -= dt;
        }
    }

    /// Whether the action is allowed again
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Seconds left
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

/// Countdown that holds while positive.
///
/// Used for stuns that lock a state in, and for short grace windows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stun {
    remaining: f32,
}

impl Stun {
    /// Start the stun
    pub fn start(&mut self, duration: f32) {
        self.remaining = duration;
    }

    /// Advance the clock
    pub fn tick(&mut self, dt: f32) {
        if self.remaining > 0.0 {
            self.remaining -= dt;
        }
    }

    /// End the stun immediately
    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }

    /// Whether the stun still holds
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Seconds left
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

/// Bounded resource counter, always within `[0, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    value: u32,
    max: u32,
}

impl Counter {
    /// A counter starting full
    pub fn full(max: u32) -> Self {
        Self { value: max, max }
    }

    /// A counter starting empty
    pub fn empty(max: u32) -> Self {
        Self { value: 0, max }
    }

    /// Current value
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Whether anything is left
    pub fn is_positive(&self) -> bool {
        self.value > 0
    }

    /// Whether the bound is reached
    pub fn is_full(&self) -> bool {
        self.value >= self.max
    }

    /// Decrease by one. Returns false (and stays at zero) when already empty.
    pub fn decrement(&mut self) -> bool {
        if self.value == 0 {
            return false;
        }
        self.value -= 1;
        true
    }

    /// Increase by one. Returns false (and stays at max) when already full.
    pub fn increment(&mut self) -> bool {
        if self.value >= self.max {
            return false;
        }
        self.value += 1;
        true
    }

    /// Set to a value, clamped to the bounds
    pub fn set(&mut self, value: u32) {
        self.value = value.min(self.max);
    }

    /// Set to max
    pub fn refill(&mut self) {
        self.value = self.max;
    }

    /// Set to zero. Returns whether the value changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.value != 0;
        self.value = 0;
        changed
    }
}

/// Sprint build-up and expiry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SprintTimer {
    build_up: f32,
    expiry: f32,
}

impl SprintTimer {
    /// Whether sprinting is currently permitted
    pub fn can_sprint(&self, config: &SprintConfig) -> bool {
        self.build_up >= config.time_til_sprint
    }

    /// Drop any accumulated sprint
    pub fn stop(&mut self) {
        self.build_up = 0.0;
    }

    /// Advance with this tick's horizontal speed.
    ///
    /// `may_build` is true when the character is on stable ground and not sliding.
    pub fn update(
        &mut self,
        config: &SprintConfig,
        may_build: bool,
        horizontal_speed: f32,
        dt: f32,
    ) {
        let can_sprint = self.can_sprint(config);
        let running = horizontal_speed > config.running_threshold;

        if !can_sprint && may_build && running {
            self.build_up += dt;
        } else if can_sprint && running {
            self.expiry = config.expire_time;
        } else if can_sprint && self.expiry > 0.0 {
            self.expiry -= dt;
        } else {
            self.expiry = 0.0;
            self.build_up = 0.0;
        }
    }
}

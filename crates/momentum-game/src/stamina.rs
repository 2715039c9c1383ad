//! Stamina charges gating dashes and air jumps
//!
//! The pool is shared with other gameplay systems, so the movement controller
//! only sees it through [`StaminaSource`].

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A finite charge pool the movement controller draws from
pub trait StaminaSource {
    /// Whether a charge is available, without taking it
    fn can_consume(&self) -> bool;

    /// Take one charge. Returns false when none is left.
    fn consume(&mut self) -> bool;
}

/// Stamina tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaConfig {
    /// Maximum number of charges
    pub max_charges: u32,
    /// Seconds to recharge one charge
    pub recharge_time: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            max_charges: 3,
            recharge_time: 2.0,
        }
    }
}

/// Notifications from [`StaminaPool::update`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StaminaEvent {
    /// Still recharging, with the normalized fill level
    Recharging(f32),
    /// A charge was restored
    Recharged,
}

/// Charge pool that refills one charge at a time
#[derive(Debug, Clone)]
pub struct StaminaPool {
    config: StaminaConfig,
    charges: u32,
    recharge_timer: f32,
}

impl StaminaPool {
    /// A full pool
    pub fn new(config: StaminaConfig) -> Self {
        Self {
            charges: config.max_charges,
            recharge_timer: 0.0,
            config,
        }
    }

    /// Current whole charges
    pub fn charges(&self) -> u32 {
        self.charges
    }

    /// Maximum charges
    pub fn max_charges(&self) -> u32 {
        self.config.max_charges
    }

    /// Fill level in `[0, 1]`, counting the partially recharged charge
    pub fn normalized(&self) -> f32 {
        if self.config.max_charges == 0 {
            return 0.0;
        }
        let partial = if self.config.recharge_time > 0.0 {
            self.recharge_timer / self.config.recharge_time
        } else {
            0.0
        };
        ((self.charges as f32 + partial) / self.config.max_charges as f32).min(1.0)
    }

    /// Advance the recharge clock
    pub fn update(&mut self, dt: f32) -> Option<StaminaEvent> {
        if self.charges >= self.config.max_charges {
            self.recharge_timer = 0.0;
            return None;
        }

        if self.recharge_timer >= self.config.recharge_time {
            self.charges += 1;
            self.recharge_timer = 0.0;
            return Some(StaminaEvent::Recharged);
        }

        self.recharge_timer += dt;
        Some(StaminaEvent::Recharging(self.normalized()))
    }

    /// Add charges, capped at the maximum
    pub fn add_charges(&mut self, charges: u32) {
        self.charges = (self.charges + charges).min(self.config.max_charges);
    }
}

impl Default for StaminaPool {
    fn default() -> Self {
        Self::new(StaminaConfig::default())
    }
}

impl StaminaSource for StaminaPool {
    fn can_consume(&self) -> bool {
        self.charges > 0
    }

    fn consume(&mut self) -> bool {
        if self.charges == 0 {
            warn!("Attempted to consume stamina with no charges left");
            return false;
        }
        self.charges -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_until_empty() {
        let mut pool = StaminaPool::default();
        assert_eq!(pool.charges(), 3);
        assert!(pool.consume());
        assert!(pool.consume());
        assert!(pool.consume());
        assert!(!pool.can_consume());
        assert!(!pool.consume());
        assert_eq!(pool.charges(), 0);
    }

    #[test]
    fn test_recharge_one_charge() {
        let mut pool = StaminaPool::new(StaminaConfig {
            max_charges: 2,
            recharge_time: 1.0,
        });
        pool.consume();

        let mut recharged = false;
        for _ in 0..12 {
            if pool.update(0.1) == Some(StaminaEvent::Recharged) {
                recharged = true;
                break;
            }
        }
        assert!(recharged);
        assert_eq!(pool.charges(), 2);
        assert_eq!(pool.update(0.1), None);
    }

    #[test]
    fn test_add_charges_capped() {
        let mut pool = StaminaPool::default();
        pool.consume();
        pool.consume();
        pool.add_charges(10);
        assert_eq!(pool.charges(), pool.max_charges());
        assert_eq!(pool.normalized(), 1.0);
    }

    #[test]
    fn test_normalized_counts_partial_charge() {
        let mut pool = StaminaPool::new(StaminaConfig {
            max_charges: 2,
            recharge_time: 1.0,
        });
        pool.consume();
        pool.update(0.5);
        assert!((pool.normalized() - 0.75).abs() < 1e-5);
    }
}

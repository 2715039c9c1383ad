//! Movement state machine
//!
//! Twelve states selected by prioritized guards every tick, a velocity
//! integrator shaped by per-state coefficients, and the timers, probes and
//! capsule bookkeeping the guards read.

pub mod capsule;
pub mod config;
pub mod controller;
pub mod events;
mod guards;
pub mod integrator;
pub mod machine;
pub mod modifiers;
pub mod probes;
pub mod slide;
pub mod state;
pub mod timers;

pub use capsule::Capsule;
pub use config::{
    AirConfig, ConfigError, CrouchConfig, DashConfig, DownwardDashConfig, GravityConfig,
    JumpConfig, MovementConfig, ProbeConfig, SlideConfig, SprintConfig, StableConfig,
    WallJumpConfig, WallRunConfig,
};
pub use controller::MovementController;
pub use events::MovementEvent;
pub use machine::ExitDecision;
pub use modifiers::{PendingModifiers, VelocityModifier};
pub use probes::WallProbe;
pub use state::{Coefficients, MovementState};
pub use timers::{Cooldown, Counter, RequestBuffer, SprintTimer, Stun};

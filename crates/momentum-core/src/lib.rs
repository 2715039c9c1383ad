//! Momentum Core - Shared types and utilities for the Momentum workspace
//!
//! This crate provides the foundational pieces used by the movement core and its hosts:
//! - Mathematical primitives (re-exported from glam) and plane projection helpers
//! - The [`Motor`] collaborator trait the movement core drives a character through
//! - Fixed-step game time
//! - Eased tweens for smoothly interpolated values such as capsule height

pub mod math;
pub mod motor;
pub mod time;
pub mod tween;
pub mod types;

pub use glam::{Quat, Vec2, Vec3};
pub use motor::{CapsuleDimensions, GroundingStatus, Motor, ProbeLayer, RayHit};
pub use time::{GameTime, TimeConfig};
pub use tween::{Ease, Tween};
pub use types::Transform;

//! The headless test course
//!
//! A straight run along -Z: a raised deck with a low tunnel to crouch under,
//! a drop off the deck's end beside a long side wall, and an uphill ramp to
//! finish on.

use glam::Vec3;

use momentum_physics::{PhysicsWorld, SurfaceKind};

/// Height of the deck the character starts on
pub const DECK_HEIGHT: f32 = 3.0;

/// Where the character starts, feet just above the deck, facing -Z
pub const SPAWN: Vec3 = Vec3::new(0.0, DECK_HEIGHT + 0.05, 0.0);

/// Build the course into an empty world
pub fn build(world: &mut PhysicsWorld) {
    world.create_ground(0.0);

    // Deck from z = 5 to z = -40, its sides double as walls
    world.create_box(
        Vec3::new(2.0, DECK_HEIGHT / 2.0, 22.5),
        Vec3::new(0.0, DECK_HEIGHT / 2.0, -17.5),
        SurfaceKind::Block,
    );

    // Tunnel roof 1.4m above the deck
    world.create_box(
        Vec3::new(2.0, 0.2, 3.0),
        Vec3::new(0.0, DECK_HEIGHT + 1.6, -14.0),
        SurfaceKind::Ground,
    );

    // Side wall flush with the deck's right edge, running on past the drop
    world.create_wall(Vec3::new(0.2, 5.0, 30.0), Vec3::new(2.2, 5.0, -55.0));

    // Uphill ramp from z = -95
    world.create_ramp(Vec3::new(3.0, 0.2, 7.0), Vec3::new(0.0, 1.6, -102.0), 15.0);

    world.update_queries();
}

//! Momentum Physics - Collision queries and the character motor using rapier3d
//!
//! Provides a static collision world split into ground and wall layers, and a
//! kinematic character body that implements the movement core's
//! [`Motor`](momentum_core::Motor).

mod character_controller;

pub use character_controller::{CharacterBody, CharacterBodyConfig, RapierMotor};

use glam::{Quat, Vec3};
use nalgebra::{Quaternion, Unit, UnitQuaternion};
use rapier3d::prelude::*;
use tracing::debug;

use momentum_core::{ProbeLayer, RayHit};

/// Collision group of surfaces the character can stand on
pub const GROUND_GROUP: Group = Group::GROUP_1;
/// Collision group of surfaces the character can wall-run on
pub const WALL_GROUP: Group = Group::GROUP_2;
/// Collision group of character capsules
pub const CHARACTER_GROUP: Group = Group::GROUP_3;

/// Which probe layers a static surface belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Floors and ramps
    Ground,
    /// Wall-runnable walls
    Wall,
    /// Blocks whose tops are floors and whose sides are walls
    Block,
}

impl SurfaceKind {
    fn groups(self) -> InteractionGroups {
        let memberships = match self {
            SurfaceKind::Ground => GROUND_GROUP,
            SurfaceKind::Wall => WALL_GROUP,
            SurfaceKind::Block => GROUND_GROUP | WALL_GROUP,
        };
        InteractionGroups::new(memberships, Group::ALL)
    }
}

/// Query groups that only see one probe layer
pub fn layer_groups(layer: ProbeLayer) -> InteractionGroups {
    let filter = match layer {
        ProbeLayer::Ground => GROUND_GROUP,
        ProbeLayer::Wall => WALL_GROUP,
    };
    InteractionGroups::new(Group::ALL, filter)
}

/// Query groups that see every static surface
pub fn solid_groups() -> InteractionGroups {
    InteractionGroups::new(Group::ALL, GROUND_GROUP | WALL_GROUP)
}

// ---- glam <-> nalgebra ----

pub(crate) fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub(crate) fn to_glam(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub(crate) fn to_rotation(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::new_normalize(Quaternion::new(q.w, q.x, q.y, q.z))
}

pub(crate) fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    Isometry::from_parts(Translation::from(to_vector(position)), to_rotation(rotation))
}

/// The static collision world the character moves through
pub struct PhysicsWorld {
    /// Rigid body storage (queries need it even without dynamic bodies)
    pub rigid_body_set: RigidBodySet,
    /// Collider storage
    pub collider_set: ColliderSet,

    /// Query pipeline for raycasts, overlaps and character moves
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Rebuild the query acceleration structure after colliders were added or moved
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    pub fn query_pipeline(&self) -> &QueryPipeline {
        &self.query_pipeline
    }

    /// Add a static collider (ground, walls, etc.)
    pub fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.collider_set.insert(collider)
    }

    /// Get a collider by handle
    pub fn get_collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.collider_set.get(handle)
    }

    /// Cast a ray and get detailed hit information
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        let ray = Ray::new(point![origin.x, origin.y, origin.z], to_vector(direction));

        self.query_pipeline
            .cast_ray_and_get_normal(&self.rigid_body_set, &self.collider_set, &ray, max_distance, true, filter)
            .map(|(_, intersection)| RayHit {
                distance: intersection.time_of_impact,
                point: origin + direction * intersection.time_of_impact,
                normal: to_glam(&intersection.normal),
            })
    }

    /// Cast a ray against a single probe layer
    pub fn raycast_layer(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layer: ProbeLayer,
        exclude: Option<ColliderHandle>,
    ) -> Option<RayHit> {
        let mut filter = QueryFilter::default().groups(layer_groups(layer));
        if let Some(handle) = exclude {
            filter = filter.exclude_collider(handle);
        }
        self.raycast(origin, direction, max_distance, filter)
    }

    /// Number of static surfaces a shape overlaps at the given pose
    pub fn overlap_count(&self, shape: &dyn Shape, position: &Isometry<Real>, filter: QueryFilter) -> usize {
        let mut count = 0;
        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            position,
            shape,
            filter,
            |_| {
                count += 1;
                true
            },
        );
        count
    }

    // ---- Course building ----

    /// Create an infinite ground plane
    pub fn create_ground(&mut self, y: f32) -> ColliderHandle {
        let normal = Unit::new_normalize(vector![0.0, 1.0, 0.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, y, 0.0])
            .collision_groups(SurfaceKind::Ground.groups())
            .friction(0.0)
            .build();
        self.add_static_collider(ground)
    }

    /// Create a static box on the given layers
    pub fn create_box(&mut self, half_extents: Vec3, position: Vec3, kind: SurfaceKind) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(to_vector(position))
            .collision_groups(kind.groups())
            .friction(0.0)
            .build();
        debug!("Created {:?} box at {:?} with half extents {:?}", kind, position, half_extents);
        self.add_static_collider(collider)
    }

    /// Create a wall-runnable wall
    pub fn create_wall(&mut self, half_extents: Vec3, position: Vec3) -> ColliderHandle {
        self.create_box(half_extents, position, SurfaceKind::Wall)
    }

    /// Create a ramp pitched `angle_degrees` about the X axis, rising toward -Z
    pub fn create_ramp(&mut self, half_extents: Vec3, position: Vec3, angle_degrees: f32) -> ColliderHandle {
        let rotation = Quat::from_rotation_x(angle_degrees.to_radians());
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .position(to_isometry(position, rotation))
            .collision_groups(SurfaceKind::Ground.groups())
            .friction(0.0)
            .build();
        debug!("Created {:.0} degree ramp at {:?}", angle_degrees, position);
        self.add_static_collider(collider)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_creation() {
        let mut world = PhysicsWorld::new();
        let ground = world.create_ground(0.0);
        assert!(world.get_collider(ground).is_some());
    }

    #[test]
    fn test_raycast_hits_ground() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        world.update_queries();

        let hit = world
            .raycast_layer(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y, 100.0, ProbeLayer::Ground, None)
            .unwrap();
        assert!((hit.distance - 10.0).abs() < 1e-3);
        assert!((hit.normal - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn test_layers_filter_probes() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        world.create_wall(Vec3::new(0.5, 5.0, 5.0), Vec3::new(3.0, 5.0, 0.0));
        world.update_queries();

        let origin = Vec3::new(0.0, 1.0, 0.0);
        assert!(world.raycast_layer(origin, Vec3::X, 10.0, ProbeLayer::Wall, None).is_some());
        assert!(world.raycast_layer(origin, Vec3::X, 10.0, ProbeLayer::Ground, None).is_none());
        assert!(world.raycast_layer(origin, Vec3::NEG_Y, 10.0, ProbeLayer::Wall, None).is_none());
    }

    #[test]
    fn test_block_is_both_layers() {
        let mut world = PhysicsWorld::new();
        world.create_box(Vec3::ONE, Vec3::ZERO, SurfaceKind::Block);
        world.update_queries();

        let above = Vec3::new(0.0, 5.0, 0.0);
        let beside = Vec3::new(5.0, 0.0, 0.0);
        assert!(world.raycast_layer(above, Vec3::NEG_Y, 10.0, ProbeLayer::Ground, None).is_some());
        assert!(world.raycast_layer(beside, Vec3::NEG_X, 10.0, ProbeLayer::Wall, None).is_some());
    }

    #[test]
    fn test_ramp_normal_leans() {
        let mut world = PhysicsWorld::new();
        world.create_ramp(Vec3::new(2.0, 0.1, 5.0), Vec3::ZERO, 30.0);
        world.update_queries();

        let hit = world
            .raycast_layer(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 10.0, ProbeLayer::Ground, None)
            .unwrap();
        let angle = hit.normal.angle_between(Vec3::Y).to_degrees();
        assert!((angle - 30.0).abs() < 0.5);
    }

    #[test]
    fn test_zero_direction_misses() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        world.update_queries();
        assert!(world.raycast(Vec3::Y, Vec3::ZERO, 10.0, QueryFilter::default()).is_none());
    }
}

//! Kinematic character body using rapier3d's kinematic character controller
//!
//! The body keeps its own pose and capsule, moves through the static world
//! with [`KinematicCharacterController`], and derives grounding from the move
//! result plus a short ground probe. [`RapierMotor`] lends it to the movement
//! core for one tick.

use glam::{Quat, Vec3};
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;
use tracing::{debug, trace};

use momentum_core::math::{angle_degrees, project_on_plane};
use momentum_core::{CapsuleDimensions, GroundingStatus, Motor, ProbeLayer, RayHit, Transform};

use crate::{solid_groups, to_glam, to_isometry, to_vector, PhysicsWorld, CHARACTER_GROUP};

/// Extra reach of the ground probe past the expected contact distance
const GROUND_PROBE_MARGIN: f32 = 0.05;

/// Character body configuration
#[derive(Debug, Clone)]
pub struct CharacterBodyConfig {
    /// Initial capsule
    pub capsule: CapsuleDimensions,
    /// Maximum walkable slope in degrees (default: 45)
    pub max_slope_angle: f32,
    /// Step height for climbing stairs (default: 0.25m)
    pub step_height: f32,
    /// Skin width for collision detection (default: 0.02m)
    pub skin_width: f32,
    /// Maximum ground snap distance
    pub ground_snap_distance: f32,
}

impl Default for CharacterBodyConfig {
    fn default() -> Self {
        Self {
            capsule: CapsuleDimensions::default(),
            max_slope_angle: 45.0,
            step_height: 0.25,
            skin_width: 0.02,
            ground_snap_distance: 0.2,
        }
    }
}

/// A capsule moved kinematically through a [`PhysicsWorld`]
pub struct CharacterBody {
    /// Configuration
    pub config: CharacterBodyConfig,
    /// Feet position and facing
    transform: Transform,
    capsule: CapsuleDimensions,
    /// Capsule changed since the collider was last updated
    capsule_dirty: bool,
    grounding: GroundingStatus,
    last_grounding: GroundingStatus,
    unground_requested: bool,
    collider_handle: Option<ColliderHandle>,
    /// Rapier's kinematic character controller
    controller: KinematicCharacterController,
}

impl CharacterBody {
    /// Create a body with default config
    pub fn new() -> Self {
        Self::with_config(CharacterBodyConfig::default())
    }

    /// Create a body with custom config
    pub fn with_config(config: CharacterBodyConfig) -> Self {
        let mut controller = KinematicCharacterController::default();
        controller.max_slope_climb_angle = config.max_slope_angle.to_radians();
        controller.min_slope_slide_angle = config.max_slope_angle.to_radians();
        controller.autostep = Some(CharacterAutostep {
            max_height: CharacterLength::Absolute(config.step_height),
            min_width: CharacterLength::Relative(0.5),
            include_dynamic_bodies: false,
        });
        controller.snap_to_ground = Some(CharacterLength::Absolute(config.ground_snap_distance));
        controller.offset = CharacterLength::Absolute(config.skin_width);

        Self {
            capsule: config.capsule,
            config,
            transform: Transform::default(),
            capsule_dirty: false,
            grounding: GroundingStatus::airborne(),
            last_grounding: GroundingStatus::airborne(),
            unground_requested: false,
            collider_handle: None,
            controller,
        }
    }

    /// Spawn the character collider with its feet at `position`
    pub fn spawn(&mut self, physics: &mut PhysicsWorld, position: Vec3) -> ColliderHandle {
        self.transform = Transform {
            rotation: self.transform.rotation,
            ..Transform::from_position(position)
        };

        let collider = ColliderBuilder::new(capsule_shape(&self.capsule))
            .translation(to_vector(self.capsule_center()))
            .collision_groups(InteractionGroups::new(CHARACTER_GROUP, Group::ALL))
            .friction(0.0) // Smooth sliding against walls
            .restitution(0.0)
            .build();

        let handle = physics.add_static_collider(collider);
        self.collider_handle = Some(handle);
        debug!("Spawned character at {:?}", position);
        handle
    }

    /// Move by `velocity * dt`, colliding with the world.
    ///
    /// Returns the velocity that was actually achieved, flattened onto the
    /// ground while touching it.
    pub fn move_with_velocity(&mut self, physics: &mut PhysicsWorld, velocity: Vec3, dt: f32) -> Vec3 {
        if dt <= 0.0 {
            return velocity;
        }
        self.apply_capsule(physics);

        let shape = capsule_shape(&self.capsule);
        let pose = to_isometry(self.capsule_center(), Quat::IDENTITY);

        let snap = self.controller.snap_to_ground;
        if self.unground_requested {
            self.controller.snap_to_ground = None;
        }

        let movement = self.controller.move_shape(
            dt,
            &physics.rigid_body_set,
            &physics.collider_set,
            physics.query_pipeline(),
            &*shape,
            &pose,
            to_vector(velocity * dt),
            self.query_filter(),
            |_| {},
        );
        self.controller.snap_to_ground = snap;

        self.transform.translate(to_glam(&movement.translation));
        self.sync_collider(physics);

        self.last_grounding = self.grounding;
        self.grounding = if self.unground_requested {
            GroundingStatus::airborne()
        } else {
            self.probe_ground(physics, movement.grounded)
        };
        self.unground_requested = false;

        if !self.last_grounding.is_stable_on_ground && self.grounding.is_stable_on_ground {
            trace!("Character landed at {:?}", self.transform.position);
        }

        let achieved = to_glam(&movement.translation) / dt;
        if self.grounding.found_any_ground {
            project_on_plane(achieved, self.grounding.ground_normal)
        } else {
            achieved
        }
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    pub fn capsule(&self) -> CapsuleDimensions {
        self.capsule
    }

    pub fn grounding(&self) -> GroundingStatus {
        self.grounding
    }

    pub fn collider_handle(&self) -> Option<ColliderHandle> {
        self.collider_handle
    }

    /// Lend the body to the movement core for one tick
    pub fn motor<'a>(&'a mut self, world: &'a PhysicsWorld) -> RapierMotor<'a> {
        RapierMotor { body: self, world }
    }

    fn capsule_center(&self) -> Vec3 {
        self.transform.position + self.transform.up() * self.capsule.y_offset
    }

    fn query_filter(&self) -> QueryFilter<'static> {
        let filter = QueryFilter::default().groups(solid_groups());
        match self.collider_handle {
            Some(handle) => filter.exclude_collider(handle),
            None => filter,
        }
    }

    fn apply_capsule(&mut self, physics: &mut PhysicsWorld) {
        if !self.capsule_dirty {
            return;
        }
        if let Some(collider) = self.collider_handle.and_then(|h| physics.collider_set.get_mut(h)) {
            collider.set_shape(capsule_shape(&self.capsule));
        }
        self.capsule_dirty = false;
    }

    fn sync_collider(&self, physics: &mut PhysicsWorld) {
        if let Some(collider) = self.collider_handle.and_then(|h| physics.collider_set.get_mut(h)) {
            collider.set_translation(to_vector(self.capsule_center()));
        }
    }

    /// Ground below the capsule, within contact distance for its slope
    fn probe_ground(&self, physics: &PhysicsWorld, touching: bool) -> GroundingStatus {
        let up = self.transform.up();
        let capsule = &self.capsule;
        let center = self.capsule_center();
        let cylinder_half = (capsule.height / 2.0 - capsule.radius).max(0.0);
        let reach = cylinder_half + capsule.radius * 3.0 + self.config.skin_width + GROUND_PROBE_MARGIN;

        let hit = physics.raycast_layer(center, -up, reach, ProbeLayer::Ground, self.collider_handle);

        let normal = match hit {
            Some(hit) => {
                let cos = hit.normal.dot(up).max(0.05);
                let contact = cylinder_half + capsule.radius / cos;
                let in_contact = hit.distance <= contact + self.config.skin_width + GROUND_PROBE_MARGIN;
                (in_contact || touching).then_some(hit.normal)
            }
            None if touching => Some(up),
            None => None,
        };

        match normal {
            Some(normal) if angle_degrees(up, normal) <= self.config.max_slope_angle => {
                GroundingStatus::stable(normal)
            }
            Some(normal) => GroundingStatus::unstable(normal),
            None => GroundingStatus::airborne(),
        }
    }
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self::new()
    }
}

/// Capsule along Y with its hemispheres inside `height`
fn capsule_shape(capsule: &CapsuleDimensions) -> SharedShape {
    let half_height = (capsule.height / 2.0 - capsule.radius).max(0.01);
    SharedShape::capsule_y(half_height, capsule.radius)
}

/// A [`CharacterBody`] and the world it moves in, borrowed for one tick
pub struct RapierMotor<'a> {
    body: &'a mut CharacterBody,
    world: &'a PhysicsWorld,
}

impl Motor for RapierMotor<'_> {
    fn grounding_status(&self) -> GroundingStatus {
        self.body.grounding
    }

    fn last_grounding_status(&self) -> GroundingStatus {
        self.body.last_grounding
    }

    fn character_up(&self) -> Vec3 {
        self.body.transform.up()
    }

    fn character_forward(&self) -> Vec3 {
        self.body.transform.forward()
    }

    fn character_right(&self) -> Vec3 {
        self.body.transform.right()
    }

    fn position(&self) -> Vec3 {
        self.body.transform.position
    }

    fn rotation(&self) -> Quat {
        self.body.transform.rotation
    }

    fn set_capsule_dimensions(&mut self, dimensions: CapsuleDimensions) {
        if self.body.capsule != dimensions {
            self.body.capsule = dimensions;
            self.body.capsule_dirty = true;
        }
    }

    fn overlap_count(&self, position: Vec3, rotation: Quat) -> usize {
        let capsule = &self.body.capsule;
        let skin = self.body.config.skin_width;
        let half_height = (capsule.height / 2.0 - capsule.radius).max(0.01);
        let shape = SharedShape::capsule_y(half_height, (capsule.radius - skin).max(0.01));
        let center = position + rotation * (Vec3::Y * capsule.y_offset);

        self.world
            .overlap_count(&*shape, &to_isometry(center, rotation), self.body.query_filter())
    }

    fn force_unground(&mut self) {
        self.body.unground_requested = true;
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layer: ProbeLayer,
    ) -> Option<RayHit> {
        self.world
            .raycast_layer(origin, direction, max_distance, layer, self.body.collider_handle)
    }
}

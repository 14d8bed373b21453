//! Camrig Physics - Collision probe backend using rapier3d
//!
//! Provides [`CollisionWorld`], a thin collision-query world implementing
//! the rig's [`CollisionQuery`] interface: sphere sweeps for the spring arm
//! probe and multi-hit box sweeps for the occlusion fade probe. Colliders
//! carry an optional [`ActorId`] in their user data so hits can be
//! attributed back to world actors.

use std::collections::HashSet;

use camrig::{CollisionChannel, CollisionQuery, SweepHit};
use camrig_core::ActorId;
use glam::{Quat, Vec3};
use nalgebra::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::prelude::*;

/// Collision-query world backing the rig's probes.
///
/// Holds colliders only; the host's physics simulation owns dynamics. Call
/// [`CollisionWorld::update`] after mutating colliders so queries see the
/// latest state.
pub struct CollisionWorld {
    /// Collider storage
    pub collider_set: ColliderSet,
    /// Rigid body storage (queries need one even when empty)
    pub rigid_body_set: RigidBodySet,
    /// Island manager, needed for collider removal
    island_manager: IslandManager,
    /// Query pipeline for sweeps
    query_pipeline: QueryPipeline,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self {
            collider_set: ColliderSet::new(),
            rigid_body_set: RigidBodySet::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Refresh the query pipeline after collider changes
    pub fn update(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a static collider on the given channels (walls, terrain, props)
    pub fn add_static_collider(
        &mut self,
        collider: Collider,
        channels: CollisionChannel,
    ) -> ColliderHandle {
        let mut collider = collider;
        collider.set_collision_groups(InteractionGroups::new(
            Group::from_bits_truncate(channels.0),
            Group::ALL,
        ));
        self.collider_set.insert(collider)
    }

    /// Add a collider attributed to a world actor
    pub fn add_actor_collider(
        &mut self,
        actor: ActorId,
        collider: Collider,
        channels: CollisionChannel,
    ) -> ColliderHandle {
        let mut collider = collider;
        collider.user_data = actor.to_u128();
        self.add_static_collider(collider, channels)
    }

    /// Remove a collider
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set
            .remove(handle, &mut self.island_manager, &mut self.rigid_body_set, false);
    }

    /// Move a collider (kinematic actors the probes should track)
    pub fn set_collider_position(&mut self, handle: ColliderHandle, position: Vec3) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.set_translation(vector![position.x, position.y, position.z]);
        }
    }

    /// Actor a collider is attributed to, if any
    pub fn collider_actor(&self, handle: ColliderHandle) -> Option<ActorId> {
        self.collider_set
            .get(handle)
            .and_then(|collider| ActorId::from_u128(collider.user_data))
    }

    /// Sweep an oriented box from `start` to `end`, returning every distinct
    /// actor struck along the way.
    ///
    /// rapier reports one hit per cast, so the sweep is repeated with
    /// already-struck colliders excluded until nothing else is hit.
    pub fn sweep_box_all(
        &self,
        start: Vec3,
        end: Vec3,
        half_size: Vec3,
        rotation: Quat,
        channel: CollisionChannel,
    ) -> Vec<ActorId> {
        let delta = end - start;
        let distance = delta.length();
        if distance < 1e-6 {
            return Vec::new();
        }
        let direction = delta / distance;

        let shape = Cuboid::new(vector![half_size.x, half_size.y, half_size.z]);
        let shape_pos = Isometry::from_parts(
            Translation3::new(start.x, start.y, start.z),
            UnitQuaternion::from_quaternion(Quaternion::new(
                rotation.w, rotation.x, rotation.y, rotation.z,
            )),
        );
        let shape_vel = vector![direction.x, direction.y, direction.z];
        let groups = InteractionGroups::new(Group::ALL, Group::from_bits_truncate(channel.0));

        let mut struck_colliders: HashSet<ColliderHandle> = HashSet::new();
        let mut actors = Vec::new();

        // bounded in case of degenerate geometry
        for _ in 0..64 {
            let predicate =
                |handle: ColliderHandle, _collider: &Collider| !struck_colliders.contains(&handle);
            let filter = QueryFilter::default().groups(groups).predicate(&predicate);
            let options = ShapeCastOptions {
                max_time_of_impact: distance,
                stop_at_penetration: true,
                ..Default::default()
            };

            let Some((handle, _hit)) = self.query_pipeline.cast_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &shape_pos,
                &shape_vel,
                &shape,
                options,
                filter,
            ) else {
                break;
            };

            struck_colliders.insert(handle);
            if let Some(actor) = self.collider_actor(handle) {
                if !actors.contains(&actor) {
                    actors.push(actor);
                }
            }
        }

        actors
    }
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionQuery for CollisionWorld {
    fn sweep_sphere(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        channel: CollisionChannel,
        exclude: Option<ActorId>,
    ) -> Option<SweepHit> {
        let delta = end - start;
        let distance = delta.length();
        if distance < 1e-6 {
            return None;
        }
        let direction = delta / distance;

        let shape = Ball::new(radius);
        let shape_pos = Isometry::translation(start.x, start.y, start.z);
        let shape_vel = vector![direction.x, direction.y, direction.z];
        let groups = InteractionGroups::new(Group::ALL, Group::from_bits_truncate(channel.0));

        let excluded = exclude.map(ActorId::to_u128);
        let predicate = |_handle: ColliderHandle, collider: &Collider| match excluded {
            Some(user_data) => collider.user_data != user_data,
            None => true,
        };
        let filter = QueryFilter::default().groups(groups).predicate(&predicate);
        let options = ShapeCastOptions {
            max_time_of_impact: distance,
            stop_at_penetration: true,
            ..Default::default()
        };

        self.query_pipeline
            .cast_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &shape_pos,
                &shape_vel,
                &shape,
                options,
                filter,
            )
            .map(|(handle, hit)| SweepHit {
                location: start + direction * hit.time_of_impact,
                distance: hit.time_of_impact,
                actor: self.collider_actor(handle),
            })
    }
}

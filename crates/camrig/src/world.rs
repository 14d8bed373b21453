//! Collaborator interfaces at the rig's boundary
//!
//! The rig never talks to a scene graph, input device, physics engine, or
//! material system directly. The host hands it these capabilities each tick
//! through a [`RigEnvironment`]; every one of them is optional, and a missing
//! collaborator turns the dependent portion of a subsystem's tick into a
//! no-op rather than an error. A rig may legitimately tick before it is
//! fully attached.

use camrig_core::{ActorId, Rotator, Transform};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Collision channel bitmask used to filter probe queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionChannel(pub u32);

impl CollisionChannel {
    /// Camera-blocking geometry (the spring arm probe)
    pub const CAMERA: CollisionChannel = CollisionChannel(1);
    /// Visibility geometry (the occlusion fade probe)
    pub const VISIBILITY: CollisionChannel = CollisionChannel(1 << 1);
}

impl Default for CollisionChannel {
    fn default() -> Self {
        Self::CAMERA
    }
}

/// Result of a blocking shape sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Where the swept shape's center stops
    pub location: Vec3,
    /// Distance traveled from the sweep start
    pub distance: f32,
    /// Actor that was struck, when the backend can attribute the hit
    pub actor: Option<ActorId>,
}

/// Synchronous shape-sweep queries against world geometry.
pub trait CollisionQuery {
    /// Sweep a sphere from `start` to `end` and return the first blocking hit
    fn sweep_sphere(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        channel: CollisionChannel,
        exclude: Option<ActorId>,
    ) -> Option<SweepHit>;
}

/// World actor and material access used by the occlusion fade subsystem.
pub trait FadeScene {
    /// Sweep an oriented box from `start` to `end` and return every struck actor
    fn sweep_box_all(
        &self,
        start: Vec3,
        end: Vec3,
        half_size: Vec3,
        rotation: Quat,
        channel: CollisionChannel,
    ) -> Vec<ActorId>;

    /// Whether the handle still refers to a live actor
    fn is_actor_valid(&self, actor: ActorId) -> bool;

    /// Set a named scalar parameter on every renderable surface of the actor
    fn set_scalar_parameter(&mut self, actor: ActorId, name: &str, value: f32);
}

/// Control-rotation access on the subject's controller.
pub trait ViewController {
    fn control_rotation(&self) -> Rotator;
    fn set_control_rotation(&mut self, rotation: Rotator);
}

/// View parameters owned by the host's camera manager.
pub trait CameraManager {
    fn fov(&self) -> f32;
    fn set_fov(&mut self, fov: f32);

    fn view_pitch_min(&self) -> f32;
    fn set_view_pitch_min(&mut self, pitch: f32);

    fn view_pitch_max(&self) -> f32;
    fn set_view_pitch_max(&mut self, pitch: f32);
}

/// Snapshot of the subject the rig is attached to, taken by the host after
/// physics so the transform for this frame is final.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectState {
    pub actor: ActorId,
    pub transform: Transform,
    pub velocity: Vec3,
    /// The subject's view rotation (its control rotation, typically)
    pub view_rotation: Rotator,
}

/// Everything the host lends the rig for one tick.
pub struct RigEnvironment<'a> {
    /// World transform of the rig component itself (the spring arm's mount)
    pub rig_transform: Transform,
    pub subject: Option<SubjectState>,
    pub controller: Option<&'a mut dyn ViewController>,
    pub camera: Option<&'a mut dyn CameraManager>,
    pub collision: Option<&'a dyn CollisionQuery>,
    pub scene: Option<&'a mut dyn FadeScene>,
}

impl<'a> RigEnvironment<'a> {
    /// An environment with no collaborators attached
    pub fn detached(rig_transform: Transform) -> Self {
        Self {
            rig_transform,
            subject: None,
            controller: None,
            camera: None,
            collision: None,
            scene: None,
        }
    }
}

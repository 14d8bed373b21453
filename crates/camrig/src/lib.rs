//! Camrig - Third-person camera rig with hot-swappable camera modes
//!
//! The rig computes, once per frame, the world pose of a camera attached to a
//! moving subject. Behavior is described by camera modes: ordered sets of
//! subsystem settings (field of view, transform/lag/collision, occlusion
//! fade). Switching modes reconciles live subsystem instances instead of
//! rebuilding them, so continuity state survives the switch and the camera
//! blends rather than pops.
//!
//! The host owns scheduling: it calls [`CameraRig::tick`] once per frame,
//! after the subject's physics update, passing the external collaborators
//! (controller, camera manager, collision backend, fade scene) through a
//! [`RigEnvironment`]. Any missing collaborator degrades the dependent part
//! of the tick to a no-op.

pub mod error;
pub mod mode;
pub mod rig;
pub mod subsystems;
pub mod world;

pub use error::RigError;
pub use mode::{CameraMode, ModeId, ModeLibrary, SubsystemSettings};
pub use rig::{CameraRig, RigSnapshot, TransformSpace};
pub use subsystems::{
    EnterContext, FadeSettings, FadeSubsystem, FovSettings, FovSubsystem, Subsystem,
    SubsystemKind, TransformSettings, TransformSubsystem,
};
pub use world::{
    CameraManager, CollisionChannel, CollisionQuery, FadeScene, RigEnvironment, SubjectState,
    SweepHit, ViewController,
};

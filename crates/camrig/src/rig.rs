//! The camera rig ("spring arm")
//!
//! Owns the live subsystem instances, the active camera mode, and the cached
//! rotation input. Mode switches reconcile instances by kind: a subsystem
//! whose kind survives into the new mode keeps its continuity state and only
//! swaps settings; kinds absent from the new mode are torn down.

use camrig_core::{Rotator, Transform};
use glam::Vec3;
use tracing::{debug, error};

use crate::error::RigError;
use crate::mode::{ModeId, ModeLibrary};
use crate::subsystems::{EnterContext, Subsystem, SubsystemKind, TransformSubsystem};
use crate::world::RigEnvironment;

/// Space a socket transform is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSpace {
    /// World space
    World,
    /// Relative to the owning actor's transform
    Actor,
    /// Relative to the rig component's own transform
    Component,
}

/// Read-only view of rig state handed to subsystems during a tick.
#[derive(Debug, Clone, Copy)]
pub struct RigSnapshot {
    /// Last sampled look-rotation input, possibly stale across render ticks
    pub rotation_input: Rotator,
    /// Whether the rig's rotation is world-locked rather than inherited
    pub use_absolute_rotation: bool,
    /// World transform of the rig component
    pub rig_transform: Transform,
    /// World transform of the owning actor
    pub owner_transform: Transform,
    /// Currently resolved camera pose (world space)
    pub camera_transform: Transform,
}

/// The camera rig.
///
/// Not thread-safe by design: one rig is owned and ticked by exactly one
/// scheduling context, once per frame, after the subject's physics update.
#[derive(Debug)]
pub struct CameraRig {
    modes: ModeLibrary,
    current_mode: Option<ModeId>,
    subsystems: Vec<Subsystem>,
    rotation_input: Rotator,
    use_absolute_rotation: bool,
    rig_transform: Transform,
    owner_transform: Transform,
}

impl CameraRig {
    pub fn new(modes: ModeLibrary) -> Self {
        Self {
            modes,
            current_mode: None,
            subsystems: Vec::new(),
            rotation_input: Rotator::ZERO,
            use_absolute_rotation: false,
            rig_transform: Transform::IDENTITY,
            owner_transform: Transform::IDENTITY,
        }
    }

    /// The active mode's tag; `None` before the first successful switch.
    pub fn current_mode(&self) -> Option<&ModeId> {
        self.current_mode.as_ref()
    }

    pub fn modes(&self) -> &ModeLibrary {
        &self.modes
    }

    /// Switch to the mode with the given tag.
    ///
    /// Reconciles live subsystems against the new mode's templates: same-kind
    /// instances are kept (settings swapped, continuity state preserved),
    /// missing kinds are materialized, leftover kinds are torn down. Swapping
    /// to the already-active mode is a no-op. An unknown tag fails with
    /// [`RigError::ModeNotFound`] and leaves the rig untouched.
    pub fn set_mode(&mut self, tag: &str) -> Result<(), RigError> {
        if self
            .current_mode
            .as_ref()
            .is_some_and(|current| current.as_str() == tag)
        {
            return Ok(());
        }

        let Some(mode) = self.modes.get(tag) else {
            error!(tag, "camera mode not found");
            return Err(RigError::ModeNotFound(tag.to_owned()));
        };

        let context = EnterContext {
            // Only the very first activation snaps; every later switch blends.
            with_interpolation: self.current_mode.is_some(),
        };
        self.current_mode = Some(mode.id().clone());

        let mut next = Vec::with_capacity(mode.subsystems().len());
        for template in mode.subsystems() {
            let kind = template.kind();
            let mut instance = match self
                .subsystems
                .iter()
                .position(|subsystem| subsystem.kind() == kind)
            {
                Some(index) => {
                    debug!(?kind, "reusing camera subsystem");
                    let mut subsystem = self.subsystems.remove(index);
                    subsystem.set_settings(template.clone());
                    subsystem
                }
                None => {
                    debug!(?kind, "materializing camera subsystem");
                    Subsystem::from_settings(template.clone())
                }
            };
            instance.on_enter_mode(&context);
            next.push(instance);
        }

        for leftover in self.subsystems.drain(..) {
            debug!(kind = ?leftover.kind(), "tearing down camera subsystem");
        }
        self.subsystems = next;

        debug_assert!(
            self.subsystems
                .iter()
                .enumerate()
                .all(|(index, subsystem)| {
                    !self.subsystems[..index]
                        .iter()
                        .any(|other| other.kind() == subsystem.kind())
                }),
            "two subsystems of the same kind may not coexist"
        );

        Ok(())
    }

    /// Cache the latest look-rotation input sample.
    ///
    /// Called once per input tick; subsystems read the cached value during
    /// the render/physics tick and tolerate it being stale.
    pub fn on_rotation_input(&mut self, input: Rotator) {
        self.rotation_input = input;
    }

    pub fn rotation_input(&self) -> Rotator {
        self.rotation_input
    }

    /// Lock the rig's rotation to world space instead of inheriting.
    pub fn set_use_absolute_rotation(&mut self, absolute: bool) {
        self.use_absolute_rotation = absolute;
    }

    /// Place the rig component before the first tick.
    pub fn set_rig_transform(&mut self, transform: Transform) {
        self.rig_transform = transform;
    }

    /// Advance every live subsystem by one frame.
    ///
    /// Precondition: the subject's transform for this frame is already final.
    /// `dt` is seconds and must be non-negative; a `dt` of zero changes no
    /// time-integrated state.
    pub fn tick(&mut self, env: &mut RigEnvironment<'_>, dt: f32) {
        debug_assert!(dt >= 0.0, "tick delta must be non-negative");

        self.rig_transform = env.rig_transform;
        if let Some(subject) = env.subject {
            self.owner_transform = subject.transform;
        }

        // Snapshot per subsystem so ones ticked after the transform subsystem
        // observe the freshly resolved camera pose.
        for index in 0..self.subsystems.len() {
            let snapshot = self.snapshot();
            self.subsystems[index].tick(&snapshot, env, dt);
        }
    }

    /// The resolved camera pose in the requested space.
    ///
    /// Falls back to the owning actor's transform when no transform
    /// subsystem is live.
    pub fn socket_transform(&self, space: TransformSpace) -> Transform {
        match self.transform_subsystem() {
            Some(subsystem) => {
                subsystem.socket_transform(space, &self.rig_transform, &self.owner_transform)
            }
            None => self.owner_transform,
        }
    }

    pub fn camera_location(&self) -> Vec3 {
        self.socket_transform(TransformSpace::World).position
    }

    pub fn camera_rotation(&self) -> Rotator {
        Rotator::from_quat(self.socket_transform(TransformSpace::World).rotation)
    }

    /// Live subsystems in tick order.
    pub fn subsystems(&self) -> &[Subsystem] {
        &self.subsystems
    }

    /// Look up the live subsystem of a kind, if the active mode carries one.
    pub fn subsystem(&self, kind: SubsystemKind) -> Option<&Subsystem> {
        self.subsystems
            .iter()
            .find(|subsystem| subsystem.kind() == kind)
    }

    pub fn subsystem_mut(&mut self, kind: SubsystemKind) -> Option<&mut Subsystem> {
        self.subsystems
            .iter_mut()
            .find(|subsystem| subsystem.kind() == kind)
    }

    /// Typed access to the transform subsystem for diagnostics.
    pub fn transform_subsystem(&self) -> Option<&TransformSubsystem> {
        self.subsystems.iter().find_map(|subsystem| match subsystem {
            Subsystem::Transform(transform) => Some(transform),
            _ => None,
        })
    }

    fn snapshot(&self) -> RigSnapshot {
        RigSnapshot {
            rotation_input: self.rotation_input,
            use_absolute_rotation: self.use_absolute_rotation,
            rig_transform: self.rig_transform,
            owner_transform: self.owner_transform,
            camera_transform: self.socket_transform(TransformSpace::World),
        }
    }
}

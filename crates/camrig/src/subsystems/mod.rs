//! Camera subsystems
//!
//! A subsystem is an independently tickable behavior unit. The set is closed
//! and dispatched through a tagged union: modes name a kind plus settings,
//! and the rig materializes instances during mode reconciliation.

mod fade;
mod fov;
mod transform;

use serde::{Deserialize, Serialize};

pub use fade::{FadeSettings, FadeSubsystem};
pub use fov::{FovSettings, FovSubsystem};
pub use transform::{TransformSettings, TransformSubsystem};

use crate::mode::SubsystemSettings;
use crate::rig::RigSnapshot;
use crate::world::RigEnvironment;

/// Identifies which behavior a subsystem instance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubsystemKind {
    Fov,
    Transform,
    Fade,
}

/// Passed to [`Subsystem::on_enter_mode`] when a mode becomes active.
#[derive(Debug, Clone, Copy)]
pub struct EnterContext {
    /// False only on the very first activation, when there is no prior mode
    /// to blend from: interpolated state must snap straight to its targets.
    /// True on every later switch: runtime state is preserved so the next
    /// ticks blend from the previous mode's values to the new targets.
    pub with_interpolation: bool,
}

/// A live camera subsystem instance, exclusively owned by one rig.
#[derive(Debug)]
pub enum Subsystem {
    Fov(FovSubsystem),
    Transform(TransformSubsystem),
    Fade(FadeSubsystem),
}

impl Subsystem {
    /// Materialize a fresh instance from a settings template.
    pub fn from_settings(settings: SubsystemSettings) -> Self {
        match settings {
            SubsystemSettings::Fov(settings) => Subsystem::Fov(FovSubsystem::new(settings)),
            SubsystemSettings::Transform(settings) => {
                Subsystem::Transform(TransformSubsystem::new(settings))
            }
            SubsystemSettings::Fade(settings) => Subsystem::Fade(FadeSubsystem::new(settings)),
        }
    }

    pub fn kind(&self) -> SubsystemKind {
        match self {
            Subsystem::Fov(_) => SubsystemKind::Fov,
            Subsystem::Transform(_) => SubsystemKind::Transform,
            Subsystem::Fade(_) => SubsystemKind::Fade,
        }
    }

    /// Current settings, cloned as a unit.
    pub fn settings(&self) -> SubsystemSettings {
        match self {
            Subsystem::Fov(sub) => SubsystemSettings::Fov(sub.settings().clone()),
            Subsystem::Transform(sub) => SubsystemSettings::Transform(sub.settings().clone()),
            Subsystem::Fade(sub) => SubsystemSettings::Fade(sub.settings().clone()),
        }
    }

    /// Swap settings without touching runtime continuity state.
    ///
    /// The new settings must be of this instance's kind; a mismatch is a
    /// caller contract breach.
    pub fn set_settings(&mut self, settings: SubsystemSettings) {
        match (self, settings) {
            (Subsystem::Fov(sub), SubsystemSettings::Fov(settings)) => sub.set_settings(settings),
            (Subsystem::Transform(sub), SubsystemSettings::Transform(settings)) => {
                sub.set_settings(settings)
            }
            (Subsystem::Fade(sub), SubsystemSettings::Fade(settings)) => sub.set_settings(settings),
            (sub, settings) => panic!(
                "settings kind {:?} does not match subsystem kind {:?}",
                settings.kind(),
                sub.kind()
            ),
        }
    }

    /// Invoked exactly once when the instance is created for, or carried
    /// into, a newly activated mode.
    pub fn on_enter_mode(&mut self, context: &EnterContext) {
        match self {
            Subsystem::Fov(sub) => sub.on_enter_mode(context),
            Subsystem::Transform(sub) => sub.on_enter_mode(context),
            Subsystem::Fade(sub) => sub.on_enter_mode(context),
        }
    }

    /// Advance internal state by one frame. Safe at any `dt >= 0`; a `dt`
    /// of zero leaves all time-integrated state untouched.
    pub fn tick(&mut self, rig: &RigSnapshot, env: &mut RigEnvironment<'_>, dt: f32) {
        match self {
            Subsystem::Fov(sub) => sub.tick(env, dt),
            Subsystem::Transform(sub) => sub.tick(rig, env, dt),
            Subsystem::Fade(sub) => sub.tick(rig, env, dt),
        }
    }
}

//! Occlusion fade subsystem
//!
//! Each tick, a box probe is swept from the resolved camera location toward
//! the subject. Actors entering the probe fade in, actors leaving it fade
//! out, and a named scalar material parameter is driven from the fade
//! progress. The per-actor state machine is keyed by actor handle and
//! re-derives itself from the probe every tick, so no snapping is needed on
//! mode entry.

use camrig_core::{finterp_constant_to, ActorId};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::EnterContext;
use crate::rig::RigSnapshot;
use crate::world::{CollisionChannel, RigEnvironment};

/// Settings for the fade subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeSettings {
    /// Scalar material parameter to drive on faded actors
    pub material_parameter: String,
    /// Parameter value at fade progress 0
    pub material_parameter_min: f32,
    /// Parameter value at fade progress 1
    pub material_parameter_max: f32,
    /// Fade progress rate per second (full fade takes `1 / fade_speed`)
    pub fade_speed: f32,
    /// Channel the occlusion probe queries
    pub trace_channel: CollisionChannel,
    /// Half extents of the swept probe box
    pub trace_half_size: Vec3,
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            material_parameter: "Fade".to_owned(),
            material_parameter_min: 0.0,
            material_parameter_max: 1.0,
            fade_speed: 1.0,
            trace_channel: CollisionChannel::VISIBILITY,
            trace_half_size: Vec3::new(0.1, 1.2, 1.8),
        }
    }
}

/// Per-actor fade state.
#[derive(Debug, Clone, Copy)]
struct FadeEntry {
    actor: ActorId,
    progress: f32,
    fading_in: bool,
}

/// Live fade subsystem instance.
#[derive(Debug)]
pub struct FadeSubsystem {
    settings: FadeSettings,
    entries: Vec<FadeEntry>,
}

impl FadeSubsystem {
    pub fn new(settings: FadeSettings) -> Self {
        Self {
            settings,
            entries: Vec::new(),
        }
    }

    pub fn settings(&self) -> &FadeSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: FadeSettings) {
        self.settings = settings;
    }

    pub fn on_enter_mode(&mut self, _context: &EnterContext) {
        // Steady state re-derives from the probe within one fade cycle.
    }

    /// Fade progress for a tracked actor, if any.
    pub fn fade_progress(&self, actor: ActorId) -> Option<f32> {
        self.entries
            .iter()
            .find(|entry| entry.actor == actor)
            .map(|entry| entry.progress)
    }

    /// Actors currently tracked by the fade state machine.
    pub fn tracked_actors(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.entries.iter().map(|entry| entry.actor)
    }

    pub fn tick(&mut self, rig: &RigSnapshot, env: &mut RigEnvironment<'_>, dt: f32) {
        let Some(subject) = env.subject else {
            return;
        };
        let Some(scene) = env.scene.as_deref_mut() else {
            return;
        };

        let trace_start = rig.camera_transform.position;
        let trace_end = subject.transform.position;
        let struck = scene.sweep_box_all(
            trace_start,
            trace_end,
            self.settings.trace_half_size,
            rig.camera_transform.rotation,
            self.settings.trace_channel,
        );

        // Prune handles the world has invalidated before touching them.
        self.entries.retain(|entry| scene.is_actor_valid(entry.actor));

        for entry in &mut self.entries {
            entry.fading_in = false;
        }

        for actor in struck {
            match self.entries.iter_mut().find(|entry| entry.actor == actor) {
                Some(entry) => entry.fading_in = true,
                None => self.entries.push(FadeEntry {
                    actor,
                    progress: 0.0,
                    fading_in: true,
                }),
            }
        }

        for entry in &mut self.entries {
            let target = if entry.fading_in { 1.0 } else { 0.0 };
            entry.progress =
                finterp_constant_to(entry.progress, target, dt, self.settings.fade_speed);

            let value = self.settings.material_parameter_min
                + (self.settings.material_parameter_max - self.settings.material_parameter_min)
                    * entry.progress;
            scene.set_scalar_parameter(entry.actor, &self.settings.material_parameter, value);
        }
    }
}

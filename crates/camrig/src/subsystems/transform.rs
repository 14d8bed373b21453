//! Transform subsystem: the spring arm
//!
//! Resolves the camera pose each tick: derives the target rotation, applies
//! rate-limited lag to position and rotation (with fixed-step sub-stepping
//! for low frame rates), extends the arm, sweeps a sphere probe to keep the
//! camera out of geometry, and auto-levels the view pitch when the player
//! is moving but not looking around.
//!
//! All blends are linear constant-rate: a speed of `R` moves a value by at
//! most `R * dt` per tick and never overshoots.

use camrig_core::{
    finterp_constant_to, qinterp_constant_to, rinterp_constant_to, vinterp_constant_to, Rotator,
    Transform,
};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::EnterContext;
use crate::rig::{RigSnapshot, TransformSpace};
use crate::world::{CollisionChannel, RigEnvironment};

const MIN_SUBSTEP_REMAINDER: f32 = 1e-4;

/// Settings for the transform subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// Natural length of the spring arm when nothing is in the way
    pub target_arm_length: f32,
    /// Arm length approach rate, units per second
    pub target_arm_length_speed: f32,

    /// Offset at the end of the arm, applied in the socket's rotated space
    pub socket_offset: Vec3,
    pub socket_offset_speed: f32,

    /// Offset at the start of the arm, applied in world space
    pub target_offset: Vec3,
    pub target_offset_speed: f32,

    /// Pitch limits driven onto the camera manager
    pub view_pitch_min: f32,
    pub view_pitch_max: f32,
    /// Rate for pitch-limit driving and pitch auto-leveling, degrees per second
    pub view_min_max_speed: f32,

    /// Pitch the view settles to while the subject moves without look input
    pub desired_view_pitch: f32,
    /// Seconds of sustained idle-look + motion before auto-leveling engages
    pub min_time_to_activate_desired_view_pitch: f32,
    /// Subject speed at or above which auto-leveling may engage
    pub min_velocity_to_activate_desired_view_pitch: f32,
    /// Pitch input magnitude at or above which auto-leveling disengages
    pub min_player_input_to_stop_desired_view_pitch: f32,

    /// Radius of the collision probe sphere
    pub probe_size: f32,
    /// Channel the probe queries
    pub probe_channel: CollisionChannel,
    /// Sweep the probe to keep the camera from clipping into geometry
    pub do_collision_test: bool,

    /// Derive the target rotation from the subject's view rotation
    pub use_pawn_control_rotation: bool,
    /// Inherit pitch from the target rotation; otherwise keep the local value
    pub inherit_pitch: bool,
    pub inherit_yaw: bool,
    pub inherit_roll: bool,

    /// Lag the arm origin behind the subject's position
    pub enable_camera_lag: bool,
    /// Lag the camera rotation behind the target rotation
    pub enable_camera_rotation_lag: bool,
    /// Sub-step lag integration when a frame exceeds `camera_lag_max_time_step`
    pub use_camera_lag_substepping: bool,
    /// Position lag approach rate, units per second
    pub camera_lag_speed: f32,
    /// Rotation lag approach rate, degrees of arc per second
    pub camera_rotation_lag_speed: f32,
    /// Max sub-step size when sub-stepping is enabled
    pub camera_lag_max_time_step: f32,
    /// Max distance the lagged position may trail the arm origin; zero disables
    pub camera_lag_max_distance: f32,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            target_arm_length: 3.0,
            target_arm_length_speed: 1.0,
            socket_offset: Vec3::ZERO,
            socket_offset_speed: 1.0,
            target_offset: Vec3::ZERO,
            target_offset_speed: 1.0,
            view_pitch_min: -40.0,
            view_pitch_max: 60.0,
            view_min_max_speed: 50.0,
            desired_view_pitch: 10.0,
            min_time_to_activate_desired_view_pitch: 1.0,
            min_velocity_to_activate_desired_view_pitch: 0.1,
            min_player_input_to_stop_desired_view_pitch: 1.0,
            probe_size: 0.12,
            probe_channel: CollisionChannel::CAMERA,
            do_collision_test: true,
            use_pawn_control_rotation: false,
            inherit_pitch: true,
            inherit_yaw: true,
            inherit_roll: true,
            enable_camera_lag: false,
            enable_camera_rotation_lag: false,
            use_camera_lag_substepping: false,
            camera_lag_speed: 10.0,
            camera_rotation_lag_speed: 180.0,
            camera_lag_max_time_step: 1.0 / 60.0,
            camera_lag_max_distance: 0.0,
        }
    }
}

/// Live transform subsystem instance.
///
/// Carries the lag/continuity state between ticks and caches the resolved
/// socket pose in the rig component's space.
#[derive(Debug)]
pub struct TransformSubsystem {
    settings: TransformSettings,

    current_socket_offset: Vec3,
    current_target_offset: Vec3,
    current_arm_length: f32,

    /// Local clock accumulated from tick deltas
    time_seconds: f32,
    /// When the auto-level precondition last failed
    time_blocked_desired_view: f32,

    /// Seed lag state from targets on the next tick instead of blending
    /// in from stale or default values
    lag_reset_pending: bool,

    is_camera_fixed: bool,
    unfixed_camera_position: Vec3,

    previous_desired_location: Vec3,
    previous_arm_origin: Vec3,
    previous_desired_rotation: Rotator,

    relative_socket_location: Vec3,
    relative_socket_rotation: Quat,
}

impl TransformSubsystem {
    pub fn new(settings: TransformSettings) -> Self {
        Self {
            current_socket_offset: settings.socket_offset,
            current_target_offset: settings.target_offset,
            current_arm_length: settings.target_arm_length,
            settings,
            time_seconds: 0.0,
            time_blocked_desired_view: 0.0,
            lag_reset_pending: true,
            is_camera_fixed: false,
            unfixed_camera_position: Vec3::ZERO,
            previous_desired_location: Vec3::ZERO,
            previous_arm_origin: Vec3::ZERO,
            previous_desired_rotation: Rotator::ZERO,
            relative_socket_location: Vec3::ZERO,
            relative_socket_rotation: Quat::IDENTITY,
        }
    }

    pub fn settings(&self) -> &TransformSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: TransformSettings) {
        self.settings = settings;
    }

    pub fn on_enter_mode(&mut self, context: &EnterContext) {
        if !context.with_interpolation {
            self.current_socket_offset = self.settings.socket_offset;
            self.current_target_offset = self.settings.target_offset;
            self.current_arm_length = self.settings.target_arm_length;
            self.lag_reset_pending = true;
        }
    }

    /// The position the camera would take without the collision fix
    pub fn unfixed_camera_position(&self) -> Vec3 {
        self.unfixed_camera_position
    }

    /// Whether the collision probe is currently pinning the camera
    pub fn is_collision_fix_applied(&self) -> bool {
        self.is_camera_fixed
    }

    /// Resolved socket pose in the requested space.
    pub fn socket_transform(
        &self,
        space: TransformSpace,
        rig_transform: &Transform,
        owner_transform: &Transform,
    ) -> Transform {
        let relative = Transform::from_position_rotation(
            self.relative_socket_location,
            self.relative_socket_rotation,
        );
        match space {
            TransformSpace::Component => relative,
            TransformSpace::World => rig_transform.compose(&relative),
            TransformSpace::Actor => rig_transform.compose(&relative).relative_to(owner_transform),
        }
    }

    /// The rotation the arm is steering toward, before lag is applied.
    ///
    /// With `use_pawn_control_rotation` the controller is read live, not
    /// from the pre-tick snapshot, so a pitch auto-level applied earlier in
    /// the same tick already steers the arm.
    pub fn target_rotation(&self, rig: &RigSnapshot, env: &RigEnvironment<'_>) -> Rotator {
        let mut desired = self.world_socket_rotation(rig);

        if self.settings.use_pawn_control_rotation {
            if let Some(controller) = env.controller.as_deref() {
                desired = controller.control_rotation();
            } else if let Some(subject) = env.subject {
                desired = subject.view_rotation;
            }
        }

        if !rig.use_absolute_rotation {
            let local = Rotator::from_quat(self.relative_socket_rotation);
            if !self.settings.inherit_pitch {
                desired.pitch = local.pitch;
            }
            if !self.settings.inherit_yaw {
                desired.yaw = local.yaw;
            }
            if !self.settings.inherit_roll {
                desired.roll = local.roll;
            }
        }

        desired
    }

    fn world_socket_rotation(&self, rig: &RigSnapshot) -> Rotator {
        Rotator::from_quat(rig.rig_transform.rotation * self.relative_socket_rotation)
    }

    pub fn tick(&mut self, rig: &RigSnapshot, env: &mut RigEnvironment<'_>, dt: f32) {
        if dt > 0.0 {
            self.time_seconds += dt;
        }

        self.current_socket_offset = vinterp_constant_to(
            self.current_socket_offset,
            self.settings.socket_offset,
            dt,
            self.settings.socket_offset_speed,
        );
        self.current_target_offset = vinterp_constant_to(
            self.current_target_offset,
            self.settings.target_offset,
            dt,
            self.settings.target_offset_speed,
        );
        self.current_arm_length = finterp_constant_to(
            self.current_arm_length,
            self.settings.target_arm_length,
            dt,
            self.settings.target_arm_length_speed,
        );

        if let Some(camera) = env.camera.as_deref_mut() {
            camera.set_view_pitch_max(finterp_constant_to(
                camera.view_pitch_max(),
                self.settings.view_pitch_max,
                dt,
                self.settings.view_min_max_speed,
            ));
            camera.set_view_pitch_min(finterp_constant_to(
                camera.view_pitch_min(),
                self.settings.view_pitch_min,
                dt,
                self.settings.view_min_max_speed,
            ));
        }

        self.update_desired_view_pitch(rig, env, dt);

        self.update_desired_arm_location(
            rig,
            env,
            self.settings.do_collision_test,
            self.settings.enable_camera_lag,
            self.settings.enable_camera_rotation_lag,
            dt,
        );
    }

    /// Pitch auto-leveling: engages only after the idle-look + motion
    /// condition has held for `min_time_to_activate_desired_view_pitch`
    /// seconds, so it never fights active player input.
    fn update_desired_view_pitch(
        &mut self,
        rig: &RigSnapshot,
        env: &mut RigEnvironment<'_>,
        dt: f32,
    ) {
        let engaged = match env.subject {
            Some(subject) => {
                let min_velocity = self.settings.min_velocity_to_activate_desired_view_pitch;
                rig.rotation_input.pitch.abs()
                    < self.settings.min_player_input_to_stop_desired_view_pitch
                    && subject.velocity.length_squared() >= min_velocity * min_velocity
            }
            None => false,
        };

        if !engaged {
            self.time_blocked_desired_view = self.time_seconds;
            return;
        }

        let Some(controller) = env.controller.as_deref_mut() else {
            return;
        };

        if self.time_seconds
            > self.time_blocked_desired_view + self.settings.min_time_to_activate_desired_view_pitch
        {
            let current = controller.control_rotation();
            let mut target = current;
            target.pitch = self.settings.desired_view_pitch;
            let leveled =
                rinterp_constant_to(current, target, dt, self.settings.view_min_max_speed);
            controller.set_control_rotation(leveled);
        }
    }

    fn update_desired_arm_location(
        &mut self,
        rig: &RigSnapshot,
        env: &mut RigEnvironment<'_>,
        do_trace: bool,
        do_location_lag: bool,
        do_rotation_lag: bool,
        dt: f32,
    ) {
        let mut do_location_lag = do_location_lag;
        let mut do_rotation_lag = do_rotation_lag;

        // First tick after a non-interpolated entry: place the arm directly
        // at its targets instead of blending in from stale state.
        if self.lag_reset_pending {
            self.lag_reset_pending = false;
            do_location_lag = false;
            do_rotation_lag = false;
        }

        let mut desired_rot = self.target_rotation(rig, env);

        if do_rotation_lag {
            let previous = self.previous_desired_rotation;
            let lag_speed = self.settings.camera_rotation_lag_speed;
            if self.settings.use_camera_lag_substepping
                && dt > self.settings.camera_lag_max_time_step
                && lag_speed > 0.0
            {
                // Advance the blend target linearly across the frame and
                // integrate the blend in fixed sub-steps.
                let target_step = (desired_rot - previous).normalized() * (1.0 / dt);
                let mut lerp_target = previous;
                let mut blended = previous;
                let mut remaining = dt;
                while remaining > MIN_SUBSTEP_REMAINDER {
                    let sub_dt = remaining.min(self.settings.camera_lag_max_time_step);
                    lerp_target = lerp_target + target_step * sub_dt;
                    remaining -= sub_dt;
                    blended = Rotator::from_quat(qinterp_constant_to(
                        blended.to_quat(),
                        lerp_target.to_quat(),
                        sub_dt,
                        lag_speed,
                    ));
                }
                desired_rot = blended;
            } else {
                desired_rot = Rotator::from_quat(qinterp_constant_to(
                    previous.to_quat(),
                    desired_rot.to_quat(),
                    dt,
                    lag_speed,
                ));
            }
        }
        self.previous_desired_rotation = desired_rot;

        // The arm origin is the point we want to look at; lag is applied to
        // it, not to the camera itself, so orbiting the camera has no lag.
        let arm_origin = rig.rig_transform.position + self.current_target_offset;
        let mut desired_loc = arm_origin;
        if do_location_lag {
            let previous = self.previous_desired_location;
            let lag_speed = self.settings.camera_lag_speed;
            if self.settings.use_camera_lag_substepping
                && dt > self.settings.camera_lag_max_time_step
                && lag_speed > 0.0
            {
                let target_step = (desired_loc - previous) * (1.0 / dt);
                let mut lerp_target = previous;
                let mut blended = previous;
                let mut remaining = dt;
                while remaining > MIN_SUBSTEP_REMAINDER {
                    let sub_dt = remaining.min(self.settings.camera_lag_max_time_step);
                    lerp_target += target_step * sub_dt;
                    remaining -= sub_dt;
                    blended = vinterp_constant_to(blended, lerp_target, sub_dt, lag_speed);
                }
                desired_loc = blended;
            } else {
                desired_loc = vinterp_constant_to(previous, desired_loc, dt, lag_speed);
            }

            if self.settings.camera_lag_max_distance > 0.0 {
                let from_origin = desired_loc - arm_origin;
                let max_distance = self.settings.camera_lag_max_distance;
                if from_origin.length_squared() > max_distance * max_distance {
                    desired_loc = arm_origin + from_origin.clamp_length_max(max_distance);
                }
            }
        }

        self.previous_arm_origin = arm_origin;
        self.previous_desired_location = desired_loc;

        // Offset the camera back along the target rotation, then apply the
        // socket offset in the rotated frame.
        let rotation = desired_rot.to_quat();
        desired_loc -= desired_rot.forward() * self.current_arm_length;
        desired_loc += rotation * self.current_socket_offset;

        let result_loc;
        if do_trace && self.settings.target_arm_length != 0.0 {
            self.unfixed_camera_position = desired_loc;
            let hit = env.collision.and_then(|collision| {
                collision.sweep_sphere(
                    arm_origin,
                    desired_loc,
                    self.settings.probe_size,
                    self.settings.probe_channel,
                    env.subject.map(|subject| subject.actor),
                )
            });
            match hit {
                Some(hit) => {
                    result_loc = hit.location;
                    // a graze at the arm's very end moved nothing
                    self.is_camera_fixed = hit.location != desired_loc;
                }
                None => {
                    result_loc = desired_loc;
                    self.is_camera_fixed = false;
                }
            }
        } else {
            result_loc = desired_loc;
            self.is_camera_fixed = false;
            self.unfixed_camera_position = result_loc;
        }

        let world_cam = Transform::from_position_rotation(result_loc, rotation);
        let relative = world_cam.relative_to(&rig.rig_transform);
        self.relative_socket_location = relative.position;
        self.relative_socket_rotation = relative.rotation;
    }
}

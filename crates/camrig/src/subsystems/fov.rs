//! Field-of-view subsystem
//!
//! Drives the camera manager's field of view toward a target at a constant
//! rate in degrees per second.

use camrig_core::finterp_constant_to;
use serde::{Deserialize, Serialize};

use super::EnterContext;
use crate::world::RigEnvironment;

/// Settings for the FOV subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FovSettings {
    /// Target field of view in degrees
    pub fov: f32,
    /// Approach rate in degrees per second
    pub fov_speed: f32,
}

impl Default for FovSettings {
    fn default() -> Self {
        Self {
            fov: 90.0,
            fov_speed: 40.0,
        }
    }
}

/// Live FOV subsystem instance.
#[derive(Debug)]
pub struct FovSubsystem {
    settings: FovSettings,
    /// Set on a non-interpolated mode entry; the camera manager is external,
    /// so the snap is applied on the next tick that can reach it.
    snap_pending: bool,
}

impl FovSubsystem {
    pub fn new(settings: FovSettings) -> Self {
        Self {
            settings,
            snap_pending: false,
        }
    }

    pub fn settings(&self) -> &FovSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: FovSettings) {
        self.settings = settings;
    }

    pub fn on_enter_mode(&mut self, context: &EnterContext) {
        if !context.with_interpolation {
            self.snap_pending = true;
        }
    }

    pub fn tick(&mut self, env: &mut RigEnvironment<'_>, dt: f32) {
        let Some(camera) = env.camera.as_deref_mut() else {
            return;
        };

        if self.snap_pending {
            self.snap_pending = false;
            camera.set_fov(self.settings.fov);
            return;
        }

        let fov = finterp_constant_to(camera.fov(), self.settings.fov, dt, self.settings.fov_speed);
        camera.set_fov(fov);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::CameraManager;
    use camrig_core::Transform;

    struct TestCameraManager {
        fov: f32,
        pitch_min: f32,
        pitch_max: f32,
    }

    impl TestCameraManager {
        fn new(fov: f32) -> Self {
            Self {
                fov,
                pitch_min: -89.0,
                pitch_max: 89.0,
            }
        }
    }

    impl CameraManager for TestCameraManager {
        fn fov(&self) -> f32 {
            self.fov
        }
        fn set_fov(&mut self, fov: f32) {
            self.fov = fov;
        }
        fn view_pitch_min(&self) -> f32 {
            self.pitch_min
        }
        fn set_view_pitch_min(&mut self, pitch: f32) {
            self.pitch_min = pitch;
        }
        fn view_pitch_max(&self) -> f32 {
            self.pitch_max
        }
        fn set_view_pitch_max(&mut self, pitch: f32) {
            self.pitch_max = pitch;
        }
    }

    fn env<'a>(camera: &'a mut TestCameraManager) -> RigEnvironment<'a> {
        let mut env = RigEnvironment::detached(Transform::IDENTITY);
        env.camera = Some(camera);
        env
    }

    #[test]
    fn test_fov_approaches_target_at_constant_rate() {
        let mut camera = TestCameraManager::new(60.0);
        let mut subsystem = FovSubsystem::new(FovSettings {
            fov: 90.0,
            fov_speed: 40.0,
        });

        subsystem.tick(&mut env(&mut camera), 0.25);
        assert!((camera.fov - 70.0).abs() < 1e-4);

        // converges without overshoot
        for _ in 0..10 {
            subsystem.tick(&mut env(&mut camera), 0.25);
        }
        assert_eq!(camera.fov, 90.0);
    }

    #[test]
    fn test_snap_on_first_entry() {
        let mut camera = TestCameraManager::new(60.0);
        let mut subsystem = FovSubsystem::new(FovSettings {
            fov: 100.0,
            fov_speed: 5.0,
        });

        subsystem.on_enter_mode(&EnterContext {
            with_interpolation: false,
        });
        subsystem.tick(&mut env(&mut camera), 0.001);
        assert_eq!(camera.fov, 100.0);
    }

    #[test]
    fn test_blend_on_subsequent_entry() {
        let mut camera = TestCameraManager::new(100.0);
        let mut subsystem = FovSubsystem::new(FovSettings {
            fov: 60.0,
            fov_speed: 40.0,
        });

        subsystem.on_enter_mode(&EnterContext {
            with_interpolation: true,
        });
        subsystem.tick(&mut env(&mut camera), 0.1);
        // part-way, neither snapped nor still at the old value
        assert!((camera.fov - 96.0).abs() < 1e-4);
    }

    #[test]
    fn test_missing_camera_manager_is_noop() {
        let mut subsystem = FovSubsystem::new(FovSettings::default());
        let mut env = RigEnvironment::detached(Transform::IDENTITY);
        subsystem.tick(&mut env, 0.016);
    }

    #[test]
    fn test_settings_swap_keeps_blending_from_current_value() {
        let mut camera = TestCameraManager::new(80.0);
        let mut subsystem = FovSubsystem::new(FovSettings {
            fov: 90.0,
            fov_speed: 40.0,
        });
        subsystem.tick(&mut env(&mut camera), 0.1);
        let before = camera.fov;

        subsystem.set_settings(FovSettings {
            fov: 50.0,
            fov_speed: 40.0,
        });
        subsystem.tick(&mut env(&mut camera), 0.1);
        assert!((camera.fov - (before - 4.0)).abs() < 1e-4);
    }
}

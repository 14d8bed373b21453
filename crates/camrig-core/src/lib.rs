//! Camrig Core - Math primitives and shared value types for the camera rig
//!
//! This crate provides the foundational types used by the rig runtime:
//! - `Transform` for poses (position + rotation) with compose/relative math
//! - `Rotator` for Euler angles in degrees with axis-selective editing
//! - `ActorId` handles for world actors
//! - Constant-rate interpolation helpers used by every lag/blend in the rig

pub mod math;
pub mod types;

pub use glam::{Mat4, Quat, Vec3};
pub use math::{
    finterp_constant_to, qinterp_constant_to, rinterp_constant_to, vinterp_constant_to, Rotator,
};
pub use types::{ActorId, Transform};

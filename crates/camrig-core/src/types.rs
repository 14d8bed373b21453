//! Shared value types for the camera rig

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle identifying an actor in the host world.
///
/// The rig never owns actors; it stores handles and revalidates them through
/// the host before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Create a new random actor ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an actor ID from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Pack into a u128, e.g. for collider user data
    pub fn to_u128(self) -> u128 {
        self.0.as_u128()
    }

    /// Unpack from a u128; zero means "no actor"
    pub fn from_u128(raw: u128) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self(Uuid::from_u128(raw)))
        }
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

/// A world pose: position and rotation.
///
/// The rig never scales anything, so no scale component is carried.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a new transform at the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Compute the model matrix for this transform
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X in local space)
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y in local space)
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Transform a point from local space into this transform's space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    /// Treat `local` as a child pose of this transform and return its world pose
    pub fn compose(&self, local: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * local.position,
            rotation: self.rotation * local.rotation,
        }
    }

    /// Express this world pose relative to `base`, such that
    /// `base.compose(&t.relative_to(&base)) == t`
    pub fn relative_to(&self, base: &Transform) -> Transform {
        let inv_rotation = base.rotation.inverse();
        Transform {
            position: inv_rotation * (self.position - base.position),
            rotation: inv_rotation * self.rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_transform_matrix() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let matrix = transform.matrix();
        let translation = matrix.col(3).truncate();
        assert_eq!(translation, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_compose_relative_round_trip() {
        let base = Transform::from_position_rotation(
            Vec3::new(5.0, 0.0, -2.0),
            Quat::from_rotation_y(FRAC_PI_2),
        );
        let world = Transform::from_position_rotation(
            Vec3::new(1.0, 3.0, 4.0),
            Quat::from_rotation_x(0.3),
        );

        let relative = world.relative_to(&base);
        let back = base.compose(&relative);

        assert!((back.position - world.position).length() < 1e-4);
        assert!(back.rotation.dot(world.rotation).abs() > 0.9999);
    }

    #[test]
    fn test_relative_to_identity_is_self() {
        let world = Transform::from_position(Vec3::new(7.0, -1.0, 0.5));
        let relative = world.relative_to(&Transform::IDENTITY);
        assert_eq!(relative, world);
    }

    #[test]
    fn test_actor_id_u128_round_trip() {
        let actor = ActorId::new();
        assert_eq!(ActorId::from_u128(actor.to_u128()), Some(actor));
        assert_eq!(ActorId::from_u128(0), None);
    }
}

//! Camera mode definitions
//!
//! A camera mode is pure configuration: an identifying tag plus an ordered
//! list of subsystem settings templates. Modes are authored once, validated,
//! and shared read-only across every rig that uses them; only the rig's live
//! subsystem instances ever mutate.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::RigError;
use crate::subsystems::{FadeSettings, FovSettings, SubsystemKind, TransformSettings};

/// Tag identifying a camera mode, unique within a [`ModeLibrary`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModeId(String);

impl ModeId {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModeId {
    fn from(tag: &str) -> Self {
        Self(tag.to_owned())
    }
}

/// Settings template for one subsystem, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubsystemSettings {
    Fov(FovSettings),
    Transform(TransformSettings),
    Fade(FadeSettings),
}

impl SubsystemSettings {
    pub fn kind(&self) -> SubsystemKind {
        match self {
            SubsystemSettings::Fov(_) => SubsystemKind::Fov,
            SubsystemSettings::Transform(_) => SubsystemKind::Transform,
            SubsystemSettings::Fade(_) => SubsystemKind::Fade,
        }
    }
}

/// An authored camera mode: a tag plus ordered subsystem templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCameraMode")]
pub struct CameraMode {
    id: ModeId,
    subsystems: Vec<SubsystemSettings>,
}

/// Unvalidated shape used during deserialization.
#[derive(Deserialize)]
struct RawCameraMode {
    id: ModeId,
    subsystems: Vec<SubsystemSettings>,
}

impl TryFrom<RawCameraMode> for CameraMode {
    type Error = RigError;

    fn try_from(raw: RawCameraMode) -> Result<Self, RigError> {
        CameraMode::new(raw.id, raw.subsystems)
    }
}

impl CameraMode {
    /// Create a mode, rejecting duplicate subsystem kinds.
    pub fn new(
        id: impl Into<ModeId>,
        subsystems: Vec<SubsystemSettings>,
    ) -> Result<Self, RigError> {
        let id = id.into();
        for (index, settings) in subsystems.iter().enumerate() {
            let kind = settings.kind();
            if subsystems[..index].iter().any(|other| other.kind() == kind) {
                return Err(RigError::DuplicateSubsystemKind {
                    mode: id.to_string(),
                    kind,
                });
            }
        }
        Ok(Self { id, subsystems })
    }

    pub fn id(&self) -> &ModeId {
        &self.id
    }

    pub fn subsystems(&self) -> &[SubsystemSettings] {
        &self.subsystems
    }
}

/// The set of camera modes a rig can switch between.
///
/// Modes are held behind `Arc` so many rigs can share one library.
#[derive(Debug, Clone, Default)]
pub struct ModeLibrary {
    modes: Vec<Arc<CameraMode>>,
}

impl ModeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mode, replacing any existing mode with the same tag.
    pub fn insert(&mut self, mode: CameraMode) {
        self.modes.retain(|existing| existing.id() != mode.id());
        self.modes.push(Arc::new(mode));
    }

    /// Look up a mode by tag.
    pub fn get(&self, tag: &str) -> Option<Arc<CameraMode>> {
        self.modes
            .iter()
            .find(|mode| mode.id().as_str() == tag)
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Parse a library from a JSON array of camera modes.
    ///
    /// Loading the bytes is the host's concern; only parsing lives here.
    pub fn from_json(json: &str) -> Result<Self, RigError> {
        let modes: Vec<CameraMode> = serde_json::from_str(json)?;
        let mut library = Self::new();
        for mode in modes {
            library.insert(mode);
        }
        Ok(library)
    }
}

impl FromIterator<CameraMode> for ModeLibrary {
    fn from_iter<T: IntoIterator<Item = CameraMode>>(iter: T) -> Self {
        let mut library = Self::new();
        for mode in iter {
            library.insert(mode);
        }
        library
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_kind_rejected() {
        let result = CameraMode::new(
            "broken",
            vec![
                SubsystemSettings::Fov(FovSettings::default()),
                SubsystemSettings::Fov(FovSettings::default()),
            ],
        );
        assert!(matches!(
            result,
            Err(RigError::DuplicateSubsystemKind {
                kind: SubsystemKind::Fov,
                ..
            })
        ));
    }

    #[test]
    fn test_library_lookup_and_replace() {
        let mut library = ModeLibrary::new();
        library.insert(
            CameraMode::new("explore", vec![SubsystemSettings::Fov(FovSettings::default())])
                .unwrap(),
        );
        library.insert(CameraMode::new("explore", vec![]).unwrap());

        assert_eq!(library.len(), 1);
        assert!(library.get("explore").unwrap().subsystems().is_empty());
        assert!(library.get("missing").is_none());
    }

    #[test]
    fn test_mode_library_from_json() {
        let json = r#"[
            {
                "id": "explore",
                "subsystems": [
                    { "kind": "fov", "fov": 75.0 },
                    { "kind": "transform", "target_arm_length": 4.5 }
                ]
            },
            {
                "id": "aim",
                "subsystems": [ { "kind": "fov" } ]
            }
        ]"#;

        let library = ModeLibrary::from_json(json).unwrap();
        assert_eq!(library.len(), 2);

        let explore = library.get("explore").unwrap();
        match &explore.subsystems()[0] {
            SubsystemSettings::Fov(settings) => assert_eq!(settings.fov, 75.0),
            other => panic!("unexpected subsystem: {other:?}"),
        }
        match &explore.subsystems()[1] {
            SubsystemSettings::Transform(settings) => {
                assert_eq!(settings.target_arm_length, 4.5);
                // unspecified fields fall back to defaults
                assert_eq!(settings.probe_size, TransformSettings::default().probe_size);
            }
            other => panic!("unexpected subsystem: {other:?}"),
        }

        let aim = library.get("aim").unwrap();
        match &aim.subsystems()[0] {
            SubsystemSettings::Fov(settings) => {
                assert_eq!(settings.fov, FovSettings::default().fov)
            }
            other => panic!("unexpected subsystem: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_kind_rejected_from_json() {
        let json = r#"[
            { "id": "broken", "subsystems": [ { "kind": "fov" }, { "kind": "fov" } ] }
        ]"#;
        assert!(ModeLibrary::from_json(json).is_err());
    }
}

use crate::subsystems::SubsystemKind;

/// Errors reported by the rig and mode library.
#[derive(Debug, thiserror::Error)]
pub enum RigError {
    #[error("camera mode not found: {0}")]
    ModeNotFound(String),

    #[error("camera mode '{mode}' declares more than one {kind:?} subsystem")]
    DuplicateSubsystemKind { mode: String, kind: SubsystemKind },

    #[error("failed to parse camera mode data: {0}")]
    InvalidModeData(#[from] serde_json::Error),
}

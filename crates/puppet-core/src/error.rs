//! Error types for the avatar director

use thiserror::Error;

/// Core errors
///
/// None of these are fatal to a running engine. Callers log them and carry on;
/// only `Config` is surfaced at startup.
#[derive(Error, Debug)]
pub enum PuppetError {
    // Reference errors
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    #[error("Profile sync is disabled")]
    SyncDisabled,

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    // Store errors
    #[error("Config store unavailable: {0}")]
    ConfigUnavailable(String),

    // Startup errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PuppetError {
    /// Unknown profile or scene id
    pub fn is_reference_not_found(&self) -> bool {
        matches!(
            self,
            PuppetError::ProfileNotFound(_) | PuppetError::SceneNotFound(_)
        )
    }

    /// Poll/report/fetch failure that the next cycle retries naturally
    pub fn is_transport(&self) -> bool {
        matches!(self, PuppetError::Transport(_) | PuppetError::Decode(_))
    }
}

impl From<serde_json::Error> for PuppetError {
    fn from(e: serde_json::Error) -> Self {
        PuppetError::Decode(e.to_string())
    }
}

/// Result type for core operations
pub type PuppetResult<T> = Result<T, PuppetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(PuppetError::ProfileNotFound("x".into()).is_reference_not_found());
        assert!(PuppetError::SceneNotFound("x".into()).is_reference_not_found());
        assert!(PuppetError::Transport("refused".into()).is_transport());
        assert!(!PuppetError::SyncDisabled.is_transport());
    }

    #[test]
    fn test_json_errors_become_decode() {
        let err: PuppetError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, PuppetError::Decode(_)));
    }
}

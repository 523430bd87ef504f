//! Shared execution state and the status report derived from it

use serde::{Deserialize, Serialize};

use crate::ClientId;

/// What the director is doing right now
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionState {
    /// An execution is in flight (new non-interrupting commands queue)
    pub is_processing: bool,
    /// The running sequence restarts after its last step
    pub is_looping: bool,
    /// Last profile successfully applied
    pub current_profile: Option<String>,
    /// Scene being played, if the execution came from a scene
    pub current_scene: Option<String>,
    /// Idle fallback has fired and nothing has been applied since
    pub is_idle: bool,
}

impl ExecutionState {
    /// Forget the running execution (used by cancellation)
    pub fn reset_execution(&mut self) {
        self.is_processing = false;
        self.is_looping = false;
        self.current_scene = None;
    }
}

/// Global toggles controlled from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Audio output muted (analysis keeps running)
    pub is_muted: bool,
    /// Profile application enabled
    pub is_sync_enabled: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            is_muted: false,
            is_sync_enabled: true,
        }
    }
}

/// Status pushed to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub client_id: ClientId,
    pub current_profile: Option<String>,
    pub current_scene: Option<String>,
    pub queue_size: usize,
    pub is_looping: bool,
}

impl StatusReport {
    pub fn snapshot(client_id: &ClientId, state: &ExecutionState, queue_size: usize) -> Self {
        StatusReport {
            client_id: client_id.clone(),
            current_profile: state.current_profile.clone(),
            current_scene: state.current_scene.clone(),
            queue_size,
            is_looping: state.is_looping,
        }
    }
}

//! Scenes - ordered, timed sequences of profiles

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One step of a sequence: a bare profile name or `{profile, duration?}`
///
/// Duration is in milliseconds. A step without a (positive) duration does not
/// wait; the next step follows in the same scheduling pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Named(String),
    Timed {
        profile: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<f64>,
    },
}

impl Step {
    pub fn named(profile: impl Into<String>) -> Self {
        Step::Named(profile.into())
    }

    pub fn timed(profile: impl Into<String>, millis: u64) -> Self {
        Step::Timed {
            profile: profile.into(),
            duration: Some(millis as f64),
        }
    }

    /// Profile id referenced by this step
    pub fn profile_id(&self) -> &str {
        match self {
            Step::Named(name) => name,
            Step::Timed { profile, .. } => profile,
        }
    }

    /// Wait after applying this step, if any
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Step::Named(_) => None,
            Step::Timed { duration, .. } => duration
                .filter(|ms| ms.is_finite() && *ms > 0.0)
                .map(|ms| Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)),
        }
    }
}

//! Commands - one unit of work delivered by the controller
//!
//! Wire shape:
//! `{"interrupt": false, "payload": {"profile": "smile", "scene": null, "profiles": [...], "audio_url": "...", "msg": "...", "loop": false}}`
//!
//! Every payload field may be absent or `null`. Empty strings and empty step
//! lists count as absent.

use serde::{Deserialize, Serialize};

use crate::Step;

/// A command as consumed from the command source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(default)]
    pub interrupt: bool,
    #[serde(default)]
    pub payload: Option<Payload>,
}

/// Command payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub scene: Option<String>,
    #[serde(default)]
    pub profiles: Option<Vec<Step>>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default, rename = "loop")]
    pub looping: Option<bool>,
}

impl Command {
    /// Apply a single profile
    pub fn profile(id: impl Into<String>) -> Self {
        Command {
            interrupt: false,
            payload: Some(Payload {
                profile: Some(id.into()),
                ..Default::default()
            }),
        }
    }

    /// Play a stored scene
    pub fn scene(id: impl Into<String>, looping: bool) -> Self {
        Command {
            interrupt: false,
            payload: Some(Payload {
                scene: Some(id.into()),
                looping: Some(looping),
                ..Default::default()
            }),
        }
    }

    /// Run an explicit step list
    pub fn sequence(steps: Vec<Step>, looping: bool) -> Self {
        Command {
            interrupt: false,
            payload: Some(Payload {
                profiles: Some(steps),
                looping: Some(looping),
                ..Default::default()
            }),
        }
    }

    /// Builder: mark as interrupting
    pub fn interrupting(mut self) -> Self {
        self.interrupt = true;
        self
    }

    /// Builder: attach speech audio
    pub fn with_audio(mut self, url: impl Into<String>) -> Self {
        self.payload.get_or_insert_with(Payload::default).audio_url = Some(url.into());
        self
    }

    /// Builder: attach a subtitle
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.payload.get_or_insert_with(Payload::default).msg = Some(msg.into());
        self
    }

    /// Does this command carry anything to execute?
    pub fn is_actionable(&self) -> bool {
        self.payload.as_ref().is_some_and(Payload::is_actionable)
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

impl Payload {
    pub fn profile(&self) -> Option<&str> {
        non_empty(&self.profile)
    }

    pub fn scene(&self) -> Option<&str> {
        non_empty(&self.scene)
    }

    pub fn audio_url(&self) -> Option<&str> {
        non_empty(&self.audio_url)
    }

    pub fn message(&self) -> Option<&str> {
        non_empty(&self.msg)
    }

    /// Explicit step list, if non-empty
    pub fn sequence(&self) -> Option<&[Step]> {
        self.profiles.as_deref().filter(|s| !s.is_empty())
    }

    pub fn looping(&self) -> bool {
        self.looping.unwrap_or(false)
    }

    /// At least one recognized field is present
    pub fn is_actionable(&self) -> bool {
        self.profile().is_some()
            || self.scene().is_some()
            || self.sequence().is_some()
            || self.audio_url().is_some()
            || self.message().is_some()
    }
}

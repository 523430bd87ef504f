//! Audio backend seam
//!
//! Decoding and output are external. A backend plays one clip at a time and
//! exposes its current frequency spectrum for lip sync.

use thiserror::Error;

/// Audio backend errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("failed to fetch audio: {0}")]
    Fetch(String),

    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("audio output unavailable: {0}")]
    Output(String),
}

pub trait AudioBackend: Send {
    /// Start playing `url`, replacing anything already playing
    fn play(&mut self, url: &str) -> Result<(), AudioError>;

    /// Stop and release the current clip
    fn stop(&mut self);

    fn set_muted(&mut self, muted: bool);

    /// Fill `out` with the current frequency bins, byte-scaled (0..=255)
    fn frequency_data(&mut self, out: &mut Vec<f32>);

    /// True once the current clip has played to its end
    fn has_ended(&self) -> bool;
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    fn play(&mut self, url: &str) -> Result<(), AudioError> {
        (**self).play(url)
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn set_muted(&mut self, muted: bool) {
        (**self).set_muted(muted);
    }

    fn frequency_data(&mut self, out: &mut Vec<f32>) {
        (**self).frequency_data(out);
    }

    fn has_ended(&self) -> bool {
        (**self).has_ended()
    }
}

//! Audio controller - talking state around an `AudioBackend`
//!
//! Talking is true from a successful `play` until the clip ends or is
//! stopped. The controller does not touch the stage; the director reacts to
//! `AudioEvent::Ended`.

use tracing::{debug, warn};

use crate::{loudness, AudioBackend, AudioError, DEFAULT_SENSITIVITY};

/// Playback events surfaced by `poll`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioEvent {
    /// The current clip finished on its own
    Ended { url: String },
}

#[derive(Clone, Debug, Default)]
pub struct AudioStats {
    pub clips_started: u64,
    pub clips_failed: u64,
    pub clips_ended: u64,
}

pub struct AudioController<B: AudioBackend> {
    backend: B,
    current: Option<String>,
    muted: bool,
    sensitivity: f32,
    spectrum: Vec<f32>,
    stats: AudioStats,
}

impl<B: AudioBackend> AudioController<B> {
    pub fn new(backend: B) -> Self {
        Self::with_sensitivity(backend, DEFAULT_SENSITIVITY)
    }

    pub fn with_sensitivity(backend: B, sensitivity: f32) -> Self {
        AudioController {
            backend,
            current: None,
            muted: false,
            sensitivity,
            spectrum: Vec::new(),
            stats: AudioStats::default(),
        }
    }

    /// Replace whatever is playing with `url`.
    ///
    /// On failure nothing is playing and talking stays false.
    pub fn play(&mut self, url: &str) -> Result<(), AudioError> {
        self.release();

        if let Err(e) = self.backend.play(url) {
            self.stats.clips_failed += 1;
            warn!(url, error = %e, "audio playback failed to start");
            return Err(e);
        }

        self.backend.set_muted(self.muted);
        self.current = Some(url.to_string());
        self.stats.clips_started += 1;
        debug!(url, muted = self.muted, "audio started");
        Ok(())
    }

    /// Stop immediately; no `Ended` event follows
    pub fn stop(&mut self) {
        if self.current.is_some() {
            debug!("audio stopped");
        }
        self.release();
    }

    fn release(&mut self) {
        if self.current.take().is_some() {
            self.backend.stop();
        }
        self.spectrum.clear();
    }

    /// Applies to the playing clip and every later one
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.backend.set_muted(muted);
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn talking(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Detect a natural end of the current clip
    pub fn poll(&mut self) -> Option<AudioEvent> {
        if self.current.is_none() || !self.backend.has_ended() {
            return None;
        }
        let url = self.current.take()?;
        self.backend.stop();
        self.spectrum.clear();
        self.stats.clips_ended += 1;
        debug!(url = %url, "audio ended");
        Some(AudioEvent::Ended { url })
    }

    /// Lip-sync level for this frame, `None` when not talking
    pub fn mouth_level(&mut self) -> Option<f32> {
        if self.current.is_none() {
            return None;
        }
        self.spectrum.clear();
        self.backend.frequency_data(&mut self.spectrum);
        Some(loudness(&self.spectrum, self.sensitivity))
    }

    pub fn stats(&self) -> &AudioStats {
        &self.stats
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeBackend {
        playing: Option<String>,
        muted: bool,
        ended: bool,
        fail: bool,
        level: f32,
        stops: usize,
    }

    impl AudioBackend for FakeBackend {
        fn play(&mut self, url: &str) -> Result<(), AudioError> {
            if self.fail {
                return Err(AudioError::Fetch(url.to_string()));
            }
            self.playing = Some(url.to_string());
            self.ended = false;
            Ok(())
        }

        fn stop(&mut self) {
            self.playing = None;
            self.stops += 1;
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn frequency_data(&mut self, out: &mut Vec<f32>) {
            out.extend(std::iter::repeat(self.level).take(16));
        }

        fn has_ended(&self) -> bool {
            self.ended
        }
    }

    #[test]
    fn test_play_sets_talking_and_applies_mute() {
        let mut audio = AudioController::new(FakeBackend::default());
        audio.set_muted(true);
        audio.play("http://x/a.mp3").unwrap();

        assert!(audio.talking());
        assert!(audio.backend().muted);
        assert_eq!(audio.current_url(), Some("http://x/a.mp3"));
    }

    #[test]
    fn test_play_replaces_current() {
        let mut audio = AudioController::new(FakeBackend::default());
        audio.play("a").unwrap();
        audio.play("b").unwrap();

        assert_eq!(audio.backend().stops, 1);
        assert_eq!(audio.backend().playing.as_deref(), Some("b"));
    }

    #[test]
    fn test_failed_play_is_not_talking() {
        let mut audio = AudioController::new(FakeBackend {
            fail: true,
            ..Default::default()
        });
        assert!(audio.play("a").is_err());
        assert!(!audio.talking());
        assert_eq!(audio.stats().clips_failed, 1);
        assert!(audio.poll().is_none());
    }

    #[test]
    fn test_natural_end_emits_once() {
        let mut audio = AudioController::new(FakeBackend::default());
        audio.play("a").unwrap();
        assert!(audio.poll().is_none());

        audio.backend_mut().ended = true;
        assert_eq!(audio.poll(), Some(AudioEvent::Ended { url: "a".into() }));
        assert!(!audio.talking());
        assert!(audio.poll().is_none());
    }

    #[test]
    fn test_stop_suppresses_end_event() {
        let mut audio = AudioController::new(FakeBackend::default());
        audio.play("a").unwrap();
        audio.stop();
        audio.backend_mut().ended = true;

        assert!(!audio.talking());
        assert!(audio.poll().is_none());
    }

    #[test]
    fn test_mouth_level_only_while_talking() {
        let mut audio = AudioController::with_sensitivity(
            FakeBackend {
                level: 25.0,
                ..Default::default()
            },
            50.0,
        );
        assert_eq!(audio.mouth_level(), None);

        audio.play("a").unwrap();
        let level = audio.mouth_level().unwrap();
        assert!((level - 0.5).abs() < 1e-6);
    }
}

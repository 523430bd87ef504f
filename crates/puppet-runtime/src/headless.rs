//! Headless collaborators for running without a display or sound card

use std::collections::HashMap;

use puppet_core::{MotionRef, Renderer};
use puppet_voice::{AudioBackend, AudioError};
use tracing::{debug, info};

/// Renderer that keeps parameters in memory.
///
/// Every parameter exists and starts at 0.0.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    params: HashMap<String, f32>,
    subtitle: Option<String>,
    motions: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        HeadlessRenderer::default()
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    pub fn motions_started(&self) -> u64 {
        self.motions
    }
}

impl Renderer for HeadlessRenderer {
    fn parameter(&self, id: &str) -> Option<f32> {
        Some(self.params.get(id).copied().unwrap_or(0.0))
    }

    fn set_parameter(&mut self, id: &str, value: f32) {
        self.params.insert(id.to_string(), value);
    }

    fn start_motion(&mut self, motion: &MotionRef) {
        self.motions += 1;
        info!(group = %motion.group, index = ?motion.index, "motion");
    }

    fn show_subtitle(&mut self, text: &str) {
        info!(text, "subtitle");
        self.subtitle = Some(text.to_string());
    }

    fn clear_subtitle(&mut self) {
        if self.subtitle.take().is_some() {
            debug!("subtitle cleared");
        }
    }
}

/// Audio backend that plays nothing; every clip ends right away
#[derive(Debug, Default)]
pub struct SilentAudio {
    current: Option<String>,
}

impl AudioBackend for SilentAudio {
    fn play(&mut self, url: &str) -> Result<(), AudioError> {
        info!(url, "audio (silent)");
        self.current = Some(url.to_string());
        Ok(())
    }

    fn stop(&mut self) {
        self.current = None;
    }

    fn set_muted(&mut self, _muted: bool) {}

    fn frequency_data(&mut self, _out: &mut Vec<f32>) {}

    fn has_ended(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_renderer_knows_every_param() {
        let mut renderer = HeadlessRenderer::new();
        assert_eq!(renderer.parameter("anything"), Some(0.0));
        renderer.set_parameter("anything", 0.4);
        assert_eq!(renderer.parameter("anything"), Some(0.4));
    }

    #[test]
    fn test_subtitle_lifecycle() {
        let mut renderer = HeadlessRenderer::new();
        renderer.show_subtitle("hello");
        assert_eq!(renderer.subtitle(), Some("hello"));
        renderer.clear_subtitle();
        assert_eq!(renderer.subtitle(), None);
    }
}

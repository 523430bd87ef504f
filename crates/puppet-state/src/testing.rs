use std::collections::HashMap;

use puppet_core::{MotionRef, Renderer};

/// In-memory renderer for unit tests
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    pub params: HashMap<String, f32>,
    pub motions: Vec<MotionRef>,
    pub subtitle: Option<String>,
}

impl MemoryRenderer {
    pub fn with_params(params: &[(&str, f32)]) -> Self {
        MemoryRenderer {
            params: params.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ..Default::default()
        }
    }
}

impl Renderer for MemoryRenderer {
    fn parameter(&self, id: &str) -> Option<f32> {
        self.params.get(id).copied()
    }

    fn set_parameter(&mut self, id: &str, value: f32) {
        if let Some(slot) = self.params.get_mut(id) {
            *slot = value;
        }
    }

    fn start_motion(&mut self, motion: &MotionRef) {
        self.motions.push(motion.clone());
    }

    fn show_subtitle(&mut self, text: &str) {
        self.subtitle = Some(text.to_string());
    }

    fn clear_subtitle(&mut self) {
        self.subtitle = None;
    }
}

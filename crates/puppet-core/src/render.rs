//! Renderer seam
//!
//! The rendering/animation engine is external. The director only reads and
//! writes parameter values, fires motions, and shows subtitles through this
//! trait.

use crate::MotionRef;

pub trait Renderer {
    /// Current value of a parameter, `None` if the model has no such parameter
    fn parameter(&self, id: &str) -> Option<f32>;

    /// Write a parameter value for this frame
    fn set_parameter(&mut self, id: &str, value: f32);

    /// Fire-and-forget motion playback
    fn start_motion(&mut self, motion: &MotionRef);

    fn show_subtitle(&mut self, text: &str);

    fn clear_subtitle(&mut self);
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn parameter(&self, id: &str) -> Option<f32> {
        (**self).parameter(id)
    }

    fn set_parameter(&mut self, id: &str, value: f32) {
        (**self).set_parameter(id, value);
    }

    fn start_motion(&mut self, motion: &MotionRef) {
        (**self).start_motion(motion);
    }

    fn show_subtitle(&mut self, text: &str) {
        (**self).show_subtitle(text);
    }

    fn clear_subtitle(&mut self) {
        (**self).clear_subtitle();
    }
}

//! Parameter animation
//!
//! Each render tick moves every rendered parameter a fraction of the way
//! toward its target. The mouth parameter is overridden by the audio level
//! while speech is playing.

use puppet_core::{ParameterSet, Renderer};

/// Animator configuration
#[derive(Clone, Debug)]
pub struct AnimatorConfig {
    /// Fraction of the remaining distance covered per nominal frame
    pub smoothing: f32,
    /// Parameter driven by lip sync
    pub mouth_param: String,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        AnimatorConfig {
            smoothing: 0.1,
            mouth_param: "ParamMouthOpenY".to_string(),
        }
    }
}

/// One smoothing step from `current` toward `target`.
///
/// The factor is `smoothing * delta` clamped to [0, 1]. The result always lies
/// between `current` and `target`, so repeated steps never overshoot.
pub fn approach(current: f32, target: f32, smoothing: f32, delta: f32) -> f32 {
    let factor = (smoothing * delta).clamp(0.0, 1.0);
    if factor >= 1.0 {
        return target;
    }
    let next = current + (target - current) * factor;
    if current <= target {
        next.clamp(current, target)
    } else {
        next.clamp(target, current)
    }
}

/// Per-frame parameter smoother
#[derive(Clone, Debug, Default)]
pub struct ParameterAnimator {
    config: AnimatorConfig,
}

impl ParameterAnimator {
    pub fn new(config: AnimatorConfig) -> Self {
        ParameterAnimator { config }
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// Advance one frame. Returns the number of parameters written.
    ///
    /// `mouth_level` is the lip-sync level for this frame when talking.
    pub fn step(
        &self,
        targets: &ParameterSet,
        renderer: &mut dyn Renderer,
        delta: f32,
        mouth_level: Option<f32>,
    ) -> usize {
        let mut written = 0;
        for (id, target) in targets.iter() {
            // Parameters the model does not have
            let Some(current) = renderer.parameter(id) else {
                continue;
            };
            renderer.set_parameter(id, approach(current, target, self.config.smoothing, delta));
            written += 1;
        }

        if let Some(level) = mouth_level {
            let mouth = self.config.mouth_param.as_str();
            if renderer.parameter(mouth).is_some() {
                renderer.set_parameter(mouth, level.clamp(0.0, 1.0));
                written += 1;
            }
        }
        written
    }
}

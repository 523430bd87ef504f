//! Frame pacing - turns wall time between render ticks into a delta scalar

use std::time::Duration;

use puppet_core::EngineTime;

/// Frame pacing configuration
#[derive(Clone, Debug)]
pub struct FrameConfig {
    /// Duration of one nominal frame (delta = 1.0)
    pub nominal_frame: Duration,
    /// Largest elapsed time credited to a single tick
    pub max_step: Duration,
}

impl Default for FrameConfig {
    fn default() -> Self {
        // 60 fps
        FrameConfig {
            nominal_frame: Duration::from_micros(16_667),
            max_step: Duration::from_millis(100),
        }
    }
}

/// Frame pacer - computes `delta` for each render tick
#[derive(Debug)]
pub struct FramePacer {
    config: FrameConfig,
    last_tick: Option<EngineTime>,
    frames: u64,
}

impl FramePacer {
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    pub fn with_config(config: FrameConfig) -> Self {
        FramePacer {
            config,
            last_tick: None,
            frames: 0,
        }
    }

    /// Register a render tick at `now` and return its delta.
    ///
    /// The first tick counts as one nominal frame. Elapsed time is clamped to
    /// `max_step` so a stalled process does not snap every parameter at once.
    pub fn tick(&mut self, now: EngineTime) -> f32 {
        self.frames += 1;
        let Some(last) = self.last_tick.replace(now) else {
            return 1.0;
        };

        let elapsed = (now - last).min(self.config.max_step);
        let nominal = self.config.nominal_frame.as_secs_f64();
        if nominal <= 0.0 {
            return 1.0;
        }
        (elapsed.as_secs_f64() / nominal) as f32
    }

    /// Number of ticks seen
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new()
    }
}

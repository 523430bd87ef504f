//! Recording collaborators
//!
//! Both hand out cheap handles that share state with the instance moved into
//! the director, so a test can inspect what the director did.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use puppet_core::{EngineTime, MotionRef, Renderer};
use puppet_time::{Clock, ManualClock};
use puppet_voice::{AudioBackend, AudioError};

// ============================================================================
// RENDERER
// ============================================================================

/// Something the renderer was asked to do
#[derive(Clone, Debug, PartialEq)]
pub enum RenderEvent {
    Motion { group: String, at: EngineTime },
    Subtitle(String),
    SubtitleCleared,
}

#[derive(Debug, Default)]
pub struct RenderLog {
    pub params: HashMap<String, f32>,
    pub events: Vec<RenderEvent>,
    pub subtitle: Option<String>,
}

/// Renderer with a fixed parameter set that logs every side effect
#[derive(Clone)]
pub struct RecordingRenderer {
    log: Arc<Mutex<RenderLog>>,
    clock: ManualClock,
}

impl RecordingRenderer {
    /// Model with `params`, all starting at 0.0
    pub fn new<I, S>(params: I, clock: ManualClock) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let log = RenderLog {
            params: params.into_iter().map(|p| (p.into(), 0.0)).collect(),
            ..Default::default()
        };
        RecordingRenderer {
            log: Arc::new(Mutex::new(log)),
            clock,
        }
    }

    pub fn value(&self, id: &str) -> Option<f32> {
        self.log.lock().params.get(id).copied()
    }

    pub fn subtitle(&self) -> Option<String> {
        self.log.lock().subtitle.clone()
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.log.lock().events.clone()
    }

    /// Motion groups in the order they fired
    pub fn motions(&self) -> Vec<String> {
        self.log
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Motion { group, .. } => Some(group.clone()),
                _ => None,
            })
            .collect()
    }

    /// Motion groups with their fire times
    pub fn timed_motions(&self) -> Vec<(String, EngineTime)> {
        self.log
            .lock()
            .events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Motion { group, at } => Some((group.clone(), *at)),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn parameter(&self, id: &str) -> Option<f32> {
        self.value(id)
    }

    fn set_parameter(&mut self, id: &str, value: f32) {
        if let Some(slot) = self.log.lock().params.get_mut(id) {
            *slot = value;
        }
    }

    fn start_motion(&mut self, motion: &MotionRef) {
        let at = self.clock.now();
        self.log.lock().events.push(RenderEvent::Motion {
            group: motion.group.clone(),
            at,
        });
    }

    fn show_subtitle(&mut self, text: &str) {
        let mut log = self.log.lock();
        log.subtitle = Some(text.to_string());
        log.events.push(RenderEvent::Subtitle(text.to_string()));
    }

    fn clear_subtitle(&mut self) {
        let mut log = self.log.lock();
        if log.subtitle.take().is_some() {
            log.events.push(RenderEvent::SubtitleCleared);
        }
    }
}

// ============================================================================
// AUDIO
// ============================================================================

#[derive(Debug, Default)]
struct AudioScript {
    clip_lengths: HashMap<String, Duration>,
    broken: HashSet<String>,
    playing: Option<(String, EngineTime)>,
    muted: bool,
    level: f32,
    played: Vec<String>,
}

/// Audio backend whose clips last a scripted time on the simulation clock
#[derive(Clone)]
pub struct ScriptedAudio {
    script: Arc<Mutex<AudioScript>>,
    clock: ManualClock,
}

impl ScriptedAudio {
    /// Unknown clips last one second
    const DEFAULT_CLIP: Duration = Duration::from_secs(1);

    pub fn new(clock: ManualClock) -> Self {
        ScriptedAudio {
            script: Arc::new(Mutex::new(AudioScript {
                level: 25.0,
                ..Default::default()
            })),
            clock,
        }
    }

    pub fn with_clip(self, url: &str, length: Duration) -> Self {
        self.script.lock().clip_lengths.insert(url.to_string(), length);
        self
    }

    /// `url` fails to start
    pub fn with_broken(self, url: &str) -> Self {
        self.script.lock().broken.insert(url.to_string());
        self
    }

    /// Constant spectrum bin value while playing
    pub fn set_level(&self, level: f32) {
        self.script.lock().level = level;
    }

    pub fn is_muted(&self) -> bool {
        self.script.lock().muted
    }

    pub fn is_playing(&self) -> bool {
        self.script.lock().playing.is_some()
    }

    pub fn played(&self) -> Vec<String> {
        self.script.lock().played.clone()
    }
}

impl AudioBackend for ScriptedAudio {
    fn play(&mut self, url: &str) -> Result<(), AudioError> {
        let mut script = self.script.lock();
        if script.broken.contains(url) {
            return Err(AudioError::Fetch(format!("{url}: 404")));
        }
        script.playing = Some((url.to_string(), self.clock.now()));
        script.played.push(url.to_string());
        Ok(())
    }

    fn stop(&mut self) {
        self.script.lock().playing = None;
    }

    fn set_muted(&mut self, muted: bool) {
        self.script.lock().muted = muted;
    }

    fn frequency_data(&mut self, out: &mut Vec<f32>) {
        let script = self.script.lock();
        if script.playing.is_some() {
            out.extend(std::iter::repeat(script.level).take(32));
        }
    }

    fn has_ended(&self) -> bool {
        let script = self.script.lock();
        let Some((url, started)) = &script.playing else {
            return true;
        };
        let length = script
            .clip_lengths
            .get(url)
            .copied()
            .unwrap_or(Self::DEFAULT_CLIP);
        self.clock.now() >= started.saturating_add(length)
    }
}

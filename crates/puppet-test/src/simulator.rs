//! Director simulator - deterministic time, recorded side effects
//!
//! Drives a real `Director` from a manual clock at a fixed frame interval, so
//! step waits, idle timeouts and clip lengths play out without sleeping.

use std::time::Duration;

use puppet_core::{
    Command, EngineTime, Library, Profile, ProfileStore, SceneStore, StatusReport, Step,
};
use puppet_runtime::{Director, DirectorConfig};
use puppet_time::{Clock, ManualClock};

use crate::{RecordingRenderer, ScriptedAudio};

/// Build a library where every profile fires a motion named after itself,
/// so the renderer's motion log is the application history.
pub fn marked_library(profiles: &[(&str, &[(&str, f32)])], scenes: &[(&str, Vec<Step>)]) -> Library {
    let profiles: ProfileStore = profiles
        .iter()
        .map(|(id, params)| {
            let profile = params
                .iter()
                .fold(Profile::new(), |p, (param, value)| p.with_param(*param, *value))
                .with_motion(*id, None);
            (id.to_string(), profile)
        })
        .collect();
    let scenes: SceneStore = scenes
        .iter()
        .map(|(id, steps)| (id.to_string(), steps.clone()))
        .collect();
    Library::with_stores(profiles, scenes)
}

/// Simulator configuration
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Simulated time per tick
    pub frame: Duration,
    pub director: DirectorConfig,
    /// Parameters the simulated model has, besides those in the library
    pub extra_params: Vec<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let director = DirectorConfig::default();
        SimConfig {
            frame: Duration::from_millis(10),
            extra_params: vec![director.animator.mouth_param.clone()],
            director,
        }
    }
}

impl SimConfig {
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.director.idle_timeout = timeout;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.director.queue_capacity = capacity;
        self
    }
}

pub struct StageSimulator {
    clock: ManualClock,
    frame: Duration,
    director: Director<RecordingRenderer, ScriptedAudio>,
    renderer: RecordingRenderer,
    audio: ScriptedAudio,
    reports: Vec<StatusReport>,
    idle_entries: Vec<EngineTime>,
}

impl StageSimulator {
    pub fn new(library: Library, config: SimConfig) -> Self {
        let clock = ManualClock::new();
        let audio = ScriptedAudio::new(clock.clone());
        Self::with_audio(library, config, clock, audio)
    }

    /// Use a pre-scripted audio backend sharing `clock`
    pub fn with_audio(library: Library, config: SimConfig, clock: ManualClock, audio: ScriptedAudio) -> Self {
        let mut params: Vec<String> = library
            .profile_ids()
            .filter_map(|id| library.profile(id))
            .flat_map(|profile| profile.parameters.keys().cloned())
            .collect();
        params.extend(config.extra_params.iter().cloned());

        let renderer = RecordingRenderer::new(params, clock.clone());
        let director = Director::new(
            "sim".into(),
            config.director.clone(),
            library,
            renderer.clone(),
            audio.clone(),
        );

        StageSimulator {
            clock,
            frame: config.frame,
            director,
            renderer,
            audio,
            reports: Vec::new(),
            idle_entries: Vec::new(),
        }
    }

    pub fn now(&self) -> EngineTime {
        self.clock.now()
    }

    pub fn submit(&mut self, command: Command) {
        self.director.submit(command, self.clock.now());
        self.drain_report();
    }

    /// Advance one frame and tick
    pub fn step(&mut self) {
        let was_idle = self.director.stage().execution.is_idle;
        let now = self.clock.advance(self.frame);
        self.director.tick(now);
        if !was_idle && self.director.stage().execution.is_idle {
            self.idle_entries.push(now);
        }
        self.drain_report();
    }

    /// Tick until `duration` of simulated time has passed
    pub fn run_for(&mut self, duration: Duration) {
        let end = self.clock.now().saturating_add(duration);
        while self.clock.now() < end {
            self.step();
        }
    }

    /// Tick until `done` holds or `limit` passes; returns whether it held
    pub fn run_until(&mut self, limit: Duration, mut done: impl FnMut(&Self) -> bool) -> bool {
        let end = self.clock.now().saturating_add(limit);
        while self.clock.now() < end {
            if done(self) {
                return true;
            }
            self.step();
        }
        done(self)
    }

    fn drain_report(&mut self) {
        if let Some(report) = self.director.take_report() {
            self.reports.push(report);
        }
    }

    pub fn current_profile(&self) -> Option<&str> {
        self.director.stage().execution.current_profile.as_deref()
    }

    pub fn director(&self) -> &Director<RecordingRenderer, ScriptedAudio> {
        &self.director
    }

    pub fn director_mut(&mut self) -> &mut Director<RecordingRenderer, ScriptedAudio> {
        &mut self.director
    }

    pub fn renderer(&self) -> &RecordingRenderer {
        &self.renderer
    }

    pub fn audio(&self) -> &ScriptedAudio {
        &self.audio
    }

    pub fn reports(&self) -> &[StatusReport] {
        &self.reports
    }

    /// Times at which the stage went idle
    pub fn idle_entries(&self) -> &[EngineTime] {
        &self.idle_entries
    }
}

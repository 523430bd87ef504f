//! Director - command dispatch and per-tick orchestration
//!
//! The director is a synchronous state machine. It is owned by one task, fed
//! commands through `submit`, and advanced with `tick`. Nothing here blocks:
//! sequence waits are deadlines inside the active `SequenceRunner`, and audio
//! completion is observed by polling the controller.
//!
//! Per tick:
//! 1. Observe audio completion
//! 2. Advance the active execution (and start queued ones as it completes)
//! 3. Idle check
//! 4. Animate parameters toward targets, with lip sync while talking

use std::time::Duration;

use puppet_core::{
    ClientId, Command, EngineTime, Generation, Library, Payload, PuppetError, Renderer, Step,
    StatusReport, SyncSettings, TokenSource,
};
use puppet_state::{AnimatorConfig, IdleMonitor, IdleOutcome, ParameterAnimator, ProfileResolver, Stage};
use puppet_time::{FrameConfig, FramePacer};
use puppet_voice::{AudioBackend, AudioController, AudioEvent, DEFAULT_SENSITIVITY};
use tracing::{debug, info, warn};

use crate::{CommandQueue, RunnerStatus, SequenceRunner};

/// Director configuration
#[derive(Clone, Debug)]
pub struct DirectorConfig {
    /// Pending commands kept behind the current execution
    pub queue_capacity: usize,
    /// Inactivity before the idle fallback
    pub idle_timeout: Duration,
    /// Spectrum mean that maps to a fully open mouth
    pub lip_sync_sensitivity: f32,
    pub animator: AnimatorConfig,
    pub frame: FrameConfig,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        DirectorConfig {
            queue_capacity: 64,
            idle_timeout: Duration::from_secs(30),
            lip_sync_sensitivity: DEFAULT_SENSITIVITY,
            animator: AnimatorConfig::default(),
            frame: FrameConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DirectorStats {
    pub ticks: u64,
    pub commands_submitted: u64,
    pub interrupts: u64,
    pub executions_started: u64,
    pub executions_completed: u64,
    pub executions_cancelled: u64,
    pub noop_commands: u64,
    pub scenes_missing: u64,
    pub library_reloads: u64,
}

/// The execution currently authoritative over the stage
#[derive(Debug)]
struct Execution {
    generation: Generation,
    runner: Option<SequenceRunner>,
    /// Completion also waits for this clip
    awaits_audio: bool,
}

pub struct Director<R: Renderer, B: AudioBackend> {
    client_id: ClientId,
    config: DirectorConfig,
    stage: Stage,
    tokens: TokenSource,
    queue: CommandQueue,
    current: Option<Execution>,
    resolver: ProfileResolver,
    animator: ParameterAnimator,
    idle: IdleMonitor,
    audio: AudioController<B>,
    renderer: R,
    pacer: FramePacer,
    stats: DirectorStats,
}

impl<R: Renderer, B: AudioBackend> Director<R, B> {
    pub fn new(
        client_id: ClientId,
        config: DirectorConfig,
        library: Library,
        renderer: R,
        audio: B,
    ) -> Self {
        Director {
            client_id,
            stage: Stage::new(library),
            tokens: TokenSource::new(),
            queue: CommandQueue::new(config.queue_capacity),
            current: None,
            resolver: ProfileResolver::new(),
            animator: ParameterAnimator::new(config.animator.clone()),
            idle: IdleMonitor::new(config.idle_timeout),
            audio: AudioController::with_sensitivity(audio, config.lip_sync_sensitivity),
            renderer,
            pacer: FramePacer::with_config(config.frame.clone()),
            stats: DirectorStats::default(),
            config,
        }
    }

    /// Accept a command.
    ///
    /// Interrupting commands cancel everything and run now. Others run now
    /// when nothing is executing and queue otherwise.
    pub fn submit(&mut self, command: Command, now: EngineTime) {
        self.stats.commands_submitted += 1;

        if command.interrupt {
            self.stats.interrupts += 1;
            self.cancel();
            self.start(command, now);
        } else if !self.stage.execution.is_processing {
            self.start(command, now);
        } else {
            if self.queue.push(command) {
                debug!(queued = self.queue.len(), "command queued");
            }
            self.stage.request_report();
            return;
        }
        self.progress(now);
    }

    /// Cancel the current execution and everything queued behind it
    pub fn cancel(&mut self) {
        let generation = self.tokens.bump();
        let dropped = self.queue.clear();
        self.audio.stop();
        self.renderer.clear_subtitle();
        self.stage.execution.reset_execution();
        if self.current.take().is_some() {
            self.stats.executions_cancelled += 1;
        }
        self.stage.request_report();
        debug!(?generation, dropped, "execution cancelled");
    }

    /// Advance everything by one render tick
    pub fn tick(&mut self, now: EngineTime) {
        self.stats.ticks += 1;

        if let Some(AudioEvent::Ended { url }) = self.audio.poll() {
            self.on_audio_ended(&url, now);
        }

        self.progress(now);

        let outcome = self.idle.check(
            &mut self.stage,
            &self.resolver,
            &mut self.renderer,
            self.audio.talking(),
            now,
        );
        if let IdleOutcome::Entered(profile) = &outcome {
            info!(profile = %profile, "idle");
        }

        let delta = self.pacer.tick(now);
        let mouth = self.audio.mouth_level();
        self.animator
            .step(&self.stage.targets, &mut self.renderer, delta, mouth);
    }

    fn on_audio_ended(&mut self, url: &str, now: EngineTime) {
        debug!(url, "speech finished");
        self.renderer.clear_subtitle();
        if self.stage.settings.is_sync_enabled {
            self.stage.reset_targets_to_default();
        }
        self.stage.touch(now);
    }

    /// Set up a new execution for `command` without advancing it
    fn start(&mut self, command: Command, now: EngineTime) {
        let generation = self.tokens.bump();
        let Some(payload) = command.payload.filter(Payload::is_actionable) else {
            self.stats.noop_commands += 1;
            debug!("command without actionable payload");
            self.current = Some(Execution {
                generation,
                runner: None,
                awaits_audio: false,
            });
            self.stage.execution.is_processing = true;
            return;
        };

        self.stats.executions_started += 1;
        self.stage.execution.is_processing = true;

        if let Some(msg) = payload.message() {
            self.renderer.show_subtitle(msg);
        }

        let mut awaits_audio = false;
        if let Some(url) = payload.audio_url() {
            // A failed start is logged by the controller
            awaits_audio = self.audio.play(url).is_ok();
        }

        let runner = match self.select_sequence(&payload) {
            Some((steps, scene)) => {
                let looping = payload.looping();
                self.stage.execution.current_scene = scene;
                self.stage.execution.is_looping = looping;
                Some(SequenceRunner::new(steps, looping, generation))
            }
            None => {
                if let Some(profile) = payload.profile() {
                    self.apply_logged(profile, now);
                }
                None
            }
        };

        self.stage.request_report();
        self.current = Some(Execution {
            generation,
            runner,
            awaits_audio,
        });
    }

    /// Scene first, then the explicit step list
    fn select_sequence(&mut self, payload: &Payload) -> Option<(Vec<Step>, Option<String>)> {
        if let Some(scene) = payload.scene() {
            match self.stage.library.scene(scene) {
                Some(steps) => return Some((steps.to_vec(), Some(scene.to_string()))),
                None => {
                    self.stats.scenes_missing += 1;
                    warn!(error = %PuppetError::SceneNotFound(scene.to_string()), "ignoring scene");
                }
            }
        }
        payload.sequence().map(|steps| (steps.to_vec(), None))
    }

    fn apply_logged(&mut self, profile: &str, now: EngineTime) {
        match self
            .resolver
            .apply(&mut self.stage, &mut self.renderer, profile, now)
        {
            Ok(()) => {}
            Err(PuppetError::SyncDisabled) => debug!(profile, "sync disabled, profile not applied"),
            Err(e) => warn!(error = %e, "profile not applied"),
        }
    }

    /// Drive the active execution; on natural completion start the next
    /// queued command, repeating while executions complete immediately
    fn progress(&mut self, now: EngineTime) {
        while let Some(exec) = self.current.as_mut() {
            if !self.tokens.is_current(exec.generation) {
                self.current = None;
                return;
            }

            if let Some(runner) = exec.runner.as_mut() {
                match runner.advance(
                    now,
                    &self.tokens,
                    &mut self.stage,
                    &self.resolver,
                    &mut self.renderer,
                ) {
                    RunnerStatus::Waiting(_) => return,
                    RunnerStatus::Finished => exec.runner = None,
                    RunnerStatus::Cancelled => {
                        self.current = None;
                        return;
                    }
                }
            }

            if exec.awaits_audio && self.audio.talking() {
                return;
            }

            self.current = None;
            self.stage.execution.reset_execution();
            self.stats.executions_completed += 1;
            self.stage.request_report();

            match self.queue.pop() {
                Some(next) => self.start(next, now),
                None => return,
            }
        }
    }

    /// Apply backend toggles; mute takes effect on playing audio immediately
    pub fn apply_settings(&mut self, settings: SyncSettings) {
        if self.stage.settings == settings {
            return;
        }
        info!(
            muted = settings.is_muted,
            sync = settings.is_sync_enabled,
            "sync settings changed"
        );
        self.stage.settings = settings;
        self.audio.set_muted(settings.is_muted);
    }

    /// Swap in a freshly fetched library
    pub fn replace_library(&mut self, library: Library) {
        self.stage.library.replace(library);
        self.stats.library_reloads += 1;
        debug!(
            profiles = self.stage.library.profile_count(),
            scenes = self.stage.library.scene_count(),
            revision = self.stage.library.revision(),
            "library replaced"
        );
    }

    /// Pending status report, coalesced since the last call
    pub fn take_report(&mut self) -> Option<StatusReport> {
        self.stage.take_report(&self.client_id, self.queue.len())
    }

    pub fn is_processing(&self) -> bool {
        self.stage.execution.is_processing
    }

    pub fn is_talking(&self) -> bool {
        self.audio.talking()
    }

    pub fn generation(&self) -> Generation {
        self.tokens.current()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn shed_count(&self) -> u64 {
        self.queue.shed_count()
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn audio(&self) -> &AudioController<B> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioController<B> {
        &mut self.audio
    }

    pub fn stats(&self) -> &DirectorStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeadlessRenderer, SilentAudio};
    use puppet_core::{Profile, ProfileStore, SceneStore};

    fn ms(v: u64) -> EngineTime {
        EngineTime::from_millis(v)
    }

    fn director() -> Director<HeadlessRenderer, SilentAudio> {
        let mut profiles = ProfileStore::new();
        profiles.insert("default".into(), Profile::new().with_param("x", 0.0).with_param("y", 0.0));
        profiles.insert("a".into(), Profile::new().with_param("x", 1.0));
        profiles.insert("b".into(), Profile::new().with_param("x", 5.0).with_param("y", 9.0));
        profiles.insert("idle".into(), Profile::new().with_param("y", -1.0));
        let mut scenes = SceneStore::new();
        scenes.insert("ab".into(), vec![Step::timed("a", 100), Step::timed("b", 100)]);

        Director::new(
            ClientId::new("test"),
            DirectorConfig {
                idle_timeout: Duration::from_millis(1000),
                ..Default::default()
            },
            Library::with_stores(profiles, scenes),
            HeadlessRenderer::new(),
            SilentAudio::default(),
        )
    }

    fn current(d: &Director<HeadlessRenderer, SilentAudio>) -> Option<&str> {
        d.stage().execution.current_profile.as_deref()
    }

    #[test]
    fn test_single_profile_completes_immediately() {
        let mut d = director();
        d.submit(Command::profile("a"), ms(0));

        assert_eq!(current(&d), Some("a"));
        assert!(!d.is_processing());
        assert_eq!(d.stats().executions_completed, 1);
    }

    #[test]
    fn test_queued_commands_run_in_order() {
        let mut d = director();
        d.submit(Command::scene("ab", false), ms(0));
        d.submit(Command::profile("b"), ms(10));
        d.submit(Command::profile("a"), ms(20));
        assert_eq!(d.queue_len(), 2);
        assert_eq!(current(&d), Some("a"));

        d.tick(ms(100));
        assert_eq!(current(&d), Some("b"));
        assert_eq!(d.queue_len(), 2);

        // Scene done; both queued commands complete immediately, in order
        d.tick(ms(200));
        assert_eq!(d.queue_len(), 0);
        assert_eq!(current(&d), Some("a"));
        assert_eq!(d.stats().executions_completed, 3);
        assert!(!d.is_processing());
    }

    #[test]
    fn test_interrupt_clears_queue_and_loop() {
        let mut d = director();
        d.submit(Command::scene("ab", true), ms(0));
        d.submit(Command::profile("b"), ms(10));
        assert!(d.stage().execution.is_looping);

        d.submit(Command::profile("idle").interrupting(), ms(50));
        assert_eq!(d.queue_len(), 0);
        assert_eq!(current(&d), Some("idle"));
        assert!(!d.stage().execution.is_looping);
        assert_eq!(d.stage().execution.current_scene, None);

        for t in (100..2000).step_by(50) {
            d.tick(ms(t));
            assert_ne!(current(&d), Some("a"));
            assert_ne!(current(&d), Some("b"));
        }
        assert_eq!(d.stats().executions_cancelled, 1);
    }

    #[test]
    fn test_huge_step_duration_waits_instead_of_failing() {
        for millis in [1e300, 18_446_744_073_709_551_666.0] {
            let mut d = director();
            let step = Step::Timed {
                profile: "a".into(),
                duration: Some(millis),
            };
            d.submit(Command::sequence(vec![step, Step::named("b")], false), ms(0));
            assert_eq!(current(&d), Some("a"));

            d.tick(ms(1000));
            d.tick(ms(60_000));
            assert!(d.is_processing());
            assert_eq!(current(&d), Some("a"));
        }
    }

    #[test]
    fn test_noop_payload_completes() {
        let mut d = director();
        d.submit(Command::default(), ms(0));
        assert!(!d.is_processing());
        assert_eq!(d.stats().noop_commands, 1);
        assert_eq!(current(&d), None);
    }

    #[test]
    fn test_scene_wins_over_sequence() {
        let mut d = director();
        let mut cmd = Command::sequence(vec![Step::named("idle")], false);
        if let Some(payload) = cmd.payload.as_mut() {
            payload.scene = Some("ab".into());
        }
        d.submit(cmd, ms(0));
        assert_eq!(current(&d), Some("a"));
        assert_eq!(d.stage().execution.current_scene.as_deref(), Some("ab"));
    }

    #[test]
    fn test_unknown_scene_falls_through() {
        let mut d = director();
        let mut cmd = Command::profile("b");
        if let Some(payload) = cmd.payload.as_mut() {
            payload.scene = Some("nope".into());
        }
        d.submit(cmd, ms(0));
        assert_eq!(current(&d), Some("b"));
        assert_eq!(d.stats().scenes_missing, 1);
    }

    #[test]
    fn test_message_shows_subtitle_and_interrupt_clears_it() {
        let mut d = director();
        d.submit(Command::scene("ab", true).with_message("hi"), ms(0));
        assert_eq!(d.renderer().subtitle(), Some("hi"));

        d.submit(Command::profile("a").interrupting(), ms(10));
        assert_eq!(d.renderer().subtitle(), None);
    }

    #[test]
    fn test_sync_disabled_blocks_profiles() {
        let mut d = director();
        d.apply_settings(SyncSettings {
            is_muted: false,
            is_sync_enabled: false,
        });
        d.submit(Command::profile("a"), ms(0));
        assert_eq!(current(&d), None);
        assert!(!d.is_processing());
    }

    #[test]
    fn test_reports_coalesce_per_drain() {
        let mut d = director();
        d.submit(Command::scene("ab", false), ms(0));
        d.submit(Command::profile("b"), ms(1));

        let report = d.take_report().unwrap();
        assert_eq!(report.current_scene.as_deref(), Some("ab"));
        assert_eq!(report.queue_size, 1);
        assert!(d.take_report().is_none());
    }

    #[test]
    fn test_idle_after_timeout() {
        let mut d = director();
        d.submit(Command::profile("a"), ms(0));
        d.tick(ms(1000));
        assert!(!d.stage().execution.is_idle);
        d.tick(ms(1001));
        assert!(d.stage().execution.is_idle);
        assert_eq!(current(&d), Some("idle"));
    }
}

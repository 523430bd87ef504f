//! Sequence runner - timed profile steps as a resumable continuation
//!
//! A runner never sleeps. `advance` applies steps until it reaches a wait,
//! stores the wake-up deadline, and returns. The director calls `advance`
//! again on later ticks. The generation captured at start is checked before
//! every step and on every resume; once it is stale the runner is dead.

use puppet_core::{EngineTime, Generation, PuppetError, Renderer, Step, TokenSource};
use puppet_state::{ProfileResolver, Stage};
use tracing::{debug, warn};

/// Outcome of one `advance` call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunnerStatus {
    /// Call again at or after this time
    Waiting(EngineTime),
    /// Last step done and not looping
    Finished,
    /// Superseded by a newer execution
    Cancelled,
}

#[derive(Debug)]
pub struct SequenceRunner {
    steps: Vec<Step>,
    looping: bool,
    generation: Generation,
    cursor: usize,
    resume_at: Option<EngineTime>,
    /// A step with a duration ran during the current pass
    waited_this_pass: bool,
    passes: u64,
}

impl SequenceRunner {
    pub fn new(steps: Vec<Step>, looping: bool, generation: Generation) -> Self {
        SequenceRunner {
            steps,
            looping,
            generation,
            cursor: 0,
            resume_at: None,
            waited_this_pass: false,
            passes: 0,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Completed passes over the step list
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Run steps until the next wait, the end, or cancellation
    pub fn advance(
        &mut self,
        now: EngineTime,
        tokens: &TokenSource,
        stage: &mut Stage,
        resolver: &ProfileResolver,
        renderer: &mut dyn Renderer,
    ) -> RunnerStatus {
        loop {
            if !tokens.is_current(self.generation) {
                debug!(generation = ?self.generation, "sequence superseded");
                return RunnerStatus::Cancelled;
            }

            if let Some(at) = self.resume_at {
                if now < at {
                    return RunnerStatus::Waiting(at);
                }
                self.resume_at = None;
            }

            if self.cursor >= self.steps.len() {
                self.passes += 1;
                if !self.looping || self.steps.is_empty() {
                    return RunnerStatus::Finished;
                }
                self.cursor = 0;
                // Zero-wait loop: give the tick loop a turn
                if !std::mem::take(&mut self.waited_this_pass) {
                    return RunnerStatus::Waiting(now);
                }
            }

            let step = &self.steps[self.cursor];
            self.cursor += 1;

            match resolver.apply(stage, renderer, step.profile_id(), now) {
                Ok(()) => {}
                Err(PuppetError::SyncDisabled) => {
                    debug!(profile = step.profile_id(), "sync disabled, step not applied");
                }
                Err(e) => {
                    warn!(profile = step.profile_id(), error = %e, "skipping sequence step");
                    continue;
                }
            }

            if let Some(duration) = step.duration() {
                let until = now.saturating_add(duration);
                // Keeps the idle monitor quiet for the whole wait
                stage.extend_activity(until);
                self.resume_at = Some(until);
                self.waited_this_pass = true;
                return RunnerStatus::Waiting(until);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeadlessRenderer;
    use puppet_core::{Library, Profile, ProfileStore, SceneStore};

    struct Rig {
        tokens: TokenSource,
        stage: Stage,
        resolver: ProfileResolver,
        renderer: HeadlessRenderer,
    }

    impl Rig {
        fn new(ids: &[&str]) -> Self {
            let store: ProfileStore = ids
                .iter()
                .map(|id| (id.to_string(), Profile::new().with_param(*id, 1.0)))
                .collect();
            Rig {
                tokens: TokenSource::new(),
                stage: Stage::new(Library::with_stores(store, SceneStore::new())),
                resolver: ProfileResolver::new(),
                renderer: HeadlessRenderer::new(),
            }
        }

        fn advance(&mut self, runner: &mut SequenceRunner, at: u64) -> RunnerStatus {
            runner.advance(
                EngineTime::from_millis(at),
                &self.tokens,
                &mut self.stage,
                &self.resolver,
                &mut self.renderer,
            )
        }

        fn current(&self) -> Option<&str> {
            self.stage.execution.current_profile.as_deref()
        }
    }

    #[test]
    fn test_steps_wait_in_order() {
        let mut rig = Rig::new(&["a", "b", "c"]);
        let mut runner = SequenceRunner::new(
            vec![Step::timed("a", 100), Step::timed("b", 200), Step::named("c")],
            false,
            rig.tokens.bump(),
        );

        assert_eq!(rig.advance(&mut runner, 0), RunnerStatus::Waiting(EngineTime::from_millis(100)));
        assert_eq!(rig.current(), Some("a"));

        assert_eq!(rig.advance(&mut runner, 99), RunnerStatus::Waiting(EngineTime::from_millis(100)));
        assert_eq!(rig.current(), Some("a"));

        assert_eq!(rig.advance(&mut runner, 100), RunnerStatus::Waiting(EngineTime::from_millis(300)));
        assert_eq!(rig.current(), Some("b"));

        assert_eq!(rig.advance(&mut runner, 300), RunnerStatus::Finished);
        assert_eq!(rig.current(), Some("c"));
    }

    #[test]
    fn test_activity_extended_before_wait() {
        let mut rig = Rig::new(&["a"]);
        let mut runner = SequenceRunner::new(vec![Step::timed("a", 5000)], false, rig.tokens.bump());

        rig.advance(&mut runner, 1000);
        assert_eq!(rig.stage.last_activity(), EngineTime::from_millis(6000));
    }

    #[test]
    fn test_missing_profile_is_skipped() {
        let mut rig = Rig::new(&["a", "c"]);
        let mut runner = SequenceRunner::new(
            vec![Step::timed("a", 100), Step::timed("deleted", 500), Step::timed("c", 100)],
            false,
            rig.tokens.bump(),
        );

        rig.advance(&mut runner, 0);
        assert_eq!(rig.advance(&mut runner, 100), RunnerStatus::Waiting(EngineTime::from_millis(200)));
        assert_eq!(rig.current(), Some("c"));
        assert_eq!(rig.advance(&mut runner, 200), RunnerStatus::Finished);
    }

    #[test]
    fn test_stale_generation_cancels_without_side_effects() {
        let mut rig = Rig::new(&["a", "b"]);
        let mut runner = SequenceRunner::new(
            vec![Step::timed("a", 100), Step::timed("b", 100)],
            true,
            rig.tokens.bump(),
        );
        rig.advance(&mut runner, 0);

        rig.tokens.bump();
        assert_eq!(rig.advance(&mut runner, 100), RunnerStatus::Cancelled);
        assert_eq!(rig.current(), Some("a"));
        assert_eq!(rig.advance(&mut runner, 10_000), RunnerStatus::Cancelled);
    }

    #[test]
    fn test_loop_restarts() {
        let mut rig = Rig::new(&["a", "b"]);
        let mut runner = SequenceRunner::new(
            vec![Step::timed("a", 100), Step::timed("b", 100)],
            true,
            rig.tokens.bump(),
        );

        rig.advance(&mut runner, 0);
        rig.advance(&mut runner, 100);
        assert_eq!(rig.advance(&mut runner, 200), RunnerStatus::Waiting(EngineTime::from_millis(300)));
        assert_eq!(rig.current(), Some("a"));
        assert_eq!(runner.passes(), 1);
    }

    #[test]
    fn test_zero_wait_loop_yields_each_pass() {
        let mut rig = Rig::new(&["a", "b"]);
        let mut runner =
            SequenceRunner::new(vec![Step::named("a"), Step::named("b")], true, rig.tokens.bump());

        assert_eq!(rig.advance(&mut runner, 5), RunnerStatus::Waiting(EngineTime::from_millis(5)));
        assert_eq!(rig.current(), Some("b"));
        assert_eq!(runner.passes(), 1);

        assert_eq!(rig.advance(&mut runner, 6), RunnerStatus::Waiting(EngineTime::from_millis(6)));
        assert_eq!(runner.passes(), 2);
    }

    #[test]
    fn test_empty_sequence_finishes() {
        let mut rig = Rig::new(&[]);
        let mut runner = SequenceRunner::new(Vec::new(), true, rig.tokens.bump());
        assert_eq!(rig.advance(&mut runner, 0), RunnerStatus::Finished);
    }

    #[test]
    fn test_sync_disabled_keeps_timing() {
        let mut rig = Rig::new(&["a", "b"]);
        rig.stage.settings.is_sync_enabled = false;
        let mut runner = SequenceRunner::new(
            vec![Step::timed("a", 100), Step::named("b")],
            false,
            rig.tokens.bump(),
        );

        assert_eq!(rig.advance(&mut runner, 0), RunnerStatus::Waiting(EngineTime::from_millis(100)));
        assert_eq!(rig.current(), None);
        assert_eq!(rig.advance(&mut runner, 100), RunnerStatus::Finished);
    }
}

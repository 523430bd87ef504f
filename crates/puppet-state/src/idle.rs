//! Idle fallback
//!
//! Two states: Active and Idle. After `timeout` without activity the monitor
//! applies the `idle` profile, or `default` when there is no idle profile, and
//! marks the stage idle so the fallback runs once per idle period.

use std::time::Duration;

use puppet_core::{EngineTime, Renderer, DEFAULT_PROFILE, IDLE_PROFILE};
use tracing::{debug, warn};

use crate::{ProfileResolver, Stage};

/// Result of an idle check
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdleOutcome {
    /// Nothing to do
    Active,
    /// Already idle
    StillIdle,
    /// Entered idle and applied this profile
    Entered(String),
    /// Entered idle but no fallback profile exists
    EnteredWithoutProfile,
}

/// Inactivity watcher
#[derive(Clone, Debug)]
pub struct IdleMonitor {
    timeout: Duration,
}

impl Default for IdleMonitor {
    fn default() -> Self {
        IdleMonitor::new(Duration::from_secs(30))
    }
}

impl IdleMonitor {
    pub fn new(timeout: Duration) -> Self {
        IdleMonitor { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check for inactivity at `now`
    pub fn check(
        &self,
        stage: &mut Stage,
        resolver: &ProfileResolver,
        renderer: &mut dyn Renderer,
        talking: bool,
        now: EngineTime,
    ) -> IdleOutcome {
        if stage.execution.is_idle {
            return IdleOutcome::StillIdle;
        }
        if !stage.settings.is_sync_enabled || talking {
            return IdleOutcome::Active;
        }
        // last_activity may be ahead of now during a step wait
        if now.since(stage.last_activity()) <= self.timeout {
            return IdleOutcome::Active;
        }

        let fallback = [IDLE_PROFILE, DEFAULT_PROFILE]
            .into_iter()
            .find(|id| stage.library.contains_profile(id));

        let outcome = match fallback {
            Some(id) => match resolver.apply(stage, renderer, id, now) {
                Ok(()) => IdleOutcome::Entered(id.to_string()),
                Err(e) => {
                    warn!(profile = id, error = %e, "idle fallback failed");
                    IdleOutcome::EnteredWithoutProfile
                }
            },
            None => {
                warn!("idle timeout reached but no idle or default profile exists");
                IdleOutcome::EnteredWithoutProfile
            }
        };

        stage.execution.is_idle = true;
        stage.stats_mut().idle_fallbacks += 1;
        debug!(?outcome, "entered idle");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryRenderer;
    use puppet_core::{Library, Profile, ProfileStore, SceneStore};

    fn stage(ids: &[&str]) -> Stage {
        let store: ProfileStore = ids
            .iter()
            .map(|id| (id.to_string(), Profile::new().with_param(*id, 1.0)))
            .collect();
        Stage::new(Library::with_stores(store, SceneStore::new()))
    }

    fn ms(v: u64) -> EngineTime {
        EngineTime::from_millis(v)
    }

    #[test]
    fn test_fires_only_after_timeout() {
        let monitor = IdleMonitor::new(Duration::from_millis(1000));
        let resolver = ProfileResolver::new();
        let mut renderer = MemoryRenderer::default();
        let mut stage = stage(&["idle", "default"]);
        stage.touch(ms(0));

        assert_eq!(
            monitor.check(&mut stage, &resolver, &mut renderer, false, ms(1000)),
            IdleOutcome::Active
        );
        assert!(!stage.execution.is_idle);

        assert_eq!(
            monitor.check(&mut stage, &resolver, &mut renderer, false, ms(1001)),
            IdleOutcome::Entered("idle".into())
        );
        assert!(stage.execution.is_idle);
    }

    #[test]
    fn test_does_not_reapply_while_idle() {
        let monitor = IdleMonitor::new(Duration::from_millis(1000));
        let resolver = ProfileResolver::new();
        let mut renderer = MemoryRenderer::default();
        let mut stage = stage(&["idle"]);

        monitor.check(&mut stage, &resolver, &mut renderer, false, ms(2000));
        let applied = stage.stats().profiles_applied;
        for t in 2001..2100 {
            assert_eq!(
                monitor.check(&mut stage, &resolver, &mut renderer, false, ms(t)),
                IdleOutcome::StillIdle
            );
        }
        assert_eq!(stage.stats().profiles_applied, applied);
        assert_eq!(stage.stats().idle_fallbacks, 1);
    }

    #[test]
    fn test_falls_back_to_default() {
        let monitor = IdleMonitor::new(Duration::from_millis(10));
        let mut stage = stage(&["default"]);

        let outcome = monitor.check(
            &mut stage,
            &ProfileResolver::new(),
            &mut MemoryRenderer::default(),
            false,
            ms(50),
        );
        assert_eq!(outcome, IdleOutcome::Entered("default".into()));
        assert_eq!(stage.execution.current_profile.as_deref(), Some("default"));
        assert!(stage.execution.is_idle);
    }

    #[test]
    fn test_no_fallback_still_marks_idle() {
        let monitor = IdleMonitor::new(Duration::from_millis(10));
        let mut stage = stage(&[]);

        let outcome = monitor.check(
            &mut stage,
            &ProfileResolver::new(),
            &mut MemoryRenderer::default(),
            false,
            ms(50),
        );
        assert_eq!(outcome, IdleOutcome::EnteredWithoutProfile);
        assert!(stage.execution.is_idle);
    }

    #[test]
    fn test_talking_or_sync_off_blocks_idle() {
        let monitor = IdleMonitor::new(Duration::from_millis(10));
        let resolver = ProfileResolver::new();
        let mut renderer = MemoryRenderer::default();
        let mut stage = stage(&["idle"]);

        assert_eq!(
            monitor.check(&mut stage, &resolver, &mut renderer, true, ms(500)),
            IdleOutcome::Active
        );

        stage.settings.is_sync_enabled = false;
        assert_eq!(
            monitor.check(&mut stage, &resolver, &mut renderer, false, ms(500)),
            IdleOutcome::Active
        );
        assert!(!stage.execution.is_idle);
    }

    #[test]
    fn test_extended_activity_holds_off_idle() {
        let monitor = IdleMonitor::new(Duration::from_millis(1000));
        let resolver = ProfileResolver::new();
        let mut renderer = MemoryRenderer::default();
        let mut stage = stage(&["idle"]);
        stage.touch(ms(0));
        // A 5s step wait
        stage.extend_activity(ms(5000));

        assert_eq!(
            monitor.check(&mut stage, &resolver, &mut renderer, false, ms(5900)),
            IdleOutcome::Active
        );
        assert!(matches!(
            monitor.check(&mut stage, &resolver, &mut renderer, false, ms(6001)),
            IdleOutcome::Entered(_)
        ));
    }
}

//! Stage - the single owner of shared engine state
//!
//! Everything the resolver, idle monitor and animator read or write lives
//! here. The director owns exactly one stage and lends it out by reference.

use puppet_core::{
    ClientId, EngineTime, ExecutionState, Library, ParameterSet, StatusReport, SyncSettings,
};

/// Stage counters
#[derive(Clone, Debug, Default)]
pub struct StageStats {
    pub profiles_applied: u64,
    pub profiles_missing: u64,
    pub idle_fallbacks: u64,
    pub reports_requested: u64,
}

/// Shared engine state
#[derive(Debug, Default)]
pub struct Stage {
    /// Profile and scene definitions
    pub library: Library,
    /// Animator targets
    pub targets: ParameterSet,
    /// Execution flags and current ids
    pub execution: ExecutionState,
    /// Backend toggles
    pub settings: SyncSettings,
    /// Last activity; may lie in the future while a step waits
    last_activity: EngineTime,
    /// A status report should go out
    report_pending: bool,
    stats: StageStats,
}

impl Stage {
    pub fn new(library: Library) -> Self {
        Stage {
            library,
            ..Default::default()
        }
    }

    /// Mark activity at `now` and leave the idle state
    pub fn touch(&mut self, now: EngineTime) {
        self.last_activity = now;
        self.execution.is_idle = false;
    }

    /// Push last activity forward to `until` (never backwards)
    pub fn extend_activity(&mut self, until: EngineTime) {
        self.last_activity = self.last_activity.max(until);
    }

    pub fn last_activity(&self) -> EngineTime {
        self.last_activity
    }

    /// Reset targets to the default profile's parameters
    pub fn reset_targets_to_default(&mut self) {
        let baseline = ParameterSet::baseline(self.library.default_profile());
        self.targets.replace(baseline);
    }

    /// Ask for a status report on the next drain
    pub fn request_report(&mut self) {
        self.report_pending = true;
        self.stats.reports_requested += 1;
    }

    /// Take the pending report, if any, as a snapshot
    pub fn take_report(&mut self, client_id: &ClientId, queue_size: usize) -> Option<StatusReport> {
        if !std::mem::take(&mut self.report_pending) {
            return None;
        }
        Some(StatusReport::snapshot(client_id, &self.execution, queue_size))
    }

    pub fn stats(&self) -> &StageStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut StageStats {
        &mut self.stats
    }
}

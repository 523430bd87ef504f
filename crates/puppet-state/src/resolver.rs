//! Profile resolution
//!
//! Applying a profile rebuilds the whole target set: the default profile is
//! the baseline, the named profile is overlaid key by key. Parameters the
//! applied profile does not mention fall back to the baseline.

use puppet_core::{EngineTime, ParameterSet, PuppetError, PuppetResult, Renderer};
use tracing::debug;

use crate::Stage;

/// Resolves profile ids into target parameter sets
#[derive(Clone, Debug, Default)]
pub struct ProfileResolver;

impl ProfileResolver {
    pub fn new() -> Self {
        ProfileResolver
    }

    /// Apply profile `id` at `now`.
    ///
    /// Refused with `SyncDisabled` when sync is off and with `ProfileNotFound`
    /// when the library has no such profile. Neither refusal touches the stage.
    pub fn apply(
        &self,
        stage: &mut Stage,
        renderer: &mut dyn Renderer,
        id: &str,
        now: EngineTime,
    ) -> PuppetResult<()> {
        if !stage.settings.is_sync_enabled {
            return Err(PuppetError::SyncDisabled);
        }

        let Some(profile) = stage.library.profile(id) else {
            stage.stats_mut().profiles_missing += 1;
            return Err(PuppetError::ProfileNotFound(id.to_string()));
        };

        // Compute fully before swapping in
        let merged = ParameterSet::merged(stage.library.default_profile(), profile);
        let motion = profile.motion();

        stage.targets.replace(merged);
        if let Some(motion) = motion {
            debug!(profile = id, group = %motion.group, "starting motion");
            renderer.start_motion(&motion);
        }

        stage.execution.current_profile = Some(id.to_string());
        stage.touch(now);
        stage.stats_mut().profiles_applied += 1;
        stage.request_report();

        debug!(profile = id, params = stage.targets.len(), "profile applied");
        Ok(())
    }
}

//! Async driver - runs a `Director` against the backend
//!
//! One task owns the director. Commands, settings and library refreshes
//! arrive over channels fed by background pollers; render ticks come from a
//! local interval. Reports are drained once per loop turn.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use puppet_core::{Command, Renderer};
use puppet_time::Clock;
use puppet_transport::{
    start_command_poller, start_library_refresher, start_settings_poller, BackendClient,
    StateReporter,
};
use puppet_voice::AudioBackend;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::Director;

/// Driver timing
#[derive(Clone, Debug)]
pub struct DriverConfig {
    pub poll_interval: Duration,
    pub render_interval: Duration,
    pub settings_interval: Duration,
    pub library_refresh: Duration,
    /// Commands buffered between poller and director
    pub command_buffer: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            poll_interval: Duration::from_secs(1),
            render_interval: Duration::from_micros(16_667),
            settings_interval: Duration::from_secs(2),
            library_refresh: Duration::from_secs(30),
            command_buffer: 16,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DriverStats {
    pub commands_received: u64,
    pub settings_received: u64,
    pub libraries_received: u64,
    pub reports_sent: u64,
}

pub struct Driver<R: Renderer, B: AudioBackend, C: Clock> {
    director: Director<R, B>,
    client: Arc<BackendClient>,
    clock: C,
    config: DriverConfig,
    stats: DriverStats,
}

impl<R: Renderer, B: AudioBackend, C: Clock> Driver<R, B, C> {
    pub fn new(director: Director<R, B>, client: Arc<BackendClient>, clock: C, config: DriverConfig) -> Self {
        Driver {
            director,
            client,
            clock,
            config,
            stats: DriverStats::default(),
        }
    }

    /// Rewrite a relative audio URL against the backend
    fn resolve_media(&self, mut command: Command) -> Command {
        let Some(payload) = command.payload.as_mut() else {
            return command;
        };
        let Some(url) = payload.audio_url().map(str::to_string) else {
            return command;
        };
        match self.client.resolve_media_url(&url) {
            Ok(resolved) => payload.audio_url = Some(resolved),
            Err(e) => {
                warn!(error = %e, "dropping unresolvable audio url");
                payload.audio_url = None;
            }
        }
        command
    }

    /// Run until `shutdown` resolves, then hand the director back
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> (Director<R, B>, DriverStats) {
        let mut commands = start_command_poller(
            Arc::clone(&self.client),
            self.config.poll_interval,
            self.config.command_buffer,
        );
        let mut settings = start_settings_poller(Arc::clone(&self.client), self.config.settings_interval);
        let mut libraries =
            start_library_refresher(Arc::clone(&self.client), self.config.library_refresh);
        let reporter = StateReporter::spawn(Arc::clone(&self.client));

        let mut render = tokio::time::interval(self.config.render_interval);
        render.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(client = %self.director.client_id(), backend = %self.client.base(), "driver started");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(command) = commands.recv() => {
                    self.stats.commands_received += 1;
                    let command = self.resolve_media(command);
                    self.director.submit(command, self.clock.now());
                }
                Some(update) = settings.recv() => {
                    self.stats.settings_received += 1;
                    self.director.apply_settings(update);
                }
                Some(library) = libraries.recv() => {
                    self.stats.libraries_received += 1;
                    self.director.replace_library(library);
                }
                _ = render.tick() => {
                    self.director.tick(self.clock.now());
                }
            }

            if let Some(report) = self.director.take_report() {
                self.stats.reports_sent += 1;
                reporter.report(report);
            }
        }

        info!(ticks = self.director.stats().ticks, "driver stopped");
        (self.director, self.stats)
    }
}

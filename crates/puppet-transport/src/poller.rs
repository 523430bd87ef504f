//! Background command polling

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use puppet_core::{Command, Library, SyncSettings};

use crate::BackendClient;

/// Commands received from the backend, in poll order
pub type CommandReceiver = mpsc::Receiver<Command>;

/// Start a background poll loop.
///
/// One request per `interval`. Transport and decode errors are logged and the
/// next tick retries. The loop ends when the receiver is dropped.
pub fn start_command_poller(
    client: Arc<BackendClient>,
    interval: Duration,
    buffer_size: usize,
) -> CommandReceiver {
    let (tx, rx) = mpsc::channel(buffer_size.max(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tx.closed() => break,
            }

            match client.poll_command().await {
                Ok(Some(command)) => {
                    if tx.send(command).await.is_err() {
                        break; // Receiver dropped
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("command poll failed: {}", e);
                }
            }
        }
        tracing::debug!("command poller stopped");
    });

    rx
}

/// Start a background sync-settings poll loop.
///
/// Only settings the backend actually holds for this client are delivered.
pub fn start_settings_poller(
    client: Arc<BackendClient>,
    interval: Duration,
) -> mpsc::Receiver<SyncSettings> {
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tx.closed() => break,
            }

            match client.fetch_settings().await {
                Ok(Some(settings)) => {
                    if tx.send(settings).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("settings poll failed: {}", e);
                }
            }
        }
    });

    rx
}

/// Start a background library refresh loop.
///
/// The first refresh happens one `interval` after start; the caller is
/// expected to have loaded the library already. A failed refresh keeps the
/// previous library.
pub fn start_library_refresher(
    client: Arc<BackendClient>,
    interval: Duration,
) -> mpsc::Receiver<Library> {
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tx.closed() => break,
            }

            match client.fetch_library().await {
                Ok(library) => {
                    if tx.send(library).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("library refresh failed, keeping previous: {}", e);
                }
            }
        }
    });

    rx
}

//! Best-effort status reporting
//!
//! Reports go through a watch channel, so a slow backend only ever sees the
//! latest snapshot. Failures are logged and dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use puppet_core::StatusReport;

use crate::BackendClient;

#[derive(Debug, Default)]
pub struct ReporterStats {
    pub submitted: AtomicU64,
    pub sent: AtomicU64,
    pub failed: AtomicU64,
}

/// Handle to the background reporter task
#[derive(Clone)]
pub struct StateReporter {
    tx: Arc<watch::Sender<Option<StatusReport>>>,
    stats: Arc<ReporterStats>,
}

impl StateReporter {
    /// Spawn the reporter task; it ends when every handle is dropped
    pub fn spawn(client: Arc<BackendClient>) -> Self {
        let (tx, mut rx) = watch::channel(None::<StatusReport>);
        let stats = Arc::new(ReporterStats::default());
        let task_stats = Arc::clone(&stats);

        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let Some(report) = rx.borrow_and_update().clone() else {
                    continue;
                };
                match client.report(&report).await {
                    Ok(()) => {
                        task_stats.sent.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        task_stats.failed.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!("status report failed: {}", e);
                    }
                }
            }
        });

        StateReporter {
            tx: Arc::new(tx),
            stats,
        }
    }

    /// Queue a report, replacing any that has not gone out yet
    pub fn report(&self, report: StatusReport) {
        self.stats.submitted.fetch_add(1, Ordering::Relaxed);
        self.tx.send_replace(Some(report));
    }

    pub fn stats(&self) -> &ReporterStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use puppet_core::{ClientId, ExecutionState};
    use std::time::Duration;

    async fn wait_for(mut check: impl FnMut() -> bool) {
        for _ in 0..200 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn test_report_reaches_backend() {
        let mock = MockBackend::start().await;
        let client = Arc::new(BackendClient::new(&mock.url(), ClientId::new("c1")).unwrap());
        let reporter = StateReporter::spawn(client.clone());

        let state = ExecutionState {
            current_scene: Some("greet".into()),
            is_looping: true,
            ..Default::default()
        };
        reporter.report(StatusReport::snapshot(client.client_id(), &state, 0));

        wait_for(|| !mock.reports().is_empty()).await;
        let reports = mock.reports();
        assert_eq!(reports[0]["current_scene"], "greet");
        assert_eq!(reports[0]["is_looping"], true);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let client = Arc::new(
            BackendClient::with_timeout(
                "http://127.0.0.1:9",
                ClientId::new("c1"),
                Duration::from_millis(200),
            )
            .unwrap(),
        );
        let reporter = StateReporter::spawn(client.clone());
        reporter.report(StatusReport::snapshot(
            client.client_id(),
            &ExecutionState::default(),
            0,
        ));

        wait_for(|| reporter.stats().failed.load(Ordering::Relaxed) == 1).await;
        assert_eq!(reporter.stats().sent.load(Ordering::Relaxed), 0);
    }
}

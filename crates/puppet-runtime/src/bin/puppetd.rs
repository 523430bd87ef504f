//! puppetd - headless avatar director
//!
//! Configured from `PUPPET_*` environment variables. Stops on Ctrl-C.

use std::sync::Arc;

use puppet_core::Library;
use puppet_runtime::{init_logging, Director, Driver, HeadlessRenderer, RuntimeConfig, SilentAudio};
use puppet_time::SystemClock;
use puppet_transport::BackendClient;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RuntimeConfig::from_env()?;
    init_logging(config.log_json)?;

    let client = Arc::new(BackendClient::new(
        &config.backend_url,
        config.client_id.clone(),
    )?);
    info!(client = %config.client_id, backend = %client.base(), "puppetd starting");

    let library = match client.fetch_library().await {
        Ok(library) => library,
        Err(e) => {
            warn!(error = %e, "starting with an empty library");
            Library::new()
        }
    };
    info!(
        profiles = library.profile_count(),
        scenes = library.scene_count(),
        "library loaded"
    );

    let mut director = Director::new(
        config.client_id.clone(),
        config.director.clone(),
        library,
        HeadlessRenderer::new(),
        SilentAudio::default(),
    );
    match client.fetch_settings().await {
        Ok(Some(settings)) => director.apply_settings(settings),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "initial settings fetch failed"),
    }

    let driver = Driver::new(director, client, SystemClock::new(), config.driver.clone());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };
    let (director, stats) = driver.run(shutdown).await;

    info!(
        commands = stats.commands_received,
        executions = director.stats().executions_completed,
        shed = director.shed_count(),
        "puppetd stopped"
    );
    Ok(())
}

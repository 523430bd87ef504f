//! HTTP client for the control backend

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use puppet_core::{
    ClientId, Command, Library, ProfileStore, PuppetError, PuppetResult, SceneStore, StatusReport,
    SyncSettings,
};

fn transport_err(e: reqwest::Error) -> PuppetError {
    PuppetError::Transport(e.to_string())
}

/// `GET /api/status` body; only the fields the director reads
#[derive(Debug, Default, Deserialize)]
struct StatusBody {
    #[serde(default)]
    clients: HashMap<String, ClientEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ClientEntry {
    #[serde(default)]
    model_state: ModelState,
}

#[derive(Debug, Default, Deserialize)]
struct ModelState {
    is_muted: Option<bool>,
    is_sync_enabled: Option<bool>,
}

/// Client bound to one backend and one client id
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
    client_id: ClientId,
}

impl BackendClient {
    /// Client with a 5 second request timeout
    pub fn new(base: &str, client_id: ClientId) -> PuppetResult<Self> {
        Self::with_timeout(base, client_id, Duration::from_secs(5))
    }

    pub fn with_timeout(base: &str, client_id: ClientId, timeout: Duration) -> PuppetResult<Self> {
        let mut base = Url::parse(base)
            .map_err(|e| PuppetError::Config(format!("backend url {base:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(PuppetError::Config(format!("backend url {base} cannot be a base")));
        }
        // Relative joins need a trailing slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PuppetError::Config(e.to_string()))?;

        Ok(BackendClient {
            http,
            base,
            client_id,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    fn endpoint(&self, path: &str) -> PuppetResult<Url> {
        self.base
            .join(path)
            .map_err(|e| PuppetError::Config(format!("endpoint {path}: {e}")))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> PuppetResult<T> {
        let body = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(transport_err)?
            .error_for_status()
            .map_err(transport_err)?
            .bytes()
            .await
            .map_err(transport_err)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Next command for this client, `None` when the queue is empty
    pub async fn poll_command(&self) -> PuppetResult<Option<Command>> {
        let url = self.endpoint("api/queue")?;
        self.get_json(url, &[("client_id", self.client_id.as_str())])
            .await
    }

    /// Push a status report
    pub async fn report(&self, report: &StatusReport) -> PuppetResult<()> {
        let url = self.endpoint("api/report")?;
        self.http
            .post(url)
            .json(report)
            .send()
            .await
            .map_err(transport_err)?
            .error_for_status()
            .map_err(transport_err)?;
        Ok(())
    }

    pub async fn fetch_profiles(&self) -> PuppetResult<ProfileStore> {
        let url = self.endpoint("api/profiles")?;
        self.get_json(url, &[]).await
    }

    pub async fn fetch_scenes(&self) -> PuppetResult<SceneStore> {
        let url = self.endpoint("api/scenes")?;
        self.get_json(url, &[]).await
    }

    /// Fetch both stores. Any failure is `ConfigUnavailable`.
    pub async fn fetch_library(&self) -> PuppetResult<Library> {
        let (profiles, scenes) = tokio::try_join!(self.fetch_profiles(), self.fetch_scenes())
            .map_err(|e| PuppetError::ConfigUnavailable(e.to_string()))?;
        Ok(Library::with_stores(profiles, scenes))
    }

    /// Sync settings for this client, `None` if the backend has no entry yet
    pub async fn fetch_settings(&self) -> PuppetResult<Option<SyncSettings>> {
        let url = self.endpoint("api/status")?;
        let mut body: StatusBody = self.get_json(url, &[]).await?;

        let Some(entry) = body.clients.remove(self.client_id.as_str()) else {
            return Ok(None);
        };
        let defaults = SyncSettings::default();
        Ok(Some(SyncSettings {
            is_muted: entry.model_state.is_muted.unwrap_or(defaults.is_muted),
            is_sync_enabled: entry
                .model_state
                .is_sync_enabled
                .unwrap_or(defaults.is_sync_enabled),
        }))
    }

    /// Absolute http(s) URLs pass through; anything else joins onto the base
    pub fn resolve_media_url(&self, url: &str) -> PuppetResult<String> {
        if let Ok(parsed) = Url::parse(url) {
            if matches!(parsed.scheme(), "http" | "https") {
                return Ok(parsed.into());
            }
        }
        self.base
            .join(url)
            .map(String::from)
            .map_err(|e| PuppetError::Decode(format!("media url {url:?}: {e}")))
    }
}

//! Async HTTP client for the external execution engine.
//!
//! The engine stores configurations by name and runs machines, either returning a full
//! execution record or driving an attached display. This client only moves documents
//! across the wire; it never retries, and nothing it receives is trusted until it has
//! been through `Editor::adopt`.

use crate::codec::{from_value, Configuration};
use crate::loader::ConfigLoader;
use crate::render::ExecutionResult;
use crate::types::EditorError;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default address of an engine running as a Wi-Fi access point.
pub const DEFAULT_ENGINE_URL: &str = "http://192.168.4.1";
/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default pause between steps when running on a display, in milliseconds.
pub const DEFAULT_DISPLAY_DELAY_MS: u64 = 500;

/// Where and how to reach the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub display_delay_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENGINE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            display_delay_ms: DEFAULT_DISPLAY_DELAY_MS,
        }
    }
}

/// Errors raised while talking to the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid engine URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// The engine could not be reached at all (connection refused, timeout, ...).
    #[error("Engine unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    /// The engine answered with an `{error}` body.
    #[error("Engine rejected the request: {0}")]
    Rejected(String),
    /// The engine answered with a non-2xx status and no `{error}` body.
    #[error("Engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// HTTP 503 from a display endpoint: no display device is attached.
    #[error("No display device is attached to the engine")]
    DisplayUnavailable,
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Configuration(#[from] EditorError),
}

/// A configuration file stored on the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
}

impl StoredFile {
    /// The name without the `.json` extension, as used by load and delete.
    pub fn stem(&self) -> &str {
        self.name.strip_suffix(".json").unwrap_or(&self.name)
    }
}

/// Where a save ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Stored on the engine under this file name.
    Remote(String),
    /// The engine was unreachable; written to this local path instead.
    Local(PathBuf),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct SavedBody {
    file: String,
}

#[derive(Deserialize)]
struct FilesBody {
    files: Vec<StoredFile>,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Serialize)]
struct RunRequest<'a> {
    input: &'a str,
    config: &'a Configuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    delay: Option<u64>,
}

/// Client for the engine's HTTP API.
#[derive(Debug, Clone)]
pub struct EngineClient {
    base: Url,
    http: Client,
    display_delay_ms: u64,
}

impl EngineClient {
    pub fn new(settings: &EngineSettings) -> Result<Self, EngineError> {
        let invalid = |reason: String| EngineError::InvalidUrl {
            url: settings.base_url.clone(),
            reason,
        };

        let mut base = Url::parse(&settings.base_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(EngineError::Unreachable)?;

        Ok(Self {
            base,
            http,
            display_delay_ms: settings.display_delay_ms,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str, filename: Option<&str>) -> Result<Url, EngineError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|e| EngineError::InvalidUrl {
                url: format!("{}{}", self.base, path),
                reason: e.to_string(),
            })?;
        if let Some(name) = filename {
            url.query_pairs_mut().append_pair("filename", name);
        }
        Ok(url)
    }

    /// Liveness probe. Any 2xx answer counts as connected.
    pub async fn status(&self) -> bool {
        let url = match self.endpoint("status", None) {
            Ok(url) => url,
            Err(_) => return false,
        };

        match self.http.get(url).send().await {
            Ok(response) => {
                debug!(status = %response.status(), "engine status probe");
                response.status().is_success()
            }
            Err(e) => {
                debug!(error = %e, "engine status probe failed");
                false
            }
        }
    }

    /// Stores `config` on the engine under `name`. Returns the engine's file name.
    pub async fn save(&self, name: &str, config: &Configuration) -> Result<String, EngineError> {
        let url = self.endpoint("api/save", Some(name))?;
        let response = self
            .http
            .post(url)
            .json(config)
            .send()
            .await
            .map_err(EngineError::Unreachable)?;

        let body: SavedBody = decode(check(response).await?).await?;
        Ok(body.file)
    }

    /// Saves on the engine, or writes `<directory>/<name>.json` if the engine is unreachable.
    ///
    /// Only transport failures fall back; an engine that answers with an error is reported.
    pub async fn save_with_fallback(
        &self,
        name: &str,
        config: &Configuration,
        directory: &Path,
    ) -> Result<SaveOutcome, EngineError> {
        match self.save(name, config).await {
            Ok(file) => Ok(SaveOutcome::Remote(file)),
            Err(EngineError::Unreachable(e)) => {
                let path = ConfigLoader::path_for(directory, name);
                warn!(error = %e, path = %path.display(), "engine unreachable, saving locally");
                ConfigLoader::save_file(&path, config)?;
                Ok(SaveOutcome::Local(path))
            }
            Err(e) => Err(e),
        }
    }

    /// Fetches a stored configuration.
    ///
    /// Only the document's shape is checked here; pass the result to `Editor::adopt`
    /// before using it.
    pub async fn load(&self, name: &str) -> Result<Configuration, EngineError> {
        let url = self.endpoint("api/load", Some(name))?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(EngineError::Unreachable)?;

        let value: serde_json::Value = decode(check(response).await?).await?;
        Ok(from_value(value)?)
    }

    pub async fn files(&self) -> Result<Vec<StoredFile>, EngineError> {
        let url = self.endpoint("api/files", None)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(EngineError::Unreachable)?;

        let body: FilesBody = decode(check(response).await?).await?;
        Ok(body.files)
    }

    pub async fn delete(&self, name: &str) -> Result<(), EngineError> {
        let url = self.endpoint("api/delete", Some(name))?;
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(EngineError::Unreachable)?;

        check(response).await?;
        Ok(())
    }

    /// Runs the machine on the engine and returns the full execution record.
    pub async fn execute(
        &self,
        input: &str,
        config: &Configuration,
    ) -> Result<ExecutionResult, EngineError> {
        let url = self.endpoint("api/execute", None)?;
        let request = RunRequest {
            input,
            config,
            delay: None,
        };
        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(EngineError::Unreachable)?;

        decode(check(response).await?).await
    }

    /// Starts an animated run on the engine's display. Only an acknowledgement comes back.
    pub async fn execute_on_display(
        &self,
        input: &str,
        config: &Configuration,
        delay_ms: Option<u64>,
    ) -> Result<(), EngineError> {
        let url = self.endpoint("api/execute-display", None)?;
        let request = RunRequest {
            input,
            config,
            delay: Some(delay_ms.unwrap_or(self.display_delay_ms)),
        };
        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(EngineError::Unreachable)?;

        check_display(response).await?;
        Ok(())
    }

    /// Starts step-by-step mode, driven afterwards by the device's own buttons.
    pub async fn start_step_mode(
        &self,
        input: &str,
        config: &Configuration,
    ) -> Result<String, EngineError> {
        let url = self.endpoint("api/start-step-mode", None)?;
        let request = RunRequest {
            input,
            config,
            delay: None,
        };
        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(EngineError::Unreachable)?;

        let body: MessageBody = decode(check_display(response).await?).await?;
        Ok(body.message)
    }
}

/// Passes 2xx responses through and turns everything else into an error.
async fn check(response: Response) -> Result<Response, EngineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(status = %status, error = %e, "failed to read engine error body");
            return Err(EngineError::InvalidResponse(format!(
                "HTTP {} with unreadable body: {}",
                status, e
            )));
        }
    };
    let error = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody { error }) => EngineError::Rejected(error),
        Err(_) => EngineError::Status {
            status: status.as_u16(),
            body,
        },
    };
    warn!(status = %status, error = %error, "engine request failed");
    Err(error)
}

/// Like `check`, but maps 503 to `DisplayUnavailable`.
async fn check_display(response: Response) -> Result<Response, EngineError> {
    if response.status() == StatusCode::SERVICE_UNAVAILABLE {
        warn!("engine reports no display device");
        return Err(EngineError::DisplayUnavailable);
    }
    check(response).await
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, EngineError> {
    response
        .json::<T>()
        .await
        .map_err(|e| EngineError::InvalidResponse(e.to_string()))
}

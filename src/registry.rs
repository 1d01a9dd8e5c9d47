//! Model registry client
//!
//! Resolves a registry-qualified model reference of the form
//! `models:/{name}@{version}` into a loaded [`LinearModel`] handle. The
//! registry stores versioned artifacts; this client fetches exactly one of
//! them at startup. Resolution is deliberately not retried: a first
//! failure aborts startup. Unlike the service this replaces, the call
//! carries a bounded timeout so a hung registry cannot block forever.

use std::fmt;
use std::time::Duration;

use crate::error::{PredecirError, Result};
use crate::model::{LinearModel, ModelArtifact};

/// Default bound on the startup resolution call
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(30);

/// A registry-qualified model reference: `models:/{name}@{version}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelUri {
    /// Registered model name
    pub name: String,
    /// Version or alias label
    pub version: String,
}

impl ModelUri {
    /// Build a reference from a name and version label
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse a `models:/{name}@{version}` reference
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` when the scheme is wrong or either component
    /// is empty.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri.strip_prefix("models:/").ok_or_else(|| {
            PredecirError::model_load(format!(
                "invalid model reference '{uri}': expected models:/ scheme"
            ))
        })?;
        let (name, version) = rest.split_once('@').ok_or_else(|| {
            PredecirError::model_load(format!(
                "invalid model reference '{uri}': expected models:/name@version"
            ))
        })?;
        if name.is_empty() || version.is_empty() {
            return Err(PredecirError::model_load(format!(
                "invalid model reference '{uri}': empty name or version"
            )));
        }
        Ok(Self::new(name, version))
    }
}

impl fmt::Display for ModelUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "models:/{}@{}", self.name, self.version)
    }
}

/// HTTP client for the model registry
pub struct RegistryClient {
    base_url: String,
    client: reqwest::Client,
}

impl RegistryClient {
    /// Create a client for the registry at `base_url` with the default
    /// resolution timeout
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_RESOLVE_TIMEOUT)
    }

    /// Create a client with a custom resolution timeout
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` if the underlying HTTP client cannot be built.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PredecirError::model_load(format!("cannot build registry client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Registry location this client talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL the artifact for `uri` is served at
    #[must_use]
    pub fn artifact_url(&self, uri: &ModelUri) -> String {
        format!(
            "{}/api/2.0/registry/models/{}/versions/{}",
            self.base_url, uri.name, uri.version
        )
    }

    /// Fetch and materialize the model behind a reference
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` when the registry is unreachable, answers
    /// non-2xx (unknown name/version), or serves a malformed artifact.
    pub async fn resolve(&self, uri: &ModelUri) -> Result<LinearModel> {
        let url = self.artifact_url(uri);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PredecirError::model_load(format!("registry unreachable at {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(PredecirError::model_load(format!(
                "registry returned {} for {uri}",
                response.status()
            )));
        }

        let artifact: ModelArtifact = response
            .json()
            .await
            .map_err(|e| PredecirError::model_load(format!("malformed artifact for {uri}: {e}")))?;

        LinearModel::from_artifact(artifact)
    }
}

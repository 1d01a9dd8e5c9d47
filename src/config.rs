//! Application configuration
//!
//! Loads the JSON configuration file the service is launched with. Two
//! registry location forms are accepted: a full `tracking_uri`, or a
//! `tracking_base_url` + `tracking_port` pair that gets composed. The HTTP
//! listen port may be given as `service_port` or `port`. Missing required
//! keys are a startup-time fatal error; unrecognized keys are ignored.

use std::path::Path;

use serde::Deserialize;

use crate::error::{PredecirError, Result};

/// Which prediction task this deployment serves
///
/// Selects both the feature schema and the endpoint path. The registry
/// model must have been trained for the matching schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionTask {
    /// Credit-default classification, served at `POST /default_payment`
    DefaultPayment,
    /// Diabetes classification, served at `POST /has_diabetes`
    HasDiabetes,
}

impl PredictionTask {
    /// Endpoint path the task is served under
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Self::DefaultPayment => "/default_payment",
            Self::HasDiabetes => "/has_diabetes",
        }
    }
}

impl Default for PredictionTask {
    fn default() -> Self {
        Self::DefaultPayment
    }
}

/// Application configuration as read from `config/app.json`
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Registered model name in the registry
    pub model_name: String,
    /// Model version or alias label
    pub model_version: String,
    /// Full registry location, e.g. `http://localhost:5000`
    #[serde(default)]
    pub tracking_uri: Option<String>,
    /// Registry base URL, composed with `tracking_port`
    #[serde(default)]
    pub tracking_base_url: Option<String>,
    /// Registry port, composed with `tracking_base_url`
    #[serde(default)]
    pub tracking_port: Option<u16>,
    /// HTTP listen port (`port` accepted as an alias)
    #[serde(default, alias = "port")]
    pub service_port: Option<u16>,
    /// Active prediction task (defaults to credit-default)
    #[serde(default)]
    pub task: PredictionTask,
}

impl AppConfig {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file cannot be read, is not valid JSON, or
    /// is missing a required key.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PredecirError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Parse configuration from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `Config` on malformed JSON or missing required keys.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| PredecirError::config(format!("invalid configuration: {e}")))
    }

    /// Resolve the registry location
    ///
    /// Prefers `tracking_uri`; falls back to composing
    /// `tracking_base_url:tracking_port`.
    ///
    /// # Errors
    ///
    /// Returns `Config` when neither form is present.
    pub fn tracking_uri(&self) -> Result<String> {
        if let Some(uri) = &self.tracking_uri {
            return Ok(uri.clone());
        }
        match (&self.tracking_base_url, self.tracking_port) {
            (Some(base), Some(port)) => Ok(format!("{base}:{port}")),
            _ => Err(PredecirError::config(
                "missing 'tracking_uri' (or 'tracking_base_url' + 'tracking_port')",
            )),
        }
    }

    /// Resolve the HTTP listen port
    ///
    /// # Errors
    ///
    /// Returns `Config` when neither `service_port` nor `port` is present.
    pub fn service_port(&self) -> Result<u16> {
        self.service_port
            .ok_or_else(|| PredecirError::config("missing 'service_port' (or 'port')"))
    }
}

//! Firebase provider configuration

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Identity Toolkit endpoint
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";

/// Default Firestore REST endpoint
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration for the Firebase identity and document-store providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    /// Web API key for the Firebase project
    pub api_key: String,

    /// Firebase project id
    pub project_id: String,

    /// Identity Toolkit base URL, overridable for the local emulator
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,

    /// Firestore base URL, overridable for the local emulator
    #[serde(default = "default_firestore_endpoint")]
    pub firestore_endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_auth_endpoint() -> String {
    DEFAULT_AUTH_ENDPOINT.to_string()
}

fn default_firestore_endpoint() -> String {
    DEFAULT_FIRESTORE_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl FirebaseConfig {
    /// Create a configuration for the hosted backend
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            auth_endpoint: default_auth_endpoint(),
            firestore_endpoint: default_firestore_endpoint(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Load configuration from `SENDIT_FIREBASE_*` environment variables
    ///
    /// `SENDIT_FIREBASE_API_KEY` and `SENDIT_FIREBASE_PROJECT_ID` are
    /// required; `SENDIT_FIREBASE_AUTH_ENDPOINT` and
    /// `SENDIT_FIREBASE_FIRESTORE_ENDPOINT` override the hosted endpoints,
    /// which is how the tests point at the local emulator.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("SENDIT_FIREBASE_API_KEY")
            .map_err(|_| ClientError::Config("SENDIT_FIREBASE_API_KEY is not set".to_string()))?;
        let project_id = std::env::var("SENDIT_FIREBASE_PROJECT_ID").map_err(|_| {
            ClientError::Config("SENDIT_FIREBASE_PROJECT_ID is not set".to_string())
        })?;

        let mut config = Self::new(api_key, project_id);
        if let Ok(endpoint) = std::env::var("SENDIT_FIREBASE_AUTH_ENDPOINT") {
            config.auth_endpoint = endpoint;
        }
        if let Ok(endpoint) = std::env::var("SENDIT_FIREBASE_FIRESTORE_ENDPOINT") {
            config.firestore_endpoint = endpoint;
        }
        Ok(config)
    }

    /// Override the auth endpoint (emulator support)
    pub fn with_auth_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.auth_endpoint = endpoint.into();
        self
    }

    /// Override the Firestore endpoint (emulator support)
    pub fn with_firestore_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.firestore_endpoint = endpoint.into();
        self
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Root path of the project's default database in the Firestore API
    pub fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }
}

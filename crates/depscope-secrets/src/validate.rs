//! Out-of-band service-account key validation
//!
//! Asks the credential authority for the account's current certificates
//! and checks the fingerprint signature against them. The universe
//! hostname is configurable so tests (and sovereign-cloud deployments)
//! can point elsewhere.

use depscope_core::Secret;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_UNIVERSE: &str = "www.googleapis.com";

/// Outcome of validating one candidate secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// The account exists and a current certificate verifies the
    /// fingerprint: the key still grants access.
    Valid,
    /// The account does not exist.
    Invalid,
    /// The endpoint answered but nothing verified (rotated key,
    /// unparseable body, unexpected status).
    Failed,
}

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("validation transport failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("validation canceled")]
    Canceled,

    #[error("secret is not a service-account key")]
    WrongSecretKind,
}

pub struct ServiceAccountValidator {
    http: Client,
    universe: String,
}

impl ServiceAccountValidator {
    pub fn new() -> Self {
        Self::with_universe(DEFAULT_UNIVERSE)
    }

    /// Point the validator at another universe. Accepts a bare hostname
    /// (`https://` is assumed) or a full base URL.
    pub fn with_universe(universe: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("depscope/0.4.0")
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            universe: universe.into(),
        }
    }

    /// Swap in a caller-supplied HTTP client.
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    fn metadata_url(&self, service_account: &str) -> String {
        let base = if self.universe.contains("://") {
            self.universe.clone()
        } else {
            format!("https://{}", self.universe)
        };
        format!(
            "{}/robot/v1/metadata/x509/{}",
            base,
            urlencoding::encode(service_account)
        )
    }

    /// Validate a detected service-account key secret.
    pub async fn validate(
        &self,
        secret: &Secret,
        cancel: &CancellationToken,
    ) -> Result<ValidationStatus, ValidatorError> {
        let (service_account, signature) = match secret {
            Secret::ServiceAccountKey {
                service_account,
                signature,
                ..
            } => (service_account, signature),
            _ => return Err(ValidatorError::WrongSecretKind),
        };

        let url = self.metadata_url(service_account);
        debug!("validating service-account key against {url}");

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ValidatorError::Canceled),
            response = self.http.get(&url).send() => response?,
        };

        match response.status() {
            StatusCode::NOT_FOUND => Ok(ValidationStatus::Invalid),
            StatusCode::OK => {
                // Body is a map of key id to certificate PEM.
                let certificates = match response.json::<HashMap<String, String>>().await {
                    Ok(certificates) => certificates,
                    Err(_) => return Ok(ValidationStatus::Failed),
                };
                for certificate in certificates.values() {
                    if depscope_crypto::verify(signature, certificate).unwrap_or(false) {
                        return Ok(ValidationStatus::Valid);
                    }
                }
                Ok(ValidationStatus::Failed)
            }
            _ => Ok(ValidationStatus::Failed),
        }
    }
}

impl Default for ServiceAccountValidator {
    fn default() -> Self {
        Self::new()
    }
}

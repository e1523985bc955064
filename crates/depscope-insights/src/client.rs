use crate::error::{InsightsError, Result};
use crate::models::*;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Hard limit the service imposes on one batch query.
pub const MAX_BATCH_KEYS: usize = 5000;

/// Client for the deps.dev insights API.
///
/// ## Example
///
/// ```no_run
/// use depscope_insights::{InsightsClient, System, VersionKey};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = InsightsClient::new();
///     let deprecated = client
///         .query_version_batch(&[VersionKey {
///             system: System::Npm,
///             name: "request".to_string(),
///             version: "2.88.2".to_string(),
///         }])
///         .await?;
///     println!("resolved {} keys", deprecated.len());
///     Ok(())
/// }
/// ```
pub struct InsightsClient {
    client: Client,
    base_url: String,
}

impl InsightsClient {
    pub fn new() -> Self {
        Self::with_base_url("https://api.deps.dev")
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("depscope/0.4.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Resolve one chunk of version keys (at most [`MAX_BATCH_KEYS`]) to
    /// their deprecation flags, following the service's pagination until
    /// the page token comes back empty.
    ///
    /// The returned map is keyed by the version key from the *request*:
    /// the service may canonicalize names in its responses, and the caller
    /// joins on what it asked for.
    pub async fn query_version_batch(
        &self,
        keys: &[VersionKey],
    ) -> Result<HashMap<VersionKey, bool>> {
        if keys.len() > MAX_BATCH_KEYS {
            return Err(InsightsError::BatchTooLarge(keys.len()));
        }

        let url = format!("{}/v3alpha/versionbatch", self.base_url);
        let mut resolved = HashMap::new();
        let mut page_token: Option<String> = None;

        loop {
            let body = VersionBatchRequest {
                requests: keys
                    .iter()
                    .map(|k| VersionQuery {
                        version_key: k.clone(),
                    })
                    .collect(),
                page_token: page_token.clone(),
            };

            debug!("querying version batch: {} keys, page={:?}", keys.len(), page_token);
            let response = self.client.post(&url).json(&body).send().await?;
            if !response.status().is_success() {
                return Err(InsightsError::ApiError(format!(
                    "HTTP {}",
                    response.status()
                )));
            }
            let page = response.json::<VersionBatchResponse>().await?;

            for result in page.responses {
                let Some(request) = result.request else { continue };
                let deprecated = result
                    .version
                    .map(|v| v.is_deprecated)
                    .unwrap_or(false);
                resolved.insert(request.version_key, deprecated);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(resolved)
    }
}

impl Default for InsightsClient {
    fn default() -> Self {
        Self::new()
    }
}

//! Deprecation enricher
//!
//! Annotates every package with the `deprecated` flag reported by the
//! insights service. Keys are normalized first (the service wants Go
//! module versions with a `v` prefix), grouped so each distinct
//! `(system, name, version)` is queried once, and resolved in chunks of at
//! most [`MAX_BATCH_KEYS`]. Mutations are applied only after every chunk
//! resolved; a transport error aborts the enricher without partial writes.

use crate::client::{InsightsClient, MAX_BATCH_KEYS};
use crate::models::{System, VersionKey};
use anyhow::Context;
use async_trait::async_trait;
use depscope_core::{Ecosystem, Inventory};
use depscope_orchestrator::{Enricher, ScanInput};
use std::collections::HashMap;
use tracing::{debug, info};

pub struct DeprecationEnricher {
    client: InsightsClient,
}

impl DeprecationEnricher {
    pub fn new() -> Self {
        Self {
            client: InsightsClient::new(),
        }
    }

    pub fn with_client(client: InsightsClient) -> Self {
        Self { client }
    }

    /// The key the service knows this package under, or `None` when the
    /// ecosystem has no insights mapping.
    fn version_key(package: &depscope_core::Package) -> Option<VersionKey> {
        let system = System::from_ecosystem(package.ecosystem)?;
        let version = if package.ecosystem == Ecosystem::Golang
            && package.name != "stdlib"
            && !package.version.starts_with('v')
        {
            format!("v{}", package.version)
        } else {
            package.version.clone()
        };
        Some(VersionKey {
            system,
            name: package.name.clone(),
            version,
        })
    }
}

impl Default for DeprecationEnricher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Enricher for DeprecationEnricher {
    fn name(&self) -> &str {
        "insights/deprecation"
    }

    async fn enrich(&self, input: &ScanInput, inventory: &mut Inventory) -> anyhow::Result<()> {
        // Group package indices by normalized key so duplicates are asked once.
        let mut by_key: HashMap<VersionKey, Vec<usize>> = HashMap::new();
        for (idx, package) in inventory.packages().iter().enumerate() {
            if let Some(key) = Self::version_key(package) {
                by_key.entry(key).or_default().push(idx);
            }
        }
        if by_key.is_empty() {
            debug!("no packages with an insights mapping");
            return Ok(());
        }

        let keys: Vec<VersionKey> = by_key.keys().cloned().collect();
        let mut resolved: HashMap<VersionKey, bool> = HashMap::new();
        for chunk in keys.chunks(MAX_BATCH_KEYS) {
            if input.cancel.is_cancelled() {
                anyhow::bail!("scan canceled");
            }
            let chunk_resolved = self
                .client
                .query_version_batch(chunk)
                .await
                .context("insights version batch failed")?;
            resolved.extend(chunk_resolved);
        }

        let mut deprecated_count = 0;
        for (key, indices) in &by_key {
            let deprecated = resolved.get(key).copied().unwrap_or(false);
            for &idx in indices {
                inventory.packages_mut()[idx].deprecated = deprecated;
            }
            if deprecated {
                deprecated_count += indices.len();
            }
        }
        info!(
            "deprecation lookup complete: {} keys, {} deprecated packages",
            by_key.len(),
            deprecated_count
        );
        Ok(())
    }
}

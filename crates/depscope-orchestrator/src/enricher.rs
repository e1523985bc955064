//! The enricher capability trait and its per-run input

use async_trait::async_trait;
use depscope_core::Inventory;
use std::io;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Input handed to every enricher for one scan: the scan root, a view of
/// the filesystem under it, and a cancellation token.
#[derive(Debug, Clone)]
pub struct ScanInput {
    /// Root of the scanned tree.
    pub root: PathBuf,
    /// Cooperative cancellation. Enrichers poll this at natural
    /// granularity (per module, per chunk, per artifact) and return
    /// promptly once it fires; already-appended signals stay.
    pub cancel: CancellationToken,
}

impl ScanInput {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an inventory-relative location against the scan root.
    pub fn resolve(&self, location: impl AsRef<Path>) -> PathBuf {
        self.root.join(location)
    }

    /// Read a file under the scan root.
    pub fn read(&self, location: impl AsRef<Path>) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(location))
    }

    /// Open a file under the scan root for streaming reads.
    pub fn open(&self, location: impl AsRef<Path>) -> io::Result<std::fs::File> {
        std::fs::File::open(self.resolve(location))
    }
}


/// An enrichment plugin: reads the inventory, performs its work, and
/// mutates records in place.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Stable plugin name, e.g. `"reachability/native"`.
    fn name(&self) -> &str;

    /// Names of producers that must run before this enricher.
    fn requires(&self) -> Vec<String> {
        Vec::new()
    }

    async fn enrich(&self, input: &ScanInput, inventory: &mut Inventory) -> anyhow::Result<()>;
}

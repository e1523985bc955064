//! The detector capability trait

use depscope_core::Secret;
use std::fmt;

/// Default window size exposed to the engine, in bytes.
pub const DEFAULT_WINDOW: usize = 10 * 1024;

/// One detected secret and its offset in the scanned stream.
///
/// `Debug` is hand-written so that logging detector output renders the
/// secret through its redacted form, never the raw material.
#[derive(Clone, PartialEq)]
pub struct Detection {
    pub secret: Secret,
    pub position: usize,
}

impl Detection {
    pub fn new(secret: Secret, position: usize) -> Self {
        Self { secret, position }
    }
}

impl fmt::Debug for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detection")
            .field("secret", &self.secret.redacted())
            .field("position", &self.position)
            .finish()
    }
}


/// A pull-based secret detector. The engine hands it windows of bytes;
/// positions in the returned detections are window-relative.
pub trait Detector: Send + Sync {
    /// Stable detector name, e.g. `"secrets/gcp-service-account-key"`.
    fn name(&self) -> &str;

    /// The window size this detector needs to see a whole secret.
    fn max_secret_len(&self) -> usize {
        DEFAULT_WINDOW
    }

    fn detect(&self, data: &[u8]) -> Vec<Detection>;
}

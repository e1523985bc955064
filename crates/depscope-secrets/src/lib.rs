//! Secret Detection
//!
//! Pull-based detectors over scanned bytes. A streaming engine feeds each
//! detector overlapping windows of the input and harvests `(secret,
//! position)` tuples. Two detector families live here:
//!
//! - the paired-credential substrate ([`pair`]), which finds co-located
//!   A/B matches (an identifier and its secret) and solves an optimal
//!   pairing under a distance window, and
//! - the structural service-account-key detector ([`service_account`]),
//!   which localizes JSON-shaped or base64-encoded regions, extracts
//!   fields at any escape depth, and proves it found a real key by
//!   computing a fingerprint signature with it.
//!
//! The out-of-band [`validate`] client checks whether a discovered
//! service-account key still grants access.

pub mod bearer;
pub mod detector;
pub mod engine;
pub mod flatjson;
pub mod oauth_client;
pub mod pair;
pub mod service_account;
pub mod validate;

pub use bearer::BearerTokenDetector;
pub use detector::{Detection, Detector, DEFAULT_WINDOW};
pub use engine::DetectionEngine;
pub use oauth_client::OauthClientDetector;
pub use pair::{PairDetector, PairRules, RegexMatch};
pub use service_account::ServiceAccountKeyDetector;
pub use validate::{ServiceAccountValidator, ValidationStatus, ValidatorError};

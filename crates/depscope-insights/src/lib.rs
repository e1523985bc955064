//! deps.dev Insights Integration
//!
//! A client for the deps.dev insights API and the enricher that uses it to
//! flag deprecated package versions. Lookups are batched (the service
//! accepts at most 5000 keys per query) and paginated; package identities
//! are normalized to the service's canonical form before querying.

pub mod client;
pub mod enricher;
pub mod error;
pub mod models;

pub use client::{InsightsClient, MAX_BATCH_KEYS};
pub use enricher::DeprecationEnricher;
pub use error::{InsightsError, Result};
pub use models::{System, VersionKey};

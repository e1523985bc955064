//! Source-Level Reachability
//!
//! Delegates call-graph analysis of Go modules to govulncheck. The engine
//! materializes an offline advisory database, points the analyzer at it
//! with a `file://` URL, streams the JSON findings, and applies a
//! tri-state policy per advisory: reachable, known-unreachable, or
//! unknown. Only known-unreachable advisories receive a signal.

pub mod db;
pub mod enricher;
pub mod error;
pub mod stream;

pub use enricher::GovulncheckEnricher;
pub use error::{Result, SourceReachabilityError};
pub use stream::{Finding, Frame};

//! Inventory Data Model
//!
//! This crate defines the types the depscope enrichment engine operates on:
//! packages and their ecosystems, security advisories, package/vulnerability
//! pairings with exploitability signals, detected secrets, and the typed
//! metadata extractors attach to packages.
//!
//! The `Inventory` is owned by the orchestrator for the duration of a scan;
//! enrichers borrow it mutably one at a time. Advisories are shared
//! read-only (`Arc`), and exploitability signals are append-only.

pub mod advisory;
pub mod ecosystem;
pub mod inventory;
pub mod metadata;
pub mod package;
pub mod secret;

pub use advisory::{Advisory, Affected, AffectedPackage, EcosystemSpecific, Import, Range, Reference};
pub use ecosystem::Ecosystem;
pub use inventory::{ExploitabilitySignal, Inventory, Justification, PackageKey, PackageVuln};
pub use metadata::{AptMetadata, ContainerMetadata, JavascriptMetadata, Metadata};
pub use package::Package;
pub use secret::Secret;

//! Native Binary Reachability
//!
//! Decides, for each `(package, vulnerability)` pair of a native-code
//! project, whether the vulnerable functions can still be called from the
//! built artifacts. The project is rebuilt with full LTO so that dead
//! vulnerable paths are truly absent from the binaries, then every
//! artifact's DWARF is walked for subprogram linkage names, which are
//! demangled, canonicalized, and matched against the advisory's
//! function list.
//!
//! Advisories without function-level data are never signaled.

pub mod archive;
pub mod build;
pub mod enricher;
pub mod error;
pub mod matcher;
pub mod symbols;

pub use enricher::CargoReachabilityEnricher;
pub use error::{NativeReachabilityError, Result};

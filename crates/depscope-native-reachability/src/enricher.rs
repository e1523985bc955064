//! The native reachability enricher

use crate::archive::read_artifact;
use crate::build::{artifacts_from_dep_files, build_workspace, toolchain_present};
use crate::error::NativeReachabilityError;
use crate::matcher::SymbolSet;
use crate::symbols::{container_symbols, host_platform_supported};
use async_trait::async_trait;
use depscope_core::{Ecosystem, Inventory, Justification};
use depscope_orchestrator::{Enricher, ScanInput};
use tempfile::TempDir;
use tracing::{info, warn};

pub const PLUGIN_NAME: &str = "reachability/native";

/// Rebuilds the scanned cargo project and matches advisory function lists
/// against the symbols that survived into the optimized artifacts.
pub struct CargoReachabilityEnricher;

impl CargoReachabilityEnricher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CargoReachabilityEnricher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Enricher for CargoReachabilityEnricher {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn enrich(&self, input: &ScanInput, inventory: &mut Inventory) -> anyhow::Result<()> {
        if !toolchain_present() {
            return Err(NativeReachabilityError::NoToolchain.into());
        }

        // Build directory is scoped: released on every exit path.
        let build_dir = TempDir::new()?;
        build_workspace(&input.root, build_dir.path())?;
        let artifacts = artifacts_from_dep_files(build_dir.path())?;

        let mut present = SymbolSet::default();
        for artifact in &artifacts {
            if input.cancel.is_cancelled() {
                return Err(NativeReachabilityError::Canceled.into());
            }
            if let Err(e) = host_platform_supported() {
                warn!("{}: {}", artifact.display(), e);
                continue;
            }
            let symbols = read_artifact(artifact).and_then(|data| container_symbols(artifact, &data));
            match symbols {
                Ok(symbols) => present.extend(symbols),
                // Malformed archives and DWARF-less artifacts are
                // per-artifact failures; the enricher keeps going.
                Err(e) => warn!("{}: {}", artifact.display(), e),
            }
        }
        info!(
            "collected {} symbols from {} artifacts",
            present.len(),
            artifacts.len()
        );

        apply_reachability_signals(inventory, &present);
        Ok(())
    }
}

/// Tri-state decision per advisory: symbol data present and nothing
/// matched means the vulnerable code is not in the execute path; a match,
/// or an advisory without function-level data, adds nothing.
pub(crate) fn apply_reachability_signals(inventory: &mut Inventory, present: &SymbolSet) {
    for pv in inventory.package_vulns_mut() {
        if !matches!(pv.package.ecosystem, Ecosystem::Crates | Ecosystem::Cargo) {
            continue;
        }
        let advisory = pv.advisory.clone();
        let functions = advisory.affected_functions();
        if functions.is_empty() {
            continue;
        }
        let reachable = functions.iter().any(|f| present.matches(f));
        if !reachable {
            pv.add_signal(PLUGIN_NAME, Justification::VulnerableCodeNotInExecutePath);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depscope_core::{Advisory, Package, PackageKey};
    use std::sync::Arc;

    fn inventory_with_advisory(functions: &[&str]) -> Inventory {
        let advisory: Advisory = serde_json::from_value(serde_json::json!({
            "id": "RUSTSEC-2020-0071",
            "affected": [{
                "package": { "name": "time", "ecosystem": "crates.io" },
                "ecosystem_specific": if functions.is_empty() {
                    serde_json::json!(null)
                } else {
                    serde_json::json!({ "affects": { "functions": functions } })
                }
            }]
        }))
        .unwrap();

        let mut inventory = Inventory::new();
        let pkg = Package::new(Ecosystem::Crates, "time", "0.1.45");
        let key = PackageKey::of(&pkg);
        inventory.add_package(pkg);
        inventory.attach_advisory(key, Arc::new(advisory));
        inventory
    }

    fn symbols(present: &[&str]) -> SymbolSet {
        present.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reachable_advisory_gets_no_signal() {
        let mut inventory = inventory_with_advisory(&["time::OffsetDateTime::now_utc"]);
        apply_reachability_signals(
            &mut inventory,
            &symbols(&["time::OffsetDateTime::now_utc", "main"]),
        );
        assert!(inventory.package_vulns()[0].signals.is_empty());
    }

    #[test]
    fn test_unreachable_advisory_gets_signal_with_plugin_tag() {
        let mut inventory = inventory_with_advisory(&["time::OffsetDateTime::fake_func"]);
        apply_reachability_signals(&mut inventory, &symbols(&["main", "time::Date::year"]));

        let signals = &inventory.package_vulns()[0].signals;
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].plugin, "reachability/native");
        assert_eq!(
            signals[0].justification,
            Justification::VulnerableCodeNotInExecutePath
        );
    }

    #[test]
    fn test_advisory_without_function_data_is_left_alone() {
        let mut inventory = inventory_with_advisory(&[]);
        apply_reachability_signals(&mut inventory, &symbols(&["main"]));
        assert!(inventory.package_vulns()[0].signals.is_empty());
    }

    #[test]
    fn test_non_native_package_vulns_are_ignored() {
        let advisory: Advisory = serde_json::from_value(serde_json::json!({
            "id": "GHSA-aaaa-bbbb-cccc",
            "affected": [{
                "package": { "name": "lodash", "ecosystem": "npm" },
                "ecosystem_specific": { "affects": { "functions": ["lodash::merge"] } }
            }]
        }))
        .unwrap();
        let mut inventory = Inventory::new();
        let pkg = Package::new(Ecosystem::Npm, "lodash", "4.17.20");
        let key = PackageKey::of(&pkg);
        inventory.add_package(pkg);
        inventory.attach_advisory(key, Arc::new(advisory));

        apply_reachability_signals(&mut inventory, &symbols(&[]));
        assert!(inventory.package_vulns()[0].signals.is_empty());
    }
}

//! The source reachability enricher

use crate::db::{file_url, write_offline_db};
use crate::error::{Result, SourceReachabilityError};
use crate::stream::{read_findings, Finding};
use async_trait::async_trait;
use depscope_core::{Advisory, Ecosystem, Inventory, Justification};
use depscope_orchestrator::{Enricher, ScanInput};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{info, warn};

pub const PLUGIN_NAME: &str = "reachability/source";

/// Name of the package record that carries the pinned toolchain version
/// for a module.
const STDLIB_PACKAGE: &str = "stdlib";

/// Runs govulncheck per Go module against an offline advisory database
/// and applies the tri-state reachability policy.
pub struct GovulncheckEnricher;

impl GovulncheckEnricher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GovulncheckEnricher {
    fn default() -> Self {
        Self::new()
    }
}

/// Presence probe for the host toolchain.
pub fn toolchain_present() -> bool {
    Command::new("go")
        .arg("version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[async_trait]
impl Enricher for GovulncheckEnricher {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn enrich(&self, input: &ScanInput, inventory: &mut Inventory) -> anyhow::Result<()> {
        if !toolchain_present() {
            return Err(SourceReachabilityError::NoToolchain.into());
        }

        let modules = module_roots(input.root(), inventory);
        if modules.is_empty() {
            info!("no Go modules in the inventory");
            return Ok(());
        }

        let advisories: Vec<Arc<Advisory>> = golang_advisories(inventory);
        let mut findings: HashMap<String, Vec<Finding>> = HashMap::new();

        for (module_dir, go_version) in &modules {
            if input.cancel.is_cancelled() {
                return Err(SourceReachabilityError::Canceled.into());
            }
            match analyze_module(module_dir, go_version.as_deref(), &advisories) {
                Ok(module_findings) => {
                    for (id, mut fs) in module_findings {
                        findings.entry(id).or_default().append(&mut fs);
                    }
                }
                // A broken module must not starve the others.
                Err(e) => warn!("{}: {}", module_dir.display(), e),
            }
        }

        apply_findings(inventory, &findings);
        Ok(())
    }
}

/// Module roots and their pinned toolchain versions, from the inventory's
/// module-manifest locations.
fn module_roots(scan_root: &Path, inventory: &Inventory) -> Vec<(PathBuf, Option<String>)> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for package in inventory.packages_in(Ecosystem::Golang) {
        for location in &package.locations {
            let location_path = Path::new(location);
            if location_path.file_name().and_then(|n| n.to_str()) != Some("go.mod") {
                continue;
            }
            let dir = location_path
                .parent()
                .map(|p| scan_root.join(p))
                .unwrap_or_else(|| scan_root.to_path_buf());
            if !roots.contains(&dir) {
                roots.push(dir);
            }
        }
    }

    roots
        .into_iter()
        .map(|dir| {
            let version = inventory
                .packages_in(Ecosystem::Golang)
                .find(|p| {
                    p.name == STDLIB_PACKAGE
                        && p.locations.iter().any(|l| {
                            Path::new(l)
                                .parent()
                                .map(|parent| scan_root.join(parent) == dir)
                                .unwrap_or(false)
                        })
                })
                .map(|p| p.version.clone());
            (dir, version)
        })
        .collect()
}

/// Distinct advisories attached to Go packages, for the offline database.
fn golang_advisories(inventory: &Inventory) -> Vec<Arc<Advisory>> {
    let mut seen = std::collections::HashSet::new();
    inventory
        .package_vulns()
        .iter()
        .filter(|pv| pv.package.ecosystem == Ecosystem::Golang)
        .filter(|pv| seen.insert(pv.advisory.id.clone()))
        .map(|pv| pv.advisory.clone())
        .collect()
}

/// Run the analyzer for one module against a freshly materialized offline
/// database. The database directory is scoped and removed on all paths.
fn analyze_module(
    module_dir: &Path,
    go_version: Option<&str>,
    advisories: &[Arc<Advisory>],
) -> Result<HashMap<String, Vec<Finding>>> {
    let db_dir = TempDir::new()?;
    let refs: Vec<&Advisory> = advisories.iter().map(|a| a.as_ref()).collect();
    write_offline_db(db_dir.path(), &refs)?;
    let db_url = file_url(db_dir.path())?;

    info!("analyzing {} against {} advisories", module_dir.display(), advisories.len());
    let mut cmd = Command::new("govulncheck");
    cmd.arg("-db")
        .arg(db_url.as_str())
        .arg("-C")
        .arg(module_dir)
        .args(["-json", "-mode", "source", "./..."]);
    if let Some(version) = go_version {
        let pinned = if version.starts_with("go") {
            version.to_string()
        } else {
            format!("go{version}")
        };
        cmd.env("GOVERSION", pinned);
    }

    // output() drains stdout fully before waiting on the child.
    let output = cmd.output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SourceReachabilityError::AnalyzerFailed(
            stderr.lines().take(10).collect::<Vec<_>>().join("\n"),
        ));
    }
    read_findings(&output.stdout[..])
}

/// Tri-state join of findings against the inventory.
///
/// An advisory absent from the findings is known-unreachable only when it
/// carries import data: the analyzer processes symbol-bearing advisories
/// exhaustively, so absence means the code is definitely not imported.
/// Without import data, absence stays unknown. A present advisory is
/// reachable iff some finding has a named first frame.
pub(crate) fn apply_findings(inventory: &mut Inventory, findings: &HashMap<String, Vec<Finding>>) {
    for pv in inventory.package_vulns_mut() {
        if pv.package.ecosystem != Ecosystem::Golang {
            continue;
        }
        let advisory = pv.advisory.clone();
        match findings.get(&advisory.id) {
            None => {
                if advisory.has_import_data() {
                    pv.add_signal(PLUGIN_NAME, Justification::VulnerableCodeNotInExecutePath);
                }
            }
            Some(advisory_findings) => {
                if !advisory_findings.iter().any(Finding::is_reached) {
                    pv.add_signal(PLUGIN_NAME, Justification::VulnerableCodeNotInExecutePath);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Frame;
    use depscope_core::{Package, PackageKey};

    fn go_bitfield_advisory(with_imports: bool) -> Arc<Advisory> {
        let ecosystem_specific = if with_imports {
            serde_json::json!({
                "imports": [{
                    "path": "github.com/ipfs/go-bitfield",
                    "symbols": ["NewBitfield", "Bitfield.SetBytes"]
                }]
            })
        } else {
            serde_json::Value::Null
        };
        Arc::new(
            serde_json::from_value(serde_json::json!({
                "id": "GO-2023-1558",
                "affected": [{
                    "package": { "name": "github.com/ipfs/go-bitfield", "ecosystem": "Go" },
                    "ecosystem_specific": ecosystem_specific
                }]
            }))
            .unwrap(),
        )
    }

    fn inventory_with(advisory: Arc<Advisory>) -> Inventory {
        let mut inventory = Inventory::new();
        let pkg = Package::new(Ecosystem::Golang, "github.com/ipfs/go-bitfield", "1.0.0")
            .with_location("go.mod");
        let key = PackageKey::of(&pkg);
        inventory.add_package(pkg);
        inventory.attach_advisory(key, advisory);
        inventory
    }

    fn reached_finding(osv: &str) -> Finding {
        Finding {
            osv: osv.to_string(),
            trace: vec![Frame {
                module: "github.com/ipfs/go-bitfield".to_string(),
                function: Some("NewBitfield".to_string()),
                ..Frame::default()
            }],
        }
    }

    #[test]
    fn test_imports_present_but_no_finding_is_unreachable() {
        let mut inventory = inventory_with(go_bitfield_advisory(true));
        apply_findings(&mut inventory, &HashMap::new());

        let signals = &inventory.package_vulns()[0].signals;
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].plugin, "reachability/source");
        assert_eq!(
            signals[0].justification,
            Justification::VulnerableCodeNotInExecutePath
        );
    }

    #[test]
    fn test_no_symbol_data_and_no_finding_stays_unknown() {
        let mut inventory = inventory_with(go_bitfield_advisory(false));
        apply_findings(&mut inventory, &HashMap::new());
        assert!(inventory.package_vulns()[0].signals.is_empty());
    }

    #[test]
    fn test_named_trace_means_reachable() {
        let mut inventory = inventory_with(go_bitfield_advisory(true));
        let mut findings = HashMap::new();
        findings.insert("GO-2023-1558".to_string(), vec![reached_finding("GO-2023-1558")]);
        apply_findings(&mut inventory, &findings);
        assert!(inventory.package_vulns()[0].signals.is_empty());
    }

    #[test]
    fn test_only_synthetic_traces_means_unreachable() {
        let mut inventory = inventory_with(go_bitfield_advisory(true));
        let mut findings = HashMap::new();
        findings.insert(
            "GO-2023-1558".to_string(),
            vec![Finding {
                osv: "GO-2023-1558".to_string(),
                trace: vec![],
            }],
        );
        apply_findings(&mut inventory, &findings);
        assert_eq!(inventory.package_vulns()[0].signals.len(), 1);
    }

    #[test]
    fn test_module_roots_resolve_against_scan_root() {
        let mut inventory = Inventory::new();
        inventory.add_package(
            Package::new(Ecosystem::Golang, "github.com/ipfs/go-bitfield", "1.0.0")
                .with_location("services/api/go.mod"),
        );
        inventory.add_package(
            Package::new(Ecosystem::Golang, "stdlib", "1.21.4")
                .with_location("services/api/go.mod"),
        );

        let roots = module_roots(Path::new("/scan"), &inventory);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].0, PathBuf::from("/scan/services/api"));
        assert_eq!(roots[0].1.as_deref(), Some("1.21.4"));
    }

    #[test]
    fn test_distinct_advisories_deduped_for_db() {
        let advisory = go_bitfield_advisory(true);
        let mut inventory = inventory_with(advisory.clone());
        let pkg = Package::new(Ecosystem::Golang, "github.com/other/pkg", "2.0.0");
        let key = PackageKey::of(&pkg);
        inventory.add_package(pkg);
        inventory.attach_advisory(key, advisory);

        assert_eq!(golang_advisories(&inventory).len(), 1);
    }
}

//! Cargo toolchain invocation and artifact enumeration
//!
//! The build profile is fixed: maximum optimization, a single codegen unit
//! per crate, fat LTO with embedded bitcode, and retained unstripped debug
//! info. LTO collapses unused dynamic dispatch, so a vulnerable path the
//! project never calls does not survive into the binary; the debug info is
//! the DWARF substrate symbol recovery walks afterwards.

use crate::error::{NativeReachabilityError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Flags pinned into the build environment.
pub const BUILD_RUSTFLAGS: &str = "-C opt-level=3 -C codegen-units=1 -C lto=fat -C embed-bitcode=yes -C debuginfo=2 -C strip=none";

/// Separator between the artifact path and its prerequisites in a dep file.
const DEP_SEPARATOR: &str = ": ";

/// Presence probe for the host toolchain.
pub fn toolchain_present() -> bool {
    Command::new("cargo")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Build the workspace under `root` into `target_dir` with the pinned
/// flag profile.
pub fn build_workspace(root: &Path, target_dir: &Path) -> Result<()> {
    info!("building {} with reachability profile", root.display());
    let output = Command::new("cargo")
        .args(["build", "--workspace", "--all-targets", "--release", "--target-dir"])
        .arg(target_dir)
        .current_dir(root)
        .env("RUSTFLAGS", BUILD_RUSTFLAGS)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().collect();
        let tail = lines[lines.len().saturating_sub(20)..].join("\n");
        return Err(NativeReachabilityError::BuildFailed(tail));
    }
    Ok(())
}

/// Enumerate produced artifacts by reading the companion dep files the
/// build leaves next to its outputs (one `*.d` per artifact, first token
/// of each rule is the artifact path).
///
/// A rule whose path portion itself contains `": "` cannot be told apart
/// from a malformed rule and is rejected as unparseable.
pub fn artifacts_from_dep_files(target_dir: &Path) -> Result<Vec<PathBuf>> {
    let release_dir = target_dir.join("release");
    let mut artifacts = Vec::new();

    for entry in fs::read_dir(&release_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("d") {
            continue;
        }
        let contents = fs::read_to_string(&path)?;
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            artifacts.push(parse_dep_line(line)?);
        }
    }

    artifacts.sort();
    artifacts.dedup();
    debug!("found {} build artifacts", artifacts.len());
    Ok(artifacts)
}

fn parse_dep_line(line: &str) -> Result<PathBuf> {
    if line.matches(DEP_SEPARATOR).count() != 1 {
        return Err(NativeReachabilityError::ArtifactListUnparseable(
            line.to_string(),
        ));
    }
    let (artifact, _prerequisites) = line
        .split_once(DEP_SEPARATOR)
        .expect("separator counted above");
    Ok(PathBuf::from(artifact))
}

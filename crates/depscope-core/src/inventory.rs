//! The scan inventory and package/vulnerability pairings

use crate::advisory::Advisory;
use crate::ecosystem::Ecosystem;
use crate::package::Package;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Logical identity of a package: `(ecosystem, name, version)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageKey {
    pub ecosystem: Ecosystem,
    pub name: String,
    pub version: String,
}

impl PackageKey {
    pub fn of(package: &Package) -> Self {
        Self {
            ecosystem: package.ecosystem,
            name: package.name.clone(),
            version: package.version.clone(),
        }
    }
}

/// Why a vulnerability is (or is not) exploitable in this project.
///
/// Mirrors the VEX justification vocabulary; reachability enrichers only
/// ever produce `VulnerableCodeNotInExecutePath`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Justification {
    Unspecified,
    VulnerableCodeNotInExecutePath,
    VulnerableCodeNotPresent,
    VulnerableCodeCannotBeControlledByAdversary,
    InlineMitigationsExist,
    ComponentNotPresent,
}

/// A signal appended by an enricher, tagged with the producing plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploitabilitySignal {
    pub plugin: String,
    pub justification: Justification,
}

/// A package paired with an advisory that affects it.
///
/// Created by the vuln-matching stage; reachability enrichers append
/// signals. Signals are never removed during enrichment.
#[derive(Debug, Clone)]
pub struct PackageVuln {
    pub package: PackageKey,
    pub advisory: Arc<Advisory>,
    pub signals: Vec<ExploitabilitySignal>,
}

impl PackageVuln {
    pub fn new(package: PackageKey, advisory: Arc<Advisory>) -> Self {
        Self {
            package,
            advisory,
            signals: Vec::new(),
        }
    }

    pub fn add_signal(&mut self, plugin: impl Into<String>, justification: Justification) {
        self.signals.push(ExploitabilitySignal {
            plugin: plugin.into(),
            justification,
        });
    }
}

/// Everything known about the scanned tree: packages and their
/// vulnerability pairings.
///
/// Owned by the orchestrator; enrichers receive `&mut Inventory` for the
/// duration of their phase.
#[derive(Debug, Default)]
pub struct Inventory {
    packages: Vec<Package>,
    package_vulns: Vec<PackageVuln>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package, merging into an existing record when the logical
    /// identity matches.
    pub fn add_package(&mut self, package: Package) {
        if let Some(existing) = self.packages.iter_mut().find(|p| p.same_identity(&package)) {
            existing.merge_from(package);
        } else {
            self.packages.push(package);
        }
    }

    /// Pair a package with an advisory that affects it.
    pub fn attach_advisory(&mut self, package: PackageKey, advisory: Arc<Advisory>) {
        self.package_vulns.push(PackageVuln::new(package, advisory));
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn packages_mut(&mut self) -> &mut [Package] {
        &mut self.packages
    }

    pub fn packages_in(&self, ecosystem: Ecosystem) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(move |p| p.ecosystem == ecosystem)
    }

    pub fn package_vulns(&self) -> &[PackageVuln] {
        &self.package_vulns
    }

    pub fn package_vulns_mut(&mut self) -> &mut [PackageVuln] {
        &mut self.package_vulns
    }

    /// Find a package by logical identity.
    pub fn find_package(&self, key: &PackageKey) -> Option<&Package> {
        self.packages.iter().find(|p| {
            p.ecosystem == key.ecosystem && p.name == key.name && p.version == key.version
        })
    }
}

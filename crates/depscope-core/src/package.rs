//! Discovered packages

use crate::ecosystem::Ecosystem;
use crate::metadata::Metadata;
use serde::{Deserialize, Serialize};

/// A software package discovered somewhere in the scanned tree.
///
/// `(ecosystem, name, version)` is the logical identity; the same package
/// reported by several extractors merges into one record (see
/// [`Package::merge_from`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub ecosystem: Ecosystem,
    /// Filesystem locations the package was seen at, relative to the scan root.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub locations: Vec<String>,
    /// Identifiers of the extractor plugins that contributed this record.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub plugins: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub deprecated: bool,
}

impl Package {
    pub fn new(ecosystem: Ecosystem, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ecosystem,
            locations: Vec::new(),
            plugins: Vec::new(),
            metadata: None,
            deprecated: false,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.locations.push(location.into());
        self
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugins.push(plugin.into());
        self
    }

    /// True when `other` denotes the same logical package.
    pub fn same_identity(&self, other: &Package) -> bool {
        self.ecosystem == other.ecosystem
            && self.name == other.name
            && self.version == other.version
    }

    /// Fold a duplicate record into this one: union of locations and
    /// contributing plugins, kept sorted and deduplicated.
    pub fn merge_from(&mut self, other: Package) {
        self.locations.extend(other.locations);
        self.locations.sort();
        self.locations.dedup();
        self.plugins.extend(other.plugins);
        self.plugins.sort();
        self.plugins.dedup();
        if self.metadata.is_none() {
            self.metadata = other.metadata;
        }
        self.deprecated = self.deprecated || other.deprecated;
    }

    /// Render a Package URL for this package.
    pub fn purl(&self) -> String {
        let kind = match self.ecosystem {
            Ecosystem::Crates | Ecosystem::Cargo => "cargo",
            Ecosystem::Maven => "maven",
            Ecosystem::Npm => "npm",
            Ecosystem::Golang => "golang",
            Ecosystem::PyPi => "pypi",
            Ecosystem::NuGet => "nuget",
            Ecosystem::Apt => "deb",
            Ecosystem::Winget => "winget",
            Ecosystem::Docker => "docker",
            Ecosystem::Generic => "generic",
        };

        // Maven coordinates arrive as "group:artifact".
        if self.ecosystem == Ecosystem::Maven {
            if let Some((group, artifact)) = self.name.split_once(':') {
                return format!("pkg:{}/{}/{}@{}", kind, group, artifact, self.version);
            }
        }

        format!("pkg:{}/{}@{}", kind, self.name, self.version)
    }
}

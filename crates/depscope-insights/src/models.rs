//! Wire shapes for the insights API

use depscope_core::Ecosystem;
use serde::{Deserialize, Serialize};

/// Package system identifier in the insights service's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum System {
    Go,
    Npm,
    Cargo,
    #[serde(rename = "PYPI")]
    PyPi,
    NuGet,
    Maven,
}

impl System {
    pub fn as_str(&self) -> &str {
        match self {
            System::Go => "GO",
            System::Npm => "NPM",
            System::Cargo => "CARGO",
            System::PyPi => "PYPI",
            System::NuGet => "NUGET",
            System::Maven => "MAVEN",
        }
    }

    /// Closed map from inventory ecosystem tags onto insights systems.
    ///
    /// Ecosystems with no mapping are simply not looked up; their packages
    /// keep `deprecated = false`.
    pub fn from_ecosystem(ecosystem: Ecosystem) -> Option<Self> {
        match ecosystem {
            Ecosystem::Golang => Some(System::Go),
            Ecosystem::Npm => Some(System::Npm),
            Ecosystem::Crates | Ecosystem::Cargo => Some(System::Cargo),
            Ecosystem::PyPi => Some(System::PyPi),
            Ecosystem::NuGet => Some(System::NuGet),
            Ecosystem::Maven => Some(System::Maven),
            _ => None,
        }
    }
}

/// Version key uniquely identifying a package version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionKey {
    pub system: System,
    pub name: String,
    pub version: String,
}

/// One entry of a batch query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionQuery {
    pub version_key: VersionKey,
}

/// Body of `POST /v3alpha/versionbatch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionBatchRequest {
    pub requests: Vec<VersionQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionBatchResponse {
    #[serde(default)]
    pub responses: Vec<VersionBatchResult>,
    /// Empty or absent when this is the last page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionBatchResult {
    /// The query this result answers. The service may canonicalize names in
    /// `version`, so joining back is done on this field.
    pub request: Option<VersionQuery>,
    pub version: Option<VersionSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub version_key: VersionKey,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub is_default: bool,
}

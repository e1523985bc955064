//! Security advisories in the OSV schema
//!
//! Only the fields the enrichers consume are modeled: identifier, affected
//! packages with version ranges, the `ecosystem_specific` block carrying
//! symbol-level precision, and references.

use serde::{Deserialize, Serialize};

/// A structured vulnerability record, e.g. `GO-2023-1558` or
/// `RUSTSEC-2020-0071`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub affected: Vec<Affected>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affected {
    pub package: AffectedPackage,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ranges: Vec<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecosystem_specific: Option<EcosystemSpecific>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedPackage {
    pub name: String,
    pub ecosystem: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    #[serde(rename = "type")]
    pub range_type: String,
    #[serde(default)]
    pub events: Vec<RangeEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduced: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_affected: Option<String>,
}

/// Symbol-level precision an advisory may carry. Either `imports[].symbols`
/// (Go vulndb convention) or `affects.functions` (RUSTSEC convention).
/// Both absent means the advisory has no function-level granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcosystemSpecific {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub imports: Vec<Import>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affects: Option<Affects>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affects {
    #[serde(default)]
    pub functions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "type")]
    pub ref_type: String,
    pub url: String,
}

impl Advisory {
    /// All affected-function identifiers across every `affected` entry.
    pub fn affected_functions(&self) -> Vec<&str> {
        self.affected
            .iter()
            .filter_map(|a| a.ecosystem_specific.as_ref())
            .filter_map(|es| es.affects.as_ref())
            .flat_map(|af| af.functions.iter().map(String::as_str))
            .collect()
    }

    /// True when any entry carries `affects.functions`.
    pub fn has_function_data(&self) -> bool {
        !self.affected_functions().is_empty()
    }

    /// True when any entry carries `imports[].symbols`.
    pub fn has_import_data(&self) -> bool {
        self.affected
            .iter()
            .filter_map(|a| a.ecosystem_specific.as_ref())
            .any(|es| es.imports.iter().any(|i| !i.symbols.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rustsec_advisory() -> Advisory {
        serde_json::from_value(serde_json::json!({
            "id": "RUSTSEC-2020-0071",
            "affected": [{
                "package": { "name": "time", "ecosystem": "crates.io" },
                "ranges": [{
                    "type": "SEMVER",
                    "events": [{ "introduced": "0.1.0" }, { "fixed": "0.2.23" }]
                }],
                "ecosystem_specific": {
                    "affects": { "functions": ["time::OffsetDateTime::now_utc"] }
                }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_affected_functions() {
        let adv = rustsec_advisory();
        assert!(adv.has_function_data());
        assert!(!adv.has_import_data());
        assert_eq!(adv.affected_functions(), vec!["time::OffsetDateTime::now_utc"]);
    }

    #[test]
    fn test_missing_ecosystem_specific_means_no_symbol_data() {
        let adv: Advisory = serde_json::from_value(serde_json::json!({
            "id": "GHSA-xxxx-yyyy-zzzz",
            "affected": [{ "package": { "name": "lodash", "ecosystem": "npm" } }]
        }))
        .unwrap();
        assert!(!adv.has_function_data());
        assert!(!adv.has_import_data());
        assert!(adv.affected_functions().is_empty());
    }

    #[test]
    fn test_import_symbols() {
        let adv: Advisory = serde_json::from_value(serde_json::json!({
            "id": "GO-2023-1558",
            "affected": [{
                "package": { "name": "github.com/ipfs/go-bitfield", "ecosystem": "Go" },
                "ecosystem_specific": {
                    "imports": [{
                        "path": "github.com/ipfs/go-bitfield",
                        "symbols": ["NewBitfield", "Bitfield.SetBytes"]
                    }]
                }
            }]
        }))
        .unwrap();
        assert!(adv.has_import_data());
        assert!(!adv.has_function_data());
    }
}

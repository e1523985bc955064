//! Typed package metadata
//!
//! Each extractor kind attaches a bit-exact metadata payload to the
//! packages it produces. The wire form is the internally tagged JSON
//! rendering; for every variant the in-memory structure and the wire form
//! are a total bijection (see the round-trip tests).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Internally tagged enums buffer content through a generic representation
/// that only supports string map keys, so a `BTreeMap<u16, _>` fails to
/// round-trip through `Metadata`'s tagged deserializer even though the wire
/// form (JSON object keys are always strings) is unaffected either way.
mod u16_keyed_map {
    use super::*;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<u16, String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let stringified: BTreeMap<String, &String> =
            map.iter().map(|(k, v)| (k.to_string(), v)).collect();
        stringified.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<u16, String>, D::Error> {
        let stringified: BTreeMap<String, String> = BTreeMap::deserialize(deserializer)?;
        stringified
            .into_iter()
            .map(|(k, v)| {
                k.parse::<u16>()
                    .map(|k| (k, v))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metadata {
    Container(ContainerMetadata),
    Apt(AptMetadata),
    Javascript(JavascriptMetadata),
}

/// Runtime facts about a scanned container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerMetadata {
    /// Exposed port to protocol, e.g. `8080 -> "tcp"`.
    #[serde(default, with = "u16_keyed_map")]
    pub ports: BTreeMap<u16, String>,
    /// Unix epoch seconds.
    pub started_at: i64,
    pub finished_at: i64,
    pub exit_code: i32,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AptMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavascriptMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub from_npm_repository: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(m: &Metadata) -> Metadata {
        let wire = serde_json::to_string(m).unwrap();
        serde_json::from_str(&wire).unwrap()
    }

    #[test]
    fn test_container_round_trip() {
        let mut ports = BTreeMap::new();
        ports.insert(8080, "tcp".to_string());
        ports.insert(53, "udp".to_string());
        let m = Metadata::Container(ContainerMetadata {
            ports,
            started_at: 1_700_000_000,
            finished_at: 1_700_003_600,
            exit_code: 137,
            status: "exited".to_string(),
        });
        assert_eq!(round_trip(&m), m);
    }

    #[test]
    fn test_apt_round_trip() {
        let m = Metadata::Apt(AptMetadata {
            source_name: Some("openssl".to_string()),
            architecture: Some("amd64".to_string()),
            maintainer: None,
        });
        assert_eq!(round_trip(&m), m);
    }

    #[test]
    fn test_javascript_round_trip() {
        let m = Metadata::Javascript(JavascriptMetadata {
            author: None,
            from_npm_repository: true,
        });
        assert_eq!(round_trip(&m), m);
    }

    #[test]
    fn test_wire_discriminant_dispatch() {
        let m: Metadata = serde_json::from_value(serde_json::json!({
            "kind": "container",
            "ports": { "443": "tcp" },
            "started_at": 1,
            "finished_at": 2,
            "exit_code": 0,
            "status": "running"
        }))
        .unwrap();
        match m {
            Metadata::Container(c) => assert_eq!(c.ports.get(&443).map(String::as_str), Some("tcp")),
            other => panic!("wrong variant: {:?}", other),
        }
    }
}

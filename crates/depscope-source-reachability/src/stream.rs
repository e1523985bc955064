//! Streaming ingestion of analyzer findings
//!
//! The analyzer emits a sequence of JSON envelopes on stdout (config,
//! progress, advisory echoes, findings). Only `finding` envelopes matter
//! here; everything else is skipped without being modeled.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

/// One analyzer finding: an advisory and the call trace that reaches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub osv: String,
    #[serde(default)]
    pub trace: Vec<Frame>,
}

/// A stack frame of a finding trace. Synthetic frames carry an empty
/// function name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
}

impl Finding {
    /// An empty trace, or a first frame without a function name, means the
    /// advisory was checked but the vulnerable code is not reached.
    pub fn is_reached(&self) -> bool {
        self.trace
            .first()
            .and_then(|frame| frame.function.as_deref())
            .map(|function| !function.is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    finding: Option<Finding>,
}

/// Decode the analyzer's stdout sequentially, grouping findings by
/// advisory identifier.
pub fn read_findings(reader: impl Read) -> Result<HashMap<String, Vec<Finding>>> {
    let mut findings: HashMap<String, Vec<Finding>> = HashMap::new();
    for envelope in serde_json::Deserializer::from_reader(reader).into_iter::<Envelope>() {
        let envelope = envelope?;
        if let Some(finding) = envelope.finding {
            findings.entry(finding.osv.clone()).or_default().push(finding);
        }
    }
    debug!("ingested findings for {} advisories", findings.len());
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &str = r#"
{"config":{"protocol_version":"v1.0.0","scanner_name":"analyzer"}}
{"progress":{"message":"Scanning your code..."}}
{"osv":{"id":"GO-2023-1558"}}
{"finding":{"osv":"GO-2023-1558","trace":[{"module":"github.com/ipfs/go-bitfield","package":"github.com/ipfs/go-bitfield","function":"NewBitfield"},{"module":"example.com/app","function":"main"}]}}
{"finding":{"osv":"GO-2023-1558","trace":[{"module":"github.com/ipfs/go-bitfield"}]}}
{"finding":{"osv":"GO-2022-0969","trace":[]}}
"#;

    #[test]
    fn test_findings_grouped_by_advisory() {
        let findings = read_findings(STREAM.as_bytes()).unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings["GO-2023-1558"].len(), 2);
        assert_eq!(findings["GO-2022-0969"].len(), 1);
    }

    #[test]
    fn test_is_reached_requires_named_first_frame() {
        let findings = read_findings(STREAM.as_bytes()).unwrap();
        assert!(findings["GO-2023-1558"][0].is_reached());
        // Frame present but no function name: synthetic, not reached.
        assert!(!findings["GO-2023-1558"][1].is_reached());
        // Empty trace: checked but not reached.
        assert!(!findings["GO-2022-0969"][0].is_reached());
    }

    #[test]
    fn test_malformed_stream_is_an_error() {
        let err = read_findings("{\"finding\": {\"osv\": 42}}".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SourceReachabilityError::MalformedStream(_)
        ));
    }

    #[test]
    fn test_empty_function_name_is_not_reached() {
        let finding = Finding {
            osv: "GO-2023-1558".to_string(),
            trace: vec![Frame {
                module: "github.com/ipfs/go-bitfield".to_string(),
                function: Some(String::new()),
                ..Frame::default()
            }],
        };
        assert!(!finding.is_reached());
    }
}

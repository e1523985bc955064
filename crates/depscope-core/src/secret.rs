//! Detected secrets

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A credential recovered from scanned bytes.
///
/// `ServiceAccountKey` deliberately does not retain the private key; the
/// deterministic fingerprint `signature` identifies it instead.
///
/// `Debug` is hand-written to go through [`Secret::redacted`]: secret
/// material must never reach a log or panic message in full.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Secret {
    PairedCredentials {
        id: String,
        secret: String,
    },
    ServiceAccountKey {
        private_key_id: String,
        service_account: String,
        /// RSASSA-PKCS1-v1_5/SHA-256 signature over the fixed fingerprint
        /// payload, made with the key found in the scanned bytes.
        signature: Vec<u8>,
        #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
        extra: BTreeMap<String, String>,
    },
    BearerToken {
        token: String,
    },
}

impl Secret {
    /// Short redacted rendering safe for logs and reports.
    pub fn redacted(&self) -> String {
        fn clip(s: &str) -> String {
            if s.len() <= 8 {
                "****".to_string()
            } else {
                format!("{}****", &s[..4])
            }
        }
        match self {
            Secret::PairedCredentials { id, secret } => {
                format!("paired-credentials id={} secret={}", id, clip(secret))
            }
            Secret::ServiceAccountKey {
                private_key_id,
                service_account,
                ..
            } => format!(
                "service-account-key id={} account={}",
                clip(private_key_id),
                service_account
            ),
            Secret::BearerToken { token } => format!("bearer-token {}", clip(token)),
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

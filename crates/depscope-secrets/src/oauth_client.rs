//! Google OAuth client-credential detector
//!
//! A-matches are OAuth client identifiers, B-matches are client secrets.
//! A pair within the distance window is one leaked credential; unpaired
//! halves are not surfaced.

use crate::pair::{regex_matches, PairDetector, PairRules, RegexMatch};
use depscope_core::Secret;
use regex::bytes::Regex;
use std::sync::OnceLock;

/// Identifier and secret rarely sit further apart than a few config lines.
const MAX_DISTANCE: usize = 1024;

fn client_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[0-9]+-[0-9a-z_]{8,}\.apps\.googleusercontent\.com").expect("static regex")
    })
}

fn client_secret_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"GOCSPX-[0-9A-Za-z_-]{28}").expect("static regex"))
}

pub struct OauthClientRules;

impl PairRules for OauthClientRules {
    fn name(&self) -> &str {
        "secrets/gcp-oauth-client"
    }

    fn max_distance(&self) -> usize {
        MAX_DISTANCE
    }

    fn find_a(&self, data: &[u8]) -> Vec<RegexMatch> {
        regex_matches(client_id_re(), data)
    }

    fn find_b(&self, data: &[u8]) -> Vec<RegexMatch> {
        regex_matches(client_secret_re(), data)
    }

    fn from_pair(&self, a: &RegexMatch, b: &RegexMatch) -> Option<Secret> {
        Some(Secret::PairedCredentials {
            id: a.value.clone(),
            secret: b.value.clone(),
        })
    }
}

pub type OauthClientDetector = PairDetector<OauthClientRules>;

/// The detector the engine registers.
pub fn oauth_client_detector() -> OauthClientDetector {
    PairDetector::new(OauthClientRules)
}

//! Paired-credential substrate
//!
//! A reusable detector core for secrets whose shape is two co-located
//! items: an A-match (say a client identifier) and a B-match (its secret).
//! Candidate pairs within the distance window are solved greedily by
//! ascending distance, so the nearest pairing wins and no match is used
//! twice.

use crate::detector::{Detection, Detector, DEFAULT_WINDOW};
use depscope_core::Secret;
use regex::bytes::Regex;

/// A regex hit inside the scanned window.
#[derive(Debug, Clone, PartialEq)]
pub struct RegexMatch {
    pub value: String,
    pub position: usize,
}

/// Collect a regex's matches as `(value, position)` pairs.
pub fn regex_matches(re: &Regex, data: &[u8]) -> Vec<RegexMatch> {
    re.find_iter(data)
        .map(|m| RegexMatch {
            value: String::from_utf8_lossy(m.as_bytes()).into_owned(),
            position: m.start(),
        })
        .collect()
}

/// Configuration of one paired-credential detector.
pub trait PairRules: Send + Sync {
    fn name(&self) -> &str;

    fn max_secret_len(&self) -> usize {
        DEFAULT_WINDOW
    }

    /// Maximum byte distance between an A-match and a B-match for the two
    /// to be considered a pair.
    fn max_distance(&self) -> usize;

    fn find_a(&self, data: &[u8]) -> Vec<RegexMatch>;

    fn find_b(&self, data: &[u8]) -> Vec<RegexMatch>;

    /// Construct the final secret from a selected pair.
    fn from_pair(&self, a: &RegexMatch, b: &RegexMatch) -> Option<Secret>;

    /// Optionally surface unpaired elements. The default surfaces none.
    fn from_partial_pair(&self, _a: Option<&RegexMatch>, _b: Option<&RegexMatch>) -> Option<Secret> {
        None
    }
}

/// The generic pairing engine over a [`PairRules`] implementation.
pub struct PairDetector<R: PairRules> {
    rules: R,
}

impl<R: PairRules> PairDetector<R> {
    pub fn new(rules: R) -> Self {
        Self { rules }
    }
}

impl<R: PairRules> Detector for PairDetector<R> {
    fn name(&self) -> &str {
        self.rules.name()
    }

    fn max_secret_len(&self) -> usize {
        self.rules.max_secret_len()
    }

    fn detect(&self, data: &[u8]) -> Vec<Detection> {
        let a_matches = self.rules.find_a(data);
        let b_matches = self.rules.find_b(data);

        // Candidate pairs within the window, keyed for a stable greedy
        // order: distance first, then input order of A then B.
        let mut candidates: Vec<(usize, usize, usize)> = Vec::new();
        for (i, a) in a_matches.iter().enumerate() {
            for (j, b) in b_matches.iter().enumerate() {
                let distance = a.position.abs_diff(b.position);
                if distance <= self.rules.max_distance() {
                    candidates.push((distance, i, j));
                }
            }
        }
        candidates.sort();

        let mut used_a = vec![false; a_matches.len()];
        let mut used_b = vec![false; b_matches.len()];
        let mut detections = Vec::new();

        for (_, i, j) in candidates {
            if used_a[i] || used_b[j] {
                continue;
            }
            used_a[i] = true;
            used_b[j] = true;
            if let Some(secret) = self.rules.from_pair(&a_matches[i], &b_matches[j]) {
                detections.push(Detection::new(
                    secret,
                    a_matches[i].position.min(b_matches[j].position),
                ));
            }
        }

        for (i, a) in a_matches.iter().enumerate() {
            if !used_a[i] {
                if let Some(secret) = self.rules.from_partial_pair(Some(a), None) {
                    detections.push(Detection::new(secret, a.position));
                }
            }
        }
        for (j, b) in b_matches.iter().enumerate() {
            if !used_b[j] {
                if let Some(secret) = self.rules.from_partial_pair(None, Some(b)) {
                    detections.push(Detection::new(secret, b.position));
                }
            }
        }

        detections
    }
}

//! Advisory function matching
//!
//! Exact canonical-name lookup first, then a fuzzy fallback for advisories
//! whose function identifiers are written slightly differently from the
//! demangled form (receiver spelling, wrapper suffixes).

use std::collections::HashSet;

/// The canonicalized symbols present in the built artifacts.
#[derive(Debug, Default)]
pub struct SymbolSet {
    symbols: HashSet<String>,
}

impl SymbolSet {
    pub fn new(symbols: HashSet<String>) -> Self {
        Self { symbols }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn extend(&mut self, symbols: HashSet<String>) {
        self.symbols.extend(symbols);
    }

    /// Is the advisory function callable from the artifacts?
    pub fn matches(&self, function: &str) -> bool {
        self.symbols.contains(function) || self.fuzzy_matches(function)
    }

    /// Fuzzy fallback: the wanted path and a candidate agree on their first
    /// segment (candidate head stripped of leading non-word characters),
    /// and the wanted last segment appears somewhere in the candidate tail.
    fn fuzzy_matches(&self, function: &str) -> bool {
        let parts: Vec<&str> = function.split("::").collect();
        if parts.len() < 2 {
            return false;
        }
        let head = parts[0];
        let last = *parts.last().expect("non-empty split");

        self.symbols.iter().any(|candidate| {
            let cparts: Vec<&str> = candidate.split("::").collect();
            if cparts.len() < 2 {
                return false;
            }
            let chead =
                cparts[0].trim_start_matches(|c: char| !(c.is_alphanumeric() || c == '_'));
            chead == head && cparts[1..].iter().any(|segment| segment.contains(last))
        })
    }
}

impl FromIterator<String> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

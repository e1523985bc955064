//! Ecosystem tags

use serde::{Deserialize, Serialize};

/// Closed set of package ecosystems the engine understands.
///
/// The tag is part of a package's logical identity together with its name
/// and version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Crates,
    Maven,
    Npm,
    Golang,
    #[serde(rename = "pypi")]
    PyPi,
    #[serde(rename = "nuget")]
    NuGet,
    Cargo,
    Apt,
    Winget,
    Docker,
    Generic,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Crates => "crates",
            Ecosystem::Maven => "maven",
            Ecosystem::Npm => "npm",
            Ecosystem::Golang => "golang",
            Ecosystem::PyPi => "pypi",
            Ecosystem::NuGet => "nuget",
            Ecosystem::Cargo => "cargo",
            Ecosystem::Apt => "apt",
            Ecosystem::Winget => "winget",
            Ecosystem::Docker => "docker",
            Ecosystem::Generic => "generic",
        }
    }

    /// Map an OSV `affected[].package.ecosystem` string onto a tag.
    ///
    /// Returns `None` for ecosystems the engine does not track.
    pub fn from_osv(name: &str) -> Option<Self> {
        match name {
            "crates.io" => Some(Ecosystem::Crates),
            "Maven" => Some(Ecosystem::Maven),
            "npm" => Some(Ecosystem::Npm),
            "Go" => Some(Ecosystem::Golang),
            "PyPI" => Some(Ecosystem::PyPi),
            "NuGet" => Some(Ecosystem::NuGet),
            _ => None,
        }
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_lowercase_tags() {
        assert_eq!(serde_json::to_string(&Ecosystem::Golang).unwrap(), "\"golang\"");
        assert_eq!(serde_json::to_string(&Ecosystem::PyPi).unwrap(), "\"pypi\"");
        let e: Ecosystem = serde_json::from_str("\"nuget\"").unwrap();
        assert_eq!(e, Ecosystem::NuGet);
    }

    #[test]
    fn test_from_osv() {
        assert_eq!(Ecosystem::from_osv("crates.io"), Some(Ecosystem::Crates));
        assert_eq!(Ecosystem::from_osv("Go"), Some(Ecosystem::Golang));
        assert_eq!(Ecosystem::from_osv("Hex"), None);
    }
}

//! Offline advisory database materialization
//!
//! The analyzer consumes its database as a directory of JSON files, one
//! per advisory, addressed by a `file://` URL.

use crate::error::{Result, SourceReachabilityError};
use depscope_core::Advisory;
use std::fs;
use std::path::Path;
use tracing::debug;
use url::Url;

/// Write one `{advisory-id}.json` per advisory into `dir`.
pub fn write_offline_db(dir: &Path, advisories: &[&Advisory]) -> Result<()> {
    for advisory in advisories {
        let path = dir.join(format!("{}.json", advisory.id));
        fs::write(&path, serde_json::to_vec(advisory)?)?;
    }
    debug!("materialized {} advisories in {}", advisories.len(), dir.display());
    Ok(())
}

/// Encode an absolute filesystem path as a `file://` URL.
///
/// POSIX `/a/b` becomes `file:///a/b`; Windows drive paths become
/// `file:///C:/a/b` and UNC paths `file://host/share/f`. Relative paths
/// are a programmer error.
pub fn file_url(path: &Path) -> Result<Url> {
    Url::from_file_path(path)
        .map_err(|()| SourceReachabilityError::PathNotAbsolute(path.to_path_buf()))
}

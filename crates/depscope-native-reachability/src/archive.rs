//! Static library member extraction
//!
//! A `.rlib` built with one codegen unit per crate is an AR archive with a
//! single `*.rcgu.o` object member (plus metadata members). The object's
//! bytes are what the DWARF walk wants.

use crate::error::{NativeReachabilityError, Result};
use object::read::archive::ArchiveFile;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Read an artifact's container bytes: archives yield their single object
/// member, anything else is read whole.
pub fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    let data = fs::read(path)?;
    if path.extension().and_then(|e| e.to_str()) == Some("rlib") {
        extract_codegen_object(&data)
    } else {
        Ok(data)
    }
}

/// Locate the codegen-unit object inside an AR archive.
///
/// The single-codegen-unit build should leave exactly one; when the
/// archive carries several we warn and use the first rather than guess.
pub fn extract_codegen_object(data: &[u8]) -> Result<Vec<u8>> {
    let archive =
        ArchiveFile::parse(data).map_err(|e| NativeReachabilityError::Archive(e.to_string()))?;

    let mut object_bytes: Option<Vec<u8>> = None;
    let mut extra_members = 0usize;

    for member in archive.members() {
        let member = member.map_err(|e| NativeReachabilityError::Archive(e.to_string()))?;
        let name = String::from_utf8_lossy(member.name());
        if !name.trim_end_matches('/').ends_with(".o") {
            continue;
        }
        if object_bytes.is_none() {
            let bytes = member
                .data(data)
                .map_err(|e| NativeReachabilityError::Archive(e.to_string()))?;
            object_bytes = Some(bytes.to_vec());
        } else {
            extra_members += 1;
        }
    }

    if extra_members > 0 {
        warn!(
            "archive contains {} extra object members, using the first",
            extra_members
        );
    }
    object_bytes.ok_or_else(|| {
        NativeReachabilityError::Archive("archive contains no object member".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal AR archive by hand: global magic plus 60-byte
    /// member headers, data padded to even length.
    fn archive_with(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut out = b"!<arch>\n".to_vec();
        for (name, data) in members {
            out.extend_from_slice(
                format!(
                    "{:<16}{:<12}{:<6}{:<6}{:<8}{:<10}`\n",
                    name,
                    0,
                    0,
                    0,
                    644,
                    data.len()
                )
                .as_bytes(),
            );
            out.extend_from_slice(data);
            if data.len() % 2 == 1 {
                out.push(b'\n');
            }
        }
        out
    }

    #[test]
    fn test_extracts_single_object_member() {
        let data = archive_with(&[
            ("lib.rmeta/", b"metadata"),
            ("foo.rcgu.o/", b"OBJECT BYTES"),
        ]);
        let bytes = extract_codegen_object(&data).unwrap();
        assert_eq!(bytes, b"OBJECT BYTES");
    }

    #[test]
    fn test_multiple_objects_use_the_first() {
        let data = archive_with(&[
            ("foo.1.rcgu.o/", b"FIRST"),
            ("foo.2.rcgu.o/", b"SECOND"),
        ]);
        let bytes = extract_codegen_object(&data).unwrap();
        assert_eq!(bytes, b"FIRST");
    }

    #[test]
    fn test_archive_without_objects_is_an_error() {
        let data = archive_with(&[("lib.rmeta/", b"metadata")]);
        let err = extract_codegen_object(&data).unwrap_err();
        assert!(matches!(err, NativeReachabilityError::Archive(_)));
    }

    #[test]
    fn test_garbage_is_an_archive_error() {
        let err = extract_codegen_object(b"definitely not an archive").unwrap_err();
        assert!(matches!(err, NativeReachabilityError::Archive(_)));
    }
}

//! DWARF symbol recovery and canonicalization
//!
//! Every `DW_TAG_subprogram` entry contributes its linkage name; names
//! that do not demangle are foreign code and are skipped. Demangled names
//! are canonicalized so that advisory function identifiers, which are
//! written source-style, compare against them directly:
//!
//! - generic argument lists are stripped (`Vec<u8>` -> `Vec`),
//! - fully qualified trait-impl syntax is rewritten (`<T as U>::m` -> `T::m`).

use crate::error::{NativeReachabilityError, Result};
use gimli::{Dwarf, EndianSlice, RunTimeEndian, SectionId};
use object::{Object, ObjectSection};
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// The host platforms a binary container parser exists for.
pub fn host_platform_supported() -> Result<()> {
    match std::env::consts::OS {
        "linux" | "macos" | "windows" => Ok(()),
        other => Err(NativeReachabilityError::UnsupportedPlatform(
            other.to_string(),
        )),
    }
}

/// Walk the DWARF of one binary container and return the canonicalized
/// set of native symbols it defines.
pub fn container_symbols(path: &Path, data: &[u8]) -> Result<HashSet<String>> {
    let file = object::File::parse(data)?;
    if file.section_by_name(SectionId::DebugInfo.name()).is_none() {
        return Err(NativeReachabilityError::DebugInfoAbsent(path.to_path_buf()));
    }

    let endian = if file.is_little_endian() {
        RunTimeEndian::Little
    } else {
        RunTimeEndian::Big
    };
    let load_section = |id: SectionId| -> std::result::Result<Cow<[u8]>, gimli::Error> {
        Ok(file
            .section_by_name(id.name())
            .and_then(|s| s.uncompressed_data().ok())
            .unwrap_or(Cow::Borrowed(&[][..])))
    };
    let dwarf_sections = Dwarf::load(load_section)?;
    let dwarf = dwarf_sections.borrow(|section| EndianSlice::new(section, endian));

    let mut symbols = HashSet::new();
    let mut units = dwarf.units();
    while let Some(header) = units.next()? {
        let unit = dwarf.unit(header)?;
        let mut entries = unit.entries();
        while let Some((_, entry)) = entries.next_dfs()? {
            if entry.tag() != gimli::DW_TAG_subprogram {
                continue;
            }
            let Some(attr) = entry.attr(gimli::DW_AT_linkage_name)? else {
                continue;
            };
            let Ok(mangled) = dwarf.attr_string(&unit, attr.value()) else {
                continue;
            };
            let mangled = mangled.to_string_lossy();
            // Non-native symbols do not demangle; skip them.
            let Ok(demangled) = rustc_demangle::try_demangle(&mangled) else {
                continue;
            };
            symbols.insert(canonicalize(&format!("{demangled:#}")));
        }
    }

    debug!("{}: {} subprogram symbols", path.display(), symbols.len());
    Ok(symbols)
}

static GENERIC_LIST: OnceLock<Regex> = OnceLock::new();
static TRAIT_IMPL: OnceLock<Regex> = OnceLock::new();

/// Canonicalize a demangled symbol. Idempotent.
pub fn canonicalize(symbol: &str) -> String {
    let generic_list = GENERIC_LIST.get_or_init(|| Regex::new(r"<[\w,]+>").expect("static regex"));
    let trait_impl = TRAIT_IMPL
        .get_or_init(|| Regex::new(r"^<(?P<ty>[^ <>]+) as (?P<tr>[^>]+)>::").expect("static regex"));

    let mut out = symbol.to_string();
    // Nested argument lists unwrap one layer per pass.
    loop {
        let next = generic_list.replace_all(&out, "").into_owned();
        if next == out {
            break;
        }
        out = next;
    }
    if let Some(caps) = trait_impl.captures(&out) {
        let rest = &out[caps.get(0).expect("whole match").end()..];
        out = format!("{}::{}", &caps["ty"], rest);
    }
    out
}

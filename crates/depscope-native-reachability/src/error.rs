//! Error types for native reachability analysis

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NativeReachabilityError>;

#[derive(Error, Debug)]
pub enum NativeReachabilityError {
    #[error("host toolchain not found (cargo --version failed)")]
    NoToolchain,

    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("artifact list unparseable: {0}")]
    ArtifactListUnparseable(String),

    #[error("no binary container parser for platform {0}")]
    UnsupportedPlatform(String),

    #[error("artifact has no debug info: {}", .0.display())]
    DebugInfoAbsent(PathBuf),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("object parse error: {0}")]
    Object(#[from] object::Error),

    #[error("DWARF error: {0}")]
    Dwarf(#[from] gimli::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("scan canceled")]
    Canceled,
}

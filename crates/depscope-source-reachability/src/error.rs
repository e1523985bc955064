//! Error types for source reachability analysis

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SourceReachabilityError>;

#[derive(Error, Debug)]
pub enum SourceReachabilityError {
    #[error("host toolchain not found (go version failed)")]
    NoToolchain,

    #[error("analyzer failed: {0}")]
    AnalyzerFailed(String),

    #[error("cannot build a database URL from relative path {}", .0.display())]
    PathNotAbsolute(PathBuf),

    #[error("malformed analyzer stream: {0}")]
    MalformedStream(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("scan canceled")]
    Canceled,
}

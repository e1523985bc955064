//! Cryptographic primitives for depscope
//!
//! The engine's single cryptographic duty: a deterministic fingerprint
//! signature that identifies a discovered private key without retaining it.

pub mod signature;

pub use signature::{sign, verify, SignatureError, FINGERPRINT_PAYLOAD};

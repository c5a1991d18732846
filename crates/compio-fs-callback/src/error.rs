//! Error types for flag parsing
//!
//! OS failures are never wrapped by this crate; they surface as the
//! `std::io::Error` produced by the syscall.

use thiserror::Error;

/// Rejected open-flag string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown open flags {flags:?}")]
pub struct ParseFlagsError {
    /// The flag string as supplied by the caller
    pub flags: String,
}

impl ParseFlagsError {
    pub(crate) fn new(flags: &str) -> Self {
        Self {
            flags: flags.to_string(),
        }
    }
}

//! Error types for filesystem operations
//!
//! OS failures are carried verbatim: [`FsError::Io`] keeps the original
//! `std::io::Error` (errno included) as its source. [`ErrorKind`] is a
//! read-only classification on top of it for callers that want to branch on
//! the cause.

use std::fmt;
use std::io;
use thiserror::Error;

/// Rejection raised by a [`crate::path::PathCodec`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path was empty
    #[error("empty path")]
    Empty,

    /// The path contains a character the host cannot represent
    #[error("invalid character {ch:?} in path {path:?}")]
    InvalidCharacter { path: String, ch: char },

    /// A native path returned by the OS is not valid UTF-8
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8 { path: String },

    /// The path is structurally invalid for the codec
    #[error("malformed path {path:?}: {reason}")]
    Malformed { path: String, reason: &'static str },
}

/// Error type for every filesystem contract operation
#[derive(Debug, Error)]
pub enum FsError {
    /// A path was rejected by the codec before reaching the OS
    #[error(transparent)]
    Path(#[from] PathError),

    /// The OS reported a failure
    #[error("{op} {path}: {source}")]
    Io {
        /// Operation name, e.g. `"stat"`
        op: &'static str,
        /// Portable path(s) the operation was issued for
        path: String,
        /// The untouched OS error
        #[source]
        source: io::Error,
    },

    /// An argument other than a path was malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for filesystem contract operations
pub type Result<T, E = FsError> = std::result::Result<T, E>;

/// Cause-based classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Target path absent
    NotFound,
    /// Create-exclusive conflict
    AlreadyExists,
    /// Insufficient permissions
    PermissionDenied,
    /// A directory was required
    NotADirectory,
    /// A non-directory was required
    IsADirectory,
    /// Operation on a closed or invalid descriptor
    InvalidHandle,
    /// OS-level contention
    Busy,
    /// Rejected before reaching the OS (bad path or argument)
    InvalidInput,
    /// Any other OS-reported failure
    Unclassified,
}

impl ErrorKind {
    /// Classify an OS error without altering it
    #[must_use]
    pub fn of_io(error: &io::Error) -> Self {
        if let Some(errno) = error.raw_os_error() {
            match errno {
                libc::ENOENT => return Self::NotFound,
                libc::EEXIST => return Self::AlreadyExists,
                libc::EACCES | libc::EPERM => return Self::PermissionDenied,
                libc::ENOTDIR => return Self::NotADirectory,
                libc::EISDIR => return Self::IsADirectory,
                libc::EBADF => return Self::InvalidHandle,
                libc::EBUSY | libc::ETXTBSY => return Self::Busy,
                _ => {}
            }
        }

        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::InvalidInput => Self::InvalidInput,
            _ => Self::Unclassified,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::AlreadyExists => "already exists",
            Self::PermissionDenied => "permission denied",
            Self::NotADirectory => "not a directory",
            Self::IsADirectory => "is a directory",
            Self::InvalidHandle => "invalid handle",
            Self::Busy => "busy",
            Self::InvalidInput => "invalid input",
            Self::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

impl FsError {
    /// Wrap an OS failure for `op` on `path`
    pub(crate) fn os(op: &'static str, path: impl fmt::Display, source: io::Error) -> Self {
        let path = path.to_string();
        tracing::debug!(op, path = %path, error = %source, "filesystem operation failed");
        Self::Io { op, path, source }
    }

    /// Cause-based classification of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Path(_) | Self::InvalidArgument(_) => ErrorKind::InvalidInput,
            Self::Io { source, .. } => ErrorKind::of_io(source),
        }
    }

    /// The original OS error, if the failure came from the OS
    #[must_use]
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The raw errno reported by the OS, if any
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        self.io_error().and_then(io::Error::raw_os_error)
    }
}

impl From<compio_fs_callback::ParseFlagsError> for FsError {
    fn from(e: compio_fs_callback::ParseFlagsError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

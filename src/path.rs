//! Portable paths and the codecs that map them onto host paths
//!
//! Callers only ever see [`PortablePath`]: a UTF-8 string whose separator is
//! always `/`. A [`PathCodec`] turns it into the host's native path right
//! before an OS call and turns path-valued OS results back into portable form.
//!
//! Two codecs ship with the crate:
//!
//! - [`PosixCodec`]: identity mapping for unix hosts.
//! - [`WindowsCodec`]: `/C:/dir/file` ↔ `C:\dir\file` and
//!   `/unc/server/share` ↔ `\\server\share`.
//!
//! [`NativeCodec`] names the codec for the current host.

use crate::error::PathError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Separator used by every portable path, regardless of host
pub const SEPARATOR: char = '/';

/// OS-independent path string used at every filesystem contract boundary
///
/// Construction is unchecked; malformed values are rejected by the codec when
/// they are encoded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortablePath(String);

impl PortablePath {
    /// Wrap a portable path string
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The filesystem root, `/`
    #[must_use]
    pub fn root() -> Self {
        Self(SEPARATOR.to_string())
    }

    /// Borrow the underlying string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the underlying string
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the path starts at the root
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.0.starts_with(SEPARATOR)
    }

    /// Append one or more `/`-separated segments
    ///
    /// ```rust
    /// use fslib::PortablePath;
    ///
    /// let dir = PortablePath::new("/tmp");
    /// assert_eq!(dir.join("a.txt").as_str(), "/tmp/a.txt");
    /// assert_eq!(PortablePath::root().join("etc").as_str(), "/etc");
    /// ```
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.trim_start_matches(SEPARATOR);
        if self.0.ends_with(SEPARATOR) {
            Self(format!("{}{}", self.0, segment))
        } else {
            Self(format!("{}{}{}", self.0, SEPARATOR, segment))
        }
    }
}

impl fmt::Display for PortablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PortablePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortablePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for PortablePath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Bidirectional mapping between portable and native paths
///
/// Implementations must satisfy `decode(&encode(p)?)? == p` for every path
/// `encode` accepts, and `encode` must be injective.
pub trait PathCodec: Send + Sync + 'static {
    /// Turn a portable path into the host's path syntax
    ///
    /// # Errors
    ///
    /// Returns a [`PathError`] for empty paths and paths containing sequences
    /// the host cannot represent.
    fn encode(&self, path: &PortablePath) -> Result<PathBuf, PathError>;

    /// Turn a host path into portable form
    ///
    /// # Errors
    ///
    /// Returns a [`PathError`] if the host path is not valid UTF-8 or is empty.
    fn decode(&self, path: &Path) -> Result<PortablePath, PathError>;
}

fn native_str(path: &Path) -> Result<&str, PathError> {
    let s = path.to_str().ok_or_else(|| PathError::NonUtf8 {
        path: path.to_string_lossy().into_owned(),
    })?;
    if s.is_empty() {
        return Err(PathError::Empty);
    }
    Ok(s)
}

fn reject_char(path: &str, forbidden: impl Fn(char) -> bool) -> Result<(), PathError> {
    match path.chars().find(|&c| forbidden(c)) {
        Some(ch) => Err(PathError::InvalidCharacter {
            path: path.to_string(),
            ch,
        }),
        None => Ok(()),
    }
}

/// Identity codec for unix hosts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PosixCodec;

impl PathCodec for PosixCodec {
    fn encode(&self, path: &PortablePath) -> Result<PathBuf, PathError> {
        let s = path.as_str();
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        reject_char(s, |c| c == '\0')?;
        Ok(PathBuf::from(s))
    }

    fn decode(&self, path: &Path) -> Result<PortablePath, PathError> {
        native_str(path).map(PortablePath::from)
    }
}

/// Codec for Windows path syntax
///
/// | Portable | Native |
/// |---|---|
/// | `/C:/dir/file` | `C:\dir\file` |
/// | `/unc/server/share/file` | `\\server\share\file` |
/// | `/dir/file` | `\dir\file` |
/// | `dir/file` | `dir\file` |
///
/// Portable paths containing `\`, `//`, NUL or any of `<>:"|?*` outside the
/// drive designator are rejected, which keeps the mapping injective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowsCodec;

const UNC_PREFIX: &str = "/unc/";

impl WindowsCodec {
    fn reserved(c: char) -> bool {
        matches!(c, '\0' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*')
    }

    /// Split `/X:` off the front of a portable path
    fn drive(path: &str) -> Option<(&str, &str)> {
        let bytes = path.as_bytes();
        let has_drive = bytes.len() >= 3
            && bytes[0] == b'/'
            && bytes[1].is_ascii_alphabetic()
            && bytes[2] == b':'
            && (bytes.len() == 3 || bytes[3] == b'/');
        has_drive.then(|| (&path[1..3], &path[3..]))
    }
}

impl PathCodec for WindowsCodec {
    fn encode(&self, path: &PortablePath) -> Result<PathBuf, PathError> {
        let s = path.as_str();
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        if s.contains("//") {
            return Err(PathError::Malformed {
                path: s.to_string(),
                reason: "empty path component",
            });
        }

        let native = if let Some(rest) = s.strip_prefix(UNC_PREFIX) {
            if rest.is_empty() {
                return Err(PathError::Malformed {
                    path: s.to_string(),
                    reason: "UNC path without a server",
                });
            }
            reject_char(rest, Self::reserved)?;
            format!(r"\\{}", rest.replace(SEPARATOR, r"\"))
        } else if let Some((drive, rest)) = Self::drive(s) {
            reject_char(rest, Self::reserved)?;
            format!("{}{}", drive, rest.replace(SEPARATOR, r"\"))
        } else {
            reject_char(s, Self::reserved)?;
            s.replace(SEPARATOR, r"\")
        };

        Ok(PathBuf::from(native))
    }

    fn decode(&self, path: &Path) -> Result<PortablePath, PathError> {
        let s = native_str(path)?.replace('\\', "/");

        let portable = if let Some(rest) = s.strip_prefix("//") {
            format!("{}{}", UNC_PREFIX, rest)
        } else {
            let bytes = s.as_bytes();
            if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
                format!("/{}", s)
            } else {
                s
            }
        };

        Ok(PortablePath(portable))
    }
}

/// Codec for the current host
#[cfg(unix)]
pub type NativeCodec = PosixCodec;

/// Codec for the current host
#[cfg(windows)]
pub type NativeCodec = WindowsCodec;

//! Option structs and small value types taken by filesystem operations

use crate::error::FsError;
use std::fmt;
use std::os::unix::io::RawFd;
use std::str::FromStr;

pub use compio_fs_callback::{CopyFlags, OpenFlags, DEFAULT_FILE_MODE};

/// OS-owned handle to an open file
///
/// Returned by `open` and released exactly once by `close`. The handle is a
/// plain integer: the adapter does not track liveness, and using it after
/// `close` fails with `EBADF` from the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor(RawFd);

impl Descriptor {
    /// Wrap a raw descriptor obtained elsewhere
    #[must_use]
    pub const fn from_raw_fd(fd: RawFd) -> Self {
        Self(fd)
    }

    /// The raw descriptor number
    #[must_use]
    pub const fn as_raw_fd(self) -> RawFd {
        self.0
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fd {}", self.0)
    }
}

/// Text encoding requested from `read_file`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8; invalid sequences become U+FFFD
    Utf8,
    /// One char per byte (ISO-8859-1)
    Latin1,
    /// Lowercase hexadecimal, two digits per byte
    Hex,
}

impl Encoding {
    /// Decode raw file bytes into text
    #[must_use]
    pub fn decode(self, bytes: Vec<u8>) -> String {
        match self {
            Self::Utf8 => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            },
            Self::Latin1 => bytes.into_iter().map(char::from).collect(),
            Self::Hex => hex::encode(bytes),
        }
    }
}

impl FromStr for Encoding {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "latin1" | "binary" => Ok(Self::Latin1),
            "hex" => Ok(Self::Hex),
            other => Err(FsError::InvalidArgument(format!(
                "unknown encoding {:?}",
                other
            ))),
        }
    }
}

/// Result of `read_file`: raw bytes, or text when an encoding was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Bytes(Vec<u8>),
    Text(String),
}

impl FileContent {
    /// Decode `bytes` when `encoding` is set, otherwise keep them raw
    #[must_use]
    pub fn new(bytes: Vec<u8>, encoding: Option<Encoding>) -> Self {
        match encoding {
            Some(encoding) => Self::Text(encoding.decode(bytes)),
            None => Self::Bytes(bytes),
        }
    }

    /// The text, if this content was decoded
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }

    /// The raw bytes, if this content was not decoded
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Text(_) => None,
        }
    }

    /// Byte representation of either variant
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Bytes(bytes) => bytes,
            Self::Text(text) => text.into_bytes(),
        }
    }
}

/// Options for `write_file`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteFileOptions {
    /// How the target is opened (default `"w"`: create or truncate)
    pub flag: OpenFlags,
    /// Permission bits if the file is created (default `0o666`, before umask)
    pub mode: u32,
}

impl Default for WriteFileOptions {
    fn default() -> Self {
        Self {
            flag: OpenFlags::write(),
            mode: DEFAULT_FILE_MODE,
        }
    }
}

/// Default chunk size for read streams
pub const DEFAULT_HIGH_WATER_MARK: usize = 64 * 1024;

/// Options for `create_read_stream`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadStreamOptions {
    /// First byte offset to read (default 0)
    pub start: Option<u64>,
    /// Last byte offset to read, inclusive (default end of file)
    pub end: Option<u64>,
    /// Maximum bytes per chunk
    pub high_water_mark: usize,
}

impl Default for ReadStreamOptions {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
        }
    }
}

/// Options for `create_write_stream`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteStreamOptions {
    /// How the target is opened (default `"w"`)
    pub flags: OpenFlags,
    /// Permission bits if the file is created
    pub mode: u32,
    /// Byte offset of the first write; writes are sequential when unset
    pub start: Option<u64>,
}

impl Default for WriteStreamOptions {
    fn default() -> Self {
        Self {
            flags: OpenFlags::write(),
            mode: DEFAULT_FILE_MODE,
            start: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_decoding_is_lossy() {
        assert_eq!(Encoding::Utf8.decode(b"hello".to_vec()), "hello");
        assert_eq!(Encoding::Utf8.decode(vec![b'a', 0xff, b'b']), "a\u{fffd}b");
    }

    #[test]
    fn test_latin1_and_hex() {
        assert_eq!(Encoding::Latin1.decode(vec![0x63, 0xe9]), "cé");
        assert_eq!(Encoding::Hex.decode(vec![0x00, 0xab, 0x10]), "00ab10");
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("binary".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert!("ucs2".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_file_content_variants() {
        let raw = FileContent::new(b"abc".to_vec(), None);
        assert_eq!(raw.as_bytes(), Some(&b"abc"[..]));
        assert_eq!(raw.as_text(), None);

        let text = FileContent::new(b"abc".to_vec(), Some(Encoding::Utf8));
        assert_eq!(text.as_text(), Some("abc"));
        assert_eq!(text.into_bytes(), b"abc");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(WriteFileOptions::default().mode, 0o666);
        assert!(WriteFileOptions::default().flag.creates());
        assert_eq!(ReadStreamOptions::default().high_water_mark, 64 * 1024);
        assert_eq!(WriteStreamOptions::default().start, None);
    }
}

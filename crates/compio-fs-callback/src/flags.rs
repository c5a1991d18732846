//! Open and copy flags
//!
//! [`OpenFlags`] accepts the conventional flag strings (`"r"`, `"w+"`,
//! `"ax"`, ...) and maps them onto `open(2)` bits. [`CopyFlags`] is the
//! bitmask taken by [`crate::blocking::copy_file`].

use crate::error::ParseFlagsError;
use nix::fcntl::OFlag;
use std::fmt;
use std::str::FromStr;

/// Access and creation flags for `open(2)`
///
/// # Example
///
/// ```rust
/// use compio_fs_callback::OpenFlags;
///
/// let flags: OpenFlags = "wx".parse().unwrap();
/// assert!(flags.creates());
/// assert!(flags.is_exclusive());
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags(OFlag);

impl OpenFlags {
    /// Wrap raw `open(2)` bits
    #[must_use]
    pub const fn from_oflag(flags: OFlag) -> Self {
        Self(flags)
    }

    /// `"r"`: read-only, fail if missing
    #[must_use]
    pub fn read() -> Self {
        Self(OFlag::O_RDONLY)
    }

    /// `"w"`: write-only, create or truncate
    #[must_use]
    pub fn write() -> Self {
        Self(OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC)
    }

    /// `"a"`: write-only append, create if missing
    #[must_use]
    pub fn append() -> Self {
        Self(OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND)
    }

    /// The underlying `open(2)` bits
    #[must_use]
    pub const fn oflag(self) -> OFlag {
        self.0
    }

    /// Whether opening may create the target
    #[must_use]
    pub fn creates(self) -> bool {
        self.0.contains(OFlag::O_CREAT)
    }

    /// Whether opening fails when the target already exists
    #[must_use]
    pub fn is_exclusive(self) -> bool {
        self.0.contains(OFlag::O_CREAT | OFlag::O_EXCL)
    }

    /// Whether the descriptor is readable
    #[must_use]
    pub fn readable(self) -> bool {
        let access = self.0 & OFlag::O_ACCMODE;
        access == OFlag::O_RDONLY || access == OFlag::O_RDWR
    }

    /// Whether the descriptor is writable
    #[must_use]
    pub fn writable(self) -> bool {
        let access = self.0 & OFlag::O_ACCMODE;
        access == OFlag::O_WRONLY || access == OFlag::O_RDWR
    }
}

impl Default for OpenFlags {
    fn default() -> Self {
        Self::read()
    }
}

impl fmt::Debug for OpenFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpenFlags").field(&self.0).finish()
    }
}

impl FromStr for OpenFlags {
    type Err = ParseFlagsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let create = OFlag::O_CREAT;
        let excl = OFlag::O_CREAT | OFlag::O_EXCL;
        let flags = match s {
            "r" => OFlag::O_RDONLY,
            "rs" | "sr" => OFlag::O_RDONLY | OFlag::O_SYNC,
            "r+" => OFlag::O_RDWR,
            "rs+" | "sr+" => OFlag::O_RDWR | OFlag::O_SYNC,

            "w" => OFlag::O_WRONLY | create | OFlag::O_TRUNC,
            "wx" | "xw" => OFlag::O_WRONLY | excl | OFlag::O_TRUNC,
            "w+" => OFlag::O_RDWR | create | OFlag::O_TRUNC,
            "wx+" | "xw+" => OFlag::O_RDWR | excl | OFlag::O_TRUNC,

            "a" => OFlag::O_WRONLY | create | OFlag::O_APPEND,
            "ax" | "xa" => OFlag::O_WRONLY | excl | OFlag::O_APPEND,
            "as" | "sa" => OFlag::O_WRONLY | create | OFlag::O_APPEND | OFlag::O_SYNC,
            "a+" => OFlag::O_RDWR | create | OFlag::O_APPEND,
            "ax+" | "xa+" => OFlag::O_RDWR | excl | OFlag::O_APPEND,
            "as+" | "sa+" => OFlag::O_RDWR | create | OFlag::O_APPEND | OFlag::O_SYNC,

            other => return Err(ParseFlagsError::new(other)),
        };
        Ok(Self(flags))
    }
}

bitflags::bitflags! {
    /// Behaviour flags for [`crate::blocking::copy_file`]
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct CopyFlags: u32 {
        /// Fail with `EEXIST` if the destination already exists
        const EXCL = 1 << 0;
        /// Request a copy-on-write clone where the filesystem supports it
        const FICLONE = 1 << 1;
    }
}

impl CopyFlags {
    /// Plain copy, overwriting the destination
    pub const NONE: Self = Self::empty();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_flags() {
        let flags: OpenFlags = "r".parse().unwrap();
        assert!(flags.readable());
        assert!(!flags.writable());
        assert!(!flags.creates());
    }

    #[test]
    fn test_write_flags_create_and_truncate() {
        let flags: OpenFlags = "w".parse().unwrap();
        assert_eq!(flags, OpenFlags::write());
        assert!(flags.creates());
        assert!(!flags.is_exclusive());
        assert!(flags.oflag().contains(OFlag::O_TRUNC));
    }

    #[test]
    fn test_exclusive_aliases() {
        let a: OpenFlags = "wx+".parse().unwrap();
        let b: OpenFlags = "xw+".parse().unwrap();
        assert_eq!(a, b);
        assert!(a.is_exclusive());
        assert!(a.readable() && a.writable());
    }

    #[test]
    fn test_append_flags() {
        let flags: OpenFlags = "a".parse().unwrap();
        assert_eq!(flags, OpenFlags::append());
        assert!(flags.oflag().contains(OFlag::O_APPEND));
    }

    #[test]
    fn test_unknown_flags_rejected() {
        let err = "rw".parse::<OpenFlags>().unwrap_err();
        assert_eq!(err.flags, "rw");
        assert!(err.to_string().contains("rw"));
    }

    #[test]
    fn test_copy_flags() {
        let flags = CopyFlags::EXCL | CopyFlags::FICLONE;
        assert!(flags.contains(CopyFlags::EXCL));
        assert!(flags.contains(CopyFlags::FICLONE));
        assert!(!CopyFlags::NONE.contains(CopyFlags::EXCL));
        assert_eq!(CopyFlags::from_bits_truncate(0xff).bits(), 3);
    }
}

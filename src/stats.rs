//! Immutable metadata snapshots
//!
//! [`Stats`] captures the metadata an OS reported at the moment of a `stat`
//! or `lstat` call. It never refreshes.

use std::fmt;
use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
use std::time::{Duration, SystemTime};

/// Type of a filesystem entry, decoded from the `S_IFMT` mode bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    File,
    Directory,
    Symlink,
    BlockDevice,
    CharDevice,
    Fifo,
    Socket,
    Unknown,
}

impl FileKind {
    /// Decode the type bits of a `st_mode` value
    #[must_use]
    pub fn from_mode(mode: u32) -> Self {
        // mode_t is u16 on macOS, u32 on Linux
        let fmt = mode & libc::S_IFMT as u32;
        match fmt {
            f if f == libc::S_IFREG as u32 => Self::File,
            f if f == libc::S_IFDIR as u32 => Self::Directory,
            f if f == libc::S_IFLNK as u32 => Self::Symlink,
            f if f == libc::S_IFBLK as u32 => Self::BlockDevice,
            f if f == libc::S_IFCHR as u32 => Self::CharDevice,
            f if f == libc::S_IFIFO as u32 => Self::Fifo,
            f if f == libc::S_IFSOCK as u32 => Self::Socket,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::BlockDevice => "block device",
            Self::CharDevice => "character device",
            Self::Fifo => "fifo",
            Self::Socket => "socket",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Metadata snapshot of a filesystem entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    /// Size in bytes
    pub size: u64,
    /// Type and permission bits (`st_mode`)
    pub mode: u32,
    /// Entry type
    pub kind: FileKind,
    /// Owner user ID
    pub uid: u32,
    /// Owner group ID
    pub gid: u32,
    /// Number of hard links
    pub nlink: u64,
    /// Inode number
    pub ino: u64,
    /// Device ID
    pub dev: u64,
    /// Last access time
    pub accessed: SystemTime,
    /// Last content modification time
    pub modified: SystemTime,
    /// Last status change time
    pub changed: SystemTime,
    /// Creation time, where the filesystem records one
    pub created: Option<SystemTime>,
}

impl Stats {
    /// Snapshot `std::fs::Metadata`
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let mode = metadata.mode();
        Self {
            size: metadata.len(),
            mode,
            kind: FileKind::from_mode(mode),
            uid: metadata.uid(),
            gid: metadata.gid(),
            nlink: metadata.nlink(),
            ino: metadata.ino(),
            dev: metadata.dev(),
            accessed: timestamp(metadata.atime(), metadata.atime_nsec()),
            modified: timestamp(metadata.mtime(), metadata.mtime_nsec()),
            changed: timestamp(metadata.ctime(), metadata.ctime_nsec()),
            created: metadata.created().ok(),
        }
    }

    /// Whether this is a regular file
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    /// Whether this is a directory
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Whether this is a symbolic link (only reported by `lstat`)
    #[must_use]
    pub fn is_symlink(&self) -> bool {
        self.kind == FileKind::Symlink
    }

    /// Permission bits (`mode & 0o7777`)
    #[must_use]
    pub fn permissions(&self) -> u32 {
        self.mode & 0o7777
    }
}

fn timestamp(secs: i64, nsecs: i64) -> SystemTime {
    let nanos = u32::try_from(nsecs).unwrap_or(0);
    match u64::try_from(secs) {
        Ok(secs) => SystemTime::UNIX_EPOCH + Duration::new(secs, nanos),
        Err(_) => {
            SystemTime::UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs())
                + Duration::from_nanos(u64::from(nanos))
        }
    }
}

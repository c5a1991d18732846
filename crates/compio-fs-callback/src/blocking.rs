//! Blocking filesystem primitives
//!
//! Every function forwards to exactly one host primitive (or, for
//! `copy_file` with [`CopyFlags::EXCL`], the create-exclusive open plus the
//! data copy the host performs for `copyfile`). The calling thread is occupied
//! until the OS answers, and the OS error is returned untouched.

use crate::flags::{CopyFlags, OpenFlags};
use filetime::FileTime;
use std::ffi::OsString;
use std::fs::{self, File, Metadata, OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::{FileExt, OpenOptionsExt, PermissionsExt};
use std::os::unix::io::{OwnedFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Translate `open(2)` bits into `OpenOptions`
///
/// `O_SYNC` and any other bits outside the access/creation set are passed
/// through as custom flags.
fn open_options(flags: OpenFlags, mode: u32) -> OpenOptions {
    use nix::fcntl::OFlag;

    let bits = flags.oflag();
    let mut options = OpenOptions::new();
    options
        .read(flags.readable())
        .write(flags.writable())
        .append(bits.contains(OFlag::O_APPEND))
        .truncate(bits.contains(OFlag::O_TRUNC));

    if flags.is_exclusive() {
        options.create_new(true);
    } else {
        options.create(flags.creates());
    }

    let handled = OFlag::O_ACCMODE
        | OFlag::O_APPEND
        | OFlag::O_TRUNC
        | OFlag::O_CREAT
        | OFlag::O_EXCL;
    options.mode(mode).custom_flags((bits - handled).bits());
    options
}

/// Open `path` and return an owned `File`
///
/// # Errors
///
/// Returns the OS error from `open(2)`.
pub fn open_file(path: &Path, flags: OpenFlags, mode: u32) -> io::Result<File> {
    open_options(flags, mode).open(path)
}

/// Open `path` and hand the descriptor to the caller
///
/// The descriptor stays owned until the caller takes the raw number out with
/// `into_raw_fd`; from then on it must be released with [`close`]. Dropping
/// the `OwnedFd` closes it.
///
/// # Errors
///
/// Returns the OS error from `open(2)`.
pub fn open(path: &Path, flags: OpenFlags, mode: u32) -> io::Result<OwnedFd> {
    open_file(path, flags, mode).map(OwnedFd::from)
}

/// Release a descriptor obtained from [`open`]
///
/// # Errors
///
/// Returns `EBADF` if `fd` is not an open descriptor.
pub fn close(fd: RawFd) -> io::Result<()> {
    nix::unistd::close(fd)?;
    Ok(())
}

/// `stat(2)`: metadata of the target, following a terminal symlink
///
/// # Errors
///
/// Returns the OS error from `stat(2)`.
pub fn stat(path: &Path) -> io::Result<Metadata> {
    fs::metadata(path)
}

/// `lstat(2)`: metadata of the path itself, never following a terminal symlink
///
/// # Errors
///
/// Returns the OS error from `lstat(2)`.
pub fn lstat(path: &Path) -> io::Result<Metadata> {
    fs::symlink_metadata(path)
}

/// `realpath(3)`: canonical absolute path with every symlink resolved
///
/// # Errors
///
/// Returns the OS error from `realpath(3)`.
pub fn realpath(path: &Path) -> io::Result<PathBuf> {
    fs::canonicalize(path)
}

/// Whether `path` resolves to an existing entry
///
/// Absence is not an error: `ENOENT` and `ENOTDIR` (a path component is not a
/// directory) both report `Ok(false)`. Every other failure, such as `EACCES`
/// on a parent directory, is returned as an error. Symlinks are followed, so a
/// dangling link reports `Ok(false)`.
///
/// # Errors
///
/// Returns any `stat(2)` failure other than `ENOENT`/`ENOTDIR`.
pub fn exists(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if is_absent(&e) => Ok(false),
        Err(e) => Err(e),
    }
}

fn is_absent(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::NotFound || error.raw_os_error() == Some(libc::ENOTDIR)
}

/// `chmod(2)`
///
/// # Errors
///
/// Returns the OS error from `chmod(2)`.
pub fn chmod(path: &Path, mode: u32) -> io::Result<()> {
    fs::set_permissions(path, Permissions::from_mode(mode))
}

/// `rename(2)`
///
/// # Errors
///
/// Returns the OS error from `rename(2)`.
pub fn rename(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

/// Copy file contents and permission bits from `src` to `dst`
///
/// With [`CopyFlags::EXCL`] the destination is created with `O_EXCL`, so an
/// existing destination fails with `EEXIST` and is left untouched.
/// [`CopyFlags::FICLONE`] is a hint; the host copy primitive already clones
/// where the filesystem supports it.
///
/// # Errors
///
/// Returns the OS error from opening, creating or copying.
pub fn copy_file(src: &Path, dst: &Path, flags: CopyFlags) -> io::Result<()> {
    if !flags.contains(CopyFlags::EXCL) {
        fs::copy(src, dst)?;
        return Ok(());
    }

    let mut source = File::open(src)?;
    let mode = source.metadata()?.permissions().mode();
    let mut dest = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(dst)?;
    io::copy(&mut source, &mut dest)?;
    Ok(())
}

/// Write `content` to `path`, opening it with `flags` and `mode`
///
/// # Errors
///
/// Returns the OS error from opening or writing.
pub fn write_file(path: &Path, content: &[u8], flags: OpenFlags, mode: u32) -> io::Result<()> {
    let mut file = open_file(path, flags, mode)?;
    file.write_all(content)
}

/// `unlink(2)`
///
/// # Errors
///
/// Returns the OS error from `unlink(2)`.
pub fn unlink(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

/// `utimes(2)`: set access and modification times, following symlinks
///
/// # Errors
///
/// Returns the OS error from `utimensat(2)`.
pub fn utimes(path: &Path, accessed: SystemTime, modified: SystemTime) -> io::Result<()> {
    filetime::set_file_times(
        path,
        FileTime::from_system_time(accessed),
        FileTime::from_system_time(modified),
    )
}

/// `mkdir(2)` for a single directory; parents are never created
///
/// # Errors
///
/// Returns the OS error from `mkdir(2)`.
pub fn mkdir(path: &Path) -> io::Result<()> {
    fs::create_dir(path)
}

/// `rmdir(2)`
///
/// # Errors
///
/// Returns the OS error from `rmdir(2)`.
pub fn rmdir(path: &Path) -> io::Result<()> {
    fs::remove_dir(path)
}

/// `symlink(2)`: create `link` pointing at `target`
///
/// `target` is stored verbatim and need not exist.
///
/// # Errors
///
/// Returns the OS error from `symlink(2)`.
pub fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

/// Read the whole file
///
/// # Errors
///
/// Returns the OS error from opening or reading.
pub fn read_file(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Entry names of a directory, in the order the OS returns them
///
/// `.` and `..` are not included.
///
/// # Errors
///
/// Returns the OS error from `opendir(3)` or `readdir(3)`.
pub fn readdir(path: &Path) -> io::Result<Vec<OsString>> {
    fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect()
}

/// `readlink(2)`: the raw, unresolved link target
///
/// # Errors
///
/// Returns the OS error from `readlink(2)`.
pub fn readlink(path: &Path) -> io::Result<PathBuf> {
    fs::read_link(path)
}

/// `pread(2)`: read up to `len` bytes at `offset`
///
/// A short or empty result is returned as-is; an empty buffer means end of
/// file.
///
/// # Errors
///
/// Returns the OS error from `pread(2)`.
pub fn read_at(file: &File, offset: u64, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let n = file.read_at(&mut buf, offset)?;
    buf.truncate(n);
    Ok(buf)
}

/// Write all of `data`, at `offset` when given or at the current position
///
/// # Errors
///
/// Returns the OS error from `pwrite(2)`/`write(2)`.
pub fn write_at(file: &File, offset: Option<u64>, data: &[u8]) -> io::Result<()> {
    match offset {
        Some(offset) => file.write_all_at(data, offset),
        None => {
            let mut writer = file;
            writer.write_all(data)
        }
    }
}

//! Completion-callback filesystem primitives
//!
//! Each function issues the matching [`crate::blocking`] primitive on compio's
//! blocking thread pool and returns immediately. When the OS answers, the
//! callback runs once, on the pool thread, with the untouched result.
//!
//! These functions must be called from inside a compio runtime.

use crate::blocking;
use crate::flags::{CopyFlags, OpenFlags};
use std::ffi::OsString;
use std::fs::{File, Metadata};
use std::io;
use std::os::unix::io::{OwnedFd, RawFd};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

/// Run `op` on the blocking pool and hand its result to `callback`
///
/// The spawned task is detached; the callback is the only completion signal.
/// If `op` panics the callback is dropped without being invoked.
pub fn dispatch<T, F, C>(op: F, callback: C)
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
    C: FnOnce(io::Result<T>) + Send + 'static,
{
    compio::runtime::spawn_blocking(move || {
        let result = op();
        if let Err(e) = &result {
            log::trace!("blocking primitive failed: {}", e);
        }
        callback(result);
    })
    .detach();
}

/// Callback form of [`blocking::open`]
///
/// A callback that discards its result closes the descriptor.
pub fn open<C>(path: PathBuf, flags: OpenFlags, mode: u32, callback: C)
where
    C: FnOnce(io::Result<OwnedFd>) + Send + 'static,
{
    dispatch(move || blocking::open(&path, flags, mode), callback);
}

/// Callback form of [`blocking::open_file`]
pub fn open_file<C>(path: PathBuf, flags: OpenFlags, mode: u32, callback: C)
where
    C: FnOnce(io::Result<File>) + Send + 'static,
{
    dispatch(move || blocking::open_file(&path, flags, mode), callback);
}

/// Callback form of [`blocking::close`]
pub fn close<C>(fd: RawFd, callback: C)
where
    C: FnOnce(io::Result<()>) + Send + 'static,
{
    dispatch(move || blocking::close(fd), callback);
}

/// Callback form of [`blocking::stat`]
pub fn stat<C>(path: PathBuf, callback: C)
where
    C: FnOnce(io::Result<Metadata>) + Send + 'static,
{
    dispatch(move || blocking::stat(&path), callback);
}

/// Callback form of [`blocking::lstat`]
pub fn lstat<C>(path: PathBuf, callback: C)
where
    C: FnOnce(io::Result<Metadata>) + Send + 'static,
{
    dispatch(move || blocking::lstat(&path), callback);
}

/// Callback form of [`blocking::realpath`]
pub fn realpath<C>(path: PathBuf, callback: C)
where
    C: FnOnce(io::Result<PathBuf>) + Send + 'static,
{
    dispatch(move || blocking::realpath(&path), callback);
}

/// Callback form of [`blocking::exists`]
pub fn exists<C>(path: PathBuf, callback: C)
where
    C: FnOnce(io::Result<bool>) + Send + 'static,
{
    dispatch(move || blocking::exists(&path), callback);
}

/// Callback form of [`blocking::chmod`]
pub fn chmod<C>(path: PathBuf, mode: u32, callback: C)
where
    C: FnOnce(io::Result<()>) + Send + 'static,
{
    dispatch(move || blocking::chmod(&path, mode), callback);
}

/// Callback form of [`blocking::rename`]
pub fn rename<C>(from: PathBuf, to: PathBuf, callback: C)
where
    C: FnOnce(io::Result<()>) + Send + 'static,
{
    dispatch(move || blocking::rename(&from, &to), callback);
}

/// Callback form of [`blocking::copy_file`]
pub fn copy_file<C>(src: PathBuf, dst: PathBuf, flags: CopyFlags, callback: C)
where
    C: FnOnce(io::Result<()>) + Send + 'static,
{
    dispatch(move || blocking::copy_file(&src, &dst, flags), callback);
}

/// Callback form of [`blocking::write_file`]
pub fn write_file<C>(path: PathBuf, content: Vec<u8>, flags: OpenFlags, mode: u32, callback: C)
where
    C: FnOnce(io::Result<()>) + Send + 'static,
{
    dispatch(
        move || blocking::write_file(&path, &content, flags, mode),
        callback,
    );
}

/// Callback form of [`blocking::unlink`]
pub fn unlink<C>(path: PathBuf, callback: C)
where
    C: FnOnce(io::Result<()>) + Send + 'static,
{
    dispatch(move || blocking::unlink(&path), callback);
}

/// Callback form of [`blocking::utimes`]
pub fn utimes<C>(path: PathBuf, accessed: SystemTime, modified: SystemTime, callback: C)
where
    C: FnOnce(io::Result<()>) + Send + 'static,
{
    dispatch(move || blocking::utimes(&path, accessed, modified), callback);
}

/// Callback form of [`blocking::mkdir`]
pub fn mkdir<C>(path: PathBuf, callback: C)
where
    C: FnOnce(io::Result<()>) + Send + 'static,
{
    dispatch(move || blocking::mkdir(&path), callback);
}

/// Callback form of [`blocking::rmdir`]
pub fn rmdir<C>(path: PathBuf, callback: C)
where
    C: FnOnce(io::Result<()>) + Send + 'static,
{
    dispatch(move || blocking::rmdir(&path), callback);
}

/// Callback form of [`blocking::symlink`]
pub fn symlink<C>(target: PathBuf, link: PathBuf, callback: C)
where
    C: FnOnce(io::Result<()>) + Send + 'static,
{
    dispatch(move || blocking::symlink(&target, &link), callback);
}

/// Callback form of [`blocking::read_file`]
pub fn read_file<C>(path: PathBuf, callback: C)
where
    C: FnOnce(io::Result<Vec<u8>>) + Send + 'static,
{
    dispatch(move || blocking::read_file(&path), callback);
}

/// Callback form of [`blocking::readdir`]
pub fn readdir<C>(path: PathBuf, callback: C)
where
    C: FnOnce(io::Result<Vec<OsString>>) + Send + 'static,
{
    dispatch(move || blocking::readdir(&path), callback);
}

/// Callback form of [`blocking::readlink`]
pub fn readlink<C>(path: PathBuf, callback: C)
where
    C: FnOnce(io::Result<PathBuf>) + Send + 'static,
{
    dispatch(move || blocking::readlink(&path), callback);
}

/// Callback form of [`blocking::read_at`]
pub fn read_at<C>(file: Arc<File>, offset: u64, len: usize, callback: C)
where
    C: FnOnce(io::Result<Vec<u8>>) + Send + 'static,
{
    dispatch(move || blocking::read_at(&file, offset, len), callback);
}

/// Callback form of [`blocking::write_at`]
pub fn write_at<C>(file: Arc<File>, offset: Option<u64>, data: Vec<u8>, callback: C)
where
    C: FnOnce(io::Result<()>) + Send + 'static,
{
    dispatch(move || blocking::write_at(&file, offset, &data), callback);
}

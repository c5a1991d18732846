//! Native filesystem backend
//!
//! [`NativeFs`] implements [`FileSystem`] on the host OS. Portable paths are
//! encoded through a [`PathCodec`] before every call, and path-valued results
//! are decoded back. Both forms of each operation run the same primitive from
//! `compio-fs-callback`: the blocking form calls it directly, the future form
//! issues its callback variant and awaits the result through
//! [`crate::completion::bridge`].

use crate::completion::bridge;
use crate::error::{FsError, Result};
use crate::options::{
    CopyFlags, Descriptor, Encoding, FileContent, OpenFlags, ReadStreamOptions,
    WriteFileOptions, WriteStreamOptions, DEFAULT_FILE_MODE,
};
use crate::path::{NativeCodec, PathCodec, PortablePath};
use crate::stats::Stats;
use crate::stream::{ReadStream, WriteStream};
use crate::traits::FileSystem;
use compio_fs_callback::{blocking, callback};
use std::ffi::OsString;
use std::os::unix::io::IntoRawFd;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::trace;

/// Filesystem backend for the host OS
///
/// Generic over the path codec so that Windows-style translation can be
/// exercised on any host; [`NativeFs::new`] picks the codec matching the
/// host.
#[derive(Debug, Clone, Default)]
pub struct NativeFs<C: PathCodec = NativeCodec> {
    codec: C,
}

impl NativeFs {
    /// Backend using the host's path conventions
    #[must_use]
    pub fn new() -> Self {
        Self {
            codec: NativeCodec::default(),
        }
    }
}

impl<C: PathCodec> NativeFs<C> {
    /// Backend using an explicit path codec
    #[must_use]
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    /// The codec used to translate paths
    pub fn codec(&self) -> &C {
        &self.codec
    }

    fn native(&self, path: &PortablePath) -> Result<PathBuf> {
        Ok(self.codec.encode(path)?)
    }

    fn portable(&self, path: &Path) -> Result<PortablePath> {
        Ok(self.codec.decode(path)?)
    }

    fn entry_names(&self, names: Vec<OsString>) -> Result<Vec<String>> {
        names
            .into_iter()
            .map(|name| Ok(self.portable(Path::new(&name))?.into_string()))
            .collect()
    }
}

fn pair(from: &PortablePath, to: &PortablePath) -> String {
    format!("{} -> {}", from, to)
}

impl<C: PathCodec> FileSystem for NativeFs<C> {
    type ReadStream = ReadStream;
    type WriteStream = WriteStream;

    fn name(&self) -> &'static str {
        "native"
    }

    fn open_sync(
        &self,
        path: &PortablePath,
        flags: OpenFlags,
        mode: Option<u32>,
    ) -> Result<Descriptor> {
        trace!(op = "open", %path, ?flags);
        let native = self.native(path)?;
        let fd = blocking::open(&native, flags, mode.unwrap_or(DEFAULT_FILE_MODE))
            .map_err(|e| FsError::os("open", path, e))?;
        Ok(Descriptor::from_raw_fd(fd.into_raw_fd()))
    }

    async fn open_async(
        &self,
        path: &PortablePath,
        flags: OpenFlags,
        mode: Option<u32>,
    ) -> Result<Descriptor> {
        trace!(op = "open", %path, ?flags);
        let native = self.native(path)?;
        let mode = mode.unwrap_or(DEFAULT_FILE_MODE);
        let fd = bridge(|done| callback::open(native, flags, mode, done.into_callback()))
            .await
            .map_err(|e| FsError::os("open", path, e))?;
        Ok(Descriptor::from_raw_fd(fd.into_raw_fd()))
    }

    fn close_sync(&self, fd: Descriptor) -> Result<()> {
        trace!(op = "close", %fd);
        blocking::close(fd.as_raw_fd()).map_err(|e| FsError::os("close", fd, e))
    }

    async fn close_async(&self, fd: Descriptor) -> Result<()> {
        trace!(op = "close", %fd);
        bridge(|done| callback::close(fd.as_raw_fd(), done.into_callback()))
            .await
            .map_err(|e| FsError::os("close", fd, e))
    }

    fn stat_sync(&self, path: &PortablePath) -> Result<Stats> {
        trace!(op = "stat", %path);
        let native = self.native(path)?;
        let metadata = blocking::stat(&native).map_err(|e| FsError::os("stat", path, e))?;
        Ok(Stats::from_metadata(&metadata))
    }

    async fn stat_async(&self, path: &PortablePath) -> Result<Stats> {
        trace!(op = "stat", %path);
        let native = self.native(path)?;
        let metadata = bridge(|done| callback::stat(native, done.into_callback()))
            .await
            .map_err(|e| FsError::os("stat", path, e))?;
        Ok(Stats::from_metadata(&metadata))
    }

    fn lstat_sync(&self, path: &PortablePath) -> Result<Stats> {
        trace!(op = "lstat", %path);
        let native = self.native(path)?;
        let metadata = blocking::lstat(&native).map_err(|e| FsError::os("lstat", path, e))?;
        Ok(Stats::from_metadata(&metadata))
    }

    async fn lstat_async(&self, path: &PortablePath) -> Result<Stats> {
        trace!(op = "lstat", %path);
        let native = self.native(path)?;
        let metadata = bridge(|done| callback::lstat(native, done.into_callback()))
            .await
            .map_err(|e| FsError::os("lstat", path, e))?;
        Ok(Stats::from_metadata(&metadata))
    }

    fn realpath_sync(&self, path: &PortablePath) -> Result<PortablePath> {
        trace!(op = "realpath", %path);
        let native = self.native(path)?;
        let resolved = blocking::realpath(&native).map_err(|e| FsError::os("realpath", path, e))?;
        self.portable(&resolved)
    }

    async fn realpath_async(&self, path: &PortablePath) -> Result<PortablePath> {
        trace!(op = "realpath", %path);
        let native = self.native(path)?;
        let resolved = bridge(|done| callback::realpath(native, done.into_callback()))
            .await
            .map_err(|e| FsError::os("realpath", path, e))?;
        self.portable(&resolved)
    }

    fn exists_sync(&self, path: &PortablePath) -> Result<bool> {
        trace!(op = "exists", %path);
        let native = self.native(path)?;
        blocking::exists(&native).map_err(|e| FsError::os("exists", path, e))
    }

    async fn exists_async(&self, path: &PortablePath) -> Result<bool> {
        trace!(op = "exists", %path);
        let native = self.native(path)?;
        bridge(|done| callback::exists(native, done.into_callback()))
            .await
            .map_err(|e| FsError::os("exists", path, e))
    }

    fn chmod_sync(&self, path: &PortablePath, mode: u32) -> Result<()> {
        trace!(op = "chmod", %path, mode);
        let native = self.native(path)?;
        blocking::chmod(&native, mode).map_err(|e| FsError::os("chmod", path, e))
    }

    async fn chmod_async(&self, path: &PortablePath, mode: u32) -> Result<()> {
        trace!(op = "chmod", %path, mode);
        let native = self.native(path)?;
        bridge(|done| callback::chmod(native, mode, done.into_callback()))
            .await
            .map_err(|e| FsError::os("chmod", path, e))
    }

    fn rename_sync(&self, from: &PortablePath, to: &PortablePath) -> Result<()> {
        trace!(op = "rename", %from, %to);
        let (native_from, native_to) = (self.native(from)?, self.native(to)?);
        blocking::rename(&native_from, &native_to)
            .map_err(|e| FsError::os("rename", pair(from, to), e))
    }

    async fn rename_async(&self, from: &PortablePath, to: &PortablePath) -> Result<()> {
        trace!(op = "rename", %from, %to);
        let (native_from, native_to) = (self.native(from)?, self.native(to)?);
        bridge(|done| callback::rename(native_from, native_to, done.into_callback()))
            .await
            .map_err(|e| FsError::os("rename", pair(from, to), e))
    }

    fn copy_file_sync(
        &self,
        src: &PortablePath,
        dst: &PortablePath,
        flags: CopyFlags,
    ) -> Result<()> {
        trace!(op = "copy_file", %src, %dst, flags = flags.bits());
        let (native_src, native_dst) = (self.native(src)?, self.native(dst)?);
        blocking::copy_file(&native_src, &native_dst, flags)
            .map_err(|e| FsError::os("copy_file", pair(src, dst), e))
    }

    async fn copy_file_async(
        &self,
        src: &PortablePath,
        dst: &PortablePath,
        flags: CopyFlags,
    ) -> Result<()> {
        trace!(op = "copy_file", %src, %dst, flags = flags.bits());
        let (native_src, native_dst) = (self.native(src)?, self.native(dst)?);
        bridge(|done| callback::copy_file(native_src, native_dst, flags, done.into_callback()))
            .await
            .map_err(|e| FsError::os("copy_file", pair(src, dst), e))
    }

    fn write_file_sync(
        &self,
        path: &PortablePath,
        content: &[u8],
        options: &WriteFileOptions,
    ) -> Result<()> {
        trace!(op = "write_file", %path, len = content.len());
        let native = self.native(path)?;
        blocking::write_file(&native, content, options.flag, options.mode)
            .map_err(|e| FsError::os("write_file", path, e))
    }

    async fn write_file_async(
        &self,
        path: &PortablePath,
        content: &[u8],
        options: &WriteFileOptions,
    ) -> Result<()> {
        trace!(op = "write_file", %path, len = content.len());
        let native = self.native(path)?;
        let content = content.to_vec();
        let WriteFileOptions { flag, mode } = *options;
        bridge(|done| callback::write_file(native, content, flag, mode, done.into_callback()))
            .await
            .map_err(|e| FsError::os("write_file", path, e))
    }

    fn unlink_sync(&self, path: &PortablePath) -> Result<()> {
        trace!(op = "unlink", %path);
        let native = self.native(path)?;
        blocking::unlink(&native).map_err(|e| FsError::os("unlink", path, e))
    }

    async fn unlink_async(&self, path: &PortablePath) -> Result<()> {
        trace!(op = "unlink", %path);
        let native = self.native(path)?;
        bridge(|done| callback::unlink(native, done.into_callback()))
            .await
            .map_err(|e| FsError::os("unlink", path, e))
    }

    fn utimes_sync(
        &self,
        path: &PortablePath,
        accessed: SystemTime,
        modified: SystemTime,
    ) -> Result<()> {
        trace!(op = "utimes", %path);
        let native = self.native(path)?;
        blocking::utimes(&native, accessed, modified).map_err(|e| FsError::os("utimes", path, e))
    }

    async fn utimes_async(
        &self,
        path: &PortablePath,
        accessed: SystemTime,
        modified: SystemTime,
    ) -> Result<()> {
        trace!(op = "utimes", %path);
        let native = self.native(path)?;
        bridge(|done| callback::utimes(native, accessed, modified, done.into_callback()))
            .await
            .map_err(|e| FsError::os("utimes", path, e))
    }

    fn mkdir_sync(&self, path: &PortablePath) -> Result<()> {
        trace!(op = "mkdir", %path);
        let native = self.native(path)?;
        blocking::mkdir(&native).map_err(|e| FsError::os("mkdir", path, e))
    }

    async fn mkdir_async(&self, path: &PortablePath) -> Result<()> {
        trace!(op = "mkdir", %path);
        let native = self.native(path)?;
        bridge(|done| callback::mkdir(native, done.into_callback()))
            .await
            .map_err(|e| FsError::os("mkdir", path, e))
    }

    fn rmdir_sync(&self, path: &PortablePath) -> Result<()> {
        trace!(op = "rmdir", %path);
        let native = self.native(path)?;
        blocking::rmdir(&native).map_err(|e| FsError::os("rmdir", path, e))
    }

    async fn rmdir_async(&self, path: &PortablePath) -> Result<()> {
        trace!(op = "rmdir", %path);
        let native = self.native(path)?;
        bridge(|done| callback::rmdir(native, done.into_callback()))
            .await
            .map_err(|e| FsError::os("rmdir", path, e))
    }

    fn symlink_sync(&self, target: &PortablePath, link: &PortablePath) -> Result<()> {
        trace!(op = "symlink", %target, %link);
        let (native_target, native_link) = (self.native(target)?, self.native(link)?);
        blocking::symlink(&native_target, &native_link)
            .map_err(|e| FsError::os("symlink", pair(link, target), e))
    }

    async fn symlink_async(&self, target: &PortablePath, link: &PortablePath) -> Result<()> {
        trace!(op = "symlink", %target, %link);
        let (native_target, native_link) = (self.native(target)?, self.native(link)?);
        bridge(|done| callback::symlink(native_target, native_link, done.into_callback()))
            .await
            .map_err(|e| FsError::os("symlink", pair(link, target), e))
    }

    fn read_file_sync(
        &self,
        path: &PortablePath,
        encoding: Option<Encoding>,
    ) -> Result<FileContent> {
        trace!(op = "read_file", %path, ?encoding);
        let native = self.native(path)?;
        let bytes = blocking::read_file(&native).map_err(|e| FsError::os("read_file", path, e))?;
        Ok(FileContent::new(bytes, encoding))
    }

    async fn read_file_async(
        &self,
        path: &PortablePath,
        encoding: Option<Encoding>,
    ) -> Result<FileContent> {
        trace!(op = "read_file", %path, ?encoding);
        let native = self.native(path)?;
        let bytes = bridge(|done| callback::read_file(native, done.into_callback()))
            .await
            .map_err(|e| FsError::os("read_file", path, e))?;
        Ok(FileContent::new(bytes, encoding))
    }

    fn readdir_sync(&self, path: &PortablePath) -> Result<Vec<String>> {
        trace!(op = "readdir", %path);
        let native = self.native(path)?;
        let names = blocking::readdir(&native).map_err(|e| FsError::os("readdir", path, e))?;
        self.entry_names(names)
    }

    async fn readdir_async(&self, path: &PortablePath) -> Result<Vec<String>> {
        trace!(op = "readdir", %path);
        let native = self.native(path)?;
        let names = bridge(|done| callback::readdir(native, done.into_callback()))
            .await
            .map_err(|e| FsError::os("readdir", path, e))?;
        self.entry_names(names)
    }

    fn readlink_sync(&self, path: &PortablePath) -> Result<PortablePath> {
        trace!(op = "readlink", %path);
        let native = self.native(path)?;
        let target = blocking::readlink(&native).map_err(|e| FsError::os("readlink", path, e))?;
        self.portable(&target)
    }

    async fn readlink_async(&self, path: &PortablePath) -> Result<PortablePath> {
        trace!(op = "readlink", %path);
        let native = self.native(path)?;
        let target = bridge(|done| callback::readlink(native, done.into_callback()))
            .await
            .map_err(|e| FsError::os("readlink", path, e))?;
        self.portable(&target)
    }

    fn create_read_stream(
        &self,
        path: &PortablePath,
        options: ReadStreamOptions,
    ) -> Result<Self::ReadStream> {
        trace!(op = "create_read_stream", %path, ?options);
        let native = self.native(path)?;
        Ok(ReadStream::new(native, path.clone(), options))
    }

    fn create_write_stream(
        &self,
        path: &PortablePath,
        options: WriteStreamOptions,
    ) -> Result<Self::WriteStream> {
        trace!(op = "create_write_stream", %path, ?options);
        let native = self.native(path)?;
        Ok(WriteStream::new(native, path.clone(), options))
    }
}

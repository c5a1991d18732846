//! FileSystem trait: the operation set every backend implements
//!
//! Every operation comes in two forms with identical semantics:
//!
//! - `*_sync` blocks the calling thread until the OS answers;
//! - `*_async` suspends the call site once and resumes when the operation
//!   settles.
//!
//! Streams only come in one form, since they are incremental by nature.
//!
//! All paths crossing this boundary are [`PortablePath`]s. Backends translate
//! them to whatever their storage needs and translate path-valued results
//! back before returning.

use crate::error::{FsError, Result};
use crate::options::{
    CopyFlags, Descriptor, Encoding, FileContent, OpenFlags, ReadStreamOptions,
    WriteFileOptions, WriteStreamOptions,
};
use crate::path::PortablePath;
use crate::stats::Stats;
use futures::{Sink, Stream};
use std::time::SystemTime;

/// Uniform filesystem contract
///
/// Callers should be generic over this trait rather than naming a concrete
/// backend, so that tests and alternate storage can be substituted.
///
/// # Examples
///
/// ```rust,no_run
/// use fslib::{FileSystem, NativeFs, PortablePath};
///
/// fn size_of<F: FileSystem>(fs: &F, path: &PortablePath) -> fslib::Result<u64> {
///     Ok(fs.stat_sync(path)?.size)
/// }
///
/// let fs = NativeFs::new();
/// let size = size_of(&fs, &PortablePath::from("/etc/hosts"))?;
/// # Ok::<(), fslib::FsError>(())
/// ```
#[allow(async_fn_in_trait)]
pub trait FileSystem: Send + Sync {
    /// Lazily-opened byte stream returned by [`FileSystem::create_read_stream`]
    type ReadStream: Stream<Item = Result<Vec<u8>>> + Unpin;

    /// Lazily-opened byte sink returned by [`FileSystem::create_write_stream`]
    type WriteStream: Sink<Vec<u8>, Error = FsError> + Unpin;

    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Portable path this backend is rooted at
    fn real_path(&self) -> PortablePath {
        PortablePath::root()
    }

    /// Open `path` and return a descriptor owned by the caller
    ///
    /// `mode` applies only when `flags` create the file and defaults to
    /// `0o666`.
    ///
    /// # Errors
    ///
    /// Fails with NotFound if the target is missing and `flags` do not
    /// create it, or AlreadyExists for an exclusive create conflict.
    fn open_sync(&self, path: &PortablePath, flags: OpenFlags, mode: Option<u32>)
        -> Result<Descriptor>;

    /// Future form of [`FileSystem::open_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::open_sync`].
    async fn open_async(
        &self,
        path: &PortablePath,
        flags: OpenFlags,
        mode: Option<u32>,
    ) -> Result<Descriptor>;

    /// Release a descriptor
    ///
    /// # Errors
    ///
    /// Fails with InvalidHandle if `fd` is already closed.
    fn close_sync(&self, fd: Descriptor) -> Result<()>;

    /// Future form of [`FileSystem::close_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::close_sync`].
    async fn close_async(&self, fd: Descriptor) -> Result<()>;

    /// Metadata of the target, following a terminal symlink
    ///
    /// # Errors
    ///
    /// Forwards the OS failure.
    fn stat_sync(&self, path: &PortablePath) -> Result<Stats>;

    /// Future form of [`FileSystem::stat_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::stat_sync`].
    async fn stat_async(&self, path: &PortablePath) -> Result<Stats>;

    /// Metadata of the path itself, not following a terminal symlink
    ///
    /// # Errors
    ///
    /// Forwards the OS failure.
    fn lstat_sync(&self, path: &PortablePath) -> Result<Stats>;

    /// Future form of [`FileSystem::lstat_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::lstat_sync`].
    async fn lstat_async(&self, path: &PortablePath) -> Result<Stats>;

    /// Canonical path with every symlink resolved
    ///
    /// # Errors
    ///
    /// Forwards the OS failure, or a path error if the result cannot be
    /// represented portably.
    fn realpath_sync(&self, path: &PortablePath) -> Result<PortablePath>;

    /// Future form of [`FileSystem::realpath_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::realpath_sync`].
    async fn realpath_async(&self, path: &PortablePath) -> Result<PortablePath>;

    /// Whether `path` exists
    ///
    /// Absence (NotFound, or NotADirectory for a path through a regular
    /// file) is `Ok(false)`, never an error.
    ///
    /// # Errors
    ///
    /// Any other failure, such as PermissionDenied on a parent directory.
    fn exists_sync(&self, path: &PortablePath) -> Result<bool>;

    /// Future form of [`FileSystem::exists_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::exists_sync`].
    async fn exists_async(&self, path: &PortablePath) -> Result<bool>;

    /// Change permission bits
    ///
    /// # Errors
    ///
    /// Forwards the OS failure.
    fn chmod_sync(&self, path: &PortablePath, mode: u32) -> Result<()>;

    /// Future form of [`FileSystem::chmod_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::chmod_sync`].
    async fn chmod_async(&self, path: &PortablePath, mode: u32) -> Result<()>;

    /// Rename `from` to `to` in a single step
    ///
    /// # Errors
    ///
    /// Forwards the OS failure.
    fn rename_sync(&self, from: &PortablePath, to: &PortablePath) -> Result<()>;

    /// Future form of [`FileSystem::rename_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::rename_sync`].
    async fn rename_async(&self, from: &PortablePath, to: &PortablePath) -> Result<()>;

    /// Copy a file's contents
    ///
    /// # Errors
    ///
    /// Forwards the OS failure; AlreadyExists when [`CopyFlags::EXCL`] is set
    /// and `dst` exists.
    fn copy_file_sync(&self, src: &PortablePath, dst: &PortablePath, flags: CopyFlags)
        -> Result<()>;

    /// Future form of [`FileSystem::copy_file_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::copy_file_sync`].
    async fn copy_file_async(
        &self,
        src: &PortablePath,
        dst: &PortablePath,
        flags: CopyFlags,
    ) -> Result<()>;

    /// Write `content` to `path`
    ///
    /// # Errors
    ///
    /// Forwards the OS failure.
    fn write_file_sync(
        &self,
        path: &PortablePath,
        content: &[u8],
        options: &WriteFileOptions,
    ) -> Result<()>;

    /// Future form of [`FileSystem::write_file_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::write_file_sync`].
    async fn write_file_async(
        &self,
        path: &PortablePath,
        content: &[u8],
        options: &WriteFileOptions,
    ) -> Result<()>;

    /// Remove a non-directory entry
    ///
    /// # Errors
    ///
    /// Forwards the OS failure.
    fn unlink_sync(&self, path: &PortablePath) -> Result<()>;

    /// Future form of [`FileSystem::unlink_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::unlink_sync`].
    async fn unlink_async(&self, path: &PortablePath) -> Result<()>;

    /// Set access and modification times
    ///
    /// # Errors
    ///
    /// Forwards the OS failure.
    fn utimes_sync(&self, path: &PortablePath, accessed: SystemTime, modified: SystemTime)
        -> Result<()>;

    /// Future form of [`FileSystem::utimes_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::utimes_sync`].
    async fn utimes_async(
        &self,
        path: &PortablePath,
        accessed: SystemTime,
        modified: SystemTime,
    ) -> Result<()>;

    /// Create a single directory; parents must already exist
    ///
    /// # Errors
    ///
    /// Forwards the OS failure.
    fn mkdir_sync(&self, path: &PortablePath) -> Result<()>;

    /// Future form of [`FileSystem::mkdir_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::mkdir_sync`].
    async fn mkdir_async(&self, path: &PortablePath) -> Result<()>;

    /// Remove an empty directory
    ///
    /// # Errors
    ///
    /// Forwards the OS failure.
    fn rmdir_sync(&self, path: &PortablePath) -> Result<()>;

    /// Future form of [`FileSystem::rmdir_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::rmdir_sync`].
    async fn rmdir_async(&self, path: &PortablePath) -> Result<()>;

    /// Create `link` pointing at `target`
    ///
    /// # Errors
    ///
    /// Forwards the OS failure.
    fn symlink_sync(&self, target: &PortablePath, link: &PortablePath) -> Result<()>;

    /// Future form of [`FileSystem::symlink_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::symlink_sync`].
    async fn symlink_async(&self, target: &PortablePath, link: &PortablePath) -> Result<()>;

    /// Read a whole file, decoding it when `encoding` is set
    ///
    /// # Errors
    ///
    /// Forwards the OS failure.
    fn read_file_sync(&self, path: &PortablePath, encoding: Option<Encoding>)
        -> Result<FileContent>;

    /// Future form of [`FileSystem::read_file_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::read_file_sync`].
    async fn read_file_async(
        &self,
        path: &PortablePath,
        encoding: Option<Encoding>,
    ) -> Result<FileContent>;

    /// Entry names of a directory in backend order (not sorted)
    ///
    /// # Errors
    ///
    /// Forwards the OS failure. An entry whose name the backend's path codec
    /// cannot represent (for example a non-UTF-8 name on a POSIX host) fails
    /// the whole call with a [`crate::FsError::Path`] of kind
    /// [`crate::ErrorKind::InvalidInput`]; no partial listing is returned.
    fn readdir_sync(&self, path: &PortablePath) -> Result<Vec<String>>;

    /// Future form of [`FileSystem::readdir_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::readdir_sync`].
    async fn readdir_async(&self, path: &PortablePath) -> Result<Vec<String>>;

    /// The raw, unresolved target of a symlink
    ///
    /// # Errors
    ///
    /// Forwards the OS failure.
    fn readlink_sync(&self, path: &PortablePath) -> Result<PortablePath>;

    /// Future form of [`FileSystem::readlink_sync`]
    ///
    /// # Errors
    ///
    /// Same as [`FileSystem::readlink_sync`].
    async fn readlink_async(&self, path: &PortablePath) -> Result<PortablePath>;

    /// Stream the contents of `path` in chunks
    ///
    /// The file is opened when the stream is first polled; open and read
    /// failures are yielded as stream items.
    ///
    /// # Errors
    ///
    /// Fails immediately only if `path` is rejected by the codec.
    fn create_read_stream(
        &self,
        path: &PortablePath,
        options: ReadStreamOptions,
    ) -> Result<Self::ReadStream>;

    /// Sink writing byte chunks to `path`
    ///
    /// The file is opened on the first write (or on close if nothing was
    /// written).
    ///
    /// # Errors
    ///
    /// Fails immediately only if `path` is rejected by the codec.
    fn create_write_stream(
        &self,
        path: &PortablePath,
        options: WriteStreamOptions,
    ) -> Result<Self::WriteStream>;
}

//! Uniform filesystem adapter
//!
//! `fslib` exposes the host filesystem through one contract,
//! [`FileSystem`], where every operation exists in a blocking form
//! (`*_sync`) and a future form (`*_async`) with identical semantics.
//! Callers speak in [`PortablePath`]s; the [`NativeFs`] backend translates
//! them through a [`PathCodec`] before anything reaches the OS.
//!
//! # Example
//!
//! ```rust,no_run
//! use fslib::{FileSystem, NativeFs, PortablePath, WriteFileOptions};
//!
//! # async fn example() -> fslib::Result<()> {
//! let fs = NativeFs::new();
//! let file = PortablePath::from("/tmp/fslib-example.txt");
//!
//! fs.write_file_async(&file, b"hello", &WriteFileOptions::default()).await?;
//! assert_eq!(fs.stat_sync(&file)?.size, 5);
//! assert!(fs.exists_async(&file).await?);
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod cli;
pub mod completion;
pub mod error;
pub mod options;
pub mod path;
pub mod stats;
pub mod stream;
pub mod traits;

pub use backends::NativeFs;
pub use error::{ErrorKind, FsError, PathError, Result};
pub use options::{
    CopyFlags, Descriptor, Encoding, FileContent, OpenFlags, ReadStreamOptions,
    WriteFileOptions, WriteStreamOptions,
};
pub use path::{NativeCodec, PathCodec, PortablePath, PosixCodec, WindowsCodec};
pub use stats::{FileKind, Stats};
pub use stream::{ReadStream, WriteStream};
pub use traits::FileSystem;

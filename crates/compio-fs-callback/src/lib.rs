//! # compio-fs-callback
//!
//! Host filesystem primitives exposed in the two shapes an adapter layer
//! needs:
//!
//! - [`blocking`]: one direct OS call per function, occupying the calling
//!   thread until the kernel answers.
//! - [`callback`]: the same primitive executed on compio's blocking pool, with
//!   completion reported through a single `FnOnce(io::Result<T>)` callback.
//!
//! Both shapes share the same function bodies, so a primitive behaves
//! identically no matter how it was issued. Errors are the raw
//! [`std::io::Error`] the OS produced; nothing here retries or reclassifies.
//!
//! ## Example
//!
//! ```rust,no_run
//! use compio_fs_callback::callback;
//! use std::path::PathBuf;
//!
//! # #[compio::main]
//! # async fn main() {
//! callback::stat(PathBuf::from("/etc/hosts"), |result| match result {
//!     Ok(meta) => println!("{} bytes", meta.len()),
//!     Err(e) => eprintln!("stat failed: {e}"),
//! });
//! # }
//! ```

pub mod blocking;
pub mod callback;
pub mod error;
pub mod flags;

pub use error::ParseFlagsError;
pub use flags::{CopyFlags, OpenFlags};

/// Default permission bits for files created by `open` and `write_file`.
pub const DEFAULT_FILE_MODE: u32 = 0o666;

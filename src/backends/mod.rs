//! Filesystem backend implementations
//!
//! Concrete implementations of the [`crate::traits::FileSystem`] contract.

pub mod native;

pub use native::NativeFs;

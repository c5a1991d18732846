//! Core traits for filesystem abstraction
//!
//! This module provides the contract every filesystem backend implements, so
//! callers can hold a backend generically and swap the native filesystem for
//! another implementation without changing call sites.

pub mod filesystem;

pub use filesystem::FileSystem;

//! Shared helpers for integration tests

use fslib::PortablePath;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Portable form of a host path; temp dirs are always UTF-8 in these tests
#[allow(dead_code)]
pub fn portable(path: &Path) -> PortablePath {
    PortablePath::new(path.to_str().expect("temp path is UTF-8"))
}

/// Portable path of `name` inside `temp_dir`
#[allow(dead_code)]
pub fn portable_in(temp_dir: &TempDir, name: &str) -> PortablePath {
    portable(temp_dir.path()).join(name)
}

/// Canonical portable root of a temp dir (resolves e.g. /tmp -> /private/tmp)
#[allow(dead_code)]
pub fn canonical_root(temp_dir: &TempDir) -> PortablePath {
    portable(&temp_dir.path().canonicalize().expect("canonicalize temp dir"))
}

/// Aborts the whole test binary unless dropped before `limit` elapses
///
/// A completion that never arrives leaves its future pending forever; this
/// turns that hang into a failure.
#[allow(dead_code)]
pub struct Deadline {
    disarmed: Arc<AtomicBool>,
}

impl Deadline {
    #[allow(dead_code)]
    pub fn arm(limit: Duration) -> Self {
        let disarmed = Arc::new(AtomicBool::new(false));
        let watcher = Arc::clone(&disarmed);
        std::thread::spawn(move || {
            std::thread::sleep(limit);
            if !watcher.load(Ordering::Acquire) {
                eprintln!("still pending after {limit:?}; aborting");
                std::process::abort();
            }
        });
        Self { disarmed }
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.disarmed.store(true, Ordering::Release);
    }
}

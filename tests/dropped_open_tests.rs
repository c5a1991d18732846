//! Dropping an `open_async` future after the open was issued
//!
//! Kept in its own test binary: it counts the process's open descriptors,
//! which any concurrently running test would disturb.

#![cfg(target_os = "linux")]

mod common;

use common::{portable_in, Deadline};
use fslib::{FileSystem, NativeFs, OpenFlags};
use std::task::Poll;
use std::time::Duration;
use tempfile::TempDir;

fn open_descriptors() -> usize {
    std::fs::read_dir("/proc/self/fd").unwrap().count()
}

async fn pause(duration: Duration) {
    compio::runtime::spawn_blocking(move || std::thread::sleep(duration))
        .await
        .unwrap();
}

#[compio::test]
async fn test_dropped_open_future_releases_descriptor() {
    let _deadline = Deadline::arm(Duration::from_secs(30));
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("file"), "").unwrap();
    let path = portable_in(&temp_dir, "file");
    let fs = NativeFs::new();

    // Start the blocking pool before taking the baseline
    let fd = fs.open_async(&path, OpenFlags::read(), None).await.unwrap();
    fs.close_async(fd).await.unwrap();
    let before = open_descriptors();

    for _ in 0..50 {
        let mut open = Box::pin(fs.open_async(&path, OpenFlags::read(), None));
        if let Poll::Ready(result) = futures::poll!(open.as_mut()) {
            fs.close_sync(result.unwrap()).unwrap();
        }
        drop(open);
    }

    // The abandoned opens still finish on the pool; wait for them to settle
    let mut after = open_descriptors();
    for _ in 0..50 {
        if after <= before {
            break;
        }
        pause(Duration::from_millis(100)).await;
        after = open_descriptors();
    }
    assert!(
        after <= before,
        "abandoned opens kept {} descriptors",
        after - before
    );
}

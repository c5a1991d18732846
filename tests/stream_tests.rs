//! Read and write streams

mod common;

use common::{portable_in, Deadline};
use fslib::{
    ErrorKind, FileSystem, FsError, NativeFs, OpenFlags, PortablePath, ReadStreamOptions,
    WriteStreamOptions,
};
use futures::{SinkExt, StreamExt, TryStreamExt};
use std::time::Duration;
use tempfile::TempDir;

async fn collect<F: FileSystem>(
    fs: &F,
    path: &PortablePath,
    options: ReadStreamOptions,
) -> fslib::Result<Vec<Vec<u8>>> {
    fs.create_read_stream(path, options)?.try_collect().await
}

#[compio::test]
async fn test_read_stream_chunks_whole_file() {
    let _deadline = Deadline::arm(Duration::from_secs(30));
    let temp_dir = TempDir::new().unwrap();
    let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    std::fs::write(temp_dir.path().join("data"), &data).unwrap();

    let options = ReadStreamOptions {
        high_water_mark: 4096,
        ..ReadStreamOptions::default()
    };
    let chunks = collect(&NativeFs::new(), &portable_in(&temp_dir, "data"), options)
        .await
        .unwrap();

    let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![4096, 4096, 1808]);
    assert_eq!(chunks.concat(), data);
}

#[compio::test]
async fn test_read_stream_inclusive_range() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("abc"), "abcdefghij").unwrap();
    let path = portable_in(&temp_dir, "abc");
    let fs = NativeFs::new();

    let middle = ReadStreamOptions {
        start: Some(2),
        end: Some(5),
        high_water_mark: 3,
    };
    assert_eq!(
        collect(&fs, &path, middle).await.unwrap(),
        vec![b"cde".to_vec(), b"f".to_vec()]
    );

    let tail = ReadStreamOptions {
        start: Some(7),
        ..ReadStreamOptions::default()
    };
    assert_eq!(collect(&fs, &path, tail).await.unwrap().concat(), b"hij");

    let past_end = ReadStreamOptions {
        start: Some(100),
        ..ReadStreamOptions::default()
    };
    assert!(collect(&fs, &path, past_end).await.unwrap().is_empty());
}

#[compio::test]
async fn test_read_stream_empty_file_yields_nothing() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("empty"), "").unwrap();

    let chunks = collect(
        &NativeFs::new(),
        &portable_in(&temp_dir, "empty"),
        ReadStreamOptions::default(),
    )
    .await
    .unwrap();
    assert!(chunks.is_empty());
}

#[compio::test]
async fn test_read_stream_opens_lazily() {
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFs::new();
    let path = portable_in(&temp_dir, "later");

    // Creating the stream does not touch the file
    let mut stream = fs
        .create_read_stream(&path, ReadStreamOptions::default())
        .unwrap();
    std::fs::write(temp_dir.path().join("later"), "arrived").unwrap();

    assert_eq!(stream.next().await.unwrap().unwrap(), b"arrived");
    assert!(stream.next().await.is_none());
}

#[compio::test]
async fn test_read_stream_reports_open_failure_as_item() {
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFs::new();

    let mut stream = fs
        .create_read_stream(
            &portable_in(&temp_dir, "missing"),
            ReadStreamOptions::default(),
        )
        .unwrap();
    let err = stream.next().await.unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(stream.next().await.is_none());
}

#[test]
fn test_stream_path_rejected_up_front() {
    let fs = NativeFs::new();
    let bad = PortablePath::from("/tmp/a\0b");
    assert!(matches!(
        fs.create_read_stream(&bad, ReadStreamOptions::default()),
        Err(FsError::Path(_))
    ));
    assert!(matches!(
        fs.create_write_stream(&bad, WriteStreamOptions::default()),
        Err(FsError::Path(_))
    ));
}

#[compio::test]
async fn test_write_stream_writes_chunks_in_order() {
    let _deadline = Deadline::arm(Duration::from_secs(30));
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFs::new();
    let path = portable_in(&temp_dir, "out");

    let mut sink = fs
        .create_write_stream(&path, WriteStreamOptions::default())
        .unwrap();
    for chunk in ["first ", "second ", "third"] {
        sink.send(chunk.as_bytes().to_vec()).await.unwrap();
    }
    sink.close().await.unwrap();

    assert_eq!(sink.bytes_written(), 18);
    assert_eq!(sink.path(), &path);
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("out")).unwrap(),
        "first second third"
    );
}

#[compio::test]
async fn test_write_stream_at_offset_preserves_prefix() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("patch"), "0123456789").unwrap();
    let fs = NativeFs::new();

    let options = WriteStreamOptions {
        flags: "r+".parse::<OpenFlags>().unwrap(),
        start: Some(3),
        ..WriteStreamOptions::default()
    };
    let mut sink = fs
        .create_write_stream(&portable_in(&temp_dir, "patch"), options)
        .unwrap();
    sink.feed(b"ab".to_vec()).await.unwrap();
    sink.feed(b"cd".to_vec()).await.unwrap();
    sink.close().await.unwrap();

    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("patch")).unwrap(),
        "012abcd789"
    );
}

#[compio::test]
async fn test_write_stream_close_without_data_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFs::new();

    let mut sink = fs
        .create_write_stream(
            &portable_in(&temp_dir, "empty"),
            WriteStreamOptions::default(),
        )
        .unwrap();
    assert!(!temp_dir.path().join("empty").exists());

    sink.close().await.unwrap();
    assert_eq!(
        std::fs::metadata(temp_dir.path().join("empty")).unwrap().len(),
        0
    );

    // Closing twice is harmless; writing after close is not
    sink.close().await.unwrap();
    assert!(sink.send(b"late".to_vec()).await.is_err());
}

#[compio::test]
async fn test_write_stream_exclusive_conflict_surfaces_on_first_write() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("taken"), "mine").unwrap();
    let fs = NativeFs::new();

    let options = WriteStreamOptions {
        flags: "wx".parse().unwrap(),
        ..WriteStreamOptions::default()
    };
    let mut sink = fs
        .create_write_stream(&portable_in(&temp_dir, "taken"), options)
        .unwrap();
    let err = sink.send(b"theirs".to_vec()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    // The failed open is not retried on close
    sink.close().await.unwrap();
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("taken")).unwrap(),
        "mine"
    );
}

#[compio::test]
async fn test_write_stream_close_after_failed_open_does_not_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let fs = NativeFs::new();
    let orphan = temp_dir.path().join("gone/out");

    let mut sink = fs
        .create_write_stream(
            &portable_in(&temp_dir, "gone").join("out"),
            WriteStreamOptions::default(),
        )
        .unwrap();
    let err = sink.send(b"data".to_vec()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // Once the parent appears a retried open would succeed and create the file
    std::fs::create_dir(temp_dir.path().join("gone")).unwrap();
    sink.close().await.unwrap();
    assert!(!orphan.exists());
    assert_eq!(sink.bytes_written(), 0);
}

#[compio::test]
async fn test_stream_round_trip_through_pipe() {
    let temp_dir = TempDir::new().unwrap();
    let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(temp_dir.path().join("src"), &data).unwrap();
    let fs = NativeFs::new();

    let source = fs
        .create_read_stream(
            &portable_in(&temp_dir, "src"),
            ReadStreamOptions {
                high_water_mark: 8192,
                ..ReadStreamOptions::default()
            },
        )
        .unwrap();
    let mut sink = fs
        .create_write_stream(&portable_in(&temp_dir, "dst"), WriteStreamOptions::default())
        .unwrap();
    source.forward(&mut sink).await.unwrap();

    assert_eq!(sink.bytes_written(), data.len() as u64);
    assert_eq!(std::fs::read(temp_dir.path().join("dst")).unwrap(), data);
}

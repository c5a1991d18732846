//! Blocking and future forms must be observably identical
//!
//! Read-only operations run both forms on the same tree. Mutating operations
//! run each form on its own identical tree, then compare the outcome and the
//! resulting trees.

mod common;

use common::{portable, Deadline};
use fslib::{
    CopyFlags, Descriptor, Encoding, FileSystem, NativeFs, OpenFlags, PortablePath,
    WriteFileOptions,
};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// f (file), d/inner (dir with a file), l -> f (relative symlink)
fn fixture() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    std::fs::write(root.join("f"), "data").unwrap();
    std::fs::create_dir(root.join("d")).unwrap();
    std::fs::write(root.join("d/inner"), "inner").unwrap();
    std::os::unix::fs::symlink("f", root.join("l")).unwrap();
    temp_dir
}

fn assert_same<T: PartialEq + Debug>(
    op: &str,
    sync: fslib::Result<T>,
    future: fslib::Result<T>,
) {
    match (sync, future) {
        (Ok(sync), Ok(future)) => assert_eq!(sync, future, "{op}: values differ"),
        (Err(sync), Err(future)) => {
            assert_eq!(sync.kind(), future.kind(), "{op}: error kinds differ");
            assert_eq!(
                sync.raw_os_error(),
                future.raw_os_error(),
                "{op}: errno differs"
            );
        }
        (sync, future) => panic!("{op}: outcomes differ: {sync:?} vs {future:?}"),
    }
}

/// Sorted (relative path, description) listing of a tree, symlinks not followed
fn snapshot(root: &Path) -> Vec<(String, String)> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<(String, String)>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            let name = path
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .into_owned();
            let meta = std::fs::symlink_metadata(&path).unwrap();
            let description = if meta.file_type().is_symlink() {
                format!("link -> {}", std::fs::read_link(&path).unwrap().display())
            } else if meta.is_dir() {
                walk(root, &path, out);
                "dir".to_string()
            } else {
                use std::os::unix::fs::PermissionsExt;
                format!(
                    "file {:o} {:?}",
                    meta.permissions().mode() & 0o777,
                    std::fs::read(&path).unwrap()
                )
            };
            out.push((name, description));
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

#[compio::test]
async fn test_read_only_operations_agree() {
    let _deadline = Deadline::arm(Duration::from_secs(60));
    let temp_dir = fixture();
    let root = portable(temp_dir.path());
    let fs = NativeFs::new();
    let (file, dir, link, missing) = (
        root.join("f"),
        root.join("d"),
        root.join("l"),
        root.join("missing"),
    );

    for path in [&file, &dir, &link, &missing] {
        assert_same("stat", fs.stat_sync(path), fs.stat_async(path).await);
        assert_same("lstat", fs.lstat_sync(path), fs.lstat_async(path).await);
        assert_same(
            "realpath",
            fs.realpath_sync(path),
            fs.realpath_async(path).await,
        );
        assert_same("exists", fs.exists_sync(path), fs.exists_async(path).await);
        assert_same(
            "readlink",
            fs.readlink_sync(path),
            fs.readlink_async(path).await,
        );
        assert_same(
            "read_file",
            fs.read_file_sync(path, None),
            fs.read_file_async(path, None).await,
        );
        assert_same(
            "read_file utf8",
            fs.read_file_sync(path, Some(Encoding::Utf8)),
            fs.read_file_async(path, Some(Encoding::Utf8)).await,
        );

        let sorted = |names: fslib::Result<Vec<String>>| {
            names.map(|mut names| {
                names.sort();
                names
            })
        };
        assert_same(
            "readdir",
            sorted(fs.readdir_sync(path)),
            sorted(fs.readdir_async(path).await),
        );
    }

    let through_file = file.join("child");
    assert_same(
        "exists through file",
        fs.exists_sync(&through_file),
        fs.exists_async(&through_file).await,
    );
}

#[compio::test]
async fn test_descriptor_operations_agree() {
    let _deadline = Deadline::arm(Duration::from_secs(60));
    let temp_dir = fixture();
    let root = portable(temp_dir.path());
    let fs = NativeFs::new();

    let sync_fd = fs.open_sync(&root.join("f"), OpenFlags::read(), None);
    let future_fd = fs.open_async(&root.join("f"), OpenFlags::read(), None).await;
    assert!(sync_fd.is_ok() && future_fd.is_ok());
    assert_same(
        "close",
        fs.close_sync(sync_fd.unwrap()),
        fs.close_async(future_fd.unwrap()).await,
    );

    let missing = root.join("missing");
    assert_same(
        "open missing",
        fs.open_sync(&missing, OpenFlags::read(), None),
        fs.open_async(&missing, OpenFlags::read(), None).await,
    );

    let invalid = Descriptor::from_raw_fd(-1);
    assert_same(
        "close invalid",
        fs.close_sync(invalid),
        fs.close_async(invalid).await,
    );
}

#[derive(Debug, Clone, Copy)]
enum Form {
    Sync,
    Future,
}

/// Apply mutating operation `op` to the tree at `root` using one form
async fn mutate(fs: &NativeFs, root: &PortablePath, op: &str, form: Form) -> fslib::Result<()> {
    macro_rules! run {
        ($sync:ident / $future:ident ( $($arg:expr),* )) => {
            match form {
                Form::Sync => fs.$sync($($arg),*),
                Form::Future => fs.$future($($arg),*).await,
            }
        };
    }

    let (f, d, l) = (root.join("f"), root.join("d"), root.join("l"));
    let new = root.join("new");
    let epoch = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400);
    let append = WriteFileOptions {
        flag: OpenFlags::append(),
        ..WriteFileOptions::default()
    };
    let exclusive = WriteFileOptions {
        flag: "wx".parse().unwrap(),
        ..WriteFileOptions::default()
    };

    match op {
        "chmod" => run!(chmod_sync / chmod_async(&f, 0o600)),
        "chmod missing" => run!(chmod_sync / chmod_async(&new, 0o600)),
        "rename" => run!(rename_sync / rename_async(&f, &new)),
        "rename onto dir" => run!(rename_sync / rename_async(&f, &d)),
        "copy_file" => run!(copy_file_sync / copy_file_async(&f, &new, CopyFlags::NONE)),
        "copy_file excl" => run!(copy_file_sync / copy_file_async(&f, &l, CopyFlags::EXCL)),
        "write_file" => {
            let options = WriteFileOptions::default();
            run!(write_file_sync / write_file_async(&new, b"x", &options))
        }
        "write_file append" => run!(write_file_sync / write_file_async(&f, b"+", &append)),
        "write_file exclusive" => run!(write_file_sync / write_file_async(&f, b"x", &exclusive)),
        "unlink" => run!(unlink_sync / unlink_async(&l)),
        "unlink dir" => run!(unlink_sync / unlink_async(&d)),
        "utimes" => run!(utimes_sync / utimes_async(&f, epoch, epoch)),
        "mkdir" => run!(mkdir_sync / mkdir_async(&new)),
        "mkdir existing" => run!(mkdir_sync / mkdir_async(&d)),
        "rmdir non-empty" => run!(rmdir_sync / rmdir_async(&d)),
        "rmdir file" => run!(rmdir_sync / rmdir_async(&f)),
        "symlink" => run!(symlink_sync / symlink_async(&PortablePath::from("d"), &new)),
        "symlink existing" => run!(symlink_sync / symlink_async(&f, &l)),
        other => panic!("unknown operation {other}"),
    }
}

#[compio::test]
async fn test_mutating_operations_agree() {
    let _deadline = Deadline::arm(Duration::from_secs(60));
    let ops = [
        "chmod",
        "chmod missing",
        "rename",
        "rename onto dir",
        "copy_file",
        "copy_file excl",
        "write_file",
        "write_file append",
        "write_file exclusive",
        "unlink",
        "unlink dir",
        "utimes",
        "mkdir",
        "mkdir existing",
        "rmdir non-empty",
        "rmdir file",
        "symlink",
        "symlink existing",
    ];
    let fs = NativeFs::new();

    for op in ops {
        let sync_tree = fixture();
        let future_tree = fixture();

        let sync = mutate(&fs, &portable(sync_tree.path()), op, Form::Sync).await;
        let future = mutate(&fs, &portable(future_tree.path()), op, Form::Future).await;
        assert_same(op, sync, future);
        assert_eq!(
            snapshot(sync_tree.path()),
            snapshot(future_tree.path()),
            "{op}: trees differ"
        );

        if op == "utimes" {
            let sync_stats = fs.stat_sync(&portable(&sync_tree.path().join("f"))).unwrap();
            let future_stats = fs.stat_sync(&portable(&future_tree.path().join("f"))).unwrap();
            assert_eq!(sync_stats.modified, future_stats.modified);
            assert_eq!(sync_stats.accessed, future_stats.accessed);
        }
    }
}

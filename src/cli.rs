//! Command-line interface for `fsctl`
//!
//! Every subcommand maps onto one [`FileSystem`] operation. The global
//! `--sync` / `--async` flags pick which form of the operation is used, so
//! the same invocation can exercise both paths of a backend.

use crate::options::{CopyFlags, Encoding, OpenFlags, ReadStreamOptions, WriteFileOptions};
use crate::path::PortablePath;
use crate::stats::Stats;
use crate::traits::FileSystem;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::io::Write;
use std::time::SystemTime;

/// Inspect and modify files through the portable filesystem adapter
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Which form of each operation to call
    #[command(flatten)]
    pub execution: ExecutionConfig,

    /// Output and logging configuration
    #[command(flatten)]
    pub output: OutputConfig,
}

/// Execution form selection
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ExecutionConfig {
    /// Use the blocking form of every operation
    #[arg(long = "sync", global = true, conflicts_with = "use_async")]
    pub use_sync: bool,

    /// Use the future form of every operation (default)
    #[arg(long = "async", global = true)]
    pub use_async: bool,
}

/// Output and logging configuration
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputConfig {
    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress all logging except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Form of the operations issued by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sync,
    Async,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show metadata, following symlinks
    Stat { path: PortablePath },

    /// Show metadata of the path itself
    Lstat { path: PortablePath },

    /// Print a file's contents
    Cat {
        path: PortablePath,

        /// Decode as text (utf8, latin1, hex) instead of streaming raw bytes
        #[arg(long)]
        encoding: Option<String>,

        /// First byte offset to print
        #[arg(long, conflicts_with = "encoding")]
        start: Option<u64>,

        /// Last byte offset to print (inclusive)
        #[arg(long, conflicts_with = "encoding")]
        end: Option<u64>,
    },

    /// List directory entries, sorted by name
    Ls { path: PortablePath },

    /// Print the target of a symlink
    Readlink { path: PortablePath },

    /// Print the canonical path
    Realpath { path: PortablePath },

    /// Print whether a path exists
    Exists { path: PortablePath },

    /// Create a directory
    Mkdir { path: PortablePath },

    /// Remove an empty directory
    Rmdir { path: PortablePath },

    /// Remove a file or symlink
    Rm { path: PortablePath },

    /// Rename a path
    Mv { from: PortablePath, to: PortablePath },

    /// Copy a file
    Cp {
        src: PortablePath,
        dst: PortablePath,

        /// Fail if the destination already exists
        #[arg(short = 'n', long)]
        no_clobber: bool,
    },

    /// Create a symbolic link at LINK pointing to TARGET
    Ln { target: PortablePath, link: PortablePath },

    /// Write text to a file (stdin when CONTENT is omitted)
    Write {
        path: PortablePath,
        content: Option<String>,

        /// Open flags, e.g. w, wx, a
        #[arg(long, default_value = "w")]
        flag: String,

        /// Permission bits (octal) for a newly created file
        #[arg(long, value_parser = parse_mode, default_value = "666")]
        mode: u32,
    },

    /// Change permission bits
    Chmod {
        /// Permission bits in octal, e.g. 644
        #[arg(value_parser = parse_mode)]
        mode: u32,
        path: PortablePath,
    },

    /// Create a file if missing and set its times to now
    Touch { path: PortablePath },
}

/// Parse octal permission bits
///
/// # Errors
///
/// Returns an error if `s` is not an octal number no larger than `0o7777`.
pub fn parse_mode(s: &str) -> std::result::Result<u32, String> {
    let digits = s.strip_prefix("0o").unwrap_or(s);
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(mode),
        Ok(_) => Err(format!("mode out of range: {}", s)),
        Err(e) => Err(format!("invalid octal mode {:?}: {}", s, e)),
    }
}

impl ExecutionConfig {
    /// The selected form; async unless `--sync` was given
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        if self.use_sync {
            ExecutionMode::Sync
        } else {
            ExecutionMode::Async
        }
    }
}

impl OutputConfig {
    /// Default log level for the selected verbosity
    #[must_use]
    pub const fn level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl Args {
    /// Validate command-line arguments
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - Both --quiet and --verbose options are used
    /// - `cat` is given a start offset beyond its end offset
    pub fn validate(&self) -> Result<()> {
        if self.output.quiet && self.output.verbose > 0 {
            anyhow::bail!("Cannot use both --quiet and --verbose options");
        }

        if let Command::Cat {
            start: Some(start),
            end: Some(end),
            ..
        } = &self.command
        {
            if start > end {
                anyhow::bail!("--start ({}) must not exceed --end ({})", start, end);
            }
        }

        Ok(())
    }
}

/// Call the sync or async form of a [`FileSystem`] operation
macro_rules! call {
    ($mode:expr, $fs:expr, $sync:ident / $async:ident ( $($arg:expr),* $(,)? )) => {
        match $mode {
            ExecutionMode::Sync => $fs.$sync($($arg),*),
            ExecutionMode::Async => $fs.$async($($arg),*).await,
        }
    };
}

fn print_stats(out: &mut impl Write, stats: &Stats) -> std::io::Result<()> {
    writeln!(out, "kind: {}", stats.kind)?;
    writeln!(out, "size: {}", stats.size)?;
    writeln!(out, "mode: {:o}", stats.permissions())?;
    writeln!(out, "uid: {}", stats.uid)?;
    writeln!(out, "gid: {}", stats.gid)?;
    writeln!(out, "nlink: {}", stats.nlink)?;
    writeln!(out, "ino: {}", stats.ino)?;
    if let Ok(modified) = stats.modified.duration_since(SystemTime::UNIX_EPOCH) {
        writeln!(out, "modified: {}.{:09}", modified.as_secs(), modified.subsec_nanos())?;
    }
    Ok(())
}

/// Run `args.command` against `fs`, writing results to `out`
///
/// # Errors
///
/// Returns the failing operation's error with the command name as context.
pub async fn execute<F: FileSystem>(fs: &F, args: &Args, out: &mut impl Write) -> Result<()> {
    let mode = args.execution.mode();
    tracing::debug!(backend = fs.name(), ?mode, command = ?args.command, "executing");

    match &args.command {
        Command::Stat { path } => {
            let stats = call!(mode, fs, stat_sync / stat_async(path)).context("stat")?;
            print_stats(out, &stats)?;
        }
        Command::Lstat { path } => {
            let stats = call!(mode, fs, lstat_sync / lstat_async(path)).context("lstat")?;
            print_stats(out, &stats)?;
        }
        Command::Cat {
            path,
            encoding: Some(encoding),
            ..
        } => {
            let encoding: Encoding = encoding.parse()?;
            let content = call!(mode, fs, read_file_sync / read_file_async(path, Some(encoding)))
                .context("cat")?;
            out.write_all(&content.into_bytes())?;
        }
        Command::Cat {
            path, start, end, ..
        } => {
            let options = ReadStreamOptions {
                start: *start,
                end: *end,
                ..ReadStreamOptions::default()
            };
            let mut stream = fs.create_read_stream(path, options)?;
            while let Some(chunk) = stream.next().await {
                out.write_all(&chunk.context("cat")?)?;
            }
        }
        Command::Ls { path } => {
            let mut names = call!(mode, fs, readdir_sync / readdir_async(path)).context("ls")?;
            names.sort();
            for name in names {
                writeln!(out, "{}", name)?;
            }
        }
        Command::Readlink { path } => {
            let target =
                call!(mode, fs, readlink_sync / readlink_async(path)).context("readlink")?;
            writeln!(out, "{}", target)?;
        }
        Command::Realpath { path } => {
            let resolved =
                call!(mode, fs, realpath_sync / realpath_async(path)).context("realpath")?;
            writeln!(out, "{}", resolved)?;
        }
        Command::Exists { path } => {
            let exists = call!(mode, fs, exists_sync / exists_async(path)).context("exists")?;
            writeln!(out, "{}", exists)?;
        }
        Command::Mkdir { path } => {
            call!(mode, fs, mkdir_sync / mkdir_async(path)).context("mkdir")?;
        }
        Command::Rmdir { path } => {
            call!(mode, fs, rmdir_sync / rmdir_async(path)).context("rmdir")?;
        }
        Command::Rm { path } => {
            call!(mode, fs, unlink_sync / unlink_async(path)).context("rm")?;
        }
        Command::Mv { from, to } => {
            call!(mode, fs, rename_sync / rename_async(from, to)).context("mv")?;
        }
        Command::Cp {
            src,
            dst,
            no_clobber,
        } => {
            let flags = if *no_clobber {
                CopyFlags::EXCL
            } else {
                CopyFlags::NONE
            };
            call!(mode, fs, copy_file_sync / copy_file_async(src, dst, flags)).context("cp")?;
        }
        Command::Ln { target, link } => {
            call!(mode, fs, symlink_sync / symlink_async(target, link)).context("ln")?;
        }
        Command::Write {
            path,
            content,
            flag,
            mode: file_mode,
        } => {
            let content = match content {
                Some(text) => text.clone().into_bytes(),
                None => {
                    let mut buf = Vec::new();
                    std::io::Read::read_to_end(&mut std::io::stdin(), &mut buf)?;
                    buf
                }
            };
            let options = WriteFileOptions {
                flag: flag.parse::<OpenFlags>().map_err(crate::error::FsError::from)?,
                mode: *file_mode,
            };
            call!(mode, fs, write_file_sync / write_file_async(path, &content, &options))
                .context("write")?;
        }
        Command::Chmod { mode: bits, path } => {
            call!(mode, fs, chmod_sync / chmod_async(path, *bits)).context("chmod")?;
        }
        Command::Touch { path } => {
            // Appending nothing creates the file without truncating it
            let create = WriteFileOptions {
                flag: OpenFlags::append(),
                ..WriteFileOptions::default()
            };
            call!(mode, fs, write_file_sync / write_file_async(path, &[], &create))
                .context("touch")?;
            let now = SystemTime::now();
            call!(mode, fs, utimes_sync / utimes_async(path, now, now)).context("touch")?;
        }
    }

    out.flush()?;
    Ok(())
}

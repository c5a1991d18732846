//! Lazily-opened byte streams over native files
//!
//! [`ReadStream`] is a `futures::Stream` of byte chunks and [`WriteStream`]
//! is a `futures::Sink` of byte chunks. Neither touches the OS until it is
//! first driven; the path has already been encoded when the stream is built.
//! Every OS call goes through the callback primitives and the
//! [`crate::completion`] bridge, one operation in flight at a time.

use crate::completion::bridge;
use crate::error::{FsError, Result};
use crate::options::{OpenFlags, ReadStreamOptions, WriteStreamOptions, DEFAULT_FILE_MODE};
use crate::path::PortablePath;
use compio_fs_callback::callback;
use futures::future::LocalBoxFuture;
use futures::stream::LocalBoxStream;
use futures::{FutureExt, Sink, Stream, StreamExt};
use std::fs::File;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

async fn open_native(
    native: PathBuf,
    display: &PortablePath,
    flags: OpenFlags,
    mode: u32,
) -> Result<Arc<File>> {
    let file = bridge(|done| callback::open_file(native, flags, mode, done.into_callback()))
        .await
        .map_err(|e| FsError::os("open", display, e))?;
    Ok(Arc::new(file))
}

enum ReadState {
    Unopened {
        native: PathBuf,
        display: PortablePath,
        options: ReadStreamOptions,
    },
    Reading {
        file: Arc<File>,
        display: PortablePath,
        position: u64,
        end: Option<u64>,
        chunk: usize,
    },
    Finished,
}

/// Finite, non-restartable stream of chunks read from a file
pub struct ReadStream {
    inner: LocalBoxStream<'static, Result<Vec<u8>>>,
}

impl ReadStream {
    pub(crate) fn new(native: PathBuf, display: PortablePath, options: ReadStreamOptions) -> Self {
        let state = ReadState::Unopened {
            native,
            display,
            options,
        };
        let inner = futures::stream::unfold(state, Self::step).boxed_local();
        Self { inner }
    }

    async fn step(mut state: ReadState) -> Option<(Result<Vec<u8>>, ReadState)> {
        loop {
            match state {
                ReadState::Finished => return None,
                ReadState::Unopened {
                    native,
                    display,
                    options,
                } => {
                    match open_native(native, &display, OpenFlags::read(), DEFAULT_FILE_MODE).await
                    {
                        Ok(file) => {
                            state = ReadState::Reading {
                                file,
                                display,
                                position: options.start.unwrap_or(0),
                                end: options.end,
                                chunk: options.high_water_mark.max(1),
                            };
                        }
                        Err(e) => return Some((Err(e), ReadState::Finished)),
                    }
                }
                ReadState::Reading {
                    file,
                    display,
                    position,
                    end,
                    chunk,
                } => {
                    let want = match end {
                        Some(end) if position > end => return None,
                        Some(end) => usize::try_from((end - position).saturating_add(1))
                            .map_or(chunk, |left| left.min(chunk)),
                        None => chunk,
                    };

                    let read = bridge(|done| {
                        callback::read_at(Arc::clone(&file), position, want, done.into_callback());
                    })
                    .await;

                    return match read {
                        Ok(bytes) if bytes.is_empty() => None,
                        Ok(bytes) => {
                            let next = ReadState::Reading {
                                file,
                                display,
                                position: position + bytes.len() as u64,
                                end,
                                chunk,
                            };
                            Some((Ok(bytes), next))
                        }
                        Err(e) => {
                            let error = FsError::os("read", &display, e);
                            Some((Err(error), ReadState::Finished))
                        }
                    };
                }
            }
        }
    }
}

impl Stream for ReadStream {
    type Item = Result<Vec<u8>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

/// Sink writing chunks to a file, in order
///
/// Drive it with `futures::SinkExt` (`send`, `feed`, `close`). The file is
/// released when the sink is closed or dropped.
pub struct WriteStream {
    native: PathBuf,
    display: PortablePath,
    options: WriteStreamOptions,
    file: Option<Arc<File>>,
    position: Option<u64>,
    in_flight: Option<LocalBoxFuture<'static, Result<(Arc<File>, u64)>>>,
    bytes_written: u64,
    // An open or write has failed; closing must not try to open again
    failed: bool,
    closed: bool,
}

impl WriteStream {
    pub(crate) fn new(native: PathBuf, display: PortablePath, options: WriteStreamOptions) -> Self {
        Self {
            native,
            display,
            position: options.start,
            options,
            file: None,
            in_flight: None,
            bytes_written: 0,
            failed: false,
            closed: false,
        }
    }

    /// Total bytes acknowledged by the OS so far
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Portable path this stream writes to
    #[must_use]
    pub fn path(&self) -> &PortablePath {
        &self.display
    }

    fn start_write(&mut self, data: Vec<u8>) {
        let file = self.file.clone();
        let native = self.native.clone();
        let display = self.display.clone();
        let WriteStreamOptions { flags, mode, .. } = self.options;
        let position = self.position;

        let write = async move {
            let file = match file {
                Some(file) => file,
                None => open_native(native, &display, flags, mode).await?,
            };
            let len = data.len() as u64;
            if len > 0 {
                let target = Arc::clone(&file);
                bridge(|done| callback::write_at(target, position, data, done.into_callback()))
                    .await
                    .map_err(|e| FsError::os("write", &display, e))?;
            }
            Ok::<_, FsError>((file, len))
        };
        self.in_flight = Some(write.boxed_local());
    }

    fn poll_in_flight(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        if let Some(write) = self.in_flight.as_mut() {
            let outcome = ready!(write.as_mut().poll(cx));
            self.in_flight = None;
            let (file, len) = outcome.inspect_err(|_| self.failed = true)?;
            self.file = Some(file);
            self.bytes_written += len;
            if let Some(position) = self.position.as_mut() {
                *position += len;
            }
        }
        Poll::Ready(Ok(()))
    }
}

impl Sink<Vec<u8>> for WriteStream {
    type Error = FsError;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.get_mut().poll_in_flight(cx)
    }

    fn start_send(self: Pin<&mut Self>, item: Vec<u8>) -> Result<()> {
        let this = self.get_mut();
        if this.closed {
            return Err(FsError::InvalidArgument(format!(
                "write stream for {} is closed",
                this.display
            )));
        }
        this.start_write(item);
        Ok(())
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.get_mut().poll_in_flight(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        let this = self.get_mut();
        if this.closed {
            return Poll::Ready(Ok(()));
        }
        ready!(this.poll_in_flight(cx))?;
        if this.file.is_none() && !this.failed {
            // Nothing was written: open anyway so the target is created
            this.start_write(Vec::new());
            ready!(this.poll_in_flight(cx))?;
        }
        this.file = None;
        this.closed = true;
        Poll::Ready(Ok(()))
    }
}

//! Bounded in-process byte pipe.
//!
//! The writer blocks while `capacity` chunks are in flight; the reader
//! blocks while the pipe is empty and sees end-of-stream once the writer
//! is dropped. Dropping the reader makes every later write fail with
//! `BrokenPipe`.

use crossbeam::channel as chan;
use std::io::{self, Read, Write};

/// Creates a connected writer/reader pair.
pub fn pipe(capacity: usize, mime_type: &'static str) -> (PipeWriter, ExportStream) {
    let (sender, receiver) = chan::bounded(capacity.max(1));
    (
        PipeWriter { sender },
        ExportStream {
            receiver,
            pending: Vec::new(),
            offset: 0,
            mime_type,
        },
    )
}

/// Producer end of the pipe.
pub struct PipeWriter {
    sender: chan::Sender<Vec<u8>>,
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.sender
            .send(buf.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "export reader closed"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Readable end handed to the caller of `open_export_stream`.
pub struct ExportStream {
    receiver: chan::Receiver<Vec<u8>>,
    pending: Vec<u8>,
    offset: usize,
    mime_type: &'static str,
}

impl ExportStream {
    /// Content type of the bytes on this stream.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }
}

impl Read for ExportStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.offset >= self.pending.len() {
            match self.receiver.recv() {
                Ok(chunk) => {
                    self.pending = chunk;
                    self.offset = 0;
                }
                // Writer dropped: end of stream.
                Err(_) => return Ok(0),
            }
        }

        let available = &self.pending[self.offset..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.offset += count;
        Ok(count)
    }
}

impl std::fmt::Debug for ExportStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportStream")
            .field("mime_type", &self.mime_type)
            .field("buffered", &(self.pending.len() - self.offset.min(self.pending.len())))
            .finish_non_exhaustive()
    }
}

//! Producer task serializing one record into the export pipe.

use super::pipe::PipeWriter;
use crate::uri::ContentUri;
use log::{debug, error, info, warn};
use rusqlite::types::Value;
use std::borrow::Cow;
use std::io::{self, BufWriter, Write};
use std::thread::{self, JoinHandle};
use std::time::Instant;

const PRODUCER_THREAD_NAME: &str = "record-export";

/// Cells copied out of the read before the producer starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub uri: ContentUri,
    pub title: Value,
    pub body: Value,
}

#[derive(Debug)]
enum WriteError {
    /// A cell could not be decoded as UTF-8 text.
    Encoding { column: &'static str },
    Io(io::Error),
}

impl From<io::Error> for WriteError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Starts the producer on its own thread.
///
/// The thread owns `writer`; it is dropped (closing the pipe) when the
/// document is written or the write fails.
pub fn spawn_producer(writer: PipeWriter, document: ExportDocument) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(PRODUCER_THREAD_NAME.to_string())
        .spawn(move || produce(writer, document))
}

fn produce(writer: PipeWriter, document: ExportDocument) {
    let started_at = Instant::now();
    let mut out = BufWriter::new(writer);

    let result = write_document(&mut out, &document)
        .and_then(|()| out.flush().map_err(WriteError::from));
    match result {
        Ok(()) => info!(
            "event=export_write module=export status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(WriteError::Encoding { column }) => {
            // Deliver what was written; the reader sees a short stream.
            let _ = out.flush();
            error!(
                "event=export_write module=export status=error error_code=encoding_failed column={} uri={}",
                column, document.uri
            );
        }
        Err(WriteError::Io(err)) if err.kind() == io::ErrorKind::BrokenPipe => debug!(
            "event=export_write module=export status=aborted reason=reader_closed uri={}",
            document.uri
        ),
        Err(WriteError::Io(err)) => warn!(
            "event=export_write module=export status=error error_code=io_failed uri={} error={}",
            document.uri, err
        ),
    }
}

/// Writes `title`, a blank line, then `body`, each newline-terminated.
fn write_document(out: &mut impl Write, document: &ExportDocument) -> Result<(), WriteError> {
    let title = cell_text(&document.title, "title")?;
    out.write_all(title.as_bytes())?;
    out.write_all(b"\n\n")?;

    let body = cell_text(&document.body, "body")?;
    out.write_all(body.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

fn cell_text<'a>(value: &'a Value, column: &'static str) -> Result<Cow<'a, str>, WriteError> {
    match value {
        Value::Null => Ok(Cow::Borrowed("")),
        Value::Text(text) => Ok(Cow::Borrowed(text.as_str())),
        Value::Integer(number) => Ok(Cow::Owned(number.to_string())),
        Value::Real(number) => Ok(Cow::Owned(number.to_string())),
        Value::Blob(bytes) => std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|_| WriteError::Encoding { column }),
    }
}

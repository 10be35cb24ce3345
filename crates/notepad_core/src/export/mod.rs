//! Streaming plain-text export of single records.
//!
//! # Responsibility
//! - Provide the bounded pipe connecting the producer to the caller.
//! - Serialize one record as `title`, blank line, `body` on a producer
//!   thread that runs concurrently with the reader.
//!
//! # Invariants
//! - The caller gets the readable end before any byte is written.
//! - The producer never reports errors to the reader: encoding failures are
//!   logged and the stream ends early; a closed reader stops the producer.
//! - A stalled reader stalls the producer; there is no timeout.

mod pipe;
mod producer;

pub use pipe::{pipe, ExportStream, PipeWriter};
pub use producer::{spawn_producer, ExportDocument};

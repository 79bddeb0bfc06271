//! Local host adapters
//!
//! One JSON inbound request from a reader, forward requests as JSON lines to
//! a writer. The binary uses stdin/stdout when no NATS server is configured.

use crate::dispatch::{DispatchSink, InboundSource};
use crate::error::RouterError;
use crate::share::{ForwardRequest, InboundRequest};
use async_trait::async_trait;
use std::io::{Read, Write};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Reads a single JSON document as the delivery
pub struct ReaderSource<R> {
    reader: Option<R>,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }

    fn read_document(reader: &mut R) -> Result<Option<InboundRequest>, RouterError> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;

        if input.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&input)
            .map(Some)
            .map_err(|e| RouterError::InvalidInput {
                reason: e.to_string(),
            })
    }
}

impl<R: Read> InboundSource for ReaderSource<R> {
    fn read_inbound(&mut self) -> Option<InboundRequest> {
        // The reader is consumed by the first read
        let mut reader = self.reader.take()?;

        match Self::read_document(&mut reader) {
            Ok(Some(request)) => Some(request),
            Ok(None) => {
                debug!("Empty inbound document");
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read inbound request");
                None
            }
        }
    }
}

/// Writes each forward request as one JSON line
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl<W: Write + Send> DispatchSink for WriterSink<W> {
    async fn dispatch(&self, request: &ForwardRequest) -> Result<(), RouterError> {
        let line = serde_json::to_string(request)
            .map_err(|source| RouterError::SerializationFailed { source })?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| RouterError::dispatch_failed(request.action.as_str(), "sink writer poisoned"))?;

        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}

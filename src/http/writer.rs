//! Forward-only response serializer.
//!
//! A response is emitted in a fixed order, and every call is checked against
//! the current [`WriterState`]:
//!
//! ```text
//! StatusLine ─▶ Headers ─▶ Body ──write_body──────────────────────────▶ Done
//!                           │
//!                           └─write_chunked_body*─▶ write_chunked_body_done
//!                                                          │
//!                                                          ▼
//!                                                      Trailers ─write_trailers─▶ Done
//! ```
//!
//! The writer never injects headers. A chunked response needs
//! `Transfer-Encoding: chunked` (and `Trailer` when trailers follow) set by
//! the caller before [`ResponseWriter::write_headers`].

use std::fmt;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WriterState {
    StatusLine,
    Headers,
    Body,
    Trailers,
    Done,
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriterState::StatusLine => "status line",
            WriterState::Headers => "headers",
            WriterState::Body => "body",
            WriterState::Trailers => "trailers",
            WriterState::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("cannot {operation} in state {state}")]
    OutOfOrder {
        operation: &'static str,
        state: WriterState,
    },

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ResponseWriter<W> {
    sink: W,
    state: WriterState,
    chunked: bool,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            state: WriterState::StatusLine,
            chunked: false,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriterError> {
        self.ensure_state(WriterState::StatusLine, "write status line")?;
        self.sink.write_all(status.status_line().as_bytes()).await?;
        self.state = WriterState::Headers;
        Ok(())
    }

    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriterError> {
        self.ensure_state(WriterState::Headers, "write headers")?;
        self.sink.write_all(&headers.to_wire()).await?;
        self.state = WriterState::Body;
        Ok(())
    }

    /// Writes the whole fixed-length body. The caller must already have sent
    /// a matching `Content-Length`.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriterError> {
        self.ensure_state(WriterState::Body, "write body")?;
        if self.chunked {
            return Err(WriterError::OutOfOrder {
                operation: "write fixed body after chunked body",
                state: self.state,
            });
        }

        self.sink.write_all(body).await?;
        self.sink.flush().await?;
        self.state = WriterState::Done;
        Ok(body.len())
    }

    /// Writes one `<hex len>\r\n<bytes>\r\n` chunk. Empty input writes nothing,
    /// since a zero-length chunk is the end-of-body marker.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<usize, WriterError> {
        self.ensure_state(WriterState::Body, "write chunked body")?;
        self.chunked = true;
        if chunk.is_empty() {
            return Ok(0);
        }

        let mut frame = Vec::with_capacity(chunk.len() + 12);
        frame.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        frame.extend_from_slice(chunk);
        frame.extend_from_slice(b"\r\n");
        self.sink.write_all(&frame).await?;
        Ok(chunk.len())
    }

    /// Writes the terminating `0\r\n` and moves on to trailers.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriterError> {
        self.ensure_state(WriterState::Body, "finish chunked body")?;
        self.sink.write_all(b"0\r\n").await?;
        self.chunked = true;
        self.state = WriterState::Trailers;
        Ok(())
    }

    /// Writes trailer fields followed by the final blank line. Pass an empty
    /// table when there are no trailers; the blank line is still required.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriterError> {
        self.ensure_state(WriterState::Trailers, "write trailers")?;
        self.sink.write_all(&trailers.to_wire()).await?;
        self.sink.flush().await?;
        self.state = WriterState::Done;
        Ok(())
    }

    fn ensure_state(
        &self,
        required: WriterState,
        operation: &'static str,
    ) -> Result<(), WriterError> {
        if self.state != required {
            return Err(WriterError::OutOfOrder {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }
}

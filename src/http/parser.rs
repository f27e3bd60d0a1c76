//! Incremental request parser.
//!
//! Bytes may arrive in fragments of any size, including pieces smaller than a
//! single line. [`RequestParser::feed`] makes as much progress as the buffered
//! bytes allow and reports how many of them it consumed; the caller keeps the
//! rest and feeds it again once more data has been read.
//!
//! ```text
//! Initialized ──request line──▶ ParsingHeaders ──blank line──▶ ParsingBody ──▶ Done
//! ```

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::headers::{find_crlf, HeaderError, Headers};
use crate::http::request::{Request, RequestLine};

const INITIAL_BUFFER_SIZE: usize = 1024;
const SUPPORTED_VERSION: &str = "1.1";

/// Parser progress. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParserState {
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("poorly formatted request-line: {0}")]
    MalformedRequestLine(String),

    #[error("invalid method: {0}")]
    InvalidMethod(String),

    #[error("unrecognized HTTP-version: {0}")]
    UnsupportedVersion(String),

    #[error(transparent)]
    InvalidHeader(#[from] HeaderError),

    #[error("invalid content-length header: {0}")]
    InvalidContentLength(String),

    #[error("body length {actual} greater than Content-Length {expected}")]
    BodyTooLong { expected: usize, actual: usize },

    #[error("trying to read data in a done state")]
    DataAfterDone,

    #[error("incomplete request, connection closed in state {0:?}")]
    Incomplete(ParserState),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Whether the peer sent something we can answer with a 400.
    ///
    /// A premature close or a failed read leaves nothing coherent to answer.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, ParseError::Incomplete(_) | ParseError::Io(_))
    }
}

#[derive(Debug)]
pub struct RequestParser {
    state: ParserState,
    request_line: Option<RequestLine>,
    headers: Headers,
    body: Vec<u8>,
    content_length: Option<usize>,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Initialized,
            request_line: None,
            headers: Headers::new(),
            body: Vec::new(),
            content_length: None,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Parses as much of `data` as possible and returns the number of bytes
    /// consumed. Unconsumed bytes must be passed again on the next call,
    /// followed by whatever arrives next.
    pub fn feed(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.is_done() {
            return Err(ParseError::DataAfterDone);
        }

        let mut consumed = 0;
        while !self.is_done() {
            let before = self.state;
            let n = self.parse_single(&data[consumed..])?;
            consumed += n;

            if n == 0 && self.state == before {
                break;
            }
        }

        Ok(consumed)
    }

    /// Consumes the parser, returning the request once parsing is `Done`.
    pub fn finish(self) -> Result<Request, ParseError> {
        match (self.state, self.request_line) {
            (ParserState::Done, Some(request_line)) => Ok(Request {
                request_line,
                headers: self.headers,
                body: self.body,
            }),
            (state, _) => Err(ParseError::Incomplete(state)),
        }
    }

    /// Reads from `reader` until one full request has been parsed.
    ///
    /// Fails with [`ParseError::Incomplete`] if the source closes first.
    pub async fn from_stream<R>(reader: &mut R) -> Result<Request, ParseError>
    where
        R: AsyncRead + Unpin,
    {
        let mut parser = Self::new();
        let mut buf = BytesMut::with_capacity(INITIAL_BUFFER_SIZE);

        while !parser.is_done() {
            if buf.len() == buf.capacity() {
                let grow_by = buf.capacity().max(INITIAL_BUFFER_SIZE);
                buf.reserve(grow_by);
            }

            let n = reader.read_buf(&mut buf).await?;
            if n == 0 {
                tracing::debug!(state = ?parser.state, buffered = buf.len(), "source closed mid-request");
                return Err(ParseError::Incomplete(parser.state));
            }

            let consumed = parser.feed(&buf)?;
            buf.advance(consumed);
        }

        parser.finish()
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParserState::Initialized => {
                let Some(idx) = find_crlf(data) else {
                    return Ok(0);
                };
                self.request_line = Some(parse_request_line(&data[..idx])?);
                self.state = ParserState::ParsingHeaders;
                Ok(idx + 2)
            }

            ParserState::ParsingHeaders => {
                let (n, done) = self.headers.parse(data)?;
                if done {
                    self.content_length = declared_content_length(&self.headers)?;
                    self.state = ParserState::ParsingBody;
                }
                Ok(n)
            }

            ParserState::ParsingBody => {
                let Some(expected) = self.content_length else {
                    self.state = ParserState::Done;
                    return Ok(data.len());
                };

                self.body.extend_from_slice(data);
                if self.body.len() > expected {
                    return Err(ParseError::BodyTooLong {
                        expected,
                        actual: self.body.len(),
                    });
                }
                if self.body.len() == expected {
                    self.state = ParserState::Done;
                }
                Ok(data.len())
            }

            ParserState::Done => Err(ParseError::DataAfterDone),
        }
    }
}

fn declared_content_length(headers: &Headers) -> Result<Option<usize>, ParseError> {
    headers
        .get("content-length")
        .map(|v| {
            v.parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength(v.to_string()))
        })
        .transpose()
}

fn parse_request_line(line: &[u8]) -> Result<RequestLine, ParseError> {
    let line = std::str::from_utf8(line)
        .map_err(|_| ParseError::MalformedRequestLine(String::from_utf8_lossy(line).into_owned()))?;

    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts[..] else {
        return Err(ParseError::MalformedRequestLine(line.to_string()));
    };

    if method.is_empty() || !method.bytes().all(|c| c.is_ascii_uppercase()) {
        return Err(ParseError::InvalidMethod(method.to_string()));
    }

    let version = match version.split_once('/') {
        Some(("HTTP", v)) if v == SUPPORTED_VERSION => v,
        Some(("HTTP", v)) => return Err(ParseError::UnsupportedVersion(v.to_string())),
        _ => return Err(ParseError::MalformedRequestLine(line.to_string())),
    };

    Ok(RequestLine {
        method: method.to_string(),
        target: target.to_string(),
        version: version.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let mut parser = RequestParser::new();

        let consumed = parser.feed(req).unwrap();

        assert_eq!(consumed, req.len());
        assert_eq!(parser.state(), ParserState::Done);
        let parsed = parser.finish().unwrap();
        assert_eq!(parsed.target(), "/");
        assert_eq!(parsed.header("Host"), Some("example.com"));
    }

    #[test]
    fn partial_request_line_consumes_nothing() {
        let mut parser = RequestParser::new();
        assert_eq!(parser.feed(b"GET / HT").unwrap(), 0);
        assert_eq!(parser.state(), ParserState::Initialized);
    }

    #[test]
    fn waits_for_body_bytes() {
        let mut parser = RequestParser::new();
        let head = b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\n";

        assert_eq!(parser.feed(head).unwrap(), head.len());
        assert_eq!(parser.state(), ParserState::ParsingBody);

        assert_eq!(parser.feed(b"hel").unwrap(), 3);
        assert_eq!(parser.feed(b"lo").unwrap(), 2);
        assert!(parser.is_done());
        assert_eq!(parser.body(), b"hello");
    }

    #[test]
    fn feeding_after_done_fails() {
        let mut parser = RequestParser::new();
        parser.feed(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert!(matches!(parser.feed(b"x"), Err(ParseError::DataAfterDone)));
    }

    #[test]
    fn request_line_rejections() {
        assert!(matches!(
            parse_request_line(b"/coffee HTTP/1.1"),
            Err(ParseError::MalformedRequestLine(_))
        ));
        assert!(matches!(
            parse_request_line(b"get / HTTP/1.1"),
            Err(ParseError::InvalidMethod(_))
        ));
        assert!(matches!(
            parse_request_line(b"GET / HTTP/2.0"),
            Err(ParseError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            parse_request_line(b"GET / HTTPS/1.1"),
            Err(ParseError::MalformedRequestLine(_))
        ));
        assert!(matches!(
            parse_request_line(b"GET  / HTTP/1.1"),
            Err(ParseError::MalformedRequestLine(_))
        ));
    }
}

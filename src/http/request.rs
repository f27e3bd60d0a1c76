use crate::http::headers::Headers;

/// The first line of a request: `<METHOD> <target> HTTP/<version>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// Uppercase ASCII method token, e.g. "GET"
    pub method: String,
    /// Request target exactly as sent, e.g. "/coffee?size=large"
    pub target: String,
    /// Version without the "HTTP/" prefix; always "1.1"
    pub version: String,
}

/// Represents a fully parsed HTTP request read from a connection.
///
/// `body` is only populated when the request carried a `Content-Length`
/// header, and then always has exactly that many bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub request_line: RequestLine,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Request {
    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The declared `Content-Length`, if present and numeric.
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length").and_then(|v| v.parse().ok())
    }
}

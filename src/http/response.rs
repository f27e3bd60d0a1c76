use crate::http::headers::Headers;

/// HTTP status codes the server knows a reason phrase for.
///
/// Any other code is carried as `Other` and written without a phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 500 Internal Server Error
    InternalServerError,
    Other(u16),
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpfromtcp::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::Other(418).as_u16(), 418);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::InternalServerError => 500,
            StatusCode::Other(code) => *code,
        }
    }

    /// Returns the canonical reason phrase, if this code has one.
    pub fn reason_phrase(&self) -> Option<&'static str> {
        match self {
            StatusCode::Ok => Some("OK"),
            StatusCode::BadRequest => Some("Bad Request"),
            StatusCode::InternalServerError => Some("Internal Server Error"),
            StatusCode::Other(_) => None,
        }
    }

    /// Formats the full status line including the trailing CRLF.
    pub(crate) fn status_line(&self) -> String {
        match self.reason_phrase() {
            Some(reason) => format!("HTTP/1.1 {} {}\r\n", self.as_u16(), reason),
            None => format!("HTTP/1.1 {}\r\n", self.as_u16()),
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        match code {
            200 => StatusCode::Ok,
            400 => StatusCode::BadRequest,
            500 => StatusCode::InternalServerError,
            other => StatusCode::Other(other),
        }
    }
}

/// Headers for a plain-text response whose body is `content_len` bytes long.
///
/// Connections are never reused, so `Connection: close` is always announced.
pub fn default_headers(content_len: usize) -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Length", &content_len.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", "text/plain");
    headers
}

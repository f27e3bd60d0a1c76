use std::future::Future;

use tokio::io::AsyncWrite;
use tokio::net::TcpStream;

use crate::http::request::Request;
use crate::http::response::{default_headers, StatusCode};
use crate::http::writer::{ResponseWriter, WriterError};

/// Writer handed to a [`Handler`], bound to the accepted connection.
pub type ConnectionWriter = ResponseWriter<TcpStream>;

/// Application logic invoked once per successfully parsed request.
///
/// On every path a handler either drives the writer through a complete
/// response (status line, headers, then a fixed body or chunks + done +
/// trailers) or leaves it untouched and returns a [`HandlerError`], which the
/// server turns into a response itself.
///
/// ```ignore
/// struct Hello;
///
/// impl Handler for Hello {
///     async fn handle(&self, w: &mut ConnectionWriter, _req: &Request) -> Result<(), HandlerError> {
///         let body = b"hello\n";
///         w.write_status_line(StatusCode::Ok).await?;
///         w.write_headers(&default_headers(body.len())).await?;
///         w.write_body(body).await?;
///         Ok(())
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    fn handle(
        &self,
        writer: &mut ConnectionWriter,
        request: &Request,
    ) -> impl Future<Output = Result<(), HandlerError>> + Send;
}

/// An error the handler wants reported to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InternalServerError, message)
    }

    /// Writes this error as a complete plain-text response.
    pub async fn write_to<W>(&self, writer: &mut ResponseWriter<W>) -> Result<(), WriterError>
    where
        W: AsyncWrite + Unpin,
    {
        let body = self.message.as_bytes();
        writer.write_status_line(self.status).await?;
        writer.write_headers(&default_headers(body.len())).await?;
        writer.write_body(body).await?;
        Ok(())
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for HandlerError {}

/// Lets handlers use `?` on writer calls; a failed write reports as a 500.
impl From<WriterError> for HandlerError {
    fn from(err: WriterError) -> Self {
        Self::internal(err.to_string())
    }
}

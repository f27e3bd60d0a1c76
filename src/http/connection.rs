use std::net::SocketAddr;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::parser::RequestParser;
use crate::http::request::Request;
use crate::http::writer::{ResponseWriter, WriterState};
use crate::server::handler::{Handler, HandlerError};

/// One accepted client connection, good for exactly one request.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self { stream, peer }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Reads a request, answers it, and closes the connection.
    ///
    /// Malformed requests get a 400 without reaching `handler`. A peer that
    /// disconnects mid-request gets nothing and the error is returned.
    pub async fn run<H: Handler>(self, handler: &H) -> anyhow::Result<()> {
        let Connection { mut stream, peer } = self;

        let parsed = RequestParser::from_stream(&mut stream).await;
        let mut writer = ResponseWriter::new(stream);

        let result = match parsed {
            Ok(request) => {
                tracing::info!(
                    %peer,
                    method = request.method(),
                    target = request.target(),
                    "Handling request"
                );
                Self::dispatch(handler, &mut writer, &request).await
            }
            Err(e) if e.is_malformed() => {
                tracing::debug!(%peer, error = %e, "Rejecting malformed request");
                HandlerError::bad_request(e.to_string())
                    .write_to(&mut writer)
                    .await
                    .map_err(anyhow::Error::from)
            }
            Err(e) => Err(anyhow::anyhow!("failed to read request: {}", e)),
        };

        let mut stream = writer.into_inner();
        if let Err(e) = stream.shutdown().await {
            tracing::trace!(%peer, error = %e, "Shutdown after response failed");
        }

        result
    }

    async fn dispatch<H: Handler>(
        handler: &H,
        writer: &mut ResponseWriter<TcpStream>,
        request: &Request,
    ) -> anyhow::Result<()> {
        match handler.handle(writer, request).await {
            Ok(()) => {
                if writer.state() != WriterState::Done {
                    tracing::warn!(
                        state = %writer.state(),
                        target = request.target(),
                        "Handler returned before completing the response"
                    );
                }
                Ok(())
            }
            Err(err) if writer.state() == WriterState::StatusLine => {
                tracing::debug!(status = err.status.as_u16(), "Handler reported an error");
                err.write_to(writer).await?;
                Ok(())
            }
            Err(err) => Err(anyhow::anyhow!(
                "handler failed after starting the response (state {}): {}",
                writer.state(),
                err
            )),
        }
    }
}

//! Demo handler wired up by the binary.

use httpfromtcp::http::headers::Headers;
use httpfromtcp::http::request::Request;
use httpfromtcp::http::response::{default_headers, StatusCode};
use httpfromtcp::server::{ConnectionWriter, Handler, HandlerError};

const OK_PAGE: &str = "<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was an absolute banger.</p>
  </body>
</html>
";

const BAD_REQUEST_PAGE: &str = "<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>
";

const SERVER_ERROR_PAGE: &str = "<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Okay, you know what? This one is on me.</p>
  </body>
</html>
";

pub struct Routes;

impl Handler for Routes {
    async fn handle(
        &self,
        writer: &mut ConnectionWriter,
        request: &Request,
    ) -> Result<(), HandlerError> {
        let target = request.target();

        if target == "/yourproblem" {
            return html(writer, StatusCode::BadRequest, BAD_REQUEST_PAGE).await;
        }
        if target == "/myproblem" {
            return html(writer, StatusCode::InternalServerError, SERVER_ERROR_PAGE).await;
        }
        if target == "/echo" {
            return echo(writer, request).await;
        }
        if let Some(size) = target.strip_prefix("/chunked/") {
            let size: usize = size
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| HandlerError::bad_request(format!("invalid chunk size: {}", size)))?;
            return chunked(writer, size).await;
        }

        html(writer, StatusCode::Ok, OK_PAGE).await
    }
}

async fn html(
    writer: &mut ConnectionWriter,
    status: StatusCode,
    page: &str,
) -> Result<(), HandlerError> {
    let mut headers = default_headers(page.len());
    headers.replace("Content-Type", "text/html");

    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(page.as_bytes()).await?;
    Ok(())
}

async fn echo(writer: &mut ConnectionWriter, request: &Request) -> Result<(), HandlerError> {
    let mut headers = default_headers(request.body.len());
    if let Some(content_type) = request.header("content-type") {
        headers.replace("Content-Type", content_type);
    }

    writer.write_status_line(StatusCode::Ok).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(&request.body).await?;
    Ok(())
}

/// Streams the OK page `size` bytes at a time, then reports the total length
/// as a trailer.
async fn chunked(writer: &mut ConnectionWriter, size: usize) -> Result<(), HandlerError> {
    let mut headers = Headers::new();
    headers.set("Content-Type", "text/html");
    headers.set("Connection", "close");
    headers.set("Transfer-Encoding", "chunked");
    headers.set("Trailer", "x-content-length");

    writer.write_status_line(StatusCode::Ok).await?;
    writer.write_headers(&headers).await?;

    let mut sent = 0;
    for chunk in OK_PAGE.as_bytes().chunks(size) {
        sent += writer.write_chunked_body(chunk).await?;
        tracing::debug!(chunk_len = chunk.len(), "Wrote chunk");
    }
    writer.write_chunked_body_done().await?;

    let mut trailers = Headers::new();
    trailers.set("X-Content-Length", &sent.to_string());
    writer.write_trailers(&trailers).await?;
    Ok(())
}

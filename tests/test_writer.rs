use httpfromtcp::http::headers::Headers;
use httpfromtcp::http::response::{default_headers, StatusCode};
use httpfromtcp::http::writer::{ResponseWriter, WriterError, WriterState};

fn content_length(len: &str) -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Length", len);
    headers
}

#[tokio::test]
async fn test_fixed_body_response() {
    let mut writer = ResponseWriter::new(Vec::new());

    writer.write_status_line(StatusCode::Ok).await.unwrap();
    writer.write_headers(&content_length("4")).await.unwrap();
    let n = writer.write_body(b"body").await.unwrap();

    assert_eq!(n, 4);
    assert_eq!(writer.state(), WriterState::Done);
    assert_eq!(
        writer.into_inner(),
        b"HTTP/1.1 200 OK\r\ncontent-length: 4\r\n\r\nbody".to_vec()
    );
}

#[tokio::test]
async fn test_headers_before_status_line() {
    let mut writer = ResponseWriter::new(Vec::new());

    let err = writer.write_headers(&content_length("4")).await.unwrap_err();

    assert!(matches!(
        err,
        WriterError::OutOfOrder {
            state: WriterState::StatusLine,
            ..
        }
    ));
    assert!(writer.get_ref().is_empty());
    assert_eq!(writer.state(), WriterState::StatusLine);
}

#[tokio::test]
async fn test_body_before_headers() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::Ok).await.unwrap();

    assert!(writer.write_body(b"body").await.is_err());
    assert!(writer.write_chunked_body(b"body").await.is_err());
    assert!(writer.write_chunked_body_done().await.is_err());
}

#[tokio::test]
async fn test_headers_only_once() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::Ok).await.unwrap();
    writer.write_headers(&Headers::new()).await.unwrap();

    assert!(writer.write_headers(&Headers::new()).await.is_err());
}

#[tokio::test]
async fn test_fixed_body_only_once() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::Ok).await.unwrap();
    writer.write_headers(&content_length("4")).await.unwrap();
    writer.write_body(b"body").await.unwrap();

    assert!(writer.write_body(b"more").await.is_err());
    assert!(writer.write_trailers(&Headers::new()).await.is_err());
}

#[tokio::test]
async fn test_status_line_reasons() {
    let cases = [
        (StatusCode::Ok, "HTTP/1.1 200 OK\r\n"),
        (StatusCode::BadRequest, "HTTP/1.1 400 Bad Request\r\n"),
        (
            StatusCode::InternalServerError,
            "HTTP/1.1 500 Internal Server Error\r\n",
        ),
        (StatusCode::Other(404), "HTTP/1.1 404\r\n"),
    ];

    for (status, expected) in cases {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_status_line(status).await.unwrap();
        assert_eq!(writer.into_inner(), expected.as_bytes());
    }
}

#[tokio::test]
async fn test_chunk_framing() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::Ok).await.unwrap();
    writer.write_headers(&Headers::new()).await.unwrap();
    let head_len = writer.get_ref().len();

    writer.write_chunked_body(b"abc").await.unwrap();
    assert_eq!(&writer.get_ref()[head_len..], b"3\r\nabc\r\n");

    writer.write_chunked_body_done().await.unwrap();
    assert_eq!(&writer.get_ref()[head_len..], b"3\r\nabc\r\n0\r\n");
    assert_eq!(writer.state(), WriterState::Trailers);

    assert!(writer.write_chunked_body(b"late").await.is_err());
    assert!(writer.write_body(b"late").await.is_err());
    assert!(writer.write_chunked_body_done().await.is_err());
}

#[tokio::test]
async fn test_chunk_length_is_hex() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::Ok).await.unwrap();
    writer.write_headers(&Headers::new()).await.unwrap();
    let head_len = writer.get_ref().len();

    let chunk = vec![b'a'; 26];
    writer.write_chunked_body(&chunk).await.unwrap();

    assert!(writer.get_ref()[head_len..].starts_with(b"1a\r\n"));
}

#[tokio::test]
async fn test_chunked_response_with_trailers() {
    let mut headers = Headers::new();
    headers.set("Transfer-Encoding", "chunked");
    headers.set("Trailer", "X-Content-Length");

    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::Ok).await.unwrap();
    writer.write_headers(&headers).await.unwrap();
    writer.write_chunked_body(b"hello ").await.unwrap();
    writer.write_chunked_body(b"world").await.unwrap();
    writer.write_chunked_body_done().await.unwrap();

    let mut trailers = Headers::new();
    trailers.set("X-Content-Length", "11");
    writer.write_trailers(&trailers).await.unwrap();

    assert_eq!(writer.state(), WriterState::Done);
    assert_eq!(
        String::from_utf8(writer.into_inner()).unwrap(),
        "HTTP/1.1 200 OK\r\n\
         transfer-encoding: chunked\r\n\
         trailer: X-Content-Length\r\n\
         \r\n\
         6\r\nhello \r\n\
         5\r\nworld\r\n\
         0\r\n\
         x-content-length: 11\r\n\
         \r\n"
    );
}

#[tokio::test]
async fn test_empty_trailers_end_response() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::Ok).await.unwrap();
    writer.write_headers(&Headers::new()).await.unwrap();
    writer.write_chunked_body_done().await.unwrap();
    writer.write_trailers(&Headers::new()).await.unwrap();

    assert!(writer.into_inner().ends_with(b"\r\n\r\n0\r\n\r\n"));
}

#[tokio::test]
async fn test_default_headers_response() {
    let mut writer = ResponseWriter::new(Vec::new());
    writer.write_status_line(StatusCode::BadRequest).await.unwrap();
    writer.write_headers(&default_headers(5)).await.unwrap();
    writer.write_body(b"oops!").await.unwrap();

    assert_eq!(
        String::from_utf8(writer.into_inner()).unwrap(),
        "HTTP/1.1 400 Bad Request\r\n\
         content-length: 5\r\n\
         connection: close\r\n\
         content-type: text/plain\r\n\
         \r\n\
         oops!"
    );
}

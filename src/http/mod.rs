//! HTTP/1.1 protocol implementation.
//!
//! - **`headers`**: case-insensitive header table with token validation
//! - **`request`**: the parsed request and its request line
//! - **`parser`**: incremental parser fed from fragmented reads
//! - **`response`**: status codes and default response headers
//! - **`writer`**: forward-only response serializer, fixed or chunked bodies
//! - **`connection`**: one request and one response per accepted connection
//!
//! # Connection lifecycle
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← RequestParser::from_stream
//!        └──────┬──────┘
//!               │
//!      ┌────────┴─────────┐
//!      │ ok               │ malformed
//!      ▼                  ▼
//! ┌──────────┐     ┌─────────────┐
//! │ Handler  │     │ 400 + error │
//! └────┬─────┘     └──────┬──────┘
//!      └────────┬─────────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Closed    │
//!        └─────────────┘
//! ```
//!
//! A peer that disconnects before the request is complete gets no response.

pub mod connection;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

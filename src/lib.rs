//! httpfromtcp - HTTP/1.1 straight off a TCP socket
//!
//! Request parsing, response serialization and the per-connection server
//! loop, with no HTTP library underneath.

pub mod config;
pub mod http;
pub mod server;

//! Listening socket, accept loop and the handler contract.

pub mod handler;
pub mod listener;

pub use handler::{ConnectionWriter, Handler, HandlerError};
pub use listener::Server;

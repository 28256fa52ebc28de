//! HTTP boundary: router, handlers, error mapping, server lifecycle.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

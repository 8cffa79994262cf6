//! HTTP plumbing for talking to the Pushwoosh API.
//!
//! The `Transport` trait is the seam between the message client and the
//! network. `ReqwestTransport` is the production implementation; tests and
//! embedding applications can supply their own.

pub mod client;
mod transport;

pub use client::build_http_client;
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport, TransportError};

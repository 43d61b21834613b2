//! # Elastical Transport
//!
//! The HTTP layer underneath the Elastical client: a [`Transport`] trait
//! that turns a fully assembled [`TransportRequest`] into a
//! [`RawResponse`], plus the default reqwest-backed [`HttpTransport`].
//!
//! ## Features
//!
//! - **Pluggable**: anything implementing [`Transport`] can stand in for the
//!   network, which is how the client crate tests request construction
//! - **Layered options**: per-call [`TransportOptions`] merge over connection
//!   defaults, winning only where explicitly set
//! - **Connection pooling**: one pooled client per distinct set of
//!   client-level options
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use elastical_transport::{HttpTransport, Method, Transport, TransportRequest, Url};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new();
//!     let url = Url::parse("http://127.0.0.1:9200/_stats")?;
//!
//!     let response = transport.perform(TransportRequest::new(Method::GET, url)).await?;
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
mod transport;

pub use client::HttpTransport;
pub use config::{TransportOptions, TransportOptionsBuilder};
pub use error::{Result, TransportError};
pub use request::{Body, TransportRequest};
pub use response::RawResponse;
pub use transport::Transport;

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, Method, StatusCode};
pub use url::Url;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::client::HttpTransport;
    pub use crate::config::{TransportOptions, TransportOptionsBuilder};
    pub use crate::error::{Result, TransportError};
    pub use crate::request::{Body, TransportRequest};
    pub use crate::response::RawResponse;
    pub use crate::transport::Transport;
    pub use http::{Method, StatusCode};
}

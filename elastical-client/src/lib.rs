//! Client for a search engine's REST API.
//!
//! The crate shapes loosely-typed options into HTTP requests, sends them
//! through a pluggable [`Transport`], and normalizes the answers into
//! [`Payload`]s or [`ElasticalError`]s.
//!
//! - [`Client`] holds the connection settings and one cached [`Index`]
//!   handle per name.
//! - Document operations live on [`Index`]: get, index, delete, multi-get.
//! - Search, count, bulk and the admin endpoints live on [`Client`], with
//!   index-scoped shortcuts on [`Index`].
//!
//! # Example
//!
//! ```rust,no_run
//! use elastical_client::{Client, ConnectionConfig, IndexOptions, SearchOptions};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(ConnectionConfig::new("localhost").with_port(9200));
//!
//!     let (blog, _) = client.create_index("blog", None).await?;
//!     blog.index("post", json!({"title": "Hello"}), IndexOptions::new().id("1"))
//!         .await?;
//!     blog.refresh().await?;
//!
//!     let results = blog.search(SearchOptions::new().query("hello")).await?;
//!     println!("{} hit(s)", results.total().unwrap_or(0));
//!     Ok(())
//! }
//! ```
//!
//! # Inspecting requests
//!
//! A request hook receives every fully-built request instead of the
//! transport; the call then fails with [`ElasticalError::Intercepted`]
//! carrying the request.
//!
//! ```rust,no_run
//! use elastical_client::{Client, ElasticalError, Names};
//!
//! # async fn run() {
//! let client = Client::default();
//! client.set_request_hook(|request| println!("{} {}", request.method, request.url));
//! let err = client.refresh(Names::all()).await.unwrap_err();
//! assert!(matches!(err, ElasticalError::Intercepted(_)));
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod admin;
mod bulk;
mod client;
mod config;
mod document;
mod error;
mod index;
mod percolator;
mod request;
mod response;
mod river;
mod search;
pub mod shape;

#[cfg(test)]
mod testing;

pub use admin::{AliasAction, AliasTarget, AnalyzeOptions, StatsOptions};
pub use bulk::{BulkAction, BulkOperation, BulkOptions, bulk_body};
pub use client::{Client, RequestHook};
pub use config::{ConnectionConfig, Protocol};
pub use document::{
    DeleteOptions, GetOptions, GetResult, IndexOptions, MultiGet, MultiGetDoc, MultiGetResult,
};
pub use error::{ElasticalError, Result};
pub use index::{Existence, Index};
pub use percolator::PercolateResult;
pub use request::{Names, QueryParams, RequestOptions};
pub use response::Payload;
pub use search::{CountOptions, CountResult, Query, SearchOptions, SearchResults};

pub use elastical_transport::{
    Body, HttpTransport, Method, RawResponse, StatusCode, Transport, TransportError,
    TransportOptions, TransportRequest,
};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        BulkOperation, Client, ConnectionConfig, ElasticalError, GetOptions, Index, IndexOptions,
        Names, Payload, Result, SearchOptions,
    };
}

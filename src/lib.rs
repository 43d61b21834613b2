// Elastical - a client for Elasticsearch-style REST APIs
//
// This library re-exports the request-shaping client and the HTTP transport
// it runs on.

// Re-export the client
pub use elastical_client::*;

/// HTTP transport layer.
pub mod transport {
    pub use elastical_transport::*;
}

/// Prelude for common imports.
pub mod prelude {
    pub use elastical_client::prelude::*;
    pub use serde_json::{Value, json};
}

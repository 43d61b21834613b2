//! The transport seam.

use crate::{RawResponse, Result, TransportRequest};
use async_trait::async_trait;

/// Something that can put a [`TransportRequest`] on the wire.
///
/// Implementations return whatever status the server answered with; status
/// interpretation belongs to the caller. Retries and redirects, if any, are
/// the transport's business.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch the request and collect the full response.
    async fn perform(&self, request: TransportRequest) -> Result<RawResponse>;
}

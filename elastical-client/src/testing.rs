//! In-crate test doubles.

use async_trait::async_trait;
use elastical_transport::{RawResponse, Transport, TransportRequest};
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

use crate::{Client, ConnectionConfig, ElasticalError, Result};

type Responder =
    Box<dyn Fn(&TransportRequest) -> elastical_transport::Result<RawResponse> + Send + Sync>;

/// Transport that records requests and answers from a closure.
pub(crate) struct StubTransport {
    responder: Responder,
    seen: Mutex<Vec<TransportRequest>>,
}

impl StubTransport {
    pub(crate) fn new(
        responder: impl Fn(&TransportRequest) -> elastical_transport::Result<RawResponse>
        + Send
        + Sync
        + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Always answer with `status` and `body`.
    pub(crate) fn json(status: u16, body: Value) -> Arc<Self> {
        Self::new(move |_| Ok(RawResponse::from_status(status, body.to_string())))
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.seen.lock().clone()
    }

    pub(crate) fn last(&self) -> TransportRequest {
        self.seen.lock().last().cloned().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn perform(&self, request: TransportRequest) -> elastical_transport::Result<RawResponse> {
        let response = (self.responder)(&request);
        self.seen.lock().push(request);
        response
    }
}

/// Client backed by a stub that always answers `status` with `body`.
pub(crate) fn stub_client(status: u16, body: Value) -> (Client, Arc<StubTransport>) {
    let stub = StubTransport::json(status, body);
    let client = Client::with_transport(ConnectionConfig::default(), stub.clone());
    (client, stub)
}

/// Client whose requests are captured by a hook instead of sent.
pub(crate) fn hooked_client() -> Client {
    let client = Client::new(ConnectionConfig::default());
    client.set_request_hook(|_| {});
    client
}

/// The request a hooked call produced.
pub(crate) fn captured<T: Debug>(result: Result<T>) -> TransportRequest {
    match result {
        Err(ElasticalError::Intercepted(request)) => *request,
        other => panic!("expected an intercepted request, got {other:?}"),
    }
}

/// JSON body of a captured request.
pub(crate) fn json_body(request: &TransportRequest) -> Option<&Value> {
    request.body.as_ref().and_then(|body| body.as_json())
}

//! reqwest-backed transport.

use async_trait::async_trait;
use base64::Engine;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, trace};

use crate::{RawResponse, Result, Transport, TransportError, TransportOptions, TransportRequest};

/// Settings baked into a `reqwest::Client` at build time. Requests that
/// agree on these share one pooled client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    connect_timeout: Option<Duration>,
    pool_idle_timeout: Option<Duration>,
    pool_max_idle_per_host: Option<usize>,
    follow_redirects: bool,
    max_redirects: usize,
    proxy: Option<String>,
    accept_invalid_certs: bool,
    cookie_store: bool,
    user_agent: String,
}

impl ClientKey {
    fn from_options(options: &TransportOptions) -> Self {
        Self {
            connect_timeout: options.connect_timeout,
            pool_idle_timeout: options.pool_idle_timeout,
            pool_max_idle_per_host: options.pool_max_idle_per_host,
            follow_redirects: options.follow_redirects.unwrap_or(true),
            max_redirects: options.max_redirects.unwrap_or(10),
            proxy: options.proxy.clone(),
            accept_invalid_certs: options.accept_invalid_certs.unwrap_or(false),
            cookie_store: options.cookie_store.unwrap_or(false),
            user_agent: options
                .user_agent
                .clone()
                .unwrap_or_else(|| format!("elastical/{}", env!("CARGO_PKG_VERSION"))),
        }
    }

    fn build(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .gzip(true)
            .brotli(true)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .cookie_store(self.cookie_store);

        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = self.pool_idle_timeout {
            builder = builder.pool_idle_timeout(timeout);
        }
        if let Some(max) = self.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(max);
        }
        if self.follow_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::limited(self.max_redirects));
        } else {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }
        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))
    }
}

/// Default [`Transport`] built on reqwest.
///
/// Clients are built lazily and cached per distinct set of client-level
/// options (pool, redirects, proxy, TLS, cookies).
#[derive(Default)]
pub struct HttpTransport {
    clients: Mutex<HashMap<ClientKey, reqwest::Client>>,
}

impl HttpTransport {
    /// Create a new transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct underlying clients built so far.
    pub fn pooled_clients(&self) -> usize {
        self.clients.lock().len()
    }

    fn client_for(&self, options: &TransportOptions) -> Result<reqwest::Client> {
        let key = ClientKey::from_options(options);
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        let client = key.build()?;
        clients.insert(key, client.clone());
        Ok(client)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(&self, request: TransportRequest) -> Result<RawResponse> {
        let TransportRequest {
            method,
            url,
            body,
            options,
        } = request;

        let client = self.client_for(&options)?;
        let mut builder = client.request(method.clone(), url.clone());

        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(credential) = &options.auth {
            let encoded = base64::engine::general_purpose::STANDARD.encode(credential);
            builder = builder.header("Authorization", format!("Basic {}", encoded));
        }

        if let Some(body) = &body {
            let bytes = body
                .to_bytes()
                .map_err(|e| TransportError::Build(e.to_string()))?;
            trace!(bytes = bytes.len(), "Attaching request body");
            builder = builder.header("Content-Type", body.content_type()).body(bytes);
        }

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        debug!(method = %method, url = %url, "Sending HTTP request");

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, options.timeout))?;

        let response = RawResponse::from_reqwest(response)
            .await
            .map_err(|e| TransportError::from_reqwest(e, options.timeout))?;

        debug!(status = %response.status(), "Received HTTP response");

        Ok(response)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("pooled_clients", &self.pooled_clients())
            .finish()
    }
}

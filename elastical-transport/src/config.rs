//! Transport options.

use std::time::Duration;

/// Knobs handed to the transport with every request.
///
/// Every field is optional so that a per-call set can be layered over the
/// connection-level defaults with [`TransportOptions::merged_over`]: a
/// per-call value wins only where it is explicitly set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Connection timeout.
    pub connect_timeout: Option<Duration>,
    /// How long idle pooled connections are kept.
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: Option<usize>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// Follow redirects.
    pub follow_redirects: Option<bool>,
    /// Maximum redirects to follow.
    pub max_redirects: Option<usize>,
    /// Proxy URL for all traffic.
    pub proxy: Option<String>,
    /// Basic-auth credential in `user:password` form.
    pub auth: Option<String>,
    /// Accept invalid TLS certificates.
    pub accept_invalid_certs: Option<bool>,
    /// Keep a cookie jar across requests.
    pub cookie_store: Option<bool>,
    /// User agent string.
    pub user_agent: Option<String>,
}

impl TransportOptions {
    /// Create a new options builder.
    pub fn builder() -> TransportOptionsBuilder {
        TransportOptionsBuilder::default()
    }

    /// Layer `self` over `defaults`.
    ///
    /// Headers are merged by case-insensitive name with `self` winning.
    pub fn merged_over(&self, defaults: &TransportOptions) -> TransportOptions {
        let mut headers = defaults.headers.clone();
        for (name, value) in &self.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        TransportOptions {
            timeout: self.timeout.or(defaults.timeout),
            connect_timeout: self.connect_timeout.or(defaults.connect_timeout),
            pool_idle_timeout: self.pool_idle_timeout.or(defaults.pool_idle_timeout),
            pool_max_idle_per_host: self.pool_max_idle_per_host.or(defaults.pool_max_idle_per_host),
            headers,
            follow_redirects: self.follow_redirects.or(defaults.follow_redirects),
            max_redirects: self.max_redirects.or(defaults.max_redirects),
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            auth: self.auth.clone().or_else(|| defaults.auth.clone()),
            accept_invalid_certs: self.accept_invalid_certs.or(defaults.accept_invalid_certs),
            cookie_store: self.cookie_store.or(defaults.cookie_store),
            user_agent: self.user_agent.clone().or_else(|| defaults.user_agent.clone()),
        }
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Builder for [`TransportOptions`].
#[derive(Debug, Default)]
pub struct TransportOptionsBuilder {
    options: TransportOptions,
}

impl TransportOptionsBuilder {
    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = Some(timeout);
        self
    }

    /// Set the connection pool idle timeout.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.options.pool_idle_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.options.pool_max_idle_per_host = Some(max);
        self
    }

    /// Add a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.push((name.into(), value.into()));
        self
    }

    /// Enable or disable following redirects.
    pub fn follow_redirects(mut self, enable: bool) -> Self {
        self.options.follow_redirects = Some(enable);
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.options.max_redirects = Some(max);
        self
    }

    /// Route all traffic through a proxy.
    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.options.proxy = Some(url.into());
        self
    }

    /// Set the basic-auth credential (`user:password`).
    pub fn auth(mut self, credential: impl Into<String>) -> Self {
        self.options.auth = Some(credential.into());
        self
    }

    /// Accept invalid TLS certificates (development only).
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.options.accept_invalid_certs = Some(accept);
        self
    }

    /// Enable or disable the cookie jar.
    pub fn cookie_store(mut self, enable: bool) -> Self {
        self.options.cookie_store = Some(enable);
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options.user_agent = Some(user_agent.into());
        self
    }

    /// Build the options.
    pub fn build(self) -> TransportOptions {
        self.options
    }
}

//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) client_origin: String,
    pub(crate) json_limit: usize,
}

/// Largest accepted JSON body; listings may carry inline base64 images.
pub const DEFAULT_JSON_LIMIT: usize = 15 * 1024 * 1024;

impl ServerConfig {
    /// Construct a server configuration for `bind_addr`, allowing browser
    /// calls from `client_origin`.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, client_origin: impl Into<String>) -> Self {
        Self {
            bind_addr,
            client_origin: client_origin.into(),
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }

    /// Override the JSON body limit.
    #[cfg_attr(
        not(test),
        expect(dead_code, reason = "Exercised by server tests only")
    )]
    #[must_use]
    pub fn with_json_limit(mut self, limit: usize) -> Self {
        self.json_limit = limit;
        self
    }
}

//! Client configuration.

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";

/// Connection details for one Atelier server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base endpoint, e.g. `http://localhost:8080`.
    pub endpoint: String,

    /// Bearer token, for deployments that sit behind an authenticating
    /// proxy.
    pub token: Option<String>,
}

impl ServerConfig {
    pub fn new(endpoint: Option<String>, token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            token,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

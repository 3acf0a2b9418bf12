use std::{sync::Arc, time::Duration};
use tokenx_core::{DEFAULT_UPSTREAM_TIMEOUT, HttpTokenEndpoint, RelayConfig, TokenEndpoint};

/// Comma-separated list of origins allowed by CORS (unset = any origin).
pub const ENV_ALLOWED_ORIGINS: &str = "TOKENX_ALLOWED_ORIGINS";
/// Upstream `/oauth/token` timeout in whole seconds.
pub const ENV_UPSTREAM_TIMEOUT_SECS: &str = "TOKENX_UPSTREAM_TIMEOUT_SECS";

/// Security configuration for the relay server.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Allowed origins for CORS (empty = allow all, matching the demo UI setup)
    pub allowed_origins: Vec<String>,
    /// Maximum request body size in bytes (default: 64KB)
    pub max_body_size: usize,
    /// Inbound request timeout (default: 30 seconds)
    pub request_timeout: Duration,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_body_size: 64 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl SecurityConfig {
    /// Only the given origins may call the relay from a browser.
    pub fn restricted(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins, ..Self::default() }
    }
}

/// Configuration for the relay server.
#[derive(Clone)]
pub struct ServerConfig {
    pub relay: RelayConfig,
    pub token_endpoint: Arc<dyn TokenEndpoint>,
    pub security: SecurityConfig,
}

impl ServerConfig {
    pub fn new(relay: RelayConfig, token_endpoint: Arc<dyn TokenEndpoint>) -> Self {
        Self { relay, token_endpoint, security: SecurityConfig::default() }
    }

    /// Read relay and server settings from the environment and build an HTTPS
    /// token endpoint.
    pub fn from_env() -> tokenx_core::Result<Self> {
        let timeout = std::env::var(ENV_UPSTREAM_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT);
        let origins = std::env::var(ENV_ALLOWED_ORIGINS).map(|v| parse_origins(&v)).unwrap_or_default();

        let endpoint = HttpTokenEndpoint::new(timeout)?;
        Ok(Self::new(RelayConfig::from_env(), Arc::new(endpoint)).with_allowed_origins(origins))
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    /// Configure allowed CORS origins
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.security.allowed_origins = origins;
        self
    }

    /// Configure maximum request body size
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.security.max_body_size = size;
        self
    }

    /// Configure inbound request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.security.request_timeout = timeout;
        self
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|o| !o.is_empty()).map(String::from).collect()
}

//! reqwest-backed [`TokenEndpoint`].

use crate::{
    error::{RelayError, Result},
    exchange::{TokenEndpoint, TokenExchangeGrant, UpstreamReply},
};
use async_trait::async_trait;
use std::time::Duration;

/// Posts token-exchange grants over HTTPS.
///
/// The inner client keeps a connection pool, so clone this instead of
/// building a new one per request.
#[derive(Debug, Clone)]
pub struct HttpTokenEndpoint {
    http: reqwest::Client,
}

impl HttpTokenEndpoint {
    /// Build an endpoint whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn post_grant(
        &self,
        token_url: &str,
        grant: &TokenExchangeGrant,
    ) -> Result<UpstreamReply> {
        let response = self.http.post(token_url).json(grant).send().await.map_err(|e| {
            tracing::error!(%token_url, timeout = e.is_timeout(), "token endpoint unreachable: {}", e);
            RelayError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            tracing::error!(%token_url, status, "failed to read token endpoint response: {}", e);
            RelayError::Transport(e.to_string())
        })?;

        tracing::debug!(%token_url, status, "token endpoint answered");
        Ok(UpstreamReply { status, body })
    }
}

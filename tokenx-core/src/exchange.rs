//! The token-exchange contract.
//!
//! The flow is split so each adapter can supply its own transport:
//!
//! 1. [`prepare_exchange`] validates the caller input and configuration and
//!    builds the outbound grant. Nothing leaves the process if it fails.
//! 2. A [`TokenEndpoint`] posts the grant once.
//! 3. [`interpret_reply`] turns the upstream status and body into the
//!    caller-facing result.
//!
//! [`Relay`] composes the three for `Send` transports.

use crate::{
    config::RelayConfig,
    error::{DEFAULT_UPSTREAM_ERROR, DEFAULT_UPSTREAM_ERROR_DESCRIPTION, RelayError, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, sync::Arc};

pub const TOKEN_EXCHANGE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";
pub const LEGACY_SUBJECT_TOKEN_TYPE: &str = "urn:mycompany:legacy-system";
pub const EXCHANGE_SCOPE: &str = "openid profile email read:data write:data";

/// Body of `POST /api/exchange-token`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    #[serde(default)]
    pub subject_token: Option<String>,
}

impl ExchangeRequest {
    pub fn new(subject_token: impl Into<String>) -> Self {
        Self { subject_token: Some(subject_token.into()) }
    }
}

/// JSON body sent to the Authorization Server's `/oauth/token`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct TokenExchangeGrant {
    pub grant_type: &'static str,
    pub client_id: String,
    pub client_secret: String,
    pub subject_token: String,
    pub subject_token_type: &'static str,
    pub audience: String,
    pub scope: &'static str,
}

impl fmt::Debug for TokenExchangeGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenExchangeGrant")
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("subject_token_len", &self.subject_token.len())
            .field("subject_token_type", &self.subject_token_type)
            .field("audience", &self.audience)
            .field("scope", &self.scope)
            .finish()
    }
}

/// A validated exchange, ready to be posted.
#[derive(Debug, Clone)]
pub struct PreparedExchange {
    pub token_url: String,
    pub grant: TokenExchangeGrant,
}

/// Tokens handed back to the caller.
///
/// Only these five fields are forwarded, as the upstream sent them; whatever
/// the upstream omitted stays omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<Value>,
}

impl ExchangeResponse {
    /// Pick the pass-through fields out of an upstream JSON object.
    pub fn from_upstream(mut fields: Map<String, Value>) -> Self {
        Self {
            access_token: fields.remove("access_token"),
            id_token: fields.remove("id_token"),
            refresh_token: fields.remove("refresh_token"),
            token_type: fields.remove("token_type"),
            expires_in: fields.remove("expires_in"),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_ref().and_then(Value::as_str)
    }

    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_ref().and_then(Value::as_str)
    }
}

/// Raw upstream answer: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
struct UpstreamError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Transport for the single outbound token request.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Post `grant` as JSON to `token_url`. Only failures to obtain any
    /// response are errors; non-2xx answers come back as a reply.
    async fn post_grant(&self, token_url: &str, grant: &TokenExchangeGrant)
    -> Result<UpstreamReply>;
}

/// Validate the request, then the configuration, and build the grant.
pub fn prepare_exchange(config: &RelayConfig, request: &ExchangeRequest) -> Result<PreparedExchange> {
    let subject_token = request
        .subject_token
        .as_deref()
        .filter(|token| !token.is_empty())
        .ok_or(RelayError::MissingSubjectToken)?;

    let credentials = config.credentials()?;

    Ok(PreparedExchange {
        token_url: credentials.token_url(),
        grant: TokenExchangeGrant {
            grant_type: TOKEN_EXCHANGE_GRANT_TYPE,
            client_id: credentials.client_id.to_string(),
            client_secret: credentials.client_secret.to_string(),
            subject_token: subject_token.to_string(),
            subject_token_type: LEGACY_SUBJECT_TOKEN_TYPE,
            audience: credentials.audience.to_string(),
            scope: EXCHANGE_SCOPE,
        },
    })
}

/// Map the upstream reply onto the caller-facing result.
pub fn interpret_reply(reply: UpstreamReply) -> Result<ExchangeResponse> {
    if (200..300).contains(&reply.status) {
        // A body that is not a JSON object carries none of the fields.
        let fields = serde_json::from_str::<Map<String, Value>>(&reply.body).unwrap_or_default();
        return Ok(ExchangeResponse::from_upstream(fields));
    }

    let upstream = serde_json::from_str::<UpstreamError>(&reply.body).unwrap_or_default();
    Err(RelayError::UpstreamRejection {
        status: reply.status,
        error: upstream
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_ERROR.to_string()),
        error_description: upstream
            .error_description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_ERROR_DESCRIPTION.to_string()),
    })
}

/// Stateless token-exchange relay.
#[derive(Clone)]
pub struct Relay {
    config: Arc<RelayConfig>,
    endpoint: Arc<dyn TokenEndpoint>,
}

impl Relay {
    pub fn new(config: RelayConfig, endpoint: Arc<dyn TokenEndpoint>) -> Self {
        Self { config: Arc::new(config), endpoint }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Exchange the caller's subject token. Exactly one upstream call is made
    /// when validation passes, none otherwise.
    pub async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeResponse> {
        let prepared = prepare_exchange(&self.config, &request).inspect_err(|err| {
            if let RelayError::Configuration { missing } = err {
                tracing::error!(?missing, "token exchange refused: server configuration incomplete");
            }
        })?;

        tracing::debug!(
            token_url = %prepared.token_url,
            client_id = %prepared.grant.client_id,
            audience = %prepared.grant.audience,
            "exchanging subject token"
        );

        let reply = self.endpoint.post_grant(&prepared.token_url, &prepared.grant).await?;
        let status = reply.status;

        match interpret_reply(reply) {
            Ok(tokens) => {
                tracing::info!(status, "token exchange succeeded");
                Ok(tokens)
            }
            Err(err) => {
                tracing::warn!(status, error = %err, "token exchange failed");
                Err(err)
            }
        }
    }
}

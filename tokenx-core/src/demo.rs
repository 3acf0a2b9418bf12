//! Demo "legacy system" tokens.
//!
//! A demo external token is the standard-base64 encoding of a JSON object. It
//! carries no signature and the relay never checks its expiry; it only gives
//! the token-exchange flow something to exchange.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEMO_EMAIL: &str = "demo@example.com";
pub const DEFAULT_DEMO_NAME: &str = "Demo User";
pub const DEMO_USER_ID_PREFIX: &str = "legacy-";
pub const DEMO_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Claims of a demo external token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoExternalToken {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl DemoExternalToken {
    /// JSON, then standard base64 with padding.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).expect("demo token claims always serialize");
        BASE64.encode(json)
    }

    /// Reverse of [`encode`](Self::encode). Anything that is not base64 JSON of
    /// this shape yields `None`.
    pub fn decode(token: &str) -> Option<Self> {
        let bytes = BASE64.decode(token.trim()).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Body of `POST /api/generate-demo-token`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoTokenRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoTokenResponse {
    pub token: String,
    pub decoded: DemoExternalToken,
}

impl DemoTokenRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Issue a token stamped with the current time.
    pub fn issue(self) -> DemoTokenResponse {
        self.issue_at(Utc::now())
    }

    /// Issue a token as if the clock read `now`.
    pub fn issue_at(self, now: DateTime<Utc>) -> DemoTokenResponse {
        let iat = now.timestamp();
        let decoded = DemoExternalToken {
            user_id: present(self.user_id)
                .unwrap_or_else(|| format!("{DEMO_USER_ID_PREFIX}{}", now.timestamp_millis())),
            email: present(self.email).unwrap_or_else(|| DEFAULT_DEMO_EMAIL.to_string()),
            name: present(self.name).unwrap_or_else(|| DEFAULT_DEMO_NAME.to_string()),
            iat,
            exp: iat + DEMO_TOKEN_LIFETIME_SECS,
        };

        DemoTokenResponse { token: decoded.encode(), decoded }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

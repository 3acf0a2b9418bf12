use crate::error::{RelayError, Result};
use std::{fmt, time::Duration};

pub const ENV_DOMAIN: &str = "VITE_AUTH0_DOMAIN";
pub const ENV_CLIENT_ID: &str = "VITE_AUTH0_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AUTH0_CLIENT_SECRET";
pub const ENV_AUDIENCE: &str = "VITE_AUTH0_AUDIENCE";
/// Overrides `https://{domain}/oauth/token`, e.g. to point at a local stub.
pub const ENV_TOKEN_URL: &str = "AUTH0_TOKEN_URL";

/// Upper bound for the single outbound `/oauth/token` call.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

/// Authorization Server settings for the relay.
///
/// Every field is optional so a partially configured process still starts and
/// answers with a configuration error per request. Blank values count as
/// missing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RelayConfig {
    pub domain: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub audience: Option<String>,
    pub token_url: Option<String>,
}

/// A complete view of the configuration, ready for one exchange.
#[derive(Clone, Copy)]
pub struct Credentials<'a> {
    pub domain: Option<&'a str>,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub audience: &'a str,
    token_url: Option<&'a str>,
}

impl Credentials<'_> {
    pub fn token_url(&self) -> String {
        match (self.token_url, self.domain) {
            (Some(url), _) => url.to_string(),
            (None, Some(domain)) => format!("https://{}/oauth/token", domain.trim_end_matches('/')),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("audience", &self.audience)
            .field("token_url", &self.token_url)
            .finish()
    }
}

impl RelayConfig {
    pub fn new(
        domain: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self::default()
            .with_domain(domain)
            .with_client_id(client_id)
            .with_client_secret(client_secret)
            .with_audience(audience)
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source (process environment,
    /// worker bindings, test fixtures).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            domain: non_blank(lookup(ENV_DOMAIN)),
            client_id: non_blank(lookup(ENV_CLIENT_ID)),
            client_secret: non_blank(lookup(ENV_CLIENT_SECRET)),
            audience: non_blank(lookup(ENV_AUDIENCE)),
            token_url: non_blank(lookup(ENV_TOKEN_URL)),
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = non_blank(Some(domain.into()));
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = non_blank(Some(client_id.into()));
        self
    }

    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = non_blank(Some(client_secret.into()));
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = non_blank(Some(audience.into()));
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = non_blank(Some(token_url.into()));
        self
    }

    pub fn without_client_secret(mut self) -> Self {
        self.client_secret = None;
        self
    }

    /// Names of the environment variables that are still missing.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.domain.is_none() && self.token_url.is_none() {
            missing.push(ENV_DOMAIN);
        }
        if self.client_id.is_none() {
            missing.push(ENV_CLIENT_ID);
        }
        if self.client_secret.is_none() {
            missing.push(ENV_CLIENT_SECRET);
        }
        if self.audience.is_none() {
            missing.push(ENV_AUDIENCE);
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Borrow the settings needed for an exchange, or report what is missing.
    pub fn credentials(&self) -> Result<Credentials<'_>> {
        match (&self.client_id, &self.client_secret, &self.audience) {
            (Some(client_id), Some(client_secret), Some(audience))
                if self.domain.is_some() || self.token_url.is_some() =>
            {
                Ok(Credentials {
                    domain: self.domain.as_deref(),
                    client_id,
                    client_secret,
                    audience,
                    token_url: self.token_url.as_deref(),
                })
            }
            _ => Err(RelayError::Configuration { missing: self.missing() }),
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[redacted]"))
            .field("audience", &self.audience)
            .field("token_url", &self.token_url)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

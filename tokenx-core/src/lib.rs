//! # tokenx-core
//!
//! Shared relay logic for the Custom Token Exchange demo.
//!
//! ## Overview
//!
//! Both transport adapters (the axum server and the edge worker) sit on top of
//! this crate:
//!
//! - [`RelayConfig`] - Authorization Server settings, built once at startup
//! - [`DemoTokenRequest`] / [`DemoExternalToken`] - Unsigned demo "legacy" tokens
//! - [`Relay`] / [`prepare_exchange`] / [`interpret_reply`] - The token-exchange contract
//! - [`TokenEndpoint`] - Transport seam for the outbound `/oauth/token` call
//! - [`inspect`] - Non-verifying JWT decoding for display
//! - [`RelayError`] - The error taxonomy and its HTTP mapping
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tokenx_core::{ExchangeRequest, HttpTokenEndpoint, Relay, RelayConfig};
//!
//! let config = RelayConfig::from_env();
//! let endpoint = HttpTokenEndpoint::new(tokenx_core::DEFAULT_UPSTREAM_TIMEOUT)?;
//! let relay = Relay::new(config, Arc::new(endpoint));
//!
//! let tokens = relay.exchange(ExchangeRequest::new(subject_token)).await?;
//! ```
//!
//! ## Demo-only behavior
//!
//! The demo external token is base64 JSON with no signature, and
//! [`inspect::decode`] never verifies signatures. Both exist to make the flow
//! visible and must not be used to establish trust.

pub mod config;
pub mod demo;
pub mod error;
pub mod exchange;
#[cfg(feature = "http-client")]
pub mod http;
pub mod inspect;

pub use config::{
    Credentials, DEFAULT_UPSTREAM_TIMEOUT, ENV_AUDIENCE, ENV_CLIENT_ID, ENV_CLIENT_SECRET,
    ENV_DOMAIN, ENV_TOKEN_URL, RelayConfig,
};
pub use demo::{
    DEFAULT_DEMO_EMAIL, DEFAULT_DEMO_NAME, DEMO_TOKEN_LIFETIME_SECS, DEMO_USER_ID_PREFIX,
    DemoExternalToken, DemoTokenRequest, DemoTokenResponse,
};
pub use error::{ErrorBody, RelayError, Result};
pub use exchange::{
    EXCHANGE_SCOPE, ExchangeRequest, ExchangeResponse, LEGACY_SUBJECT_TOKEN_TYPE,
    PreparedExchange, Relay, TOKEN_EXCHANGE_GRANT_TYPE, TokenEndpoint, TokenExchangeGrant,
    UpstreamReply, interpret_reply, prepare_exchange,
};
#[cfg(feature = "http-client")]
pub use http::HttpTokenEndpoint;
pub use inspect::{CustomClaim, DecodedToken};

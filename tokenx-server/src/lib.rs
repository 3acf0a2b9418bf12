//! # tokenx-server
//!
//! HTTP adapter for the Custom Token Exchange relay.
//!
//! Routes (all under `/api`):
//! - `POST /generate-demo-token` - issue a demo external token
//! - `POST /exchange-token` - swap an external token for Authorization Server tokens
//! - `GET /health` - liveness probe

pub mod config;
pub mod rest;

pub use config::{SecurityConfig, ServerConfig};
pub use rest::{ApiError, TokenController, create_app};

use super::{ApiError, parse_body};
use crate::ServerConfig;
use axum::{Json, body::Bytes, extract::State};
use tokenx_core::{DemoTokenRequest, DemoTokenResponse, ExchangeRequest, ExchangeResponse, Relay};
use tokenx_telemetry::{Instrument, demo_token_span, record_status, token_exchange_span};

/// Handlers for the demo token generator and the token exchange relay.
#[derive(Clone)]
pub struct TokenController {
    relay: Relay,
}

impl TokenController {
    pub fn new(config: &ServerConfig) -> Self {
        Self { relay: Relay::new(config.relay.clone(), config.token_endpoint.clone()) }
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }
}

pub async fn generate_demo_token(body: Bytes) -> Result<Json<DemoTokenResponse>, ApiError> {
    let span = demo_token_span();
    let _enter = span.enter();

    let request: DemoTokenRequest = parse_body(&body)?;
    let response = request.issue();
    tracing::info!(user_id = %response.decoded.user_id, "issued demo external token");
    record_status(&span, 200);
    Ok(Json(response))
}

pub async fn exchange_token(
    State(controller): State<TokenController>,
    body: Bytes,
) -> Result<Json<ExchangeResponse>, ApiError> {
    let config = controller.relay.config();
    let span = token_exchange_span(
        config.domain.as_deref().unwrap_or_default(),
        config.client_id.as_deref().unwrap_or_default(),
    );

    let result = async {
        let request: ExchangeRequest = parse_body(&body)?;
        controller.relay.exchange(request).await.map_err(ApiError::from)
    }
    .instrument(span.clone())
    .await;

    match &result {
        Ok(_) => record_status(&span, 200),
        Err(e) => record_status(&span, e.0.status_code()),
    }
    result.map(Json)
}

//! Span helpers for relay operations

use tracing::Span;

/// Create a span for one token exchange
///
/// Never pass the client secret or the subject token here.
///
/// # Arguments
/// * `domain` - Authorization Server domain (or token URL host)
/// * `client_id` - OAuth client performing the exchange
///
/// # Example
/// ```
/// use tokenx_telemetry::token_exchange_span;
/// let span = token_exchange_span("tenant.auth0.com", "client-123");
/// let _enter = span.enter();
/// ```
pub fn token_exchange_span(domain: &str, client_id: &str) -> Span {
    tracing::info_span!(
        "token.exchange",
        auth.domain = domain,
        auth.client_id = client_id,
        http.status_code = tracing::field::Empty,
        otel.kind = "client"
    )
}

/// Create a span for demo token generation
pub fn demo_token_span() -> Span {
    tracing::debug_span!(
        "demo_token.generate",
        http.status_code = tracing::field::Empty,
        otel.kind = "internal"
    )
}

/// Record the HTTP status answered for the current exchange
pub fn record_status(span: &Span, status: u16) {
    span.record("http.status_code", status);
}

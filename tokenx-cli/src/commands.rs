//! One-shot commands: demo token generation, JWT inspection, token exchange.

use anyhow::{Result, bail};
use std::{sync::Arc, time::Duration};
use tokenx_core::{
    DemoExternalToken, DemoTokenRequest, ExchangeRequest, ExchangeResponse, HttpTokenEndpoint,
    Relay, RelayConfig, inspect,
};

pub fn demo_request(
    email: Option<String>,
    name: Option<String>,
    user_id: Option<String>,
) -> DemoTokenRequest {
    DemoTokenRequest { email, name, user_id }
}

pub fn run_generate(request: DemoTokenRequest, json: bool) -> Result<String> {
    let response = request.issue();
    if json {
        Ok(serde_json::to_string_pretty(&response)?)
    } else {
        Ok(response.token)
    }
}

/// Render a token for the terminal. Demo external tokens are not JWTs, so they
/// are shown as their claims instead.
pub fn run_decode(token: &str) -> Result<String> {
    if inspect::decode(token).is_none() {
        if let Some(demo) = DemoExternalToken::decode(token.trim()) {
            return Ok(format!(
                "Demo external token (not a JWT):\n{}",
                serde_json::to_string_pretty(&demo)?
            ));
        }
    }
    Ok(inspect::render_inspection(token))
}

pub async fn run_exchange(
    config: RelayConfig,
    subject_token: Option<String>,
    timeout: Duration,
) -> Result<String> {
    let subject_token = match subject_token {
        Some(token) => token,
        None => DemoTokenRequest::new().issue().token,
    };

    let relay = Relay::new(config, Arc::new(HttpTokenEndpoint::new(timeout)?));
    match relay.exchange(ExchangeRequest::new(subject_token)).await {
        Ok(response) => Ok(render_exchange(&response)?),
        Err(e) => bail!("{} ({})", serde_json::to_string(&e.body())?, e.status_code()),
    }
}

fn render_exchange(response: &ExchangeResponse) -> Result<String> {
    let mut out = serde_json::to_string_pretty(response)?;
    for (label, token) in [("access_token", response.access_token()), ("id_token", response.id_token())]
    {
        out.push_str(&format!("\n\n== {} ==\n", label));
        out.push_str(&inspect::render_inspection(token.unwrap_or_default()));
    }
    Ok(out)
}

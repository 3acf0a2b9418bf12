//! Cloudflare Workers adapter for the token exchange relay.
//!
//! Serves the same `/api` routes as `tokenx-server`. Configuration comes from
//! the worker's vars and secrets (`VITE_AUTH0_DOMAIN`, `VITE_AUTH0_CLIENT_ID`,
//! `VITE_AUTH0_AUDIENCE`, secret `AUTH0_CLIENT_SECRET`).

use chrono::{DateTime, Utc};
use futures::future::{Either, select};
use tokenx_core::{
    DEFAULT_UPSTREAM_TIMEOUT, DemoTokenRequest, ErrorBody, ExchangeRequest, PreparedExchange,
    RelayConfig, RelayError, UpstreamReply, interpret_reply, prepare_exchange,
};
use worker::{
    AbortController, Context, Date, Delay, Env, Fetch, Headers, Method, Request, RequestInit,
    Response, Result, console_error, console_log, event, wasm_bindgen::JsValue,
};

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type";

#[event(fetch)]
pub async fn fetch(mut req: Request, env: Env, _ctx: Context) -> Result<Response> {
    if req.method() == Method::Options {
        return with_cors(Response::empty()?);
    }

    let response = match route(&req.method(), &req.path()) {
        Route::Health => Response::from_json(&serde_json::json!({ "status": "ok" }))?,
        Route::GenerateDemoToken => {
            let result = match read_body(&mut req).await {
                Ok(body) => demo_token_json(&body, now()),
                Err(e) => Err(e),
            };
            match result {
                Ok(json) => {
                    console_log!("issued demo external token for {}", json["decoded"]["userId"]);
                    Response::from_json(&json)?
                }
                Err(e) => error_response(&e)?,
            }
        }
        Route::ExchangeToken => {
            let result = match read_body(&mut req).await {
                Ok(body) => exchange_token(&relay_config(&env), &body).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(json) => Response::from_json(&json)?,
                Err(e) => {
                    console_error!("token exchange failed: {}", e);
                    error_response(&e)?
                }
            }
        }
        Route::NotFound => Response::from_json(&ErrorBody {
            error: "not_found".to_string(),
            error_description: None,
        })?
        .with_status(404),
    };

    with_cors(response)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Health,
    GenerateDemoToken,
    ExchangeToken,
    NotFound,
}

fn route(method: &Method, path: &str) -> Route {
    match (method, path) {
        (Method::Get, "/api/health") => Route::Health,
        (Method::Post, "/api/generate-demo-token") => Route::GenerateDemoToken,
        (Method::Post, "/api/exchange-token") => Route::ExchangeToken,
        _ => Route::NotFound,
    }
}

async fn read_body(req: &mut Request) -> tokenx_core::Result<String> {
    req.text().await.map_err(body_read_error)
}

fn body_read_error(e: worker::Error) -> RelayError {
    RelayError::InvalidRequest(format!("failed to read request body: {}", e))
}

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(Date::now().as_millis() as i64).unwrap_or_default()
}

fn relay_config(env: &Env) -> RelayConfig {
    RelayConfig::from_lookup(|key| {
        env.secret(key)
            .map(|s| s.to_string())
            .or_else(|_| env.var(key).map(|v| v.to_string()))
            .ok()
    })
}

fn parse_body<T>(body: &str) -> tokenx_core::Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body)
        .map_err(|e| RelayError::InvalidRequest(format!("malformed JSON body: {}", e)))
}

fn demo_token_json(body: &str, now: DateTime<Utc>) -> tokenx_core::Result<serde_json::Value> {
    let request: DemoTokenRequest = parse_body(body)?;
    serde_json::to_value(request.issue_at(now))
        .map_err(|e| RelayError::InvalidRequest(e.to_string()))
}

async fn exchange_token(config: &RelayConfig, body: &str) -> tokenx_core::Result<serde_json::Value> {
    let request: ExchangeRequest = parse_body(body)?;
    let prepared = prepare_exchange(config, &request)?;
    let reply = post_grant(&prepared).await?;
    let response = interpret_reply(reply)?;
    serde_json::to_value(response).map_err(|e| RelayError::Transport(e.to_string()))
}

async fn post_grant(prepared: &PreparedExchange) -> tokenx_core::Result<UpstreamReply> {
    let transport = |e: worker::Error| RelayError::Transport(e.to_string());

    let payload = serde_json::to_string(&prepared.grant)
        .map_err(|e| RelayError::Transport(e.to_string()))?;
    let headers = Headers::new();
    headers.set("Content-Type", "application/json").map_err(transport)?;

    let mut init = RequestInit::new();
    init.with_method(Method::Post)
        .with_headers(headers)
        .with_body(Some(JsValue::from_str(&payload)));
    let request = Request::new_with_init(&prepared.token_url, &init).map_err(transport)?;

    let controller = AbortController::default();
    let signal = controller.signal();
    let send = Box::pin(Fetch::Request(request).send_with_signal(&signal));
    let deadline = Box::pin(Delay::from(DEFAULT_UPSTREAM_TIMEOUT));

    let mut response = match select(send, deadline).await {
        Either::Left((result, _)) => result.map_err(transport)?,
        Either::Right(_) => {
            controller.abort();
            return Err(RelayError::Transport(format!(
                "no response within {:?}",
                DEFAULT_UPSTREAM_TIMEOUT
            )));
        }
    };

    let status = response.status_code();
    let body = response.text().await.map_err(transport)?;
    Ok(UpstreamReply { status, body })
}

fn error_response(error: &RelayError) -> Result<Response> {
    Ok(Response::from_json(&error.body())?.with_status(error.status_code()))
}

fn with_cors(response: Response) -> Result<Response> {
    let headers = Headers::new();
    headers.set("Access-Control-Allow-Origin", "*")?;
    headers.set("Access-Control-Allow-Methods", ALLOWED_METHODS)?;
    headers.set("Access-Control-Allow-Headers", ALLOWED_HEADERS)?;
    for (name, value) in response.headers().entries() {
        headers.set(&name, &value)?;
    }
    Ok(response.with_headers(headers))
}

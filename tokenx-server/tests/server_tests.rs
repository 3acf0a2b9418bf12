use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokenx_core::{DemoExternalToken, HttpTokenEndpoint, RelayConfig};
use tokenx_server::{ServerConfig, create_app};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn relay_config(upstream: &MockServer) -> RelayConfig {
    RelayConfig::new("tenant.example.com", "client-123", "shh-secret", "https://api.example.com")
        .with_token_url(format!("{}/oauth/token", upstream.uri()))
}

fn app_for(relay: RelayConfig) -> axum::Router {
    let endpoint = HttpTokenEndpoint::new(Duration::from_secs(5)).unwrap();
    create_app(ServerConfig::new(relay, Arc::new(endpoint)))
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = app_for(RelayConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_generate_demo_token_defaults() {
    let app = app_for(RelayConfig::default());

    let response = app.oneshot(post_json("/api/generate-demo-token", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    let token = json["token"].as_str().unwrap();
    let decoded = DemoExternalToken::decode(token).unwrap();
    assert_eq!(decoded.email, "demo@example.com");
    assert_eq!(decoded.name, "Demo User");
    assert!(decoded.user_id.starts_with("legacy-"));
    assert_eq!(decoded.exp - decoded.iat, 3600);
    assert_eq!(json["decoded"]["userId"], decoded.user_id);
}

#[tokio::test]
async fn test_generate_demo_token_with_fields_and_empty_body() {
    let app = app_for(RelayConfig::default());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/generate-demo-token",
            r#"{"email":"ada@example.com","name":"Ada","userId":"u-42"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    let decoded = DemoExternalToken::decode(json["token"].as_str().unwrap()).unwrap();
    assert_eq!(decoded.user_id, "u-42");
    assert_eq!(decoded.email, "ada@example.com");
    assert_eq!(decoded.name, "Ada");

    let response = app.oneshot(post_json("/api/generate-demo-token", "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_exchange_token_success_passes_fields_through() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_json(json!({
            "grant_type": "urn:ietf:params:oauth:grant-type:token-exchange",
            "client_id": "client-123",
            "client_secret": "shh-secret",
            "subject_token": "external-abc",
            "subject_token_type": "urn:mycompany:legacy-system",
            "audience": "https://api.example.com",
            "scope": "openid profile email read:data write:data"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at",
            "id_token": "it",
            "token_type": "Bearer",
            "expires_in": 86400,
            "refresh_token": "rt",
            "scope": "openid profile"
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = app_for(relay_config(&upstream));
    let response = app
        .oneshot(post_json("/api/exchange-token", r#"{"subjectToken":"external-abc"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({
            "access_token": "at",
            "id_token": "it",
            "refresh_token": "rt",
            "token_type": "Bearer",
            "expires_in": 86400
        })
    );
}

#[tokio::test]
async fn test_exchange_token_missing_subject_token() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&upstream).await;

    let app = app_for(relay_config(&upstream));
    for body in ["{}", "", r#"{"subjectToken":""}"#] {
        let response = app.clone().oneshot(post_json("/api/exchange-token", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body:?}");
        assert_eq!(read_json(response).await["error"], "invalid_request");
    }
}

#[tokio::test]
async fn test_exchange_token_malformed_json() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&upstream).await;

    let app = app_for(relay_config(&upstream));
    let response = app.oneshot(post_json("/api/exchange-token", "{subjectToken")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "invalid_request");
}

#[tokio::test]
async fn test_exchange_token_incomplete_configuration() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&upstream).await;

    let app = app_for(relay_config(&upstream).without_client_secret());
    let response = app
        .oneshot(post_json("/api/exchange-token", r#"{"subjectToken":"external-abc"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["error"], "server_configuration_error");
    assert!(!body.to_string().contains("AUTH0_CLIENT_SECRET"));
}

#[tokio::test]
async fn test_exchange_token_upstream_rejection() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "access_denied",
            "error_description": "Subject token rejected"
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = app_for(relay_config(&upstream));
    let response = app
        .oneshot(post_json("/api/exchange-token", r#"{"subjectToken":"external-abc"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        read_json(response).await,
        json!({ "error": "access_denied", "error_description": "Subject token rejected" })
    );
}

#[tokio::test]
async fn test_exchange_token_upstream_rejection_defaults() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .mount(&upstream)
        .await;

    let app = app_for(relay_config(&upstream));
    let response = app
        .oneshot(post_json("/api/exchange-token", r#"{"subjectToken":"external-abc"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        read_json(response).await,
        json!({ "error": "token_exchange_failed", "error_description": "Failed to exchange token" })
    );
}

#[tokio::test]
async fn test_exchange_token_unreachable_upstream() {
    let upstream = MockServer::start().await;
    let relay = relay_config(&upstream).with_token_url("http://127.0.0.1:1/oauth/token");

    let app = app_for(relay);
    let response = app
        .oneshot(post_json("/api/exchange-token", r#"{"subjectToken":"external-abc"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["error"], "internal_error");
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = app_for(RelayConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/exchange-token")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("OPTIONS"));
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_cors_restricted_origin() {
    let endpoint = HttpTokenEndpoint::new(Duration::from_secs(5)).unwrap();
    let app = create_app(
        ServerConfig::new(RelayConfig::default(), Arc::new(endpoint))
            .with_allowed_origins(vec!["https://demo.example.com".into()]),
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header(header::ORIGIN, "https://demo.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://demo.example.com"
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = app_for(RelayConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let app = app_for(RelayConfig::default());

    let response = app
        .oneshot(Request::builder().uri("/api/exchange-token").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_exchange_token_minimal_success_and_invalid_grant() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_partial_json(json!({ "subject_token": "good" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "AT",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_partial_json(json!({ "subject_token": "bad" })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "bad token"
        })))
        .mount(&upstream)
        .await;

    let app = app_for(relay_config(&upstream));

    let response = app
        .clone()
        .oneshot(post_json("/api/exchange-token", r#"{"subjectToken":"good"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "access_token": "AT", "token_type": "Bearer", "expires_in": 3600 })
    );

    let response = app
        .oneshot(post_json("/api/exchange-token", r#"{"subjectToken":"bad"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        json!({ "error": "invalid_grant", "error_description": "bad token" })
    );
}

#[tokio::test]
async fn test_exchange_token_forwards_success_body_verbatim() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_partial_json(json!({ "subject_token": "stringly" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "AT",
            "token_type": "Bearer",
            "expires_in": "3600"
        })))
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_partial_json(json!({ "subject_token": "empty" })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&upstream)
        .await;

    let app = app_for(relay_config(&upstream));

    let response = app
        .clone()
        .oneshot(post_json("/api/exchange-token", r#"{"subjectToken":"stringly"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "access_token": "AT", "token_type": "Bearer", "expires_in": "3600" })
    );

    let response = app
        .oneshot(post_json("/api/exchange-token", r#"{"subjectToken":"empty"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({}));
}

#[tokio::test]
async fn test_inbound_timeout_keeps_cors_headers() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "AT" }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&upstream)
        .await;

    let endpoint = HttpTokenEndpoint::new(Duration::from_secs(5)).unwrap();
    let app = create_app(
        ServerConfig::new(relay_config(&upstream), Arc::new(endpoint))
            .with_request_timeout(Duration::from_millis(50)),
    );

    let mut request = post_json("/api/exchange-token", r#"{"subjectToken":"slow"}"#);
    request
        .headers_mut()
        .insert(header::ORIGIN, "http://localhost:5173".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

use anyhow::{Context, Result};
use tokenx_server::{ServerConfig, create_app};
use tokenx_telemetry::{LogFormat, init_with_format, init_with_otlp};

pub async fn run_serve(
    host: &str,
    port: u16,
    log_format: LogFormat,
    otlp_endpoint: Option<&str>,
) -> Result<()> {
    let telemetry = match otlp_endpoint {
        Some(endpoint) => init_with_otlp("tokenx-relay", endpoint),
        None => init_with_format("tokenx-relay", log_format),
    };
    if let Err(e) = telemetry {
        eprintln!("Failed to initialize telemetry: {}", e);
    }

    let config = ServerConfig::from_env().context("failed to build upstream HTTP client")?;
    let app = create_app(config);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(%addr, "token exchange relay listening");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tokenx_telemetry::shutdown_telemetry();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

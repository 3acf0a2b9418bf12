use clap::{Parser, Subcommand};
use tokenx_telemetry::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "tokenx")]
#[command(about = "Custom Token Exchange relay and demo tooling", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the relay HTTP server
    Serve {
        /// Server port
        #[arg(short, long, env = "PORT", default_value_t = 3001)]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Log output format (pretty or json)
        #[arg(long, env = "TOKENX_LOG_FORMAT", default_value = "pretty")]
        log_format: LogFormat,

        /// Export spans to this OTLP collector
        #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
        otlp_endpoint: Option<String>,
    },

    /// Print a demo external token
    Generate {
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        user_id: Option<String>,

        /// Print the full `{token, decoded}` response instead of the bare token
        #[arg(long)]
        json: bool,
    },

    /// Decode a JWT for inspection (no signature verification)
    Decode {
        token: String,
    },

    /// Exchange an external token against the configured Authorization Server
    Exchange {
        /// External token to exchange; a fresh demo token is used when omitted
        #[arg(long)]
        subject_token: Option<String>,

        /// Upstream timeout in seconds
        #[arg(long, env = "TOKENX_UPSTREAM_TIMEOUT_SECS", default_value_t = 15)]
        timeout_secs: u64,
    },
}

//! # tokenx-telemetry
//!
//! Structured logging and optional distributed tracing for the relay.
//!
//! ## Features
//! - Console logging with `tracing` (pretty or JSON lines)
//! - `RUST_LOG` filtering, `info` by default
//! - Optional OTLP span export
//!
//! ## Usage
//!
//! ```rust
//! use tokenx_telemetry::{init_telemetry, info};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry("tokenx-relay")?;
//!     info!("relay starting");
//!     Ok(())
//! }
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use init::{LogFormat, init_telemetry, init_with_format, init_with_otlp, shutdown_telemetry};
pub use spans::{demo_token_span, record_status, token_exchange_span};

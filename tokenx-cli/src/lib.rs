//! # tokenx-cli
//!
//! Command-line runner for the token exchange relay.
//!
//! - `tokenx serve` - run the relay HTTP server
//! - `tokenx generate` - print a demo external token
//! - `tokenx decode <jwt>` - inspect a JWT without verifying it
//! - `tokenx exchange` - run one exchange against the configured tenant
//!
//! Settings come from the environment; a `.env` file in the working directory
//! is loaded first.

pub mod cli;
pub mod commands;
pub mod serve;

pub use cli::{Cli, Commands};

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tokenx_cli::{
    Cli, Commands,
    commands::{demo_request, run_decode, run_exchange, run_generate},
    serve::run_serve,
};
use tokenx_core::RelayConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host, log_format, otlp_endpoint } => {
            run_serve(&host, port, log_format, otlp_endpoint.as_deref()).await
        }
        Commands::Generate { email, name, user_id, json } => {
            println!("{}", run_generate(demo_request(email, name, user_id), json)?);
            Ok(())
        }
        Commands::Decode { token } => {
            println!("{}", run_decode(&token)?);
            Ok(())
        }
        Commands::Exchange { subject_token, timeout_secs } => {
            let out = run_exchange(
                RelayConfig::from_env(),
                subject_token,
                Duration::from_secs(timeout_secs),
            )
            .await?;
            println!("{}", out);
            Ok(())
        }
    }
}

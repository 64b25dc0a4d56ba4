//! Rollcall HTTP server binary.

use rollcall_server::{RollcallServer, ServerConfig};
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env();
    tracing::info!(
        "Starting rollcall-server {} on {}",
        rollcall_core::VERSION,
        config.bind_addr
    );

    match RollcallServer::new(config).serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}

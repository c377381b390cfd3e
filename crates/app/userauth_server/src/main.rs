//! userauth HTTP server binary.

mod logging;

use clap::Parser;
use tracing::info;
use userauth_api::AppState;
use userauth_api::config::ApiConfig;
use userauth_core::config::AuthConfig;

use crate::logging::LogFormat;

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "userauth_server", about = "userauth account server", version)]
struct Args {
    /// Interface to bind.
    #[arg(long, env = "BIND_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Generate random signing secrets when none are configured.
    ///
    /// Tokens issued under ephemeral secrets stop verifying on restart.
    /// Intended for local development only.
    #[arg(long, default_value_t = false)]
    ephemeral_secrets: bool,

    /// Log output format.
    #[arg(long, value_enum, env = "LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    logging::init(args.log_format);

    let config = ApiConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        auth: AuthConfig::from_env(args.ephemeral_secrets)?,
    };
    info!(
        bind_addr = %config.bind_addr,
        access_ttl_secs = config.auth.access_ttl.num_seconds(),
        refresh_ttl_secs = config.auth.refresh_ttl.num_seconds(),
        bcrypt_cost = config.auth.bcrypt_cost,
        "starting userauth_server"
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    let app = userauth_api::router(AppState::in_memory(config));

    info!(addr = %local_addr, "REST API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

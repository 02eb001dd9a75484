//! Rolegate - role-based web authentication service

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LoggingConfig};
use rolegate_api::{AppState, create_router};
use rolegate_auth::{Authenticator, InMemoryTokenRepository, PasswordEncoder, RememberMeService};
use rolegate_core::RuleSet;
use rolegate_directory::InMemoryDirectory;

/// Rolegate - role-based web authentication service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "ROLEGATE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "ROLEGATE_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config.logging);

    info!("Starting Rolegate v{}", env!("CARGO_PKG_VERSION"));

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    // Argon2 at production cost takes a while; keep it off the runtime
    let auth_config = config.auth.clone();
    let authenticator = tokio::task::spawn_blocking(move || -> Result<Authenticator> {
        let encoder =
            PasswordEncoder::new(&auth_config.encoder_secret, auth_config.hash_settings())
                .context("Failed to build password encoder")?;
        let directory = InMemoryDirectory::demo(|raw| encoder.encode(raw))
            .context("Failed to encode demo accounts")?;
        info!("Credential directory ready with {} users", directory.len());
        Authenticator::new(Arc::new(directory), encoder)
            .context("Failed to build authenticator")
    })
    .await??;

    let rules = RuleSet::demo().context("Invalid authorization rules")?;
    info!("Loaded {} authorization rules", rules.rules().len());

    let remember_me = RememberMeService::new(
        InMemoryTokenRepository::new(),
        &config.remember_me.key,
        config.remember_me.validated_validity_secs(),
    );

    let state = AppState::new(
        Arc::new(authenticator),
        Arc::new(rules),
        Arc::new(remember_me),
        config.web_settings(),
    )
    .with_metrics(metrics_handle);

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port)
        .parse()
        .with_context(|| format!("Invalid bind address: {}:{}", bind_addr, port))?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let json = logging.format.eq_ignore_ascii_case("json");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

//! Fintrack API server binary.
//!
//! Reads configuration from flags and the environment (a `.env` file is
//! honoured), runs migrations, and serves the HTTP API until Ctrl-C.

use std::sync::Arc;

use clap::Parser;
use fintrack_api::config::ApiConfig;
use fintrack_core::auth::memory::InMemoryCredentialStore;
use fintrack_core::auth::queries::PgCredentialStore;
use fintrack_core::auth::store::CredentialStore;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "fintrack_api_server", about = "Fintrack API server")]
struct Args {
    /// Address to bind the HTTP listener.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8080")]
    bind_addr: String,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL", required_unless_present = "in_memory")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// Keep credentials in process memory instead of PostgreSQL.
    ///
    /// Everything is lost on exit; meant for local frontend work.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,fintrack_api=debug,fintrack_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    // A missing or weak signing secret stops the process here.
    let config = ApiConfig::from_env().inspect_err(|e| error!("invalid configuration: {e}"))?;

    info!(
        bind_addr = %args.bind_addr,
        token_lifetime_secs = config.token_lifetime_secs,
        cookie_domain = config.cookie.domain.as_deref().unwrap_or("<host-only>"),
        cookie_secure = config.cookie.secure,
        cors_origins = config.cors_allowed_origins.len(),
        "starting fintrack_api_server"
    );

    let store: Arc<dyn CredentialStore> = match (&args.database_url, args.in_memory) {
        (_, true) => {
            warn!("using in-memory credential store; accounts will not survive a restart");
            Arc::new(InMemoryCredentialStore::new())
        }
        (Some(url), false) => {
            info!(max_connections = args.max_connections, "configuring connection pool");
            let pool = PgPoolOptions::new()
                .max_connections(args.max_connections)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(url)
                .await?;

            info!("running database migrations");
            fintrack_core::migrate::migrate(&pool).await?;
            Arc::new(PgCredentialStore::new(pool))
        }
        (None, false) => return Err("DATABASE_URL must be set (or pass --in-memory)".into()),
    };

    let state = fintrack_api::AppState::new(config, store)?;
    let app = fintrack_api::router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to install Ctrl-C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

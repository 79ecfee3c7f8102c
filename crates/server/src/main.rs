//! Carelog Server - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod infrastructure;
mod mapping;
mod records;
mod service;

use app::App;
use infrastructure::{config::Config, postgres::Db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from the workspace root; the binary's manifest dir is
    // `crates/server`, two levels down.
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carelog_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Carelog Server");

    // Load configuration
    let config = Config::from_env();

    // Connect to Postgres
    tracing::info!(
        "Connecting to Postgres at {}:{}",
        config.database.host,
        config.database.port
    );
    let db = Db::connect(&config.database)
        .await
        .context("connecting to Postgres")?;
    db.ping().await.context("initial connectivity check")?;

    // Ensure database schema (tables and indexes)
    db.ensure_schema().await.context("applying schema")?;

    // Create application
    let app = Arc::new(App::new(&db));

    // Bind both listeners before serving either, so a taken port fails the
    // whole process instead of leaving half the surface up.
    let rpc_addr: SocketAddr = format!("0.0.0.0:{}", config.rpc_port).parse()?;
    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let rpc_listener = tokio::net::TcpListener::bind(rpc_addr)
        .await
        .with_context(|| format!("binding RPC listener on {rpc_addr}"))?;
    let http_listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("binding HTTP listener on {http_addr}"))?;

    let rpc_router = api::rpc::routes().with_state(app.clone());
    let http_router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    tracing::info!("RPC listening on {}", rpc_addr);
    tracing::info!("HTTP listening on {}", http_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(rpc_listener, rpc_router).await {
            tracing::error!(error = %e, "RPC server exited");
        }
    });

    axum::serve(http_listener, http_router).await?;

    db.close().await;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

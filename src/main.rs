//! Dashboard Auth - admin dashboard backend
//! Serves login/refresh/logout and the token-gated user endpoints.

use anyhow::{Context, Result};
use clap::Parser;
use dashboard_auth::{build_router, AccessGate, AppState, Config, TokenCodec, UserStore};
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;

    info!("🚀 Dashboard auth backend starting");
    info!("⚙️  {:?}", config);

    let users = match &config.users_file {
        Some(path) => UserStore::from_json_file(path)?,
        None => {
            info!("👥 No users file configured, using built-in mock users");
            UserStore::with_mock_users().context("Invalid built-in user seed")?
        }
    };

    let codec = Arc::new(TokenCodec::new(&config.token_config()?));
    let gate = Arc::new(AccessGate::new(codec, Arc::new(users)));
    info!("🔐 Access gate ready ({} users)", gate.users().len());

    let app = build_router(AppState::new(gate, config.cookie_settings()));

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("🎯 API server listening on {}", config.bind);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard_auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents), then the crate's own .env
    let _ = dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

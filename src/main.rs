// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Comment Intake Service
//!
//! Public comment endpoint for a static blog. Submissions are rate limited
//! per client, validated, screened by spam heuristics and queued unapproved
//! until a moderator flips them visible.
//!
//! ## Endpoints
//!
//! - `GET /api/comments?postSlug=<slug>`: approved comments, newest first
//! - `POST /api/comments`: submit a comment for moderation
//! - `GET /api/posts`, `GET /api/posts/{slug}`: published post metadata
//! - `GET /health`, `GET /metrics`
//!
//! ## Configuration
//!
//! An optional TOML file named by `COMMENT_INTAKE_CONFIG`, overridden by
//! environment variables (a `.env` file is honoured):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX`: Submissions per window per client (default: 5)
//! - `RATE_LIMIT_WINDOW_MS`: Window length (default: 60000)
//! - `STORAGE_PATH`: `memory`, `surreal:memory` or a RocksDB directory
//! - `CONTENT_DIR`: Directory of post files (default: content)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use comment_intake::{config::Config, handlers::router, store, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::load()?;
    info!(
        bind_addr = %config.bind_addr,
        max_requests = config.rate_limit.max_requests,
        window_ms = config.rate_limit.window_ms,
        storage = %config.storage.path,
        posts_dir = %config.content.posts_dir.display(),
        "Starting comment intake service"
    );

    // Create application state
    let store = store::open(&config.storage).await?;
    let state = Arc::new(AppState::new(config.clone(), store)?);

    let sweeper = state
        .limiter
        .spawn_sweeper(config.rate_limit.cleanup_interval());

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

//! ccgate server binary.
//!
//! Issues client credentials, serves the client-credentials token endpoint
//! and a bearer-protected resource, with graceful shutdown.

use anyhow::Result;
use ccgate::{
    config::Config,
    http::{AppState, build_router},
    storage::{AccessTokenStore, create_storage_backend},
};
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "ccgate=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();

    let version = ccgate::config::version()?;

    env::args().for_each(|arg| {
        if arg == "--version" {
            println!("{version}");
            std::process::exit(0);
        }
    });

    tracing::info!(?version, "Starting ccgate");

    let config = Arc::new(Config::new()?);

    let oauth_storage = create_storage_backend(*config.max_clients.as_ref());
    let app_state = AppState::new(config.clone(), oauth_storage.clone());
    let app = build_router(app_state);

    let bind_address = format!("0.0.0.0:{}", config.http_port.as_ref());
    let listener = TcpListener::bind(&bind_address).await?;

    // Setup graceful shutdown
    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    {
        let tracker = tracker.clone();
        let inner_token = token.clone();

        let ctrl_c = async {
            if let Err(err) = signal::ctrl_c().await {
                tracing::error!(?err, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(err) => {
                    tracing::error!(?err, "failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::spawn(async move {
            tokio::select! {
                () = inner_token.cancelled() => { },
                _ = terminate => {},
                _ = ctrl_c => {},
            }

            tracker.close();
            inner_token.cancel();
        });
    }

    // Sweep expired access tokens
    {
        let inner_token = token.clone();
        let cleanup_interval = *config.token_cleanup_interval.as_ref();
        tracker.spawn(async move {
            let mut interval = tokio::time::interval(cleanup_interval);
            loop {
                tokio::select! {
                    () = inner_token.cancelled() => break,
                    _ = interval.tick() => {
                        match oauth_storage.cleanup_expired_tokens().await {
                            Ok(0) => {}
                            Ok(removed) => tracing::debug!(removed, "removed expired access tokens"),
                            Err(err) => tracing::error!(?err, "access token cleanup failed"),
                        }
                    }
                }
            }
        });
    }

    // Start HTTP server
    {
        let inner_token = token.clone();
        tracker.spawn(async move {
            tracing::info!("Starting server on {bind_address}");

            let shutdown_token = inner_token.clone();
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    tokio::select! {
                        () = shutdown_token.cancelled() => { }
                    }
                    tracing::info!("axum graceful shutdown complete");
                })
                .await;
            if let Err(err) = result {
                tracing::error!("axum task failed: {}", err);
            }

            inner_token.cancel();
        });
    }

    tracker.wait().await;

    Ok(())
}

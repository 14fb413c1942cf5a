//! Selecta API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use selecta_application::{SelectionProcess, SystemClock};
use selecta_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{build_selection_backend, connect_and_migrate};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    if config.migrate_only {
        if let Some(database_url) = config.database_url.as_deref() {
            connect_and_migrate(database_url).await?;
        }
        info!("database migrations applied successfully");
        return Ok(());
    }

    let backend = build_selection_backend(&config).await?;
    let selection = SelectionProcess::new(backend.ports, Arc::new(SystemClock), config.service);
    let mirror = selection.sync_mirror(backend.change_feed);

    let (shutdown_sender, shutdown_receiver) = tokio::sync::oneshot::channel::<()>();
    let mirror_task = {
        let mirror = mirror.clone();
        tokio::spawn(async move {
            mirror
                .run(async {
                    let _ = shutdown_receiver.await;
                })
                .await;
        })
    };

    let app_state = AppState {
        selection,
        mirror,
        frontend_url: config.frontend_url.clone(),
    };
    let app = build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, persistent = config.database_url.is_some(), "selecta-api listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")));

    let _ = shutdown_sender.send(());
    if let Err(error) = mirror_task.await {
        tracing::warn!(error = %error, "sync mirror task ended abnormally");
    }

    served
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

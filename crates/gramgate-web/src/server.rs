// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Axum server setup: routes, middleware, shared state.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use gramgate_core::{GramgateError, TokenGenerator};
use gramgate_relay::Bridge;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for request handlers: the application context plus the
/// injected token generator.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<Bridge>,
    pub tokens: Arc<dyn TokenGenerator>,
}

/// Builds the full route table.
///
/// The panic-catching layer is the top-level recovery wrapper: no handler
/// fault may crash the process, callers get a generic 500 instead.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Webhook traffic.
        .route("/telegram/{token}", post(handlers::telegram_webhook))
        .route("/webhook/", post(handlers::crm_webhook))
        // Admin JSON API.
        .route("/create", post(handlers::create_connection))
        .route("/save", post(handlers::save_connection))
        .route("/settings/{uid}", get(handlers::get_settings))
        .route("/add-bot", post(handlers::add_bot))
        .route("/delete-bot", post(handlers::delete_bot))
        .route("/set-lang", post(handlers::set_bot_lang))
        .route("/actions/activity", post(handlers::activity))
        // The transport logo the CRM renders next to the integration.
        .nest_service("/static", ServeDir::new("static"))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the configured address and serves until the process stops.
pub async fn start_server(state: AppState) -> Result<(), GramgateError> {
    let bind = state.bridge.config.server.bind.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| GramgateError::Internal(format!("failed to bind {bind}: {e}")))?;

    tracing::info!("gramgate listening on {bind}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GramgateError::Internal(format!("server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

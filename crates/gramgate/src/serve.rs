// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gramgate serve` command implementation.
//!
//! Wires storage, the localizer, the avatar store and the relay context
//! together, runs the startup reconciliation sweep, and hands off to the
//! HTTP server. The sweep runs to completion before the listener opens so
//! it is never concurrent with webhook traffic.

use std::sync::Arc;
use std::time::Duration;

use gramgate_avatar::{PassthroughAvatarStore, S3AvatarStore};
use gramgate_config::GramgateConfig;
use gramgate_core::{AvatarStore, GramgateError, SequencedTokenGenerator};
use gramgate_relay::{Bridge, Locales, reconcile};
use gramgate_storage::Database;
use gramgate_web::{AppState, start_server};
use tracing::{error, info};

/// Runs the bridge.
pub async fn run_serve(config: GramgateConfig) -> Result<(), GramgateError> {
    init_tracing(&config.log_level);

    info!("starting gramgate");

    let config = Arc::new(config);

    let db = Database::open(&config.storage.database_path).await?;
    let locales = Arc::new(Locales::load()?);
    let avatars = build_avatar_store(&config).await?;

    let bridge = Bridge::new(Arc::clone(&config), db, locales, avatars)?;

    // Startup reconciliation: align CRM channels with local bot records
    // before accepting traffic. Failures are logged, not fatal; the next
    // sweep retries.
    if let Err(e) = reconcile::sweep(&bridge).await {
        error!(error = %e, "startup reconciliation sweep failed");
    }

    let state = AppState {
        bridge: Arc::new(bridge),
        tokens: Arc::new(SequencedTokenGenerator::new()),
    };

    start_server(state).await
}

async fn build_avatar_store(
    config: &GramgateConfig,
) -> Result<Arc<dyn AvatarStore>, GramgateError> {
    if config.avatar.bucket.is_empty() {
        info!("no avatar bucket configured, serving telegram urls directly");
        return Ok(Arc::new(PassthroughAvatarStore));
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .build()
        .map_err(|e| GramgateError::Internal(format!("http client build failed: {e}")))?;

    info!(bucket = %config.avatar.bucket, "avatar re-hosting enabled");
    Ok(Arc::new(
        S3AvatarStore::new(config.avatar.clone(), http).await,
    ))
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gramgate={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{
    error::Error,
    fs,
    net::{SocketAddr, ToSocketAddrs},
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use keymanager_api::{
    api::router,
    auth::ApiToken,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    keymanager::KeyManager,
    keystore::Eip2335Verifier,
    state::AppState,
    storage::{self, KeymanagerDb},
};
use tracing_subscriber::EnvFilter;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Key manager server failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run(config: Config) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&config.data_dir)?;
    let db = KeymanagerDb::open(&storage::db_path(&config.data_dir))?;

    for pubkey in db.seed_readonly_signers(&config.readonly_remote_signers)? {
        tracing::warn!(%pubkey, "Read-only signer not installed, pubkey is held as a local keystore");
    }

    let api_token = if config.auth_disabled {
        tracing::warn!("API authentication is disabled");
        None
    } else {
        let (token, created) = ApiToken::load_or_create(&config.token_file)?;
        if created {
            tracing::info!(path = %config.token_file.display(), "Generated new API token");
        } else {
            tracing::info!(path = %config.token_file.display(), "Loaded API token");
        }
        Some(token)
    };

    if !config.is_loopback() {
        tracing::warn!(host = %config.host, "Key manager API is reachable from other machines");
    }

    let keymanager = KeyManager::new(
        Arc::new(db),
        Arc::new(Eip2335Verifier),
        config.defaults.clone(),
    );
    let app = router(
        AppState::new(keymanager, api_token),
        config.cors_origin.as_deref(),
    );

    let addr: SocketAddr = config
        .bind_address()
        .to_socket_addrs()?
        .next()
        .ok_or("bind address did not resolve")?;

    let handle = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    match &config.tls {
        Some(tls) => {
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "failed to install rustls crypto provider")?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            tracing::info!(%addr, "Key manager listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, "Key manager listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    tracing::info!("Key manager stopped");
    Ok(())
}

async fn shutdown_on_signal(handle: Handle<SocketAddr>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

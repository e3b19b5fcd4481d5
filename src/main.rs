// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};

use asa_mint_relay::{
    api::{cors::OriginPolicy, router},
    config::{LogFormat, RelayConfig, DEFAULT_LOG_FILTER},
    pinning::{PinataClient, PinningService},
    state::AppState,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Logging is not configured yet; fall back to the default format.
            init_tracing(LogFormat::default());
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider was already installed");
    }

    let client = match PinataClient::new(config.pinata_api_base_url.clone(), config.pinata_auth.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build Pinata client");
            return ExitCode::FAILURE;
        }
    };
    info!(
        auth = client.auth_kind(),
        api = %config.pinata_api_base_url,
        "Pinata client configured"
    );
    let pinner: Arc<dyn PinningService> = Arc::new(client);

    // Credential self-test; failures are reported but do not stop the relay.
    let probe = pinner.clone();
    tokio::spawn(async move {
        if let Err(e) = probe.test_authentication().await {
            warn!(error = %e, "Pinata authentication check failed");
        }
    });

    let state = AppState::new(pinner, OriginPolicy::from_config(&config));
    let app = router(state);

    let handle = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    let addr = config.bind_addr;
    let result = match &config.tls {
        Some(tls) => {
            let tls_config = match RustlsConfig::from_pem_file(&tls.cert, &tls.key).await {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    error!(error = %e, cert = %tls.cert.display(), "Failed to load TLS certificate");
                    return ExitCode::FAILURE;
                }
            };
            info!(%addr, "Pinning relay listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!(%addr, "Pinning relay listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    match result {
        Ok(()) => {
            info!("Pinning relay stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_on_signal(handle: Handle<SocketAddr>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
        Err(e) => warn!(error = %e, "Unable to listen for shutdown signal"),
    }
}

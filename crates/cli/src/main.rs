//! Files-changed interceptor entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration**: read and validate the environment
//!    (see [`config`]). An invalid upstream URL stops the process here.
//! 2. **Wire observability**: install the `tracing` subscriber (see
//!    [`observability`]).
//! 3. **Construct infrastructure**: build the [`github::GithubClient`] once
//!    and inject it into an [`interceptor::Interceptor`].
//! 4. **Serve**: bind the fixed port, serve until SIGINT/SIGTERM, then give
//!    in-flight requests [`listener::SHUTDOWN_GRACE`] to finish.
//!
//! Any failure along the way is logged and the process exits non-zero.

mod config;
mod observability;

use std::{
    net::{Ipv4Addr, SocketAddr},
    process::ExitCode,
    sync::Arc,
};

use anyhow::Context;
use github::GithubClient;
use interceptor::Interceptor;
use tracing::{error, info, warn};

use crate::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let telemetry = match observability::init(config.otlp_endpoint.as_deref()) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = run(config).await;
    if let Err(err) = &outcome {
        error!(error = %format!("{err:#}"), "fatal");
    }
    telemetry.shutdown();

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!(github_url = %config.github_url, timeout = ?config.github_timeout, "github host");
    if config.github_timeout.is_none() {
        warn!("no timeout configured for compare calls; a stalled upstream stalls its request");
    }

    let github = GithubClient::new(config.github_url, config.github_timeout)?;
    let interceptor = Interceptor::new(Arc::new(github));

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, listener::LISTEN_PORT));
    let tcp = listener::bind(addr).await?;

    listener::serve(
        tcp,
        listener::router(interceptor),
        shutdown_signal(),
        listener::SHUTDOWN_GRACE,
    )
    .await
    .context("shutdown failed")
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl-C"),
        _ = terminate => info!("received SIGTERM"),
    }
}

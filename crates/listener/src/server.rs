use std::{
    future::{Future, IntoFuture},
    io,
    net::SocketAddr,
    time::Duration,
};

use axum::Router;
use thiserror::Error;
use tokio::{net::TcpListener, sync::oneshot};
use tracing::{info, warn};

/// Port the service listens on.
pub const LISTEN_PORT: u16 = 8080;

/// How long in-flight requests may run after shutdown has been requested.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Errors from binding or running the HTTP server.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listen address could not be bound (typically already in use).
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// Underlying socket error.
        source: io::Error,
    },

    /// The accept loop failed while serving.
    #[error("server failed: {0}")]
    Serve(#[source] io::Error),
}

/// Binds `addr`. Not retried; a taken port is fatal to the caller.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ListenerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })
}

/// Serves `router` on `listener` until `shutdown` resolves, then drains.
///
/// Returns once every in-flight request has finished or `grace` has elapsed
/// since `shutdown` resolved, whichever comes first. Requests still running
/// at that point are abandoned and the call still succeeds.
pub async fn serve<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
    grace: Duration,
) -> Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }

    let (stopping_tx, stopping_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("shutting down");
            let _ = stopping_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result.map_err(ListenerError::Serve),
        _ = stopping_rx => {}
    }

    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => {
            result.map_err(ListenerError::Serve)?;
            info!("shut down");
        }
        Err(_) => warn!(
            grace_ms = grace.as_millis() as u64,
            "grace period elapsed, abandoning in-flight requests"
        ),
    }
    Ok(())
}

//! Hyper host adapter.
//!
//! Accepts TCP connections with tokio, serves HTTP/1.1 with hyper, buffers
//! each request body and runs the synchronous [`Dispatcher`] on the blocking
//! thread pool, one task per request.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use doze_server::{service, Dispatcher};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), doze_server::ServerError> {
//!     let dispatcher = Dispatcher::builder().build()?;
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     service::serve(listener, Arc::new(dispatcher)).await
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use doze_config::{DozeConfig, ServerConfig};
use doze_core::Response;
use http::{Request, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::dispatcher::Dispatcher;
use crate::error::ServerError;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Response type produced by the adapter.
pub type HttpResponse = http::Response<Full<Bytes>>;

/// A dispatcher bound to its server settings.
///
/// # Example
///
/// ```rust,ignore
/// use doze_config::ConfigLoader;
/// use doze_server::{DispatcherBuilder, Server};
///
/// let config = ConfigLoader::new().with_env_prefix("DOZE").load()?;
/// let dispatcher = DispatcherBuilder::from_config(&config).build()?;
/// Server::from_config(dispatcher, &config).run().await?;
/// ```
#[derive(Debug)]
pub struct Server {
    dispatcher: Arc<Dispatcher>,
    config: ServerConfig,
}

impl Server {
    /// Creates a server with the given settings.
    #[must_use]
    pub fn new(dispatcher: Dispatcher, config: ServerConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config,
        }
    }

    /// Creates a server from the `[server]` section of a configuration.
    #[must_use]
    pub fn from_config(dispatcher: Dispatcher, config: &DozeConfig) -> Self {
        Self::new(dispatcher, config.server.clone())
    }

    /// The dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Binds the configured address and serves until SIGTERM or SIGINT.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals())
            .await
    }

    /// Binds the configured address and serves until `shutdown` triggers.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.http_addr.clone();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        serve_with_shutdown(listener, self.dispatcher, self.config, shutdown).await
    }
}

/// Serves `listener` with default settings until SIGTERM or SIGINT.
pub async fn serve(listener: TcpListener, dispatcher: Arc<Dispatcher>) -> Result<(), ServerError> {
    serve_with_shutdown(
        listener,
        dispatcher,
        ServerConfig::default(),
        ShutdownSignal::with_os_signals(),
    )
    .await
}

/// Serves `listener` until `shutdown` triggers, then waits up to
/// `config.shutdown_timeout_secs` for open connections to finish.
pub async fn serve_with_shutdown(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    config: ServerConfig,
    shutdown: ShutdownSignal,
) -> Result<(), ServerError> {
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, routes = dispatcher.router().len(), "server listening");

    let tracker = ConnectionTracker::new();
    let max_body_bytes = config.max_body_bytes;

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, remote_addr)) => {
                    let dispatcher = Arc::clone(&dispatcher);
                    let shutdown = shutdown.clone();
                    let token = tracker.acquire();

                    tokio::spawn(async move {
                        if let Err(e) =
                            serve_connection(stream, remote_addr, dispatcher, max_body_bytes, shutdown).await
                        {
                            debug!(%remote_addr, error = %e, "connection error");
                        }
                        drop(token);
                    });
                }
                Err(e) => error!(error = %e, "failed to accept connection"),
            },
            () = shutdown.recv() => {
                info!("shutdown signal received, no longer accepting connections");
                break;
            }
        }
    }

    let timeout = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(timeout, tracker.wait_idle()).await.is_err() {
        warn!(
            remaining = tracker.active_connections(),
            "shutdown timeout reached with connections still open"
        );
    }

    info!("server stopped");
    Ok(())
}

async fn serve_connection(
    stream: TcpStream,
    remote_addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
    max_body_bytes: usize,
    shutdown: ShutdownSignal,
) -> Result<(), hyper::Error> {
    let service = service_fn(move |request: Request<Incoming>| {
        let dispatcher = Arc::clone(&dispatcher);
        async move { Ok::<_, Infallible>(handle_request(dispatcher, max_body_bytes, request).await) }
    });

    let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    tokio::select! {
        result = connection.as_mut() => result,
        () = shutdown.recv() => {
            debug!(%remote_addr, "closing connection for shutdown");
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    }
}

async fn handle_request(
    dispatcher: Arc<Dispatcher>,
    max_body_bytes: usize,
    request: Request<Incoming>,
) -> HttpResponse {
    let (parts, body) = request.into_parts();

    let body = match Limited::new(body, max_body_bytes).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            warn!(path = parts.uri.path(), limit = max_body_bytes, "request body too large");
            return plain(StatusCode::PAYLOAD_TOO_LARGE);
        }
        Err(e) => {
            warn!(path = parts.uri.path(), error = %e, "failed to read request body");
            return plain(StatusCode::BAD_REQUEST);
        }
    };

    let request = Request::from_parts(parts, body);
    match tokio::task::spawn_blocking(move || dispatcher.handle(request)).await {
        Ok(response) => response.map(Full::new),
        Err(e) => {
            error!(error = %e, "dispatch task failed");
            plain(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn plain(status: StatusCode) -> HttpResponse {
    let reason = status.canonical_reason().unwrap_or("Error");
    Response::text(status, reason).into_http().map(Full::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_response() {
        let response = plain(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_bind_error() {
        let holder = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ServerConfig {
            http_addr: holder.local_addr().unwrap().to_string(),
            ..ServerConfig::default()
        };
        let server = Server::new(Dispatcher::builder().build().unwrap(), config);

        let shutdown = ShutdownSignal::new();
        let result = server.run_with_shutdown(shutdown).await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}

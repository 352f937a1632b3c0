use crate::adapter::{body_too_large, dispatch, internal_error, into_comet_request, into_hyper_response, rejection};
use crate::config::ServerConfig;
use crate::error::ServerError;
use comet::Application;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use hyper_util::server::graceful::GracefulShutdown;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

/// Serves a built [`Application`] over HTTP/1.1.
///
/// Each request is dispatched on the blocking pool, so handlers may do
/// synchronous work without stalling the accept loop.
pub struct CometServer {
    app: Arc<Application>,
    config: ServerConfig,
}

impl CometServer {
    pub fn new(app: Application, config: ServerConfig) -> Self {
        Self {
            app: Arc::new(app),
            config,
        }
    }

    pub fn app(&self) -> &Application {
        &self.app
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = self.config.socket_addr()?;
        TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })
    }

    /// Binds the configured address and serves until Ctrl-C.
    pub async fn serve(self) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve_with_shutdown(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
    }

    /// Serves connections from `listener` until `shutdown` completes, then
    /// drains in-flight connections.
    pub async fn serve_with_shutdown<S>(
        self,
        listener: TcpListener,
        shutdown: S,
    ) -> Result<(), ServerError>
    where
        S: Future<Output = ()> + Send,
    {
        let local_addr = listener.local_addr()?;
        log::info!("Listening on http://{}", local_addr);
        for (method, pattern) in self.app.routes() {
            log::info!("  {} {}", method, pattern);
        }

        let builder = Builder::new(TokioExecutor::new());
        let graceful = GracefulShutdown::new();
        let mut join_set: JoinSet<()> = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Shutdown requested");
                    break;
                }
                accept = listener.accept() => {
                    let (stream, remote) = match accept {
                        Ok(s) => s,
                        Err(e) => {
                            log::warn!("Accept error: {}", e);
                            continue;
                        }
                    };
                    let app = Arc::clone(&self.app);
                    let max_body_size = self.config.max_body_size;
                    let mut http_builder = builder.clone();
                    http_builder.http1().keep_alive(self.config.keep_alive);
                    let watcher = graceful.watcher();
                    join_set.spawn(async move {
                        let io = TokioIo::new(stream);
                        let service = service_fn(move |req| {
                            handle_request(req, Arc::clone(&app), remote, max_body_size)
                        });
                        let connection = http_builder.serve_connection(io, service).into_owned();
                        if let Err(err) = watcher.watch(connection).await {
                            log::debug!("Connection error from {}: {}", remote, err);
                        }
                    });
                }
                Some(res) = join_set.join_next(), if !join_set.is_empty() => {
                    log_join_result(res);
                }
            }
        }

        drop(listener);
        graceful.shutdown().await;
        while let Some(res) = join_set.join_next().await {
            log_join_result(res);
        }
        log::info!("Server stopped");
        Ok(())
    }
}

fn log_join_result(res: Result<(), tokio::task::JoinError>) {
    if let Err(join_err) = res {
        if join_err.is_panic() {
            log::error!("Connection task panicked: {}", join_err);
        } else {
            log::warn!("Connection task error: {}", join_err);
        }
    }
}

async fn handle_request(
    req: Request<Incoming>,
    app: Arc<Application>,
    remote: SocketAddr,
    max_body_size: usize,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();

    let body = match Limited::new(body, max_body_size).collect().await {
        Ok(collected) => collected.to_bytes().to_vec(),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            return Ok(rejection(body_too_large(max_body_size)));
        }
        Err(err) => {
            log::debug!("Failed to read body from {}: {}", remote, err);
            return Ok(into_hyper_response(internal_error()));
        }
    };

    let request = match into_comet_request(&parts, body, Some(remote), max_body_size) {
        Ok(request) => request,
        Err(err) => return Ok(rejection(err)),
    };

    let response = match tokio::task::spawn_blocking(move || dispatch(&app, request)).await {
        Ok(response) => response,
        Err(e) => {
            log::error!("Dispatch task failed: {}", e);
            internal_error()
        }
    };
    Ok(into_hyper_response(response))
}

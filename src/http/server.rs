//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum service that hands every request to the Router
//! - Wire up tower layers (tracing, request timeout)
//! - Buffer request bodies up to the configured limit
//! - Bind server to listener, shut down on Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::routing::Router;

/// State injected into the dispatch handler.
#[derive(Clone)]
struct DispatchState {
    router: Arc<Router>,
    body_limit: usize,
}

/// Axum service that forwards every request to `router`.
pub fn router_service(router: Arc<Router>, body_limit: usize) -> axum::Router {
    axum::Router::new()
        .fallback(dispatch)
        .with_state(DispatchState { router, body_limit })
}

/// HTTP server for the router.
pub struct HttpServer {
    app: axum::Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig, router: Arc<Router>) -> Self {
        let app = Self::build_app(&config, router);
        Self { app, config }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &AppConfig, router: Arc<Router>) -> axum::Router {
        router_service(router, config.listener.body_limit_bytes)
            .layer(TimeoutLayer::new(Duration::from_secs(config.listener.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered app, for driving with `tower::ServiceExt::oneshot`.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Buffer the body, then run the synchronous router on the blocking pool.
async fn dispatch(State(state): State<DispatchState>, request: axum::extract::Request) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.body_limit).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(
                path = %parts.uri.path(),
                limit = state.body_limit,
                error = %e,
                "Request body rejected"
            );
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };
    let request = axum::http::Request::from_parts(parts, bytes);

    let router = state.router.clone();
    match tokio::task::spawn_blocking(move || router.dispatch(request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => e.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Dispatch task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

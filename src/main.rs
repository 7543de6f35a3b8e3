//! Lazy Router demo service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (Axum, trace + timeout layers, body buffering)
//!                         │
//!                         ▼
//!                     routing::Router (base path, first-match scan)
//!                         │
//!                         ▼
//!                     handler::RequestHandler
//!                         request_id → access_log → route middleware → handler
//!                         │                         (deferred ids resolved
//!                         ▼                          via ServiceContainer)
//!     Client Response ◀── Response, or RouterError mapped to 404/500
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use clap::Parser;
use tokio::net::TcpListener;

use lazy_router::config::{load_config, AppConfig};
use lazy_router::http::middleware::{AccessLogMiddleware, RequestIdMiddleware};
use lazy_router::observability::init_logging;
use lazy_router::{
    handler_fn, Handler, HandlerResult, HttpServer, Request, RequestExt, RouteGroup, Router,
    RouterError, Service, ServiceContainer,
};

#[derive(Debug, Parser)]
#[command(name = "lazy-router", version, about = "HTTP request router demo service")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

/// Shows one user; bound in the container as `users::ShowUser`.
struct ShowUser;

impl Handler for ShowUser {
    fn handle(&self, request: Request) -> HandlerResult {
        let id = request.attribute("id").unwrap_or_default();
        json(StatusCode::OK, serde_json::json!({ "id": id }))
    }
}

fn json(status: StatusCode, value: serde_json::Value) -> HandlerResult {
    let body = serde_json::to_vec(&value).map_err(RouterError::handler)?;
    Ok((status, [(header::CONTENT_TYPE, "application/json")], Bytes::from(body)).into_response())
}

fn text(body: impl Into<String>) -> Response {
    body.into().into_response()
}

fn build_container() -> ServiceContainer {
    let container = ServiceContainer::new();
    container
        .instance("request_id", Service::middleware(RequestIdMiddleware))
        .instance("access_log", Service::middleware(AccessLogMiddleware))
        .bind("users::ShowUser", || Service::handler(ShowUser));
    container
}

fn build_router(config: &AppConfig) -> Router {
    let mut router = Router::from_settings(&config.router)
        .with_container(Arc::new(build_container()));

    router.middleware("request_id").middleware("access_log");

    router.get("/", handler_fn(|_req| Ok(text("lazy-router"))));

    router.group(
        RouteGroup::new()
            .with_prefix("/users")
            .with_name_prefix("user.")
            .with_namespace("users")
            .with_pattern("id", "[0-9]+"),
        |users| {
            users.get("/{id}", "ShowUser").named("show");
        },
    );

    router
        .get(
            "/files/[{ext}]",
            handler_fn(|req| {
                let ext = req.attribute("ext").unwrap_or("none").to_string();
                Ok(text(format!("ext: {ext}")))
            }),
        )
        .named("files");

    router
        .post(
            "/echo",
            handler_fn(|req| {
                let value: serde_json::Value =
                    serde_json::from_slice(req.body()).map_err(RouterError::handler)?;
                json(StatusCode::OK, value)
            }),
        )
        .with_header("content-type", "application/json(;.*)?");

    router
        .get("/beta", handler_fn(|_req| Ok(text("beta"))))
        .without_header("x-stable-only");

    router
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!("lazy-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        base_path = %config.router.base_path,
        request_timeout_secs = config.listener.request_timeout_secs,
        "Configuration loaded"
    );

    let router = build_router(&config);
    router.validate()?;
    if let Ok(uri) = router.uri_for("user.show", [("id", "1")]) {
        tracing::debug!(example = %uri, "Named route check");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, Arc::new(router));
    server.run(listener).await?;

    tracing::info!("lazy-router shutdown complete");
    Ok(())
}

//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::openapi::openapi_json;
use super::routes::{dashboards, health, sources, users};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Serve until graceful shutdown. Returns CoreApp so the caller can
    /// finish the shutdown sequence.
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let database = app.database.clone();

        let router = Router::new()
            .route("/api/v1/health", get(health::health))
            .nest("/api/v1/users", users::routes(database.clone()))
            .nest("/api/v1/dashboards", dashboards::routes(database.clone()))
            .nest("/api/v1/sources", sources::routes(database))
            .route("/api/openapi.json", get(openapi_json))
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
            .layer(CompressionLayer::new())
            .layer(cors_layer(&app.config.server.host, port, &app.config.cors_allowed_origins))
            .layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(addr = %addr, "API server listening");

        let shutdown = app.shutdown.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

/// CORS allows the server's own origin plus configured extras
fn cors_layer(host: &str, port: u16, extra_origins: &[String]) -> CorsLayer {
    let mut origins: Vec<HeaderValue> = Vec::new();
    for origin in [
        format!("http://{}:{}", host, port),
        format!("http://localhost:{}", port),
        format!("http://127.0.0.1:{}", port),
    ] {
        if let Ok(value) = origin.parse::<HeaderValue>() {
            origins.push(value);
        }
    }
    for origin in extra_origins {
        match origin.parse::<HeaderValue>() {
            Ok(value) => origins.push(value),
            Err(_) => tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin"),
        }
    }
    origins.dedup();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static(crate::api::extractors::USER_HEADER),
        ])
}

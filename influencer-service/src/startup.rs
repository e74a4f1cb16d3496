//! Application startup and lifecycle management.

use crate::config::{CorsConfig, InfluencerConfig};
use crate::handlers::{self, influencers};
use crate::services::{init_metrics, InfluencerRepository, PgInfluencerRepository};
use crate::AppState;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::{request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
}

/// Only a CORS preflight (`Origin` plus `Access-Control-Request-Method`)
/// reaches the CORS layer as OPTIONS; any other OPTIONS request is refused.
async fn reject_plain_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let headers = request.headers();
        let is_preflight = headers.contains_key(header::ORIGIN)
            && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);
        if !is_preflight {
            return AppError::MethodNotAllowed.into_response();
        }
    }

    next.run(request).await
}

/// Build the HTTP router over the given state.
pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/api/influencers",
            get(influencers::get_influencers)
                .head(influencers::method_not_allowed)
                .fallback(influencers::method_not_allowed),
        )
        .route(
            "/api/influencers/:id/summary",
            get(influencers::get_influencer_summary)
                .head(influencers::method_not_allowed)
                .fallback(influencers::method_not_allowed),
        )
        .layer(cors_layer(cors))
        .layer(from_fn(reject_plain_options))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    repository: Arc<dyn InfluencerRepository>,
    router: Router,
}

impl Application {
    /// Connect to the database, bind the listener and build the router.
    pub async fn build(config: InfluencerConfig) -> Result<Self, AppError> {
        let repository = PgInfluencerRepository::connect(&config.database)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to connect to PostgreSQL");
                e
            })?;

        Self::with_repository(config, Arc::new(repository)).await
    }

    /// Build around an already constructed repository. Installs the metrics
    /// recorder if it is not installed yet.
    pub async fn with_repository(
        config: InfluencerConfig,
        repository: Arc<dyn InfluencerRepository>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let state = AppState::new(repository.clone(), config.service_name.clone());
        let router = build_router(state, &config.cors);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Influencer service listener bound");

        Ok(Self {
            port,
            listener,
            repository,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Handle to the repository, for closing it after the server stops.
    pub fn repository(&self) -> Arc<dyn InfluencerRepository> {
        self.repository.clone()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!(
            service = "influencer-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, self.router).await
    }
}

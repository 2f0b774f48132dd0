//! cds-server library crate
//!
//! Exposes `build_app` and `config` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

pub mod config;
mod error;
pub mod fhir;
pub mod handler;
mod middleware;
mod routes;

use std::sync::{Arc, OnceLock};

use axum::{
    Extension, Router,
    http::{HeaderName, Method, header},
    middleware as axum_mw,
    routing::get,
};
use cds_core::ServiceRegistry;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use fhir::FhirClient;
use middleware::BearerAuth;

/// State shared by every request: read-only after startup
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ServiceRegistry>,
    pub fhir: FhirClient,
}

impl AppState {
    pub fn new(registry: ServiceRegistry, fhir: FhirClient) -> Self {
        Self {
            registry: Arc::new(registry),
            fhir,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ServiceRegistry::standard(), FhirClient::new())
    }
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(state: AppState, config: &Config) -> Router {
    let auth = BearerAuth::new(config.bearer_token.clone(), config.allow_anonymous);

    // Service invocations (require auth)
    let protected_routes = routes::service_routes()
        .layer(axum_mw::from_fn(middleware::auth::auth_middleware))
        .layer(Extension(auth));

    let prometheus_handle = prometheus_handle();

    // Public routes (no auth required)
    let public_routes = routes::discovery_routes()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::render))
        .layer(Extension(prometheus_handle));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .route_layer(axum_mw::from_fn(
            middleware::metrics::route_template_middleware,
        ))
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}

/// Handle of the process-wide Prometheus recorder, installed on first use.
///
/// Every app built in the process (one per integration test) renders the
/// recorder that actually receives the metrics.
fn prometheus_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("A global metrics recorder was already installed");
            }
            handle
        })
        .clone()
}

/// CDS Hooks services must answer browser-based EHRs
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([
            header::ORIGIN,
            header::ACCEPT,
            header::CONTENT_LOCATION,
            header::LOCATION,
            HeaderName::from_static("x-requested-with"),
        ])
}

//! Prometheus metrics collection middleware
//!
//! Records `cds_requests_total` (counter) and `cds_request_duration_seconds`
//! (histogram) with method/route/status labels. The route label is the
//! matched route template (`/cds-services/{id}`), never the raw path, so
//! callers cannot mint new series.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

const UNMATCHED: &str = "unmatched";

/// Template of the route that served a request
#[derive(Clone, Debug)]
pub struct RouteTemplate(pub String);

/// Route layer: copy `MatchedPath` onto the response for `metrics_middleware`,
/// which wraps the whole router and never sees the match itself.
pub async fn route_template_middleware(request: Request, next: Next) -> Response {
    let template = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| RouteTemplate(p.as_str().to_string()));

    let mut response = next.run(request).await;
    if let Some(template) = template {
        response.extensions_mut().insert(template);
    }
    response
}

fn route_label(template: Option<&RouteTemplate>) -> String {
    template
        .map(|t| t.0.clone())
        .unwrap_or_else(|| UNMATCHED.to_string())
}

/// Middleware that records request count and duration metrics.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();
    let route = route_label(response.extensions().get::<RouteTemplate>());

    metrics::counter!(
        "cds_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);

    metrics::histogram!(
        "cds_request_duration_seconds",
        "method" => method,
        "route" => route
    )
    .record(duration);

    response
}

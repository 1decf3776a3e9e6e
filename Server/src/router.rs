//! Route table: a permissive CORS layer plus a `TraceLayer` span per
//! request, two routes total. No shared state — the error log is wired
//! into the tracing subscriber itself, not passed per-request.

use axum::http::Request;
use axum::routing::{any, get};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::instrument;

use crate::handlers::mp4_meta;

#[instrument(skip_all)]
pub fn create_router() -> Router {
    Router::new()
        .route("/api/mp4Meta", any(mp4_meta::parse_video))
        .route("/healthz", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(false))
                    .on_request(|request: &Request<axum::body::Body>, _span: &tracing::Span| {
                        tracing::info!("received request for {}", request.uri().path());
                    }),
            ),
        )
}

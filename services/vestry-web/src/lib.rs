//! Vestry Web
//!
//! HTTP service for the church membership app with session and role gating.
//!
//! ## Pages
//!
//! - `GET /` - Redirect to the dashboard or the login page
//! - `GET /login`, `GET /unauthorized` - Public pages
//! - `GET /dashboard` - Any signed-in viewer
//! - `GET /people` - Staff and above, scoped to the viewer's church
//! - `GET /profile`, `PUT /profile` - The viewer's own profile
//!
//! ## API
//!
//! - `POST /api/session` - Exchange an ID token for the gate cookie
//! - `DELETE /api/session` - Clear the gate cookie
//!
//! ## Health Endpoints
//!
//! - `GET /api/health` - Liveness probe
//! - `GET /api/ready` - Readiness probe
//! - `GET /api/metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use vestry_axum::{EdgeGateLayer, SessionLayer};

pub use config::{Config, ConfigError};
pub use state::AppState;

/// Build the HTTP router.
///
/// Gated routes sit behind the edge gate and session resolution. Health and
/// metrics routes skip both, along with the request timeout.
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let session_layer = SessionLayer::new(Arc::clone(&state.id_tokens), Arc::clone(&state.profiles))
        .with_cookie_verifier(state.cookie_verifier())
        .cookie_name(state.cookie.name.clone());
    let edge_layer = EdgeGateLayer::new(state.edge_gate());

    let gated = Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login))
        .route("/unauthorized", get(handlers::unauthorized))
        .route("/dashboard", get(handlers::dashboard))
        .route("/people", get(handlers::people))
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route(
            "/api/session",
            axum::routing::post(handlers::create_session).delete(handlers::delete_session),
        )
        // Edge gate runs first, then session resolution
        .layer(session_layer)
        .layer(edge_layer);

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/ready", get(handlers::ready));

    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/api/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(state.request_timeout));

    Router::new()
        .merge(gated)
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}

/// Install the Prometheus recorder and describe the service's metrics
pub fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!(
        "vestry_edge_decisions_total",
        "Edge gate decisions by outcome"
    );
    metrics::describe_counter!(
        "vestry_sessions_created_total",
        "Gate cookies issued for verified ID tokens"
    );
    metrics::describe_counter!(
        "vestry_profile_updates_total",
        "Profile edits saved"
    );

    Ok(handle)
}

//! REST API for the feedback triage service.
//!
//! Exposes endpoints for starting analysis workflows, polling their status,
//! and running synchronous analysis.

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::ApiState;

/// Build the API router with all routes
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/metrics", get(routes::metrics::metrics))
        .route("/analyze-feedback", post(routes::analyze::analyze_feedback))
        .route("/workflow/start", post(routes::workflow::start_workflow))
        .route(
            "/workflow/:id/status",
            get(routes::workflow::workflow_status),
        )
        .route(
            "/workflow/:id/cancel",
            post(routes::workflow::cancel_workflow),
        )
        .route("/jira/post-comment", post(routes::jira::post_comment))
        .route(
            "/openapi.json",
            get(|| async { Json(<ApiDoc as utoipa::OpenApi>::openapi()) }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the REST API server
pub async fn serve(state: ApiState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("REST API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

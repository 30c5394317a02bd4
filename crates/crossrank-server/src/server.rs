use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use crossrank_rerank::{RerankRequest, RerankResponse, Reranker, Scorer};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    reranker: Reranker,
}

impl AppState {
    pub fn new(scorer: Arc<dyn Scorer>, max_length: usize) -> Self {
        Self {
            reranker: Reranker::new(scorer).with_max_length(max_length),
        }
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn rerank_documents(
    State(state): State<AppState>,
    payload: Result<Json<RerankRequest>, JsonRejection>,
) -> Result<Json<RerankResponse>, ApiError> {
    let Json(request) = payload.inspect_err(|rejection| {
        tracing::warn!(status = %rejection.status(), "rejected rerank body: {}", rejection.body_text());
    })?;
    let response = state.reranker.rerank(request).await?;
    Ok(Json(response))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/rerank", post(rerank_documents))
        .route("/healthz", get(health_check))
        .route("/health", get(health_check))
        .with_state(state)
}

pub async fn serve(config: &ServerConfig, scorer: Arc<dyn Scorer>) -> Result<()> {
    let app = router(AppState::new(scorer, config.max_length));
    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("crossrank listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("shutdown signal received"),
                Err(err) => tracing::warn!("failed to listen for ctrl-c, shutting down: {err}"),
            }
        })
        .await?;
    Ok(())
}

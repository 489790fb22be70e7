use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use std::any::Any;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::extractors::extract_video_id;
use crate::transcribe::{TranscriptPipeline, TranscriptResponse};

pub mod error;

pub use error::{ApiError, ApiResult};

/// Shared by every request; holds no per-request data
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<TranscriptPipeline>,
}

impl AppState {
    pub fn new(pipeline: TranscriptPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Inbound request body
#[derive(Debug, Deserialize)]
pub struct TranscriptRequest {
    pub url: String,
}

/// Build the application router with tracing and panic isolation
pub fn router(state: AppState, route: &str) -> Router {
    Router::new()
        .route(route, post(handle_transcript_request))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    path = %request.uri().path()
                )
            }),
        )
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: &Config) -> Result<()> {
    let pipeline = TranscriptPipeline::new(&config.upstream)?;
    let app = router(AppState::new(pipeline), &config.server.route);

    let listener = TcpListener::bind((config.server.address.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!("Failed to bind {}:{}", config.server.address, config.server.port)
        })?;
    tracing::info!(
        "Listening on {} (POST {})",
        listener.local_addr()?,
        config.server.route
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down..."),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}

// The body is parsed by hand so a missing content type is not rejected early
async fn handle_transcript_request(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<TranscriptResponse>> {
    let body = body.map_err(|rejection| {
        tracing::error!("Request error: {}", rejection.body_text());
        ApiError::unexpected(Some(rejection.body_text()))
    })?;

    let request: TranscriptRequest = serde_json::from_slice(&body).map_err(|err| {
        tracing::error!("Request error: {}", err);
        ApiError::from(err)
    })?;

    let video_id = extract_video_id(&request.url).ok_or_else(ApiError::invalid_url)?;
    tracing::info!(video_id = %video_id, "Fetching transcript for video");

    let transcript = state
        .pipeline
        .fetch_transcript(&video_id)
        .await
        .map_err(|err| {
            tracing::error!(video_id = %video_id, "Transcript error: {}", err);
            ApiError::pipeline(&err, &video_id)
        })?;

    Ok(Json(TranscriptResponse {
        video_id: video_id.to_string(),
        video_url: request.url,
        transcript,
    }))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()));
    tracing::error!("Handler panicked: {}", detail.as_deref().unwrap_or("unknown"));

    ApiError::unexpected(None).into_response()
}

use std::path::Path;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use clipwall_library::{index_videos, resolve_video, ResolvedVideo, VideoEntry, VideoRoot};
use clipwall_stream::{content_type_for, open_span, RangeRequest, ServePlan};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, info};

use crate::error::{ApiError, PlainText};

#[derive(Clone)]
pub struct AppState {
    pub root: VideoRoot,
}

pub fn build_router(state: AppState, public_dir: &Path) -> Router {
    let cors = CorsLayer::permissive();
    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/api/videos", get(list_videos))
        .route("/api/set-root", post(set_root))
        .route("/stream", get(stream_video))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
        .layer(cors)
}

#[derive(Debug, Serialize)]
struct VideoListing {
    root: String,
    count: usize,
    videos: Vec<VideoEntry>,
}

async fn list_videos(State(state): State<AppState>) -> Result<Json<VideoListing>, ApiError> {
    let root = state.root.current().await;
    let videos = index_videos(&root)
        .await
        .map_err(|err| ApiError::server("Failed to list videos", err))?;

    debug!(root = %root.display(), count = videos.len(), "listed videos");
    Ok(Json(VideoListing {
        root: root.display().to_string(),
        count: videos.len(),
        videos,
    }))
}

/// Accepts `newRoot`, `root` or `path`; the first non-empty one wins.
#[derive(Debug, Deserialize)]
struct SetRootInput {
    #[serde(rename = "newRoot")]
    new_root: Option<String>,
    root: Option<String>,
    path: Option<String>,
}

impl SetRootInput {
    fn candidate(self) -> Option<String> {
        [self.new_root, self.root, self.path]
            .into_iter()
            .flatten()
            .find(|raw| !raw.is_empty())
    }
}

#[derive(Debug, Serialize)]
struct SetRootOutput {
    ok: bool,
    root: String,
    count: usize,
}

async fn set_root(
    State(state): State<AppState>,
    input: Result<Json<SetRootInput>, JsonRejection>,
) -> Result<Json<SetRootOutput>, ApiError> {
    let candidate = input
        .ok()
        .and_then(|Json(input)| input.candidate())
        .ok_or(ApiError::ClientInput("newRoot is required"))?;

    let change = state.root.set(&candidate).await?;
    info!(root = %change.root.display(), count = change.count, "serving videos from new root");

    Ok(Json(SetRootOutput {
        ok: true,
        root: change.root.display().to_string(),
        count: change.count,
    }))
}

#[derive(Debug, Deserialize)]
struct StreamParams {
    p: Option<String>,
}

async fn stream_video(
    State(state): State<AppState>,
    Query(params): Query<StreamParams>,
    headers: HeaderMap,
) -> Result<Response, PlainText> {
    let root = state.root.current().await;
    let rel = params.p.unwrap_or_default();
    let video = resolve_video(&root, &rel).await.map_err(ApiError::from)?;

    let range_header = headers.get(header::RANGE).and_then(|value| value.to_str().ok());
    let range = RangeRequest::parse(range_header);
    if range == RangeRequest::Malformed {
        debug!(header = ?range_header, "malformed range header, serving full file");
    }

    Ok(serve_video(&video, range.plan(video.size)).await?)
}

async fn serve_video(video: &ResolvedVideo, plan: ServePlan) -> Result<Response, ApiError> {
    let (status, span) = match plan {
        ServePlan::Full(span) => (StatusCode::OK, span),
        ServePlan::Partial(span) => (StatusCode::PARTIAL_CONTENT, span),
        ServePlan::Unsatisfiable { total } => return Err(ApiError::RangeNotSatisfiable { total }),
    };

    let body = open_span(&video.path, span)
        .await
        .map_err(|err| ApiError::server("Failed to open video", err))?;

    let mut response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type_for(&video.path))
        .header(header::CONTENT_LENGTH, span.len)
        .header(header::ACCEPT_RANGES, "bytes");
    if status == StatusCode::PARTIAL_CONTENT {
        response = response.header(header::CONTENT_RANGE, span.content_range());
    }

    response
        .body(Body::from_stream(body))
        .map_err(|err| ApiError::server("Failed to build stream response", err))
}

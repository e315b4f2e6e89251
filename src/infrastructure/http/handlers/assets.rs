//! Asset HTTP Handler - 本地可播放媒体流式下载

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::ports::SceneKey;

use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 下载分镜的本地可播放视频
///
/// 句柄缺失时返回 404；重载场景应先调用 hydrate（启动时自动执行）。
pub async fn download_scene_asset(
    State(state): State<Arc<AppState>>,
    Path((episode_id, scene_id)): Path<(u32, u32)>,
) -> Result<Response, ApiError> {
    let key = SceneKey::new(episode_id, scene_id);
    let path = state
        .media
        .playable_path(key)
        .ok_or_else(|| ApiError::NotFound(format!("No playable media for scene {}", key)))?;

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open media file: {}", e)))?;
    let file_size = file
        .metadata()
        .await
        .map(|m| m.len())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_LENGTH, file_size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}.mp4\"", key),
        )
        .body(body)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

//! Scene HTTP Handlers - 分镜媒体生命周期
//!
//! 图像生成同步等待（秒级）；视频合成/扩展是分钟级长任务，
//! 接口立即返回，进度与状态经 /ws/events 推送。
//! 媒体操作只在 VISUALIZE 阶段可用。

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::ports::SceneKey;
use crate::application::{Phase, SceneMediaState};
use crate::domain::story::ImageSize;

use super::require_phase;
use crate::infrastructure::http::dto::{ApiResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SceneRequest {
    pub episode_id: u32,
    pub scene_id: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    pub episode_id: u32,
    pub scene_id: u32,
    #[serde(default)]
    pub size: ImageSize,
}

#[derive(Debug, Serialize)]
pub struct SceneStateResponse {
    pub episode_id: u32,
    pub scene_id: u32,
    #[serde(flatten)]
    pub media: SceneMediaState,
    pub has_playable: bool,
}

impl SceneStateResponse {
    async fn build(state: &AppState, key: SceneKey) -> Self {
        Self {
            episode_id: key.episode,
            scene_id: key.scene,
            media: state.media.state(key).await,
            has_playable: state.media.playable_path(key).is_some(),
        }
    }
}

fn key_of(episode_id: u32, scene_id: u32) -> SceneKey {
    SceneKey::new(episode_id, scene_id)
}

/// 生成分镜图像（同步等待结果）
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateImageRequest>,
) -> Result<Json<ApiResponse<SceneStateResponse>>, ApiError> {
    require_phase(&state, Phase::Visualize).await?;
    let key = key_of(req.episode_id, req.scene_id);
    state.media.generate_image(key, req.size).await?;
    Ok(Json(ApiResponse::success(
        SceneStateResponse::build(&state, key).await,
    )))
}

/// 合成分镜视频（长任务，立即返回）
pub async fn generate_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SceneRequest>,
) -> Result<Json<ApiResponse<SceneStateResponse>>, ApiError> {
    require_phase(&state, Phase::Visualize).await?;
    let key = key_of(req.episode_id, req.scene_id);
    ensure_dispatchable(&state, key).await?;

    let media = state.media.clone();
    tokio::spawn(async move {
        if let Err(e) = media.generate_video(key).await {
            tracing::debug!(%key, error = %e, "Video generation task finished with error");
        }
    });

    Ok(Json(ApiResponse::success(
        SceneStateResponse::build(&state, key).await,
    )))
}

/// 扩展分镜视频（长任务，立即返回；每分镜仅一次）
pub async fn extend_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SceneRequest>,
) -> Result<Json<ApiResponse<SceneStateResponse>>, ApiError> {
    require_phase(&state, Phase::Visualize).await?;
    let key = key_of(req.episode_id, req.scene_id);

    // 可扩展性在调度前校验，违规立即报错而不是丢进后台
    match state.media.state(key).await {
        SceneMediaState::VideoReady { extended: false } => {}
        SceneMediaState::VideoReady { extended: true } => {
            return Err(ApiError::BadRequest(format!(
                "Scene {} video already extended",
                key
            )));
        }
        other => {
            return Err(ApiError::Conflict(format!(
                "Scene {} is {}, no extendable video",
                key,
                other.label()
            )));
        }
    }

    let media = state.media.clone();
    tokio::spawn(async move {
        if let Err(e) = media.extend_video(key).await {
            tracing::debug!(%key, error = %e, "Video extension task finished with error");
        }
    });

    Ok(Json(ApiResponse::success(
        SceneStateResponse::build(&state, key).await,
    )))
}

/// 清除分镜的所有生成媒体
pub async fn clear_scene_assets(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SceneRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    require_phase(&state, Phase::Visualize).await?;
    state
        .media
        .clear_assets(key_of(req.episode_id, req.scene_id))
        .await?;
    Ok(Json(ApiResponse::ok()))
}

/// 驳回分镜错误态
pub async fn dismiss_scene_error(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SceneRequest>,
) -> Result<Json<ApiResponse<SceneStateResponse>>, ApiError> {
    let key = key_of(req.episode_id, req.scene_id);
    state.media.dismiss_error(key).await?;
    Ok(Json(ApiResponse::success(
        SceneStateResponse::build(&state, key).await,
    )))
}

/// 按上次失败的操作重试（长任务可能在后台继续）
pub async fn retry_scene(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SceneRequest>,
) -> Result<Json<ApiResponse<SceneStateResponse>>, ApiError> {
    require_phase(&state, Phase::Visualize).await?;
    let key = key_of(req.episode_id, req.scene_id);

    match state.media.state(key).await {
        SceneMediaState::Error { .. } => {}
        other => {
            return Err(ApiError::Conflict(format!(
                "Scene {} is {}, nothing to retry",
                key,
                other.label()
            )));
        }
    }

    let media = state.media.clone();
    tokio::spawn(async move {
        if let Err(e) = media.retry(key).await {
            tracing::debug!(%key, error = %e, "Retry task finished with error");
        }
    });

    Ok(Json(ApiResponse::success(
        SceneStateResponse::build(&state, key).await,
    )))
}

/// 查询分镜媒体状态
pub async fn scene_state(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SceneRequest>,
) -> Json<ApiResponse<SceneStateResponse>> {
    let key = key_of(req.episode_id, req.scene_id);
    Json(ApiResponse::success(
        SceneStateResponse::build(&state, key).await,
    ))
}

/// 调度前校验：分镜存在且没有进行中的任务
async fn ensure_dispatchable(state: &AppState, key: SceneKey) -> Result<(), ApiError> {
    if state
        .store
        .committed()
        .await
        .scene(key.episode, key.scene)
        .is_none()
    {
        return Err(ApiError::NotFound(format!("Scene not found: {}", key)));
    }
    if state.media.state(key).await.is_loading() {
        return Err(ApiError::Conflict(format!(
            "Scene {} media operation in progress",
            key
        )));
    }
    Ok(())
}

//! Story HTTP Handlers - 故事板草稿编辑、提交与 AI 润色/导入
//!
//! 草稿编辑类操作只在 FORGE 阶段可用。

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::ports::{EventSinkPort, WorkflowEvent};
use crate::application::{Phase, RefineTarget};
use crate::domain::story::{Episode, EpisodeField, Lore, LorePatch, SceneField};

use super::require_phase;
use crate::infrastructure::http::dto::{ApiResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

/// 故事板草稿视图
#[derive(Debug, Serialize)]
pub struct StoryView {
    pub phase: String,
    pub dirty: bool,
    pub selected_index: usize,
    pub lore: Lore,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Deserialize)]
pub struct EditEpisodeRequest {
    pub episode_id: u32,
    pub field: EpisodeField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct EditSceneRequest {
    pub episode_id: u32,
    pub scene_id: u32,
    pub field: SceneField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteEpisodeRequest {
    pub episode_id: u32,
}

#[derive(Debug, Deserialize)]
pub struct SelectEpisodeRequest {
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct AddEpisodeResponse {
    pub episode_id: u32,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    /// false 表示草稿未偏离，提交为 no-op
    pub committed: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    #[serde(flatten)]
    pub target: RefineTarget,
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct RefineResponse {
    pub text: String,
    pub refined: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefineAllRequest {
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub text: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// 获取故事板草稿视图
pub async fn get_story(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StoryView>> {
    let draft = state.store.draft().await;
    let view = StoryView {
        phase: state.phase.current().await.as_str().to_string(),
        dirty: state.store.dirty().await,
        selected_index: state.store.selected_index().await,
        lore: draft.lore().clone(),
        episodes: draft.episodes().to_vec(),
    };
    Json(ApiResponse::success(view))
}

/// 编辑世界观字段
pub async fn edit_lore(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<LorePatch>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    require_phase(&state, Phase::Forge).await?;
    state.store.edit_lore(&patch).await;
    Ok(Json(ApiResponse::ok()))
}

/// 编辑章节字段
pub async fn edit_episode(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EditEpisodeRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    require_phase(&state, Phase::Forge).await?;
    state
        .store
        .edit_episode_field(req.episode_id, req.field, req.value)
        .await?;
    Ok(Json(ApiResponse::ok()))
}

/// 编辑分镜字段
pub async fn edit_scene(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EditSceneRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    require_phase(&state, Phase::Forge).await?;
    state
        .store
        .edit_scene_field(req.episode_id, req.scene_id, req.field, req.value)
        .await?;
    Ok(Json(ApiResponse::ok()))
}

/// 追加新章节
pub async fn add_episode(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<AddEpisodeResponse>>, ApiError> {
    require_phase(&state, Phase::Forge).await?;
    let episode_id = state.store.add_episode().await;
    Ok(Json(ApiResponse::success(AddEpisodeResponse { episode_id })))
}

/// 删除章节（最后一章不可删除）
pub async fn delete_episode(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteEpisodeRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    require_phase(&state, Phase::Forge).await?;
    state.store.delete_episode(req.episode_id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// 切换当前选中章节
pub async fn select_episode(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectEpisodeRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.store.select_episode(req.index).await?;
    Ok(Json(ApiResponse::ok()))
}

/// 提交草稿
pub async fn commit(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CommitResponse>>, ApiError> {
    require_phase(&state, Phase::Forge).await?;
    let committed = state.store.commit().await?;
    if committed {
        let episode_count = state.store.committed().await.episode_count();
        state
            .event_publisher
            .publish(WorkflowEvent::StoryCommitted { episode_count });
    }
    Ok(Json(ApiResponse::success(CommitResponse { committed })))
}

/// 放弃草稿
pub async fn discard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    require_phase(&state, Phase::Forge).await?;
    state.store.discard().await;
    Ok(Json(ApiResponse::ok()))
}

/// 润色单个字段
pub async fn refine_field(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefineRequest>,
) -> Result<Json<ApiResponse<RefineResponse>>, ApiError> {
    require_phase(&state, Phase::Forge).await?;
    let outcome = state.refine.refine_field(req.target, &req.feedback).await?;
    Ok(Json(ApiResponse::success(RefineResponse {
        text: outcome.text,
        refined: outcome.refined,
    })))
}

/// 全局润色整个故事板
pub async fn refine_all(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefineAllRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    require_phase(&state, Phase::Forge).await?;
    state.refine.refine_all(&req.feedback).await?;
    Ok(Json(ApiResponse::ok()))
}

/// 从原始文档提取故事板结构
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    require_phase(&state, Phase::Forge).await?;
    state.refine.ingest(&req.text).await?;
    Ok(Json(ApiResponse::ok()))
}

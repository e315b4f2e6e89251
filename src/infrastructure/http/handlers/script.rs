//! Script HTTP Handlers - 章节剧本合成评审流
//!
//! 合成是长任务：接口立即返回，状态变化经 /ws/events 推送。
//! 剧本操作只在 ARCHITECT 阶段可用。

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{Phase, ScriptState};

use super::require_phase;
use crate::infrastructure::http::dto::{ApiResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EpisodeRequest {
    pub episode_id: u32,
}

#[derive(Debug, Serialize)]
pub struct ScriptStateResponse {
    pub episode_id: u32,
    pub state: &'static str,
}

/// 启动章节剧本合成
///
/// 立即返回 synthesizing；完成或失败经 WebSocket 通知。
pub async fn synthesize_script(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EpisodeRequest>,
) -> Result<Json<ApiResponse<ScriptStateResponse>>, ApiError> {
    require_phase(&state, Phase::Architect).await?;

    if state.store.committed_episode(req.episode_id).await.is_none() {
        return Err(ApiError::NotFound(format!(
            "Episode not found: {}",
            req.episode_id
        )));
    }
    if state.script.state(req.episode_id) != ScriptState::Idle {
        return Err(ApiError::Conflict(format!(
            "Episode {} script is {}",
            req.episode_id,
            state.script.state(req.episode_id).as_str()
        )));
    }

    let script = state.script.clone();
    let episode_id = req.episode_id;
    tokio::spawn(async move {
        // 失败已经过事件端口上报，这里只兜底记录
        if let Err(e) = script.synthesize(episode_id).await {
            tracing::debug!(episode_id, error = %e, "Script synthesis task finished with error");
        }
    });

    Ok(Json(ApiResponse::success(ScriptStateResponse {
        episode_id: req.episode_id,
        state: ScriptState::Synthesizing.as_str(),
    })))
}

/// 保存评审中的剧本草稿
pub async fn save_script(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EpisodeRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    require_phase(&state, Phase::Architect).await?;
    state.script.save_draft(req.episode_id)?;
    Ok(Json(ApiResponse::ok()))
}

/// 取消评审中的剧本草稿，恢复合成前分镜
pub async fn cancel_script(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EpisodeRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    require_phase(&state, Phase::Architect).await?;
    state.script.cancel_draft(req.episode_id).await?;
    Ok(Json(ApiResponse::ok()))
}

/// 查询章节剧本合成状态
pub async fn script_state(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EpisodeRequest>,
) -> Json<ApiResponse<ScriptStateResponse>> {
    Json(ApiResponse::success(ScriptStateResponse {
        episode_id: req.episode_id,
        state: state.script.state(req.episode_id).as_str(),
    }))
}

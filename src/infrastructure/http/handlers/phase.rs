//! Phase HTTP Handlers - 阶段查询与导航

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{NavigateOutcome, Phase};

use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Serialize)]
pub struct PhaseResponse {
    pub phase: String,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub target: Phase,
    /// None 表示尚未应答守卫提示
    #[serde(default)]
    pub confirm: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    pub outcome: &'static str,
    pub phase: String,
}

/// 查询当前阶段
pub async fn get_phase(State(state): State<Arc<AppState>>) -> Json<ApiResponse<PhaseResponse>> {
    Json(ApiResponse::success(PhaseResponse {
        phase: state.phase.current().await.as_str().to_string(),
    }))
}

/// 导航到目标阶段
///
/// 草稿偏离时离开 FORGE 需要 confirm 应答；ARCHITECT 的剧本草稿
/// 静默回退，不需要确认。
pub async fn navigate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<ApiResponse<NavigateResponse>>, ApiError> {
    let outcome = state.phase.navigate(req.target, req.confirm).await;
    let label = match outcome {
        NavigateOutcome::Moved => "moved",
        NavigateOutcome::ConfirmationRequired => "confirmation_required",
        NavigateOutcome::Declined => "declined",
    };
    Ok(Json(ApiResponse::success(NavigateResponse {
        outcome: label,
        phase: state.phase.current().await.as_str().to_string(),
    })))
}

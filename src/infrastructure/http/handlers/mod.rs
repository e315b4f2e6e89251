//! HTTP Handlers

mod assets;
mod phase;
mod ping;
mod scene;
mod script;
mod story;
mod websocket;

pub use assets::*;
pub use phase::*;
pub use ping::*;
pub use scene::*;
pub use script::*;
pub use story::*;
pub use websocket::*;

use crate::application::Phase as WorkflowPhase;

use super::error::ApiError;
use super::state::AppState;

/// 校验当前阶段，操作只在其所属阶段可用
pub(crate) async fn require_phase(
    state: &AppState,
    expected: WorkflowPhase,
) -> Result<(), ApiError> {
    let current = state.phase.current().await;
    if current != expected {
        return Err(ApiError::Conflict(format!(
            "Operation requires {} phase, current phase is {}",
            expected.as_str(),
            current.as_str()
        )));
    }
    Ok(())
}

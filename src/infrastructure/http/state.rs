//! Application State
//!
//! HTTP 层共享的应用服务集合

use std::sync::Arc;

use crate::application::{
    DraftCommitStore, PhaseController, RefineService, SceneMediaLifecycle,
    ScriptSynthesisWorkflow,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    pub store: Arc<DraftCommitStore>,
    pub phase: Arc<PhaseController>,
    pub script: Arc<ScriptSynthesisWorkflow>,
    pub media: Arc<SceneMediaLifecycle>,
    pub refine: Arc<RefineService>,
    pub event_publisher: Arc<EventPublisher>,
}

impl AppState {
    pub fn new(
        store: Arc<DraftCommitStore>,
        phase: Arc<PhaseController>,
        script: Arc<ScriptSynthesisWorkflow>,
        media: Arc<SceneMediaLifecycle>,
        refine: Arc<RefineService>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            store,
            phase,
            script,
            media,
            refine,
            event_publisher,
        }
    }
}

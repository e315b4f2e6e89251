//! Event Sink Port - 工作流事件出站端口
//!
//! 工作流状态变化与长任务进度通过该端口对外广播，
//! 具体实现在 infrastructure/events 层（WebSocket 推送）。

use serde::{Deserialize, Serialize};

/// 工作流事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WorkflowEvent {
    /// 阶段切换
    PhaseChanged { phase: String },
    /// 故事板已提交持久化
    StoryCommitted { episode_count: usize },
    /// 剧本合成状态变更
    ScriptState {
        episode_id: u32,
        state: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// 分镜媒体状态变更
    SceneMedia {
        episode_id: u32,
        scene_id: u32,
        state: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// 分镜视频任务进度（每次轮询一条）
    SceneProgress {
        episode_id: u32,
        scene_id: u32,
        progress: String,
    },
}

/// Event Sink Port
pub trait EventSinkPort: Send + Sync {
    /// 广播事件（无订阅者时静默丢弃）
    fn publish(&self, event: WorkflowEvent);
}

/// 测试与无界面场景用的空实现
#[derive(Debug, Default)]
pub struct NullEventSink;

impl EventSinkPort for NullEventSink {
    fn publish(&self, _event: WorkflowEvent) {}
}

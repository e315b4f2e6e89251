//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（GenerationPort、StoryStorePort、EventSinkPort 等）
//! - store: 双缓冲故事板状态（草稿/权威）
//! - phase: 三阶段导航状态机
//! - script: 章节剧本合成评审流
//! - media: 分镜媒体生命周期
//! - refine: AI 文本润色与导入
//! - error: 应用层错误定义

pub mod error;
pub mod media;
pub mod phase;
pub mod ports;
pub mod refine;
pub mod script;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use error::ApplicationError;

pub use media::{FailedOp, SceneMediaLifecycle, SceneMediaState};
pub use phase::{GuardBehavior, GuardPolicy, NavigateOutcome, Phase, PhaseController};
pub use refine::{RefineOutcome, RefineService, RefineTarget};
pub use script::{ScriptState, ScriptSynthesisWorkflow};
pub use store::DraftCommitStore;

pub use ports::{
    // Events
    EventSinkPort,
    NullEventSink,
    WorkflowEvent,
    // Generation
    GenerationError,
    GenerationPort,
    ProgressSink,
    StoryIntel,
    VideoOutput,
    // Media storage
    MediaStoreError,
    MediaStorePort,
    // Playable registry
    PlayableRegistryPort,
    SceneKey,
    // Story store
    StoreError,
    StoryStorePort,
};

//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod events;
mod generation;
mod media_store;
mod playable;
mod story_store;

pub use events::{EventSinkPort, NullEventSink, WorkflowEvent};
pub use generation::{
    GenerationError, GenerationPort, ProgressSink, StoryIntel, VideoOutput,
};
pub use media_store::{MediaStoreError, MediaStorePort};
pub use playable::{PlayableRegistryPort, SceneKey};
pub use story_store::{StoreError, StoryStorePort};

//! Events - 工作流事件分发

mod publisher;

pub use publisher::EventPublisher;

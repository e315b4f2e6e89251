//! Memory Layer - In-Memory State Management
//!
//! 会话级内存状态：本地可播放句柄注册表

mod playable;

pub use playable::InMemoryPlayableRegistry;

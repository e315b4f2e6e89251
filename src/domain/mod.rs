//! Domain Layer - 领域层
//!
//! 单一限界上下文:
//! - Story Context: 故事板管理（Lore + Episode + Scene）

pub mod story;

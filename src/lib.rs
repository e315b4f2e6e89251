//! Gridboard - AI 漫画故事板创作系统
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Story Context: 故事板限界上下文（Lore / Episode / Scene）
//!
//! 应用层 (application/):
//! - Ports: 端口定义（GenerationPort, StoryStorePort, MediaStorePort,
//!   PlayableRegistryPort, EventSinkPort）
//! - Store: 双缓冲故事板状态（草稿/权威）
//! - Phase: 三阶段导航状态机（FORGE/ARCHITECT/VISUALIZE）
//! - Script: 章节剧本合成评审流
//! - Media: 分镜媒体生命周期
//! - Refine: AI 文本润色与导入
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Memory: 可播放句柄注册表
//! - Persistence: Sled 存储
//! - Adapters: 生成模型客户端、媒体文件存储
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

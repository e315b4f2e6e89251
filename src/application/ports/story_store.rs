//! Story Store Port - 出站端口
//!
//! 定义故事板持久化的抽象接口（两个固定键下的 KV 整体覆写）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::story::{Episode, Lore};

/// 持久化错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Story Store Port
///
/// 提交时整体覆写，启动时整体加载；数据缺失或不可解析时由调用方回退默认值。
#[async_trait]
pub trait StoryStorePort: Send + Sync {
    /// 加载已持久化的故事板，不存在时返回 None
    async fn load(&self) -> Result<Option<(Lore, Vec<Episode>)>, StoreError>;

    /// 整体覆写持久化状态
    ///
    /// 必须原子成功或失败，失败时已持久化数据保持不变。
    async fn save(&self, lore: &Lore, episodes: &[Episode]) -> Result<(), StoreError>;
}

//! Media Store Port - 出站端口
//!
//! 定义本地可播放媒体文件存储的抽象接口

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use super::SceneKey;

/// 媒体存储错误
#[derive(Debug, Error)]
pub enum MediaStoreError {
    #[error("Media file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Media Store Port
///
/// 下载的视频字节落盘为本地可播放文件；文件按分镜身份命名，
/// 被替换或清除时删除（句柄回收）。
#[async_trait]
pub trait MediaStorePort: Send + Sync {
    /// 分镜媒体文件路径
    fn media_path(&self, key: SceneKey) -> PathBuf;

    /// 写入媒体字节，返回落盘路径
    async fn save_media(&self, key: SceneKey, data: &[u8]) -> Result<PathBuf, MediaStoreError>;

    /// 删除媒体文件（不存在时为 no-op）
    async fn delete_media(&self, key: SceneKey) -> Result<(), MediaStoreError>;

    /// 媒体文件是否存在
    async fn media_exists(&self, key: SceneKey) -> bool;
}

//! Generation Port - 外部生成模型抽象
//!
//! 定义文本润色、图像生成、剧本合成与视频合成/扩展的抽象接口，
//! 具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::story::{Episode, ImageSize, Lore, Scene};

/// 生成错误
///
/// 所有外部生成失败都收敛到这套分类，由工作流边界转换为用户可见消息。
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// 凭证缺失或已过期（需要重新选择 API Key）
    #[error("API Key invalid or not found. Please re-select.")]
    Credential,

    /// 访问被拒（例如未开通付费项目）
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// 服务端已产出，客户端下载失败
    #[error("Asset download failed: {0}")]
    Transfer(String),

    /// 请求超时
    #[error("Request timeout")]
    Timeout,

    /// 网络错误
    #[error("Network error: {0}")]
    Network(String),

    /// 生成任务运行但无可用产出，或未分类错误
    #[error("Generation failed: {0}")]
    Failed(String),
}

/// 长任务进度回调（每次轮询产生一条进度文本）
pub type ProgressSink = Arc<dyn Fn(&str) + Send + Sync>;

/// 视频生成/扩展产出
#[derive(Debug, Clone)]
pub struct VideoOutput {
    /// 视频字节（已下载）
    pub data: Vec<u8>,
    /// 远端资产引用（可持久化，供续播/扩展使用）
    pub asset_ref: String,
}

/// AI 导入 / 全局润色产出
#[derive(Debug, Clone)]
pub struct StoryIntel {
    pub lore: Lore,
    pub episodes: Vec<Episode>,
}

/// Generation Port
///
/// 外部生成模型服务的抽象接口
#[async_trait]
pub trait GenerationPort: Send + Sync {
    /// 润色单个文本字段
    ///
    /// label 标识字段用途，context 携带世界观/章节背景。
    async fn refine_text(
        &self,
        label: &str,
        current: &str,
        feedback: &str,
        context: &str,
    ) -> Result<String, GenerationError>;

    /// 生成分镜图像
    ///
    /// 软失败（无产出）返回 Ok(None)，硬失败返回分类错误。
    async fn generate_frame(
        &self,
        visual: &str,
        description: &str,
        size: ImageSize,
    ) -> Result<Option<String>, GenerationError>;

    /// 为单个章节合成完整分镜剧本
    ///
    /// 失败或无产出时返回空列表由调用方判定。
    async fn generate_chapter_script(
        &self,
        lore: &Lore,
        episode: &Episode,
    ) -> Result<Vec<Scene>, GenerationError>;

    /// 生成分镜视频（提交 → 轮询 → 下载）
    ///
    /// 每次轮询通过 progress 上报进度文本，可能持续数分钟。
    async fn generate_video(
        &self,
        visual: &str,
        description: &str,
        progress: ProgressSink,
    ) -> Result<VideoOutput, GenerationError>;

    /// 扩展已有视频时长（同样的轮询协议，以资产引用为续作输入）
    async fn extend_video(
        &self,
        asset_ref: &str,
        progress: ProgressSink,
    ) -> Result<VideoOutput, GenerationError>;

    /// 按资产引用重新下载媒体字节（重载后恢复本地可播放句柄）
    async fn resolve_asset(&self, asset_ref: &str) -> Result<Vec<u8>, GenerationError>;

    /// 按反馈对整个故事板做全局润色
    async fn bulk_refine(
        &self,
        lore: &Lore,
        episodes: &[Episode],
        feedback: &str,
    ) -> Result<StoryIntel, GenerationError>;

    /// 从原始文档中提取世界观与章节结构
    async fn ingest_story_intel(&self, raw_text: &str) -> Result<StoryIntel, GenerationError>;

    /// 是否已配置可用凭证
    async fn check_api_key(&self) -> bool;
}

//! Scene Media Lifecycle - 分镜媒体生命周期
//!
//! 每个分镜独立经历 图像生成 → 视频合成 → 视频扩展 的生命周期。
//! 生命周期状态只存差异项：无记录的分镜按权威副本中的媒体存在性
//! 推导基线状态（视频 > 图像 > 空）。

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::domain::story::ImageSize;

use super::error::ApplicationError;
use super::ports::{
    EventSinkPort, GenerationError, GenerationPort, MediaStorePort, PlayableRegistryPort,
    ProgressSink, SceneKey, WorkflowEvent,
};
use super::store::DraftCommitStore;

/// 生成失败的通用用户可见消息（网络/未分类错误统一收敛到这一条）
const GENERATION_UNAVAILABLE: &str = "AI generation unavailable. Check your connection or API key.";

/// 图像软失败（接口正常返回但无产出）
const IMAGE_EMPTY: &str = "Failed to generate image.";

/// 失败的操作（错误态携带，供重试分派）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum FailedOp {
    /// 图像生成（记录原始尺寸，重试时沿用）
    Image { size: ImageSize },
    /// 视频合成
    Video,
    /// 视频扩展
    Extend,
    /// 重载后按资产引用恢复本地句柄
    Hydrate,
}

/// 分镜媒体状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum SceneMediaState {
    /// 无任何生成媒体
    Empty,
    /// 图像生成中
    ImageLoading,
    /// 视频合成中
    VideoLoading,
    /// 视频扩展中
    ExtendLoading,
    /// 图像就绪
    ImageReady,
    /// 视频就绪
    VideoReady { extended: bool },
    /// 上次操作失败（媒体内容保持失败前原样）
    Error { message: String, failed: FailedOp },
}

impl SceneMediaState {
    pub fn label(&self) -> &'static str {
        match self {
            SceneMediaState::Empty => "empty",
            SceneMediaState::ImageLoading => "image_loading",
            SceneMediaState::VideoLoading => "video_loading",
            SceneMediaState::ExtendLoading => "extend_loading",
            SceneMediaState::ImageReady => "image_ready",
            SceneMediaState::VideoReady { .. } => "video_ready",
            SceneMediaState::Error { .. } => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            SceneMediaState::ImageLoading
                | SceneMediaState::VideoLoading
                | SceneMediaState::ExtendLoading
        )
    }
}

/// Scene Media Lifecycle
pub struct SceneMediaLifecycle {
    states: DashMap<SceneKey, SceneMediaState>,
    store: Arc<DraftCommitStore>,
    generator: Arc<dyn GenerationPort>,
    media: Arc<dyn MediaStorePort>,
    playable: Arc<dyn PlayableRegistryPort>,
    events: Arc<dyn EventSinkPort>,
}

impl SceneMediaLifecycle {
    pub fn new(
        store: Arc<DraftCommitStore>,
        generator: Arc<dyn GenerationPort>,
        media: Arc<dyn MediaStorePort>,
        playable: Arc<dyn PlayableRegistryPort>,
        events: Arc<dyn EventSinkPort>,
    ) -> Self {
        Self {
            states: DashMap::new(),
            store,
            generator,
            media,
            playable,
            events,
        }
    }

    /// 分镜当前媒体状态（无记录时按权威副本推导基线）
    pub async fn state(&self, key: SceneKey) -> SceneMediaState {
        if let Some(state) = self.states.get(&key) {
            return state.clone();
        }
        self.baseline(key).await
    }

    /// 本地可播放句柄
    pub fn playable_path(&self, key: SceneKey) -> Option<PathBuf> {
        self.playable.get(key)
    }

    // ========================================================================
    // 图像生成
    // ========================================================================

    /// 为分镜生成图像
    ///
    /// 失败时分镜媒体内容保持原样，错误态记录尺寸供重试沿用。
    pub async fn generate_image(
        &self,
        key: SceneKey,
        size: ImageSize,
    ) -> Result<(), ApplicationError> {
        let scene = self.require_scene(key).await?;
        self.claim(key, SceneMediaState::ImageLoading)?;

        // 凭证预检：未配置/已过期时不发起网络调用
        if !self.generator.check_api_key().await {
            return self.fail(key, GenerationError::Credential.to_string(), FailedOp::Image { size });
        }

        let result = self
            .generator
            .generate_frame(&scene.visual, &scene.description, size)
            .await;

        let image_url = match result {
            Ok(Some(url)) => url,
            Ok(None) => return self.fail(key, IMAGE_EMPTY.to_string(), FailedOp::Image { size }),
            Err(e) => return self.fail(key, user_message(&e), FailedOp::Image { size }),
        };

        if let Err(e) = self
            .store
            .update_committed(|b| b.set_scene_image(key.episode, key.scene, image_url))
            .await
        {
            return self.fail(key, e.to_string(), FailedOp::Image { size });
        }

        self.transition(key, SceneMediaState::ImageReady, None);
        tracing::info!(%key, size = size.as_str(), "Scene image generated");
        Ok(())
    }

    // ========================================================================
    // 视频合成与扩展
    // ========================================================================

    /// 为分镜合成视频（长任务，进度经事件端口推送）
    pub async fn generate_video(&self, key: SceneKey) -> Result<(), ApplicationError> {
        let scene = self.require_scene(key).await?;
        self.claim(key, SceneMediaState::VideoLoading)?;

        if !self.generator.check_api_key().await {
            return self.fail(key, GenerationError::Credential.to_string(), FailedOp::Video);
        }

        let result = self
            .generator
            .generate_video(&scene.visual, &scene.description, self.progress_sink(key))
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => return self.fail(key, user_message(&e), FailedOp::Video),
        };

        if let Err(e) = self.install_video(key, output.data, output.asset_ref, false).await {
            return self.fail(key, e.to_string(), FailedOp::Video);
        }

        self.transition(key, SceneMediaState::VideoReady { extended: false }, None);
        tracing::info!(%key, "Scene video generated");
        Ok(())
    }

    /// 扩展已有视频时长
    ///
    /// 仅对未扩展过的已就绪视频可用（每分镜一次）。
    pub async fn extend_video(&self, key: SceneKey) -> Result<(), ApplicationError> {
        let scene = self.require_scene(key).await?;
        let asset_ref = match (self.state(key).await, scene.video_ref) {
            (SceneMediaState::VideoReady { extended: false }, Some(asset_ref)) => asset_ref,
            (SceneMediaState::VideoReady { extended: true }, _) => {
                return Err(ApplicationError::business_rule(format!(
                    "Scene {} video already extended",
                    key
                )));
            }
            _ => {
                return Err(ApplicationError::invalid_state(format!(
                    "Scene {} has no extendable video",
                    key
                )));
            }
        };
        self.claim(key, SceneMediaState::ExtendLoading)?;

        if !self.generator.check_api_key().await {
            return self.fail(key, GenerationError::Credential.to_string(), FailedOp::Extend);
        }

        let result = self
            .generator
            .extend_video(&asset_ref, self.progress_sink(key))
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => return self.fail(key, user_message(&e), FailedOp::Extend),
        };

        if let Err(e) = self.install_video(key, output.data, output.asset_ref, true).await {
            return self.fail(key, e.to_string(), FailedOp::Extend);
        }

        self.transition(key, SceneMediaState::VideoReady { extended: true }, None);
        tracing::info!(%key, "Scene video extended");
        Ok(())
    }

    // ========================================================================
    // 清除 / 错误处理 / 重试
    // ========================================================================

    /// 清除分镜的所有生成媒体（进行中的任务不可清除）
    pub async fn clear_assets(&self, key: SceneKey) -> Result<(), ApplicationError> {
        if self.state(key).await.is_loading() {
            return Err(ApplicationError::invalid_state(format!(
                "Scene {} media operation in progress",
                key
            )));
        }
        self.require_scene(key).await?;

        if let Some(old) = self.playable.revoke(key) {
            tracing::debug!(%key, path = %old.display(), "Playable handle revoked");
        }
        if let Err(e) = self.media.delete_media(key).await {
            tracing::warn!(%key, error = %e, "Failed to delete media file");
        }

        self.store
            .update_committed(|b| b.clear_scene_media(key.episode, key.scene))
            .await?;

        self.states.remove(&key);
        self.publish(key, "empty", None);
        tracing::info!(%key, "Scene media cleared");
        Ok(())
    }

    /// 驳回错误态，回落到按媒体存在性推导的基线状态
    pub async fn dismiss_error(&self, key: SceneKey) -> Result<SceneMediaState, ApplicationError> {
        match self.state(key).await {
            SceneMediaState::Error { .. } => {}
            other => {
                return Err(ApplicationError::invalid_state(format!(
                    "Scene {} is {}, nothing to dismiss",
                    key,
                    other.label()
                )));
            }
        }
        self.states.remove(&key);
        let baseline = self.baseline(key).await;
        self.publish(key, baseline.label(), None);
        Ok(baseline)
    }

    /// 按错误态记录的失败操作重试（图像重试沿用原始尺寸）
    pub async fn retry(&self, key: SceneKey) -> Result<(), ApplicationError> {
        let failed = match self.state(key).await {
            SceneMediaState::Error { failed, .. } => failed,
            other => {
                return Err(ApplicationError::invalid_state(format!(
                    "Scene {} is {}, nothing to retry",
                    key,
                    other.label()
                )));
            }
        };
        match failed {
            FailedOp::Image { size } => self.generate_image(key, size).await,
            FailedOp::Video => self.generate_video(key).await,
            FailedOp::Extend => self.extend_video(key).await,
            FailedOp::Hydrate => self.hydrate(key).await,
        }
    }

    // ========================================================================
    // 句柄恢复（重启后资产引用仍在，本地可播放文件按需重建）
    // ========================================================================

    /// 按资产引用重新下载并登记本地可播放句柄
    pub async fn hydrate(&self, key: SceneKey) -> Result<(), ApplicationError> {
        let scene = self.require_scene(key).await?;
        let asset_ref = match scene.video_ref {
            Some(asset_ref) => asset_ref,
            None => return Ok(()),
        };
        if self.playable.get(key).is_some() {
            return Ok(());
        }

        if self.media.media_exists(key).await {
            self.playable.set(key, self.media.media_path(key));
            self.clear_hydrate_error(key).await;
            tracing::debug!(%key, "Playable handle restored from local file");
            return Ok(());
        }

        let data = match self.generator.resolve_asset(&asset_ref).await {
            Ok(data) => data,
            Err(e) => return self.fail(key, user_message(&e), FailedOp::Hydrate),
        };
        let path = self
            .media
            .save_media(key, &data)
            .await
            .map_err(|e| ApplicationError::Internal(e.to_string()))?;
        self.playable.set(key, path);
        self.clear_hydrate_error(key).await;
        tracing::info!(%key, "Playable handle rehydrated from asset ref");
        Ok(())
    }

    /// 句柄恢复成功后清除遗留的恢复失败错误态
    async fn clear_hydrate_error(&self, key: SceneKey) {
        let stale = matches!(
            self.states.get(&key).as_deref(),
            Some(SceneMediaState::Error {
                failed: FailedOp::Hydrate,
                ..
            })
        );
        if stale {
            self.states.remove(&key);
            let baseline = self.baseline(key).await;
            self.publish(key, baseline.label(), None);
        }
    }

    /// 启动时为所有持有视频资产引用的分镜恢复句柄
    pub async fn hydrate_all(&self) {
        let board = self.store.committed().await;
        let keys: Vec<SceneKey> = board
            .episodes()
            .iter()
            .flat_map(|e| {
                e.scenes
                    .iter()
                    .filter(|s| s.video_ref.is_some())
                    .map(|s| SceneKey::new(e.id, s.id))
                    .collect::<Vec<_>>()
            })
            .collect();

        for key in keys {
            if let Err(e) = self.hydrate(key).await {
                tracing::warn!(%key, error = %e, "Scene hydration failed");
            }
        }
    }

    // ========================================================================
    // 内部
    // ========================================================================

    async fn baseline(&self, key: SceneKey) -> SceneMediaState {
        match self.store.committed().await.scene(key.episode, key.scene) {
            Some(scene) if scene.video_ref.is_some() => SceneMediaState::VideoReady {
                extended: scene.is_extended,
            },
            Some(scene) if scene.image_url.is_some() => SceneMediaState::ImageReady,
            _ => SceneMediaState::Empty,
        }
    }

    async fn require_scene(
        &self,
        key: SceneKey,
    ) -> Result<crate::domain::story::Scene, ApplicationError> {
        self.store
            .committed()
            .await
            .scene(key.episode, key.scene)
            .cloned()
            .ok_or_else(|| ApplicationError::not_found("Scene", key))
    }

    /// 原子占位：同一分镜同时只允许一个进行中的媒体任务
    fn claim(&self, key: SceneKey, loading: SceneMediaState) -> Result<(), ApplicationError> {
        let mut entry = self.states.entry(key).or_insert(SceneMediaState::Empty);
        if entry.is_loading() {
            return Err(ApplicationError::invalid_state(format!(
                "Scene {} media operation in progress",
                key
            )));
        }
        let label = loading.label();
        *entry = loading;
        drop(entry);
        self.publish(key, label, None);
        Ok(())
    }

    /// 写入媒体字节、登记句柄并持久化资产引用
    async fn install_video(
        &self,
        key: SceneKey,
        data: Vec<u8>,
        asset_ref: String,
        extended: bool,
    ) -> Result<(), ApplicationError> {
        let path = self
            .media
            .save_media(key, &data)
            .await
            .map_err(|e| ApplicationError::Internal(e.to_string()))?;
        if let Some(old) = self.playable.set(key, path) {
            tracing::debug!(%key, path = %old.display(), "Playable handle replaced");
        }
        self.store
            .update_committed(|b| b.set_scene_video(key.episode, key.scene, asset_ref, extended))
            .await?;
        Ok(())
    }

    fn progress_sink(&self, key: SceneKey) -> ProgressSink {
        let events = self.events.clone();
        Arc::new(move |text: &str| {
            events.publish(WorkflowEvent::SceneProgress {
                episode_id: key.episode,
                scene_id: key.scene,
                progress: text.to_string(),
            });
        })
    }

    fn transition(&self, key: SceneKey, state: SceneMediaState, message: Option<String>) {
        let label = state.label();
        self.states.insert(key, state);
        self.publish(key, label, message);
    }

    fn fail(
        &self,
        key: SceneKey,
        message: String,
        failed: FailedOp,
    ) -> Result<(), ApplicationError> {
        tracing::warn!(%key, error = %message, "Scene media operation failed");
        self.transition(
            key,
            SceneMediaState::Error {
                message: message.clone(),
                failed,
            },
            Some(message.clone()),
        );
        Err(ApplicationError::ExternalService(message))
    }

    fn publish(&self, key: SceneKey, state: &str, message: Option<String>) {
        self.events.publish(WorkflowEvent::SceneMedia {
            episode_id: key.episode,
            scene_id: key.scene,
            state: state.to_string(),
            message,
        });
    }
}

/// 将生成错误收敛为用户可见消息
///
/// 凭证/权限/下载失败保留精确分类文案，其余网络类错误统一提示。
fn user_message(e: &GenerationError) -> String {
    match e {
        GenerationError::Credential
        | GenerationError::AccessDenied(_)
        | GenerationError::Transfer(_) => e.to_string(),
        GenerationError::Timeout | GenerationError::Network(_) | GenerationError::Failed(_) => {
            GENERATION_UNAVAILABLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NullEventSink;
    use crate::application::test_support::MemoryStoryStore;
    use crate::domain::story::Storyboard;
    use crate::infrastructure::adapters::{FakeGenClient, FileMediaStore};
    use crate::infrastructure::memory::InMemoryPlayableRegistry;

    fn lifecycle_with(
        dir: &tempfile::TempDir,
        generator: Arc<FakeGenClient>,
    ) -> SceneMediaLifecycle {
        let backend = Arc::new(MemoryStoryStore::default());
        let store = Arc::new(DraftCommitStore::with_committed(
            Storyboard::seeded(),
            backend,
        ));
        SceneMediaLifecycle::new(
            store,
            generator,
            Arc::new(FileMediaStore::new(dir.path().to_path_buf())),
            Arc::new(InMemoryPlayableRegistry::new()),
            Arc::new(NullEventSink),
        )
    }

    #[tokio::test]
    async fn test_image_generation_success() {
        let dir = tempfile::tempdir().unwrap();
        let lifecycle = lifecycle_with(&dir, Arc::new(FakeGenClient::new()));
        let key = SceneKey::new(1, 1);

        lifecycle.generate_image(key, ImageSize::K2).await.unwrap();
        assert_eq!(lifecycle.state(key).await, SceneMediaState::ImageReady);
        assert!(lifecycle
            .store
            .committed()
            .await
            .scene(1, 1)
            .unwrap()
            .image_url
            .is_some());
    }

    #[tokio::test]
    async fn test_credential_precheck_skips_network_call() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Arc::new(FakeGenClient::new().with_api_key(false));
        let lifecycle = lifecycle_with(&dir, generator.clone());
        let key = SceneKey::new(1, 1);

        assert!(lifecycle.generate_image(key, ImageSize::K1).await.is_err());
        // 预检失败不触碰生成接口
        assert_eq!(generator.frame_calls(), 0);

        match lifecycle.state(key).await {
            SceneMediaState::Error { message, failed } => {
                assert_eq!(message, "API Key invalid or not found. Please re-select.");
                assert_eq!(failed, FailedOp::Image { size: ImageSize::K1 });
            }
            other => panic!("unexpected state: {:?}", other),
        }
        // 媒体内容未被触碰
        assert!(lifecycle
            .store
            .committed()
            .await
            .scene(1, 1)
            .unwrap()
            .image_url
            .is_none());
    }

    #[tokio::test]
    async fn test_retry_reuses_recorded_size() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Arc::new(FakeGenClient::new().with_api_key(false));
        let lifecycle = lifecycle_with(&dir, generator.clone());
        let key = SceneKey::new(1, 2);

        assert!(lifecycle.generate_image(key, ImageSize::K4).await.is_err());

        // 修复凭证后重试，沿用原始尺寸
        generator.set_api_key(true);
        lifecycle.retry(key).await.unwrap();
        assert_eq!(lifecycle.state(key).await, SceneMediaState::ImageReady);
        assert_eq!(generator.last_frame_size(), Some(ImageSize::K4));
    }

    #[tokio::test]
    async fn test_empty_image_output_is_soft_failure() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Arc::new(FakeGenClient::new().with_frame(None));
        let lifecycle = lifecycle_with(&dir, generator);
        let key = SceneKey::new(1, 1);

        assert!(lifecycle.generate_image(key, ImageSize::K1).await.is_err());
        match lifecycle.state(key).await {
            SceneMediaState::Error { message, .. } => {
                assert_eq!(message, "Failed to generate image.");
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_video_lifecycle_generate_extend_once() {
        let dir = tempfile::tempdir().unwrap();
        let lifecycle = lifecycle_with(&dir, Arc::new(FakeGenClient::new()));
        let key = SceneKey::new(1, 3);

        lifecycle.generate_video(key).await.unwrap();
        assert_eq!(
            lifecycle.state(key).await,
            SceneMediaState::VideoReady { extended: false }
        );
        let path = lifecycle.playable_path(key).unwrap();
        assert!(path.exists());
        let scene = lifecycle.store.committed().await.scene(1, 3).cloned().unwrap();
        assert!(scene.video_ref.is_some());
        assert!(!scene.is_extended);

        lifecycle.extend_video(key).await.unwrap();
        assert_eq!(
            lifecycle.state(key).await,
            SceneMediaState::VideoReady { extended: true }
        );
        assert!(lifecycle.store.committed().await.scene(1, 3).unwrap().is_extended);

        // 扩展只允许一次
        assert!(lifecycle.extend_video(key).await.is_err());
    }

    #[tokio::test]
    async fn test_extend_requires_ready_video() {
        let dir = tempfile::tempdir().unwrap();
        let lifecycle = lifecycle_with(&dir, Arc::new(FakeGenClient::new()));
        assert!(lifecycle.extend_video(SceneKey::new(1, 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_clear_assets_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let lifecycle = lifecycle_with(&dir, Arc::new(FakeGenClient::new()));
        let key = SceneKey::new(1, 4);

        lifecycle.generate_image(key, ImageSize::K1).await.unwrap();
        lifecycle.generate_video(key).await.unwrap();
        let path = lifecycle.playable_path(key).unwrap();

        lifecycle.clear_assets(key).await.unwrap();
        assert_eq!(lifecycle.state(key).await, SceneMediaState::Empty);
        assert!(lifecycle.playable_path(key).is_none());
        assert!(!path.exists());
        let scene = lifecycle.store.committed().await.scene(1, 4).cloned().unwrap();
        assert!(scene.image_url.is_none());
        assert!(scene.video_ref.is_none());
    }

    #[tokio::test]
    async fn test_dismiss_error_falls_back_to_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Arc::new(FakeGenClient::new());
        let lifecycle = lifecycle_with(&dir, generator.clone());
        let key = SceneKey::new(1, 5);

        lifecycle.generate_image(key, ImageSize::K1).await.unwrap();

        // 图像就绪后视频合成失败：基线应回落到 ImageReady
        generator.set_video_error(GenerationError::Network("connection reset".to_string()));
        assert!(lifecycle.generate_video(key).await.is_err());
        match lifecycle.state(key).await {
            SceneMediaState::Error { message, failed } => {
                assert_eq!(
                    message,
                    "AI generation unavailable. Check your connection or API key."
                );
                assert_eq!(failed, FailedOp::Video);
            }
            other => panic!("unexpected state: {:?}", other),
        }

        let baseline = lifecycle.dismiss_error(key).await.unwrap();
        assert_eq!(baseline, SceneMediaState::ImageReady);
        assert_eq!(lifecycle.state(key).await, SceneMediaState::ImageReady);
    }

    #[tokio::test]
    async fn test_hydrate_restores_playable_handle() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Arc::new(FakeGenClient::new());
        let lifecycle = lifecycle_with(&dir, generator.clone());
        let key = SceneKey::new(1, 6);

        lifecycle.generate_video(key).await.unwrap();

        // 模拟重启：句柄与本地文件都丢失，只剩资产引用
        lifecycle.playable.revoke(key);
        lifecycle.media.delete_media(key).await.unwrap();
        assert!(lifecycle.playable_path(key).is_none());

        lifecycle.hydrate(key).await.unwrap();
        assert!(lifecycle.playable_path(key).is_some());
        assert_eq!(
            lifecycle.state(key).await,
            SceneMediaState::VideoReady { extended: false }
        );
    }

    #[tokio::test]
    async fn test_hydrate_failure_keeps_asset_ref() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Arc::new(FakeGenClient::new());
        let lifecycle = lifecycle_with(&dir, generator.clone());
        let key = SceneKey::new(1, 7);

        lifecycle.generate_video(key).await.unwrap();
        lifecycle.playable.revoke(key);
        lifecycle.media.delete_media(key).await.unwrap();

        generator.set_resolve_error(GenerationError::Network("offline".to_string()));
        assert!(lifecycle.hydrate(key).await.is_err());
        match lifecycle.state(key).await {
            SceneMediaState::Error { failed, .. } => assert_eq!(failed, FailedOp::Hydrate),
            other => panic!("unexpected state: {:?}", other),
        }
        // 资产引用仍在，重试可恢复
        assert!(lifecycle
            .store
            .committed()
            .await
            .scene(1, 7)
            .unwrap()
            .video_ref
            .is_some());

        generator.clear_resolve_error();
        lifecycle.retry(key).await.unwrap();
        assert!(lifecycle.playable_path(key).is_some());
        assert_eq!(
            lifecycle.state(key).await,
            SceneMediaState::VideoReady { extended: false }
        );
    }

    #[tokio::test]
    async fn test_concurrent_operation_rejected_while_loading() {
        let dir = tempfile::tempdir().unwrap();
        let lifecycle = lifecycle_with(&dir, Arc::new(FakeGenClient::new()));
        let key = SceneKey::new(1, 8);

        lifecycle
            .claim(key, SceneMediaState::VideoLoading)
            .unwrap();
        assert!(lifecycle.generate_image(key, ImageSize::K1).await.is_err());
        assert!(lifecycle.clear_assets(key).await.is_err());
    }
}

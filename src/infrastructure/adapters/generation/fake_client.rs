//! Fake Generation Client - 用于测试的生成客户端
//!
//! 不实际调用生成服务，返回可配置的固定产出，并记录调用情况
//! 供测试断言。

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{
    GenerationError, GenerationPort, ProgressSink, StoryIntel, VideoOutput,
};
use crate::domain::story::{Episode, ImageSize, Lore, Scene};

/// 固定视频字节
const FAKE_VIDEO: &[u8] = b"FAKE_VIDEO_BYTES";

/// Fake Generation Client
///
/// 默认行为：凭证有效、图像返回固定 data URL、剧本返回 8 个占位分镜、
/// 视频生成两次进度回调后成功。所有失败路径都可按需注入。
pub struct FakeGenClient {
    api_key: AtomicBool,
    frame: Mutex<Result<Option<String>, GenerationError>>,
    script: Mutex<Option<Vec<Scene>>>,
    refine_error: Mutex<Option<GenerationError>>,
    video_error: Mutex<Option<GenerationError>>,
    resolve_error: Mutex<Option<GenerationError>>,
    intel: Mutex<Option<StoryIntel>>,
    frame_calls: AtomicUsize,
    last_frame_size: Mutex<Option<ImageSize>>,
    video_seq: AtomicUsize,
}

impl Default for FakeGenClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGenClient {
    pub fn new() -> Self {
        Self {
            api_key: AtomicBool::new(true),
            frame: Mutex::new(Ok(Some(
                "data:image/png;base64,RkFLRV9GUkFNRQ==".to_string(),
            ))),
            script: Mutex::new(None),
            refine_error: Mutex::new(None),
            video_error: Mutex::new(None),
            resolve_error: Mutex::new(None),
            intel: Mutex::new(None),
            frame_calls: AtomicUsize::new(0),
            last_frame_size: Mutex::new(None),
            video_seq: AtomicUsize::new(0),
        }
    }

    // ------------------------------------------------------------------
    // 构造期配置
    // ------------------------------------------------------------------

    pub fn with_api_key(self, present: bool) -> Self {
        self.api_key.store(present, Ordering::SeqCst);
        self
    }

    pub fn with_frame(self, frame: Option<String>) -> Self {
        *lock(&self.frame) = Ok(frame);
        self
    }

    pub fn with_frame_error(self, error: GenerationError) -> Self {
        *lock(&self.frame) = Err(error);
        self
    }

    pub fn with_script(self, scenes: Vec<Scene>) -> Self {
        *lock(&self.script) = Some(scenes);
        self
    }

    pub fn with_refine_error(self, error: GenerationError) -> Self {
        *lock(&self.refine_error) = Some(error);
        self
    }

    pub fn with_intel(self, intel: StoryIntel) -> Self {
        *lock(&self.intel) = Some(intel);
        self
    }

    // ------------------------------------------------------------------
    // 运行期调整与断言辅助
    // ------------------------------------------------------------------

    pub fn set_api_key(&self, present: bool) {
        self.api_key.store(present, Ordering::SeqCst);
    }

    pub fn set_video_error(&self, error: GenerationError) {
        *lock(&self.video_error) = Some(error);
    }

    pub fn set_resolve_error(&self, error: GenerationError) {
        *lock(&self.resolve_error) = Some(error);
    }

    pub fn clear_resolve_error(&self) {
        *lock(&self.resolve_error) = None;
    }

    /// 图像生成接口被调用的次数
    pub fn frame_calls(&self) -> usize {
        self.frame_calls.load(Ordering::SeqCst)
    }

    /// 最近一次图像生成请求的尺寸
    pub fn last_frame_size(&self) -> Option<ImageSize> {
        *lock(&self.last_frame_size)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl GenerationPort for FakeGenClient {
    async fn refine_text(
        &self,
        _label: &str,
        current: &str,
        _feedback: &str,
        _context: &str,
    ) -> Result<String, GenerationError> {
        if let Some(error) = lock(&self.refine_error).clone() {
            return Err(error);
        }
        Ok(format!("{}（润色版）", current))
    }

    async fn generate_frame(
        &self,
        _visual: &str,
        _description: &str,
        size: ImageSize,
    ) -> Result<Option<String>, GenerationError> {
        self.frame_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_frame_size) = Some(size);
        lock(&self.frame).clone()
    }

    async fn generate_chapter_script(
        &self,
        _lore: &Lore,
        episode: &Episode,
    ) -> Result<Vec<Scene>, GenerationError> {
        if let Some(scenes) = lock(&self.script).clone() {
            return Ok(scenes);
        }
        Ok(episode
            .scenes
            .iter()
            .map(|s| {
                let mut scene = Scene::placeholder(s.id);
                scene.title = format!("合成分镜 {}", s.id);
                scene
            })
            .collect())
    }

    async fn generate_video(
        &self,
        _visual: &str,
        _description: &str,
        progress: ProgressSink,
    ) -> Result<VideoOutput, GenerationError> {
        if let Some(error) = lock(&self.video_error).clone() {
            return Err(error);
        }
        progress("Rendering frames...");
        progress("Finalizing video...");
        let seq = self.video_seq.fetch_add(1, Ordering::SeqCst);
        Ok(VideoOutput {
            data: FAKE_VIDEO.to_vec(),
            asset_ref: format!("assets/fake-video-{}", seq),
        })
    }

    async fn extend_video(
        &self,
        asset_ref: &str,
        progress: ProgressSink,
    ) -> Result<VideoOutput, GenerationError> {
        if let Some(error) = lock(&self.video_error).clone() {
            return Err(error);
        }
        progress("Extending video...");
        Ok(VideoOutput {
            data: FAKE_VIDEO.to_vec(),
            asset_ref: format!("{}-extended", asset_ref),
        })
    }

    async fn resolve_asset(&self, _asset_ref: &str) -> Result<Vec<u8>, GenerationError> {
        if let Some(error) = lock(&self.resolve_error).clone() {
            return Err(error);
        }
        Ok(FAKE_VIDEO.to_vec())
    }

    async fn bulk_refine(
        &self,
        lore: &Lore,
        episodes: &[Episode],
        _feedback: &str,
    ) -> Result<StoryIntel, GenerationError> {
        if let Some(intel) = lock(&self.intel).clone() {
            return Ok(intel);
        }
        Ok(StoryIntel {
            lore: lore.clone(),
            episodes: episodes.to_vec(),
        })
    }

    async fn ingest_story_intel(&self, _raw_text: &str) -> Result<StoryIntel, GenerationError> {
        lock(&self.intel)
            .clone()
            .ok_or_else(|| GenerationError::Failed("no story intel configured".to_string()))
    }

    async fn check_api_key(&self) -> bool {
        self.api_key.load(Ordering::SeqCst)
    }
}

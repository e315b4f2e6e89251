//! HTTP Generation Client - 调用外部生成模型 HTTP 服务
//!
//! 实现 GenerationPort trait，对接 Gemini 风格的 REST API：
//!
//! - 文本/剧本/导入: POST {base}/v1beta/models/{model}:generateContent
//! - 图像: 同上，产出在 inlineData（base64），封装为 data URL
//! - 视频: POST {base}/v1beta/models/{model}:predictLongRunning 提交任务，
//!   按固定间隔轮询 operation 直到 done，再按 uri 下载产物

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::ports::{
    GenerationError, GenerationPort, ProgressSink, StoryIntel, VideoOutput,
};
use crate::domain::story::{Episode, ImageSize, Lore, Scene, SCENES_PER_EPISODE};

/// 图像/视频提示词模板（赛博漫画风格，16:9 电影构图）
fn frame_prompt(visual: &str, description: &str) -> String {
    format!(
        "Manga storyboard frame, high quality, digital art, cyber-manga aesthetic. \
         Scene description: {}. {}. Use a cinematic composition with neon blue and \
         vibrant green accents.",
        visual, description
    )
}

fn video_prompt(visual: &str, description: &str) -> String {
    format!(
        "Animated manga storyboard shot, cyber-manga aesthetic, cinematic camera work. \
         Scene description: {}. {}. Neon blue and vibrant green accents, 16:9.",
        visual, description
    )
}

/// HTTP 生成客户端配置
#[derive(Debug, Clone)]
pub struct HttpGenClientConfig {
    /// 生成服务基础 URL
    pub base_url: String,
    /// API Key
    pub api_key: String,
    /// 文本模型
    pub text_model: String,
    /// 图像模型
    pub image_model: String,
    /// 视频模型
    pub video_model: String,
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
    /// 视频任务轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 视频任务轮询上限（秒，0 表示不设上限）
    pub max_poll_secs: u64,
}

impl Default for HttpGenClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-3-pro-image-preview".to_string(),
            video_model: "veo-3.1-generate-preview".to_string(),
            timeout_secs: 120,
            poll_interval_secs: 10,
            max_poll_secs: 0,
        }
    }
}

/// HTTP 生成客户端
pub struct HttpGenClient {
    client: Client,
    config: HttpGenClientConfig,
}

impl HttpGenClient {
    pub fn new(config: HttpGenClientConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, model, self.config.api_key
        )
    }

    fn predict_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:predictLongRunning?key={}",
            self.config.base_url, self.config.video_model, self.config.api_key
        )
    }

    fn operation_url(&self, name: &str) -> String {
        format!(
            "{}/v1beta/{}?key={}",
            self.config.base_url, name, self.config.api_key
        )
    }

    /// 发送 generateContent 请求并返回解析后的响应
    async fn generate_content(
        &self,
        model: &str,
        body: serde_json::Value,
    ) -> Result<GenerateContentResponse, GenerationError> {
        let response = self
            .client
            .post(self.generate_url(model))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(classify_api_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text)
            .map_err(|e| GenerationError::Failed(format!("Unparseable response: {}", e)))
    }

    /// 提交长任务并轮询至完成，返回产物下载地址
    async fn run_video_operation(
        &self,
        body: serde_json::Value,
        progress: &ProgressSink,
    ) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.predict_url())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(classify_api_error(status.as_u16(), &text));
        }

        let submitted: Operation = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Failed(format!("Unparseable operation: {}", e)))?;
        let name = submitted.name;
        tracing::debug!(operation = %name, "Video operation submitted");

        let interval = Duration::from_secs(self.config.poll_interval_secs.max(1));
        let mut elapsed_secs: u64 = 0;
        loop {
            tokio::time::sleep(interval).await;
            elapsed_secs += interval.as_secs();
            progress(&format!("Generating video... {}s elapsed", elapsed_secs));

            let response = self
                .client
                .get(self.operation_url(&name))
                .send()
                .await
                .map_err(map_transport_error)?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| GenerationError::Network(e.to_string()))?;
            if !status.is_success() {
                return Err(classify_api_error(status.as_u16(), &text));
            }

            let operation: Operation = serde_json::from_str(&text)
                .map_err(|e| GenerationError::Failed(format!("Unparseable operation: {}", e)))?;

            if operation.done.unwrap_or(false) {
                if let Some(error) = operation.error {
                    return Err(classify_api_error(0, &error.message));
                }
                let uri = operation
                    .response
                    .and_then(|r| r.generate_video_response)
                    .and_then(|r| r.generated_samples)
                    .and_then(|mut samples| {
                        if samples.is_empty() {
                            None
                        } else {
                            samples.remove(0).video
                        }
                    })
                    .and_then(|v| v.uri)
                    .ok_or_else(|| {
                        GenerationError::Failed("Operation finished without video".to_string())
                    })?;
                return Ok(uri);
            }

            if self.config.max_poll_secs > 0 && elapsed_secs >= self.config.max_poll_secs {
                tracing::warn!(operation = %name, elapsed_secs, "Video operation poll limit hit");
                return Err(GenerationError::Timeout);
            }
        }
    }

    /// 下载远端产物字节（失败归类为 Transfer：服务端已产出，本地未拿到）
    async fn download(&self, uri: &str) -> Result<Vec<u8>, GenerationError> {
        let url = if uri.contains('?') {
            format!("{}&key={}", uri, self.config.api_key)
        } else {
            format!("{}?key={}", uri, self.config.api_key)
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GenerationError::Transfer(e.to_string()))?;
        if !response.status().is_success() {
            return Err(GenerationError::Transfer(format!(
                "HTTP {}",
                response.status()
            )));
        }
        Ok(response
            .bytes()
            .await
            .map_err(|e| GenerationError::Transfer(e.to_string()))?
            .to_vec())
    }

    /// 从响应中提取首个文本片段
    fn first_text(response: GenerateContentResponse) -> Option<String> {
        response
            .candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .find_map(|p| p.text)
    }

    /// 从响应中提取首个内联图像并封装为 data URL
    fn first_image(response: GenerateContentResponse) -> Option<String> {
        let inline = response
            .candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .find_map(|p| p.inline_data)?;
        Some(format!("data:image/png;base64,{}", inline.data))
    }

    /// 提取文本中的 JSON 载荷（剥掉 markdown 代码围栏）
    fn extract_json(text: &str) -> &str {
        let trimmed = text.trim();
        let trimmed = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .unwrap_or(trimmed);
        trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
    }
}

#[async_trait]
impl GenerationPort for HttpGenClient {
    async fn refine_text(
        &self,
        label: &str,
        current: &str,
        feedback: &str,
        context: &str,
    ) -> Result<String, GenerationError> {
        let prompt = format!(
            "You are editing the {} of a cyber-manga storyboard.\n\
             Story context:\n{}\n\nCurrent text:\n{}\n\nUser feedback:\n{}\n\n\
             Rewrite the text according to the feedback. Keep the original language. \
             Return ONLY the rewritten text, no commentary.",
            label, context, current, feedback
        );
        let response = self
            .generate_content(
                &self.config.text_model,
                json!({ "contents": [{ "parts": [{ "text": prompt }] }] }),
            )
            .await?;
        Self::first_text(response)
            .map(|t| t.trim().to_string())
            .ok_or_else(|| GenerationError::Failed("No text in response".to_string()))
    }

    async fn generate_frame(
        &self,
        visual: &str,
        description: &str,
        size: ImageSize,
    ) -> Result<Option<String>, GenerationError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": frame_prompt(visual, description) }] }],
            "generationConfig": {
                "imageConfig": {
                    "aspectRatio": "16:9",
                    "imageSize": size.as_str(),
                }
            }
        });
        let response = self.generate_content(&self.config.image_model, body).await?;
        // 接口正常返回但无图像产出属于软失败，由调用方提示用户
        Ok(Self::first_image(response))
    }

    async fn generate_chapter_script(
        &self,
        lore: &Lore,
        episode: &Episode,
    ) -> Result<Vec<Scene>, GenerationError> {
        let prompt = format!(
            "You are a cyber-manga storyboard writer.\n\
             World background:\n{}\n\nCharacters:\n{}\n\nWorld rules:\n{}\n\n\
             Episode title: {}\nEpisode summary: {}\n\n\
             Write a complete storyboard script of exactly {} scenes for this episode, \
             in the same language as the world background. Use \"无\" for empty \
             narrative/dialogue/ui_sfx fields.\n\
             Return ONLY a JSON array where each element has the fields: \
             id (number, 1-based), title, visual, description, narrative, dialogue, ui_sfx.",
            lore.background,
            lore.characters,
            lore.rules,
            episode.title,
            episode.summary,
            SCENES_PER_EPISODE
        );
        let response = self
            .generate_content(
                &self.config.text_model,
                json!({ "contents": [{ "parts": [{ "text": prompt }] }] }),
            )
            .await?;
        let text = Self::first_text(response)
            .ok_or_else(|| GenerationError::Failed("No text in response".to_string()))?;
        serde_json::from_str(Self::extract_json(&text))
            .map_err(|e| GenerationError::Failed(format!("Unparseable script: {}", e)))
    }

    async fn generate_video(
        &self,
        visual: &str,
        description: &str,
        progress: ProgressSink,
    ) -> Result<VideoOutput, GenerationError> {
        let body = json!({
            "instances": [{ "prompt": video_prompt(visual, description) }]
        });
        let uri = self.run_video_operation(body, &progress).await?;
        let data = self.download(&uri).await?;
        tracing::info!(bytes = data.len(), "Video generated and downloaded");
        Ok(VideoOutput {
            data,
            asset_ref: uri,
        })
    }

    async fn extend_video(
        &self,
        asset_ref: &str,
        progress: ProgressSink,
    ) -> Result<VideoOutput, GenerationError> {
        let body = json!({
            "instances": [{
                "prompt": "Continue the shot seamlessly, same style and palette.",
                "video": { "uri": asset_ref }
            }]
        });
        let uri = self.run_video_operation(body, &progress).await?;
        let data = self.download(&uri).await?;
        tracing::info!(bytes = data.len(), "Video extended and downloaded");
        Ok(VideoOutput {
            data,
            asset_ref: uri,
        })
    }

    async fn resolve_asset(&self, asset_ref: &str) -> Result<Vec<u8>, GenerationError> {
        self.download(asset_ref).await
    }

    async fn bulk_refine(
        &self,
        lore: &Lore,
        episodes: &[Episode],
        feedback: &str,
    ) -> Result<StoryIntel, GenerationError> {
        let current = serde_json::to_string(&json!({ "lore": lore, "episodes": episodes }))
            .map_err(|e| GenerationError::Failed(e.to_string()))?;
        let prompt = format!(
            "You are revising a complete cyber-manga storyboard.\n\
             Current storyboard (JSON):\n{}\n\nUser feedback:\n{}\n\n\
             Apply the feedback across the whole storyboard, keeping ids, structure and \
             language intact. Return ONLY a JSON object with the same shape: \
             {{\"lore\": ..., \"episodes\": [...]}}.",
            current, feedback
        );
        let response = self
            .generate_content(
                &self.config.text_model,
                json!({ "contents": [{ "parts": [{ "text": prompt }] }] }),
            )
            .await?;
        let text = Self::first_text(response)
            .ok_or_else(|| GenerationError::Failed("No text in response".to_string()))?;
        let intel: IntelPayload = serde_json::from_str(Self::extract_json(&text))
            .map_err(|e| GenerationError::Failed(format!("Unparseable storyboard: {}", e)))?;
        Ok(StoryIntel {
            lore: intel.lore,
            episodes: intel.episodes,
        })
    }

    async fn ingest_story_intel(&self, raw_text: &str) -> Result<StoryIntel, GenerationError> {
        let prompt = format!(
            "Extract a cyber-manga storyboard structure from the following source text.\n\
             Source:\n{}\n\n\
             Return ONLY a JSON object: {{\"lore\": {{\"background\", \"characters\", \
             \"rules\"}}, \"episodes\": [{{\"id\", \"title\", \"summary\", \"scenes\": \
             [{{\"id\", \"title\", \"visual\", \"description\", \"narrative\", \
             \"dialogue\", \"ui_sfx\"}}]}}]}}. Use \"无\" for empty fields, keep the \
             source language.",
            raw_text
        );
        let response = self
            .generate_content(
                &self.config.text_model,
                json!({ "contents": [{ "parts": [{ "text": prompt }] }] }),
            )
            .await?;
        let text = Self::first_text(response)
            .ok_or_else(|| GenerationError::Failed("No text in response".to_string()))?;
        let intel: IntelPayload = serde_json::from_str(Self::extract_json(&text))
            .map_err(|e| GenerationError::Failed(format!("Unparseable storyboard: {}", e)))?;
        Ok(StoryIntel {
            lore: intel.lore,
            episodes: intel.episodes,
        })
    }

    async fn check_api_key(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }
}

fn map_transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else if e.is_connect() {
        GenerationError::Network(format!("Cannot connect to generation service: {}", e))
    } else {
        GenerationError::Network(e.to_string())
    }
}

/// 按状态码与响应体分类 API 错误
///
/// "Requested entity was not found" 是凭证失效的标志性文案；
/// 429/配额/计费类错误归为访问被拒。
fn classify_api_error(status: u16, body: &str) -> GenerationError {
    if body.contains("Requested entity was not found") {
        return GenerationError::Credential;
    }
    if status == 429 || body.contains("quota") || body.contains("billing") {
        return GenerationError::AccessDenied(format!("HTTP {}: {}", status, truncate(body)));
    }
    GenerationError::Failed(format!("HTTP {}: {}", status, truncate(body)))
}

fn truncate(body: &str) -> String {
    const MAX: usize = 300;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    }
}

// ============================================================================
// 响应 DTO
// ============================================================================

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    done: Option<bool>,
    error: Option<OperationError>,
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    generated_samples: Option<Vec<GeneratedSample>>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoUri>,
}

#[derive(Debug, Deserialize)]
struct VideoUri {
    uri: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IntelPayload {
    lore: Lore,
    episodes: Vec<Episode>,
}

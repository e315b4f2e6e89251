//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 生成模型配置
    #[serde(default)]
    pub generation: GenerationConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 生成模型配置
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// API Key（为空时凭证预检直接失败）
    #[serde(default)]
    pub api_key: String,

    /// 生成服务基础 URL
    #[serde(default = "default_gen_base_url")]
    pub base_url: String,

    /// 文本模型（润色/剧本/导入）
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// 图像模型
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// 视频模型
    #[serde(default = "default_video_model")]
    pub video_model: String,

    /// 单次请求超时时间（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// 视频任务轮询间隔（秒）
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// 视频任务轮询上限（秒，0 表示不设上限）
    #[serde(default)]
    pub max_poll_secs: u64,

    /// 使用 Fake 客户端（离线开发/测试）
    #[serde(default)]
    pub use_fake_client: bool,
}

fn default_gen_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-3-pro-image-preview".to_string()
}

fn default_video_model() -> String {
    "veo-3.1-generate-preview".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_poll_interval_secs() -> u64 {
    10
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_gen_base_url(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            video_model: default_video_model(),
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_secs: 0,
            use_fake_client: false,
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 故事板 sled 数据库路径
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// 本地可播放媒体目录
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,
}

fn default_store_path() -> String {
    "data/storyboard.sled".to_string()
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("data/media")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            media_dir: default_media_dir(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

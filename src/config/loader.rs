//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `GRIDBOARD_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `GRIDBOARD_SERVER__PORT=8080`
/// - `GRIDBOARD_GENERATION__API_KEY=xxx`
/// - `GRIDBOARD_GENERATION__POLL_INTERVAL_SECS=5`
/// - `GRIDBOARD_STORAGE__STORE_PATH=/data/storyboard.sled`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5080)?
        .set_default("generation.api_key", "")?
        .set_default(
            "generation.base_url",
            "https://generativelanguage.googleapis.com",
        )?
        .set_default("generation.text_model", "gemini-2.5-flash")?
        .set_default("generation.image_model", "gemini-3-pro-image-preview")?
        .set_default("generation.video_model", "veo-3.1-generate-preview")?
        .set_default("generation.timeout_secs", 120)?
        .set_default("generation.poll_interval_secs", 10)?
        .set_default("generation.max_poll_secs", 0)?
        .set_default("generation.use_fake_client", false)?
        .set_default("storage.store_path", "data/storyboard.sled")?
        .set_default("storage.media_dir", "data/media")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: GRIDBOARD_，层级分隔符: __ (双下划线)
    builder = builder.add_source(
        Environment::with_prefix("GRIDBOARD")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建并反序列化
    let config = builder.build()?;
    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    // 5. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.generation.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Generation base URL cannot be empty".to_string(),
        ));
    }

    if config.generation.poll_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Generation poll interval cannot be 0".to_string(),
        ));
    }

    if config.storage.store_path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Story store path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Generation Base URL: {}", config.generation.base_url);
    tracing::info!(
        "Generation API Key: {}",
        if config.generation.api_key.is_empty() {
            "(not set)"
        } else {
            "(set)"
        }
    );
    tracing::info!("Text Model: {}", config.generation.text_model);
    tracing::info!("Image Model: {}", config.generation.image_model);
    tracing::info!("Video Model: {}", config.generation.video_model);
    tracing::info!("Poll Interval: {}s", config.generation.poll_interval_secs);
    if config.generation.max_poll_secs > 0 {
        tracing::info!("Poll Limit: {}s", config.generation.max_poll_secs);
    }
    tracing::info!("Fake Client: {}", config.generation.use_fake_client);
    tracing::info!("Story Store: {}", config.storage.store_path);
    tracing::info!("Media Directory: {:?}", config.storage.media_dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5080);
        assert_eq!(config.generation.poll_interval_secs, 10);
        assert_eq!(config.generation.max_poll_secs, 0);
        assert!(!config.generation.use_fake_client);
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_poll_interval() {
        let mut config = AppConfig::default();
        config.generation.poll_interval_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 6090

[generation]
api_key = "test-key"
poll_interval_secs = 3
"#,
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(config.server.port, 6090);
        assert_eq!(config.generation.api_key, "test-key");
        assert_eq!(config.generation.poll_interval_secs, 3);
        // 未设置的键走默认值
        assert_eq!(config.storage.store_path, "data/storyboard.sled");
    }
}

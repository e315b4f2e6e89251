//! Gridboard - AI 漫画故事板创作系统
//!
//! 架构:
//! - Domain: story/ (Bounded Context)
//! - Application: store, phase, script, media, refine, ports
//! - Infrastructure: http, memory, persistence, adapters, events

use std::sync::Arc;

use gridboard::application::ports::{
    EventSinkPort, GenerationPort, MediaStorePort, PlayableRegistryPort,
};
use gridboard::application::{
    DraftCommitStore, PhaseController, RefineService, SceneMediaLifecycle,
    ScriptSynthesisWorkflow,
};
use gridboard::config::{load_config, print_config};
use gridboard::infrastructure::adapters::{
    FakeGenClient, FileMediaStore, HttpGenClient, HttpGenClientConfig,
};
use gridboard::infrastructure::events::EventPublisher;
use gridboard::infrastructure::http::{AppState, HttpServer, ServerConfig};
use gridboard::infrastructure::memory::InMemoryPlayableRegistry;
use gridboard::infrastructure::persistence::sled::SledStoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},gridboard={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));
    if config.log.json {
        tracing_subscriber::fmt().with_env_filter(env_filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("Gridboard - AI 漫画故事板创作系统");
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.media_dir).await?;
    if let Some(parent) = std::path::Path::new(&config.storage.store_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 打开故事板存储并装载双缓冲状态
    let story_store = Arc::new(SledStoryStore::open(&config.storage.store_path)?);
    let store = Arc::new(DraftCommitStore::open(story_store).await);

    // 创建生成模型客户端
    let generator: Arc<dyn GenerationPort> = if config.generation.use_fake_client {
        tracing::warn!("Using fake generation client, no external calls will be made");
        Arc::new(FakeGenClient::new())
    } else {
        let gen_config = HttpGenClientConfig {
            base_url: config.generation.base_url.clone(),
            api_key: config.generation.api_key.clone(),
            text_model: config.generation.text_model.clone(),
            image_model: config.generation.image_model.clone(),
            video_model: config.generation.video_model.clone(),
            timeout_secs: config.generation.timeout_secs,
            poll_interval_secs: config.generation.poll_interval_secs,
            max_poll_secs: config.generation.max_poll_secs,
        };
        Arc::new(HttpGenClient::new(gen_config).map_err(|e| anyhow::anyhow!(e.to_string()))?)
    };

    // 创建媒体存储与可播放句柄注册表
    let media_store: Arc<dyn MediaStorePort> =
        Arc::new(FileMediaStore::new(config.storage.media_dir.clone()));
    let playable: Arc<dyn PlayableRegistryPort> = Arc::new(InMemoryPlayableRegistry::new());

    // 创建事件发布器
    let event_publisher = Arc::new(EventPublisher::new());
    let event_sink: Arc<dyn EventSinkPort> = event_publisher.clone();

    // 组装应用服务
    let script = Arc::new(ScriptSynthesisWorkflow::new(
        store.clone(),
        generator.clone(),
        event_sink.clone(),
    ));
    let media = Arc::new(SceneMediaLifecycle::new(
        store.clone(),
        generator.clone(),
        media_store,
        playable,
        event_sink.clone(),
    ));
    let refine = Arc::new(RefineService::new(store.clone(), generator.clone()));
    let phase = Arc::new(PhaseController::new(
        store.clone(),
        script.clone(),
        event_sink,
    ));

    // 为持有视频资产引用的分镜恢复本地可播放句柄
    media.hydrate_all().await;

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(store, phase, script, media, refine, event_publisher);
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

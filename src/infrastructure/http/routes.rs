//! HTTP Routes
//!
//! API 路由定义
//!
//! API Endpoints:
//! - /api/ping                GET   健康检查
//! - /api/story/get           GET   获取故事板草稿视图
//! - /api/story/lore/edit     POST  编辑世界观字段（FORGE）
//! - /api/story/episode/edit  POST  编辑章节字段（FORGE）
//! - /api/story/episode/add   POST  追加章节（FORGE）
//! - /api/story/episode/delete POST 删除章节（FORGE）
//! - /api/story/scene/edit    POST  编辑分镜字段（FORGE）
//! - /api/story/select        POST  切换选中章节
//! - /api/story/commit        POST  提交草稿（FORGE）
//! - /api/story/discard       POST  放弃草稿（FORGE）
//! - /api/story/refine        POST  AI 润色单个字段（FORGE）
//! - /api/story/refine_all    POST  AI 全局润色（FORGE）
//! - /api/story/ingest        POST  从原始文档提取故事板（FORGE）
//! - /api/phase/get           GET   查询当前阶段
//! - /api/phase/navigate      POST  阶段导航（带守卫确认）
//! - /api/script/synthesize   POST  合成章节剧本（ARCHITECT，异步）
//! - /api/script/save         POST  保存评审草稿（ARCHITECT）
//! - /api/script/cancel       POST  取消评审草稿（ARCHITECT）
//! - /api/script/state        POST  查询合成状态
//! - /api/scene/image         POST  生成分镜图像（VISUALIZE）
//! - /api/scene/video         POST  合成分镜视频（VISUALIZE，异步）
//! - /api/scene/extend        POST  扩展分镜视频（VISUALIZE，异步）
//! - /api/scene/clear         POST  清除分镜媒体（VISUALIZE）
//! - /api/scene/dismiss       POST  驳回分镜错误态
//! - /api/scene/retry         POST  重试上次失败操作（VISUALIZE，异步）
//! - /api/scene/state         POST  查询分镜媒体状态
//! - /api/asset/{eid}/{sid}   GET   下载本地可播放视频
//! - /ws/events               WS    工作流事件推送

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events", get(handlers::events_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/story", story_routes())
        .nest("/phase", phase_routes())
        .nest("/script", script_routes())
        .nest("/scene", scene_routes())
        .route(
            "/asset/:episode_id/:scene_id",
            get(handlers::download_scene_asset),
        )
}

/// Story 路由
fn story_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get", get(handlers::get_story))
        .route("/lore/edit", post(handlers::edit_lore))
        .route("/episode/edit", post(handlers::edit_episode))
        .route("/episode/add", post(handlers::add_episode))
        .route("/episode/delete", post(handlers::delete_episode))
        .route("/scene/edit", post(handlers::edit_scene))
        .route("/select", post(handlers::select_episode))
        .route("/commit", post(handlers::commit))
        .route("/discard", post(handlers::discard))
        .route("/refine", post(handlers::refine_field))
        .route("/refine_all", post(handlers::refine_all))
        .route("/ingest", post(handlers::ingest))
}

/// Phase 路由
fn phase_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get", get(handlers::get_phase))
        .route("/navigate", post(handlers::navigate))
}

/// Script 路由
fn script_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/synthesize", post(handlers::synthesize_script))
        .route("/save", post(handlers::save_script))
        .route("/cancel", post(handlers::cancel_script))
        .route("/state", post(handlers::script_state))
}

/// Scene 路由
fn scene_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/image", post(handlers::generate_image))
        .route("/video", post(handlers::generate_video))
        .route("/extend", post(handlers::extend_video))
        .route("/clear", post(handlers::clear_scene_assets))
        .route("/dismiss", post(handlers::dismiss_scene_error))
        .route("/retry", post(handlers::retry_scene))
        .route("/state", post(handlers::scene_state))
}

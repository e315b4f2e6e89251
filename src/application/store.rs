//! Draft/Commit Store - 双缓冲故事板状态
//!
//! 同时持有权威（已提交、已持久化）与草稿（编辑中、可放弃）两份完整
//! 故事板快照。草稿只在锻造阶段偏离权威副本；commit 与 discard 是仅有的
//! 两个跨缓冲操作。

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::story::{
    Episode, EpisodeField, Lore, LorePatch, SceneField, Storyboard, StoryError,
};

use super::error::ApplicationError;
use super::ports::StoryStorePort;

/// 双缓冲状态
struct Buffers {
    /// 权威副本（已持久化）
    committed: Storyboard,
    /// 草稿副本（编辑中）
    draft: Storyboard,
    /// 草稿自上次 commit/discard 以来是否偏离权威副本
    dirty: bool,
    /// 当前选中章节的显示序号（基于草稿章节顺序）
    selected: usize,
}

/// Draft/Commit Store
pub struct DraftCommitStore {
    state: RwLock<Buffers>,
    store: Arc<dyn StoryStorePort>,
}

impl DraftCommitStore {
    /// 从持久化存储装载；数据缺失或不可解析时回退内置默认故事板
    pub async fn open(store: Arc<dyn StoryStorePort>) -> Self {
        let committed = match store.load().await {
            Ok(Some((lore, episodes))) => {
                tracing::info!(episodes = episodes.len(), "Storyboard loaded from store");
                Storyboard::from_parts(lore, episodes)
            }
            Ok(None) => {
                tracing::info!("No persisted storyboard, seeding defaults");
                Storyboard::seeded()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Persisted storyboard unreadable, seeding defaults");
                Storyboard::seeded()
            }
        };

        Self::with_committed(committed, store)
    }

    /// 以给定权威副本创建（测试与装配路径）
    pub fn with_committed(committed: Storyboard, store: Arc<dyn StoryStorePort>) -> Self {
        let draft = committed.clone();
        Self {
            state: RwLock::new(Buffers {
                committed,
                draft,
                dirty: false,
                selected: 0,
            }),
            store,
        }
    }

    // ========================================================================
    // 草稿编辑（仅作用于草稿副本，全部置脏）
    // ========================================================================

    pub async fn edit_lore(&self, patch: &LorePatch) {
        let mut guard = self.state.write().await;
        guard.draft.edit_lore(patch);
        guard.dirty = true;
    }

    pub async fn edit_episode_field(
        &self,
        episode_id: u32,
        field: EpisodeField,
        value: String,
    ) -> Result<(), ApplicationError> {
        let mut guard = self.state.write().await;
        guard.draft.edit_episode_field(episode_id, field, value)?;
        guard.dirty = true;
        Ok(())
    }

    pub async fn edit_scene_field(
        &self,
        episode_id: u32,
        scene_id: u32,
        field: SceneField,
        value: String,
    ) -> Result<(), ApplicationError> {
        let mut guard = self.state.write().await;
        guard
            .draft
            .edit_scene_field(episode_id, scene_id, field, value)?;
        guard.dirty = true;
        Ok(())
    }

    /// 追加新章节，返回新章节 id
    pub async fn add_episode(&self) -> u32 {
        let mut guard = self.state.write().await;
        let id = guard.draft.add_episode();
        guard.dirty = true;
        tracing::debug!(episode_id = id, "Episode added to draft");
        id
    }

    /// 删除章节（最后一章不可删除），并收敛选中序号
    pub async fn delete_episode(&self, episode_id: u32) -> Result<(), ApplicationError> {
        let mut guard = self.state.write().await;
        guard.draft.delete_episode(episode_id)?;
        guard.dirty = true;

        let last = guard.draft.episode_count() - 1;
        if guard.selected > last {
            guard.selected = last;
        }
        tracing::debug!(episode_id = episode_id, "Episode deleted from draft");
        Ok(())
    }

    /// 整体替换草稿（AI 导入 / 全局润色结果）
    pub async fn bulk_replace(
        &self,
        lore: Lore,
        episodes: Vec<Episode>,
    ) -> Result<(), ApplicationError> {
        let mut guard = self.state.write().await;
        guard.draft.replace_all(lore, episodes)?;
        guard.dirty = true;

        let last = guard.draft.episode_count() - 1;
        if guard.selected > last {
            guard.selected = last;
        }
        Ok(())
    }

    // ========================================================================
    // 跨缓冲操作
    // ========================================================================

    /// 提交：草稿 → 权威，整体持久化，清除脏标记
    ///
    /// 持久化失败时权威副本不更新、草稿保留、脏标记不清除。
    /// 草稿未偏离时为 no-op，返回 false。
    pub async fn commit(&self) -> Result<bool, ApplicationError> {
        let mut guard = self.state.write().await;
        if !guard.dirty {
            return Ok(false);
        }

        let lore = guard.draft.lore().clone();
        let episodes = guard.draft.episodes().to_vec();
        self.store.save(&lore, &episodes).await?;

        guard.committed = guard.draft.clone();
        guard.dirty = false;
        tracing::info!(episodes = episodes.len(), "Storyboard committed");
        Ok(true)
    }

    /// 放弃草稿：权威 → 草稿，清除脏标记（幂等）
    pub async fn discard(&self) {
        let mut guard = self.state.write().await;
        guard.draft = guard.committed.clone();
        guard.dirty = false;
    }

    // ========================================================================
    // 权威副本直写（生成媒体与剧本合成结果，绕过草稿机制）
    // ========================================================================

    /// 对权威副本应用变更并立即持久化
    ///
    /// 持久化失败时回滚变更。草稿未偏离时同步镜像，保证阶段外
    /// 草稿 == 权威的不变量；草稿已偏离时不触碰草稿。
    pub async fn update_committed<T, F>(&self, mutate: F) -> Result<T, ApplicationError>
    where
        F: FnOnce(&mut Storyboard) -> Result<T, StoryError>,
    {
        let mut guard = self.state.write().await;
        let backup = guard.committed.clone();

        let value = match mutate(&mut guard.committed) {
            Ok(value) => value,
            Err(e) => {
                guard.committed = backup;
                return Err(e.into());
            }
        };

        let lore = guard.committed.lore().clone();
        let episodes = guard.committed.episodes().to_vec();
        if let Err(e) = self.store.save(&lore, &episodes).await {
            guard.committed = backup;
            return Err(e.into());
        }

        if !guard.dirty {
            guard.draft = guard.committed.clone();
        }
        Ok(value)
    }

    // ========================================================================
    // 读取
    // ========================================================================

    pub async fn dirty(&self) -> bool {
        self.state.read().await.dirty
    }

    pub async fn draft(&self) -> Storyboard {
        self.state.read().await.draft.clone()
    }

    pub async fn committed(&self) -> Storyboard {
        self.state.read().await.committed.clone()
    }

    pub async fn committed_episode(&self, episode_id: u32) -> Option<Episode> {
        self.state
            .read()
            .await
            .committed
            .episode(episode_id)
            .cloned()
    }

    pub async fn selected_index(&self) -> usize {
        self.state.read().await.selected
    }

    /// 切换当前选中章节（显示序号）
    pub async fn select_episode(&self, index: usize) -> Result<(), ApplicationError> {
        let mut guard = self.state.write().await;
        if index >= guard.draft.episode_count() {
            return Err(ApplicationError::validation(format!(
                "Episode index {} out of bounds",
                index
            )));
        }
        guard.selected = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::MemoryStoryStore;
    use crate::domain::story::SCENES_PER_EPISODE;

    fn new_store() -> (Arc<MemoryStoryStore>, DraftCommitStore) {
        let backend = Arc::new(MemoryStoryStore::default());
        let store = DraftCommitStore::with_committed(Storyboard::seeded(), backend.clone());
        (backend, store)
    }

    #[tokio::test]
    async fn test_edit_sets_dirty_commit_clears() {
        let (_, store) = new_store();
        assert!(!store.dirty().await);

        store
            .edit_lore(&LorePatch {
                background: Some("改写后的背景".to_string()),
                ..Default::default()
            })
            .await;
        assert!(store.dirty().await);
        assert_ne!(store.draft().await, store.committed().await);

        assert!(store.commit().await.unwrap());
        assert!(!store.dirty().await);
        assert_eq!(store.draft().await, store.committed().await);
    }

    #[tokio::test]
    async fn test_commit_clean_is_noop() {
        let (backend, store) = new_store();
        assert!(!store.commit().await.unwrap());
        assert_eq!(backend.save_count(), 0);
    }

    #[tokio::test]
    async fn test_commit_failure_keeps_draft_and_dirty() {
        let (backend, store) = new_store();
        store
            .edit_episode_field(1, EpisodeField::Title, "新标题".to_string())
            .await
            .unwrap();

        backend.fail_next_save();
        assert!(store.commit().await.is_err());

        // 草稿保留、脏标记保留、权威副本未更新
        assert!(store.dirty().await);
        assert_eq!(store.draft().await.episode(1).unwrap().title, "新标题");
        assert_ne!(store.committed().await.episode(1).unwrap().title, "新标题");

        // 重试提交可以成功
        assert!(store.commit().await.unwrap());
        assert!(!store.dirty().await);
    }

    #[tokio::test]
    async fn test_discard_is_idempotent() {
        let (_, store) = new_store();
        store
            .edit_scene_field(1, 1, SceneField::Dialogue, "新对白".to_string())
            .await
            .unwrap();
        assert!(store.dirty().await);

        store.discard().await;
        let after_first = store.draft().await;
        assert!(!store.dirty().await);
        assert_eq!(after_first, store.committed().await);

        store.discard().await;
        assert_eq!(store.draft().await, after_first);
    }

    #[tokio::test]
    async fn test_commit_round_trips_through_persistence() {
        let (backend, store) = new_store();
        store.add_episode().await;
        store.commit().await.unwrap();

        let reloaded = DraftCommitStore::open(backend.clone()).await;
        assert_eq!(reloaded.committed().await.episodes(), store.committed().await.episodes());
        assert_eq!(reloaded.committed().await.lore(), store.committed().await.lore());
    }

    #[tokio::test]
    async fn test_delete_clamps_selected_index() {
        let (_, store) = new_store();
        store.add_episode().await; // id 2
        store.add_episode().await; // id 3
        store.select_episode(2).await.unwrap();

        // 删除最后一个章节，选中序号收敛到新的末位
        store.delete_episode(3).await.unwrap();
        assert_eq!(store.selected_index().await, 1);

        // 删除非末位章节时序号不越界即可
        store.delete_episode(2).await.unwrap();
        assert_eq!(store.selected_index().await, 0);
    }

    #[tokio::test]
    async fn test_delete_last_episode_rejected() {
        let (_, store) = new_store();
        assert!(store.delete_episode(1).await.is_err());
        assert_eq!(store.draft().await.episode_count(), 1);
    }

    #[tokio::test]
    async fn test_update_committed_mirrors_clean_draft() {
        let (_, store) = new_store();
        store
            .update_committed(|b| b.set_scene_image(1, 1, "data:image/png;base64,xx".into()))
            .await
            .unwrap();

        // 草稿未偏离时直写结果同步镜像到草稿
        assert!(store.draft().await.scene(1, 1).unwrap().image_url.is_some());
        assert!(!store.dirty().await);
    }

    #[tokio::test]
    async fn test_update_committed_leaves_dirty_draft_alone() {
        let (_, store) = new_store();
        store
            .edit_lore(&LorePatch {
                rules: Some("新规则".to_string()),
                ..Default::default()
            })
            .await;

        store
            .update_committed(|b| b.set_scene_image(1, 1, "data:image/png;base64,xx".into()))
            .await
            .unwrap();

        assert!(store.dirty().await);
        assert!(store.draft().await.scene(1, 1).unwrap().image_url.is_none());
        assert_eq!(store.draft().await.lore().rules, "新规则");
    }

    #[tokio::test]
    async fn test_update_committed_rolls_back_on_persist_failure() {
        let (backend, store) = new_store();
        backend.fail_next_save();

        let result = store
            .update_committed(|b| b.set_scene_image(1, 1, "data:image/png;base64,xx".into()))
            .await;
        assert!(result.is_err());
        assert!(store.committed().await.scene(1, 1).unwrap().image_url.is_none());
    }

    #[tokio::test]
    async fn test_seeded_shape() {
        let (_, store) = new_store();
        let board = store.committed().await;
        assert_eq!(board.episode_count(), 1);
        assert_eq!(board.episodes()[0].scenes.len(), SCENES_PER_EPISODE);
    }
}

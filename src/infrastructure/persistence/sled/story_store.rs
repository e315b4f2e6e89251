//! Sled-based Story Store Implementation
//!
//! 故事板整体持久化：固定两个键（lore / episodes），JSON 编码，
//! 批量写入保证两个键同时生效。

use async_trait::async_trait;
use sled::{Batch, Db};
use std::path::Path;

use crate::application::ports::{StoreError, StoryStorePort};
use crate::domain::story::{Episode, Lore};

const KEY_LORE: &str = "lore";
const KEY_EPISODES: &str = "episodes";

/// Sled 故事板存储
pub struct SledStoryStore {
    db: Db,
}

impl SledStoryStore {
    /// 打开或创建存储
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref())
            .map_err(|e| StoreError::Persistence(e.to_string()))?;
        tracing::info!(path = %path.as_ref().display(), "SledStoryStore opened");
        Ok(Self { db })
    }
}

#[async_trait]
impl StoryStorePort for SledStoryStore {
    async fn load(&self) -> Result<Option<(Lore, Vec<Episode>)>, StoreError> {
        let lore_bytes = self
            .db
            .get(KEY_LORE)
            .map_err(|e| StoreError::Persistence(e.to_string()))?;
        let episode_bytes = self
            .db
            .get(KEY_EPISODES)
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        let (lore_bytes, episode_bytes) = match (lore_bytes, episode_bytes) {
            (Some(l), Some(e)) => (l, e),
            // 任一键缺失按未初始化处理，由上层播种默认故事板
            _ => return Ok(None),
        };

        let lore: Lore = serde_json::from_slice(&lore_bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let episodes: Vec<Episode> = serde_json::from_slice(&episode_bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        Ok(Some((lore, episodes)))
    }

    async fn save(&self, lore: &Lore, episodes: &[Episode]) -> Result<(), StoreError> {
        let lore_bytes =
            serde_json::to_vec(lore).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let episode_bytes =
            serde_json::to_vec(episodes).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut batch = Batch::default();
        batch.insert(KEY_LORE, lore_bytes);
        batch.insert(KEY_EPISODES, episode_bytes);
        self.db
            .apply_batch(batch)
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        self.db
            .flush_async()
            .await
            .map_err(|e| StoreError::Persistence(e.to_string()))?;

        tracing::debug!(episodes = episodes.len(), "Storyboard persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::{default_episodes, default_lore};

    #[tokio::test]
    async fn test_load_empty_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStoryStore::open(dir.path().join("story.sled")).unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.sled");

        let lore = default_lore();
        let episodes = default_episodes();
        {
            let store = SledStoryStore::open(&path).unwrap();
            store.save(&lore, &episodes).await.unwrap();
        }

        // 重新打开验证落盘
        let store = SledStoryStore::open(&path).unwrap();
        let (loaded_lore, loaded_episodes) = store.load().await.unwrap().unwrap();
        assert_eq!(loaded_lore, lore);
        assert_eq!(loaded_episodes, episodes);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStoryStore::open(dir.path().join("story.sled")).unwrap();

        let lore = default_lore();
        store.save(&lore, &default_episodes()).await.unwrap();

        let mut episodes = default_episodes();
        episodes[0].title = "改写后的标题".to_string();
        store.save(&lore, &episodes).await.unwrap();

        let (_, loaded) = store.load().await.unwrap().unwrap();
        assert_eq!(loaded[0].title, "改写后的标题");
    }
}

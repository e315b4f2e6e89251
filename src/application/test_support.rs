//! 测试辅助 - 内存版故事板存储

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::story::{Episode, Lore};

use super::ports::{StoreError, StoryStorePort};

/// 内存故事板存储（可注入单次保存失败）
#[derive(Default)]
pub(crate) struct MemoryStoryStore {
    snapshot: Mutex<Option<(Lore, Vec<Episode>)>>,
    fail_next: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStoryStore {
    pub(crate) fn fail_next_save(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub(crate) fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoryStorePort for MemoryStoryStore {
    async fn load(&self) -> Result<Option<(Lore, Vec<Episode>)>, StoreError> {
        Ok(self.snapshot.lock().await.clone())
    }

    async fn save(&self, lore: &Lore, episodes: &[Episode]) -> Result<(), StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Persistence("injected save failure".to_string()));
        }
        *self.snapshot.lock().await = Some((lore.clone(), episodes.to_vec()));
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

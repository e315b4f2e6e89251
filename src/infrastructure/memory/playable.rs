//! In-Memory Playable Registry
//!
//! 分镜 → 本地可播放文件路径的会话级注册表。只存在于内存，
//! 进程重启后由媒体生命周期按资产引用重建。

use std::path::PathBuf;

use dashmap::DashMap;

use crate::application::ports::{PlayableRegistryPort, SceneKey};

/// 内存可播放句柄注册表
#[derive(Default)]
pub struct InMemoryPlayableRegistry {
    handles: DashMap<SceneKey, PathBuf>,
}

impl InMemoryPlayableRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlayableRegistryPort for InMemoryPlayableRegistry {
    fn set(&self, key: SceneKey, path: PathBuf) -> Option<PathBuf> {
        self.handles.insert(key, path)
    }

    fn get(&self, key: SceneKey) -> Option<PathBuf> {
        self.handles.get(&key).map(|p| p.clone())
    }

    fn revoke(&self, key: SceneKey) -> Option<PathBuf> {
        self.handles.remove(&key).map(|(_, path)| path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_and_returns_old_handle() {
        let registry = InMemoryPlayableRegistry::new();
        let key = SceneKey::new(1, 1);

        assert!(registry.set(key, PathBuf::from("/tmp/a.mp4")).is_none());
        let old = registry.set(key, PathBuf::from("/tmp/b.mp4"));
        assert_eq!(old, Some(PathBuf::from("/tmp/a.mp4")));
        assert_eq!(registry.get(key), Some(PathBuf::from("/tmp/b.mp4")));
    }

    #[test]
    fn test_revoke_removes_handle() {
        let registry = InMemoryPlayableRegistry::new();
        let key = SceneKey::new(2, 3);

        registry.set(key, PathBuf::from("/tmp/v.mp4"));
        assert_eq!(registry.revoke(key), Some(PathBuf::from("/tmp/v.mp4")));
        assert!(registry.get(key).is_none());
        assert!(registry.revoke(key).is_none());
    }
}

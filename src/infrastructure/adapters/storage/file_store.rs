//! File Media Store - 本地文件系统媒体存储
//!
//! 下载的视频字节按分镜身份命名落盘（{episode}-{scene}.mp4），
//! 被替换时直接覆盖，清除时删除。

use std::path::PathBuf;

use async_trait::async_trait;

use crate::application::ports::{MediaStoreError, MediaStorePort, SceneKey};

/// File Media Store
pub struct FileMediaStore {
    /// 媒体文件根目录
    base_dir: PathBuf,
}

impl FileMediaStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }
}

#[async_trait]
impl MediaStorePort for FileMediaStore {
    fn media_path(&self, key: SceneKey) -> PathBuf {
        self.base_dir.join(format!("{}.mp4", key))
    }

    async fn save_media(&self, key: SceneKey, data: &[u8]) -> Result<PathBuf, MediaStoreError> {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| MediaStoreError::Io(e.to_string()))?;

        let path = self.media_path(key);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| MediaStoreError::Io(e.to_string()))?;

        tracing::debug!(%key, path = %path.display(), bytes = data.len(), "Media file saved");
        Ok(path)
    }

    async fn delete_media(&self, key: SceneKey) -> Result<(), MediaStoreError> {
        let path = self.media_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(%key, path = %path.display(), "Media file deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaStoreError::Io(e.to_string())),
        }
    }

    async fn media_exists(&self, key: SceneKey) -> bool {
        tokio::fs::try_exists(self.media_path(key))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMediaStore::new(dir.path().to_path_buf());
        let key = SceneKey::new(1, 3);

        let path = store.save_media(key, b"video bytes").await.unwrap();
        assert!(path.exists());
        assert!(store.media_exists(key).await);
        assert_eq!(path.file_name().unwrap(), "1-3.mp4");

        store.delete_media(key).await.unwrap();
        assert!(!store.media_exists(key).await);
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMediaStore::new(dir.path().to_path_buf());
        assert!(store.delete_media(SceneKey::new(9, 9)).await.is_ok());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMediaStore::new(dir.path().to_path_buf());
        let key = SceneKey::new(2, 1);

        store.save_media(key, b"first").await.unwrap();
        let path = store.save_media(key, b"second").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second");
    }
}

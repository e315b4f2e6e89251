//! Playable Registry Port - 本地可播放句柄注册表
//!
//! 资产引用是可持久化的远端指针，可播放句柄是会话级的本地资源。
//! 注册表只存在于内存中，进程重启后通过按需拉取重建。

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 分镜身份键（章节 id + 分镜 id）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneKey {
    pub episode: u32,
    pub scene: u32,
}

impl SceneKey {
    pub fn new(episode: u32, scene: u32) -> Self {
        Self { episode, scene }
    }
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.episode, self.scene)
    }
}

/// Playable Registry Port
pub trait PlayableRegistryPort: Send + Sync {
    /// 登记分镜的本地可播放路径（替换旧句柄时返回旧路径）
    fn set(&self, key: SceneKey, path: PathBuf) -> Option<PathBuf>;

    /// 查询分镜的本地可播放路径
    fn get(&self, key: SceneKey) -> Option<PathBuf>;

    /// 撤销句柄（清除资产或被新句柄取代时调用）
    fn revoke(&self, key: SceneKey) -> Option<PathBuf>;
}

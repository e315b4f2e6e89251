//! Story Context - Value Objects

use serde::{Deserialize, Serialize};

/// 字段内容为"空"的占位标记（叙述/对白/音效中表示无内容）
pub const NONE_MARKER: &str = "无";

/// 世界观设定
///
/// 全局单例，所有章节共享。首次加载时使用内置默认值创建。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lore {
    /// 世界背景
    pub background: String,
    /// 角色设定
    pub characters: String,
    /// 世界规则
    pub rules: String,
}

impl Lore {
    pub fn new(
        background: impl Into<String>,
        characters: impl Into<String>,
        rules: impl Into<String>,
    ) -> Self {
        Self {
            background: background.into(),
            characters: characters.into(),
            rules: rules.into(),
        }
    }

    /// 应用局部修改，返回是否有字段被更新
    pub fn apply(&mut self, patch: &LorePatch) -> bool {
        let mut changed = false;
        if let Some(background) = &patch.background {
            self.background = background.clone();
            changed = true;
        }
        if let Some(characters) = &patch.characters {
            self.characters = characters.clone();
            changed = true;
        }
        if let Some(rules) = &patch.rules {
            self.rules = rules.clone();
            changed = true;
        }
        changed
    }
}

/// Lore 局部修改
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LorePatch {
    pub background: Option<String>,
    pub characters: Option<String>,
    pub rules: Option<String>,
}

/// 图像生成分辨率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "1K")]
    K1,
    #[serde(rename = "2K")]
    K2,
    #[serde(rename = "4K")]
    K4,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::K1 => "1K",
            ImageSize::K2 => "2K",
            ImageSize::K4 => "4K",
        }
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        ImageSize::K1
    }
}

/// 世界观可编辑字段选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoreField {
    Background,
    Characters,
    Rules,
}

/// 章节可编辑字段选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeField {
    Title,
    Summary,
}

/// 分镜可编辑字段选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneField {
    Title,
    Visual,
    Description,
    Narrative,
    Dialogue,
    UiSfx,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lore_patch_partial() {
        let mut lore = Lore::new("bg", "chars", "rules");
        let changed = lore.apply(&LorePatch {
            background: Some("new bg".to_string()),
            ..Default::default()
        });
        assert!(changed);
        assert_eq!(lore.background, "new bg");
        assert_eq!(lore.characters, "chars");
    }

    #[test]
    fn test_lore_patch_empty_is_noop() {
        let mut lore = Lore::new("bg", "chars", "rules");
        let before = lore.clone();
        assert!(!lore.apply(&LorePatch::default()));
        assert_eq!(lore, before);
    }

    #[test]
    fn test_image_size_serde_names() {
        assert_eq!(serde_json::to_string(&ImageSize::K2).unwrap(), "\"2K\"");
        let parsed: ImageSize = serde_json::from_str("\"4K\"").unwrap();
        assert_eq!(parsed, ImageSize::K4);
    }
}

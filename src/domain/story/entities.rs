//! Story Context - Entities

use serde::{Deserialize, Serialize};

use super::NONE_MARKER;

/// 每个新章节注册时创建的分镜数量
pub const SCENES_PER_EPISODE: usize = 8;

/// 分镜 - 最小故事板单位
///
/// 不变量:
/// - id 在所属 Episode 内唯一
/// - image_url 与 video_ref 为生成产物，展示优先级: 视频 > 图像 > 占位
/// - is_extended 仅在 video_ref 存在时有意义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// 分镜编号（章节内顺序）
    pub id: u32,
    /// 分镜标题
    pub title: String,
    /// 画面构图提示（生成输入）
    pub visual: String,
    /// 画面描述提示（生成输入）
    pub description: String,
    /// 旁白
    pub narrative: String,
    /// 对白
    pub dialogue: String,
    /// UI / 音效标注
    pub ui_sfx: String,
    /// 已生成的图像引用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// 已生成视频的远端资产引用（可持久化的不透明句柄）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_ref: Option<String>,
    /// 视频是否已经历过一次时长扩展
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_extended: bool,
}

impl Scene {
    /// 创建占位分镜
    pub fn placeholder(id: u32) -> Self {
        Self {
            id,
            title: format!("Scene {}", id),
            visual: String::new(),
            description: String::new(),
            narrative: NONE_MARKER.to_string(),
            dialogue: NONE_MARKER.to_string(),
            ui_sfx: NONE_MARKER.to_string(),
            image_url: None,
            video_ref: None,
            is_extended: false,
        }
    }

    /// 是否存在任何生成媒体
    pub fn has_media(&self) -> bool {
        self.image_url.is_some() || self.video_ref.is_some()
    }

    /// 清空所有生成媒体字段
    pub fn clear_media(&mut self) {
        self.image_url = None;
        self.video_ref = None;
        self.is_extended = false;
    }
}

/// 章节 - 有序分镜的叙事单位
///
/// 不变量:
/// - id 为稳定标识（不等同于显示顺序）
/// - scenes 按 id 有序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// 章节稳定标识
    pub id: u32,
    /// 章节标题
    pub title: String,
    /// 章节梗概
    pub summary: String,
    /// 分镜列表
    pub scenes: Vec<Scene>,
}

impl Episode {
    /// 创建带固定数量占位分镜的新章节
    pub fn placeholder(id: u32) -> Self {
        Self {
            id,
            title: "新章节".to_string(),
            summary: String::new(),
            scenes: (1..=SCENES_PER_EPISODE as u32)
                .map(Scene::placeholder)
                .collect(),
        }
    }

    pub fn scene(&self, scene_id: u32) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == scene_id)
    }

    pub fn scene_mut(&mut self, scene_id: u32) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.id == scene_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_episode_shape() {
        let ep = Episode::placeholder(2);
        assert_eq!(ep.id, 2);
        assert_eq!(ep.scenes.len(), SCENES_PER_EPISODE);
        assert_eq!(ep.scenes[0].title, "Scene 1");
        assert_eq!(ep.scenes[7].title, "Scene 8");
    }

    #[test]
    fn test_scene_clear_media() {
        let mut scene = Scene::placeholder(1);
        scene.image_url = Some("data:image/png;base64,xxxx".to_string());
        scene.video_ref = Some("files/abc123".to_string());
        scene.is_extended = true;

        scene.clear_media();
        assert!(!scene.has_media());
        assert!(!scene.is_extended);
    }

    #[test]
    fn test_scene_media_serde_skipped_when_absent() {
        let scene = Scene::placeholder(1);
        let json = serde_json::to_string(&scene).unwrap();
        assert!(!json.contains("image_url"));
        assert!(!json.contains("video_ref"));
        assert!(!json.contains("is_extended"));
    }
}

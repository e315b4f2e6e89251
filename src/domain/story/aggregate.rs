//! Story Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    default_episodes, default_lore, Episode, EpisodeField, LorePatch, Scene, SceneField,
    StoryError, Lore,
};

/// Storyboard 聚合根
///
/// 不变量:
/// - 章节列表永不为空
/// - 章节 id 唯一且稳定（新 id = 现有最大 id + 1）
/// - 分镜媒体字段只通过专用操作修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storyboard {
    lore: Lore,
    episodes: Vec<Episode>,
    updated_at: DateTime<Utc>,
}

impl Storyboard {
    /// 从已有数据装配故事板（持久化加载路径）
    ///
    /// 空章节列表会被替换为一个占位章节，保证不变量成立。
    pub fn from_parts(lore: Lore, mut episodes: Vec<Episode>) -> Self {
        if episodes.is_empty() {
            episodes.push(Episode::placeholder(1));
        }
        Self {
            lore,
            episodes,
            updated_at: Utc::now(),
        }
    }

    /// 内置默认故事板（新项目）
    pub fn seeded() -> Self {
        Self::from_parts(default_lore(), default_episodes())
    }

    // Getters
    pub fn lore(&self) -> &Lore {
        &self.lore
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn episode(&self, id: u32) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.id == id)
    }

    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// 修改世界观设定
    pub fn edit_lore(&mut self, patch: &LorePatch) {
        if self.lore.apply(patch) {
            self.touch();
        }
    }

    /// 修改章节文本字段
    pub fn edit_episode_field(
        &mut self,
        episode_id: u32,
        field: EpisodeField,
        value: String,
    ) -> Result<(), StoryError> {
        let episode = self.episode_mut(episode_id)?;
        match field {
            EpisodeField::Title => episode.title = value,
            EpisodeField::Summary => episode.summary = value,
        }
        self.touch();
        Ok(())
    }

    /// 修改分镜文本字段
    pub fn edit_scene_field(
        &mut self,
        episode_id: u32,
        scene_id: u32,
        field: SceneField,
        value: String,
    ) -> Result<(), StoryError> {
        let scene = self.scene_mut(episode_id, scene_id)?;
        match field {
            SceneField::Title => scene.title = value,
            SceneField::Visual => scene.visual = value,
            SceneField::Description => scene.description = value,
            SceneField::Narrative => scene.narrative = value,
            SceneField::Dialogue => scene.dialogue = value,
            SceneField::UiSfx => scene.ui_sfx = value,
        }
        self.touch();
        Ok(())
    }

    /// 追加新章节（带占位分镜），返回新章节 id
    pub fn add_episode(&mut self) -> u32 {
        let id = self
            .episodes
            .iter()
            .map(|e| e.id)
            .max()
            .map(|max| max + 1)
            .unwrap_or(1);
        self.episodes.push(Episode::placeholder(id));
        self.touch();
        id
    }

    /// 删除章节
    ///
    /// 最后一个章节不可删除。
    pub fn delete_episode(&mut self, episode_id: u32) -> Result<(), StoryError> {
        if self.episodes.len() <= 1 {
            return Err(StoryError::LastEpisode);
        }
        let index = self
            .episodes
            .iter()
            .position(|e| e.id == episode_id)
            .ok_or(StoryError::EpisodeNotFound(episode_id))?;
        self.episodes.remove(index);
        self.touch();
        Ok(())
    }

    /// 整体替换分镜列表（剧本合成结果写入），返回被替换的旧分镜
    pub fn replace_scenes(
        &mut self,
        episode_id: u32,
        scenes: Vec<Scene>,
    ) -> Result<Vec<Scene>, StoryError> {
        if scenes.is_empty() {
            return Err(StoryError::EmptyScenes(episode_id));
        }
        let episode = self.episode_mut(episode_id)?;
        let previous = std::mem::replace(&mut episode.scenes, scenes);
        self.touch();
        Ok(previous)
    }

    /// 写入生成图像引用
    pub fn set_scene_image(
        &mut self,
        episode_id: u32,
        scene_id: u32,
        image_url: String,
    ) -> Result<(), StoryError> {
        let scene = self.scene_mut(episode_id, scene_id)?;
        scene.image_url = Some(image_url);
        self.touch();
        Ok(())
    }

    /// 写入生成视频资产引用
    ///
    /// 新生成视频 extended = false；扩展成功后 extended = true。
    pub fn set_scene_video(
        &mut self,
        episode_id: u32,
        scene_id: u32,
        video_ref: String,
        extended: bool,
    ) -> Result<(), StoryError> {
        let scene = self.scene_mut(episode_id, scene_id)?;
        scene.video_ref = Some(video_ref);
        scene.is_extended = extended;
        self.touch();
        Ok(())
    }

    /// 清空分镜的所有生成媒体
    pub fn clear_scene_media(&mut self, episode_id: u32, scene_id: u32) -> Result<(), StoryError> {
        let scene = self.scene_mut(episode_id, scene_id)?;
        scene.clear_media();
        self.touch();
        Ok(())
    }

    /// 整体替换（AI 导入 / 全局润色结果）
    pub fn replace_all(&mut self, lore: Lore, episodes: Vec<Episode>) -> Result<(), StoryError> {
        if episodes.is_empty() {
            return Err(StoryError::EmptyStory);
        }
        self.lore = lore;
        self.episodes = episodes;
        self.touch();
        Ok(())
    }

    pub fn scene(&self, episode_id: u32, scene_id: u32) -> Option<&Scene> {
        self.episode(episode_id).and_then(|e| e.scene(scene_id))
    }

    fn episode_mut(&mut self, episode_id: u32) -> Result<&mut Episode, StoryError> {
        self.episodes
            .iter_mut()
            .find(|e| e.id == episode_id)
            .ok_or(StoryError::EpisodeNotFound(episode_id))
    }

    fn scene_mut(&mut self, episode_id: u32, scene_id: u32) -> Result<&mut Scene, StoryError> {
        self.episodes
            .iter_mut()
            .find(|e| e.id == episode_id)
            .ok_or(StoryError::EpisodeNotFound(episode_id))?
            .scene_mut(scene_id)
            .ok_or(StoryError::SceneNotFound {
                episode: episode_id,
                scene: scene_id,
            })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Storyboard {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::SCENES_PER_EPISODE;

    #[test]
    fn test_seeded_board_has_one_episode_of_eight_scenes() {
        let board = Storyboard::seeded();
        assert_eq!(board.episode_count(), 1);
        assert_eq!(board.episodes()[0].id, 1);
        assert_eq!(board.episodes()[0].scenes.len(), SCENES_PER_EPISODE);
    }

    #[test]
    fn test_add_episode_assigns_next_id_and_placeholders() {
        let mut board = Storyboard::seeded();
        let id = board.add_episode();
        assert_eq!(id, 2);
        assert_eq!(board.episode_count(), 2);

        let ep = board.episode(2).unwrap();
        assert_eq!(ep.scenes.len(), SCENES_PER_EPISODE);
        assert_eq!(ep.scenes[0].title, "Scene 1");
        assert_eq!(ep.scenes[7].title, "Scene 8");
    }

    #[test]
    fn test_episode_id_stable_after_deletion() {
        let mut board = Storyboard::seeded();
        board.add_episode(); // id 2
        board.add_episode(); // id 3
        board.delete_episode(2).unwrap();
        // 下一个 id 基于最大现存 id，而不是数量
        assert_eq!(board.add_episode(), 4);
    }

    #[test]
    fn test_delete_last_episode_rejected() {
        let mut board = Storyboard::seeded();
        assert!(matches!(
            board.delete_episode(1),
            Err(StoryError::LastEpisode)
        ));
        assert_eq!(board.episode_count(), 1);
    }

    #[test]
    fn test_replace_scenes_returns_previous() {
        let mut board = Storyboard::seeded();
        let original_titles: Vec<String> = board.episodes()[0]
            .scenes
            .iter()
            .map(|s| s.title.clone())
            .collect();

        let replacement = vec![Scene::placeholder(1)];
        let previous = board.replace_scenes(1, replacement).unwrap();
        assert_eq!(
            previous.iter().map(|s| s.title.clone()).collect::<Vec<_>>(),
            original_titles
        );
        assert_eq!(board.episode(1).unwrap().scenes.len(), 1);
    }

    #[test]
    fn test_replace_scenes_with_empty_rejected() {
        let mut board = Storyboard::seeded();
        assert!(board.replace_scenes(1, Vec::new()).is_err());
        assert_eq!(
            board.episode(1).unwrap().scenes.len(),
            SCENES_PER_EPISODE
        );
    }

    #[test]
    fn test_scene_media_writes() {
        let mut board = Storyboard::seeded();
        board
            .set_scene_video(1, 1, "files/op-1".to_string(), false)
            .unwrap();
        let scene = board.scene(1, 1).unwrap();
        assert_eq!(scene.video_ref.as_deref(), Some("files/op-1"));
        assert!(!scene.is_extended);

        board
            .set_scene_video(1, 1, "files/op-2".to_string(), true)
            .unwrap();
        assert!(board.scene(1, 1).unwrap().is_extended);

        board.clear_scene_media(1, 1).unwrap();
        assert!(!board.scene(1, 1).unwrap().has_media());
    }
}

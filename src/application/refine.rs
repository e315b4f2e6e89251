//! Refine Service - AI 文本润色与导入
//!
//! 单字段润色作用于草稿副本：产出写回草稿等待用户提交，
//! 生成失败时回退为原文（不报错、不置脏）。

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::story::{EpisodeField, LoreField, LorePatch, SceneField};

use super::error::ApplicationError;
use super::ports::{GenerationPort, StoryIntel};
use super::store::DraftCommitStore;

/// 润色目标字段
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case", tag = "target")]
pub enum RefineTarget {
    Lore {
        field: LoreField,
    },
    Episode {
        episode_id: u32,
        field: EpisodeField,
    },
    Scene {
        episode_id: u32,
        scene_id: u32,
        field: SceneField,
    },
}

/// 润色结果
#[derive(Debug, Clone)]
pub struct RefineOutcome {
    /// 润色后文本（失败时为原文）
    pub text: String,
    /// 是否实际发生了润色
    pub refined: bool,
}

/// Refine Service
pub struct RefineService {
    store: Arc<DraftCommitStore>,
    generator: Arc<dyn GenerationPort>,
}

impl RefineService {
    pub fn new(store: Arc<DraftCommitStore>, generator: Arc<dyn GenerationPort>) -> Self {
        Self { store, generator }
    }

    /// 按用户反馈润色单个字段
    ///
    /// 成功时将产出写入草稿并返回新文本；生成失败时返回原文，
    /// 草稿保持不变。
    pub async fn refine_field(
        &self,
        target: RefineTarget,
        feedback: &str,
    ) -> Result<RefineOutcome, ApplicationError> {
        let draft = self.store.draft().await;
        let (label, current) = match target {
            RefineTarget::Lore { field } => {
                let lore = draft.lore();
                let current = match field {
                    LoreField::Background => lore.background.clone(),
                    LoreField::Characters => lore.characters.clone(),
                    LoreField::Rules => lore.rules.clone(),
                };
                (lore_label(field), current)
            }
            RefineTarget::Episode { episode_id, field } => {
                let episode = draft
                    .episode(episode_id)
                    .ok_or_else(|| ApplicationError::not_found("Episode", episode_id))?;
                let current = match field {
                    EpisodeField::Title => episode.title.clone(),
                    EpisodeField::Summary => episode.summary.clone(),
                };
                (episode_label(field), current)
            }
            RefineTarget::Scene {
                episode_id,
                scene_id,
                field,
            } => {
                let scene = draft.scene(episode_id, scene_id).ok_or_else(|| {
                    ApplicationError::not_found("Scene", format!("{}-{}", episode_id, scene_id))
                })?;
                let current = match field {
                    SceneField::Title => scene.title.clone(),
                    SceneField::Visual => scene.visual.clone(),
                    SceneField::Description => scene.description.clone(),
                    SceneField::Narrative => scene.narrative.clone(),
                    SceneField::Dialogue => scene.dialogue.clone(),
                    SceneField::UiSfx => scene.ui_sfx.clone(),
                };
                (scene_label(field), current)
            }
        };

        let context = format!(
            "世界背景：{}\n角色设定：{}\n世界规则：{}",
            draft.lore().background,
            draft.lore().characters,
            draft.lore().rules
        );

        let refined = match self
            .generator
            .refine_text(label, &current, feedback, &context)
            .await
        {
            Ok(text) if !text.trim().is_empty() && text != current => text,
            Ok(_) => {
                return Ok(RefineOutcome {
                    text: current,
                    refined: false,
                })
            }
            Err(e) => {
                tracing::warn!(label, error = %e, "Field refinement failed, keeping original");
                return Ok(RefineOutcome {
                    text: current,
                    refined: false,
                });
            }
        };

        match target {
            RefineTarget::Lore { field } => {
                let mut patch = LorePatch::default();
                match field {
                    LoreField::Background => patch.background = Some(refined.clone()),
                    LoreField::Characters => patch.characters = Some(refined.clone()),
                    LoreField::Rules => patch.rules = Some(refined.clone()),
                }
                self.store.edit_lore(&patch).await;
            }
            RefineTarget::Episode { episode_id, field } => {
                self.store
                    .edit_episode_field(episode_id, field, refined.clone())
                    .await?;
            }
            RefineTarget::Scene {
                episode_id,
                scene_id,
                field,
            } => {
                self.store
                    .edit_scene_field(episode_id, scene_id, field, refined.clone())
                    .await?;
            }
        }

        tracing::info!(label, "Field refined");
        Ok(RefineOutcome {
            text: refined,
            refined: true,
        })
    }

    /// 按反馈对整个故事板做全局润色，结果写入草稿
    pub async fn refine_all(&self, feedback: &str) -> Result<(), ApplicationError> {
        let draft = self.store.draft().await;
        let intel = self
            .generator
            .bulk_refine(draft.lore(), draft.episodes(), feedback)
            .await
            .map_err(|e| ApplicationError::ExternalService(e.to_string()))?;

        self.apply_intel(intel).await?;
        tracing::info!("Storyboard bulk-refined into draft");
        Ok(())
    }

    /// 从原始文档提取世界观与章节结构，结果写入草稿
    pub async fn ingest(&self, raw_text: &str) -> Result<(), ApplicationError> {
        if raw_text.trim().is_empty() {
            return Err(ApplicationError::validation("Source text is empty"));
        }
        let intel = self
            .generator
            .ingest_story_intel(raw_text)
            .await
            .map_err(|e| ApplicationError::ExternalService(e.to_string()))?;

        self.apply_intel(intel).await?;
        tracing::info!("Story intel ingested into draft");
        Ok(())
    }

    async fn apply_intel(&self, intel: StoryIntel) -> Result<(), ApplicationError> {
        if intel.episodes.is_empty() {
            return Err(ApplicationError::ExternalService(
                "Generation produced no episodes".to_string(),
            ));
        }
        self.store.bulk_replace(intel.lore, intel.episodes).await
    }
}

fn lore_label(field: LoreField) -> &'static str {
    match field {
        LoreField::Background => "world background",
        LoreField::Characters => "character profiles",
        LoreField::Rules => "world rules",
    }
}

fn episode_label(field: EpisodeField) -> &'static str {
    match field {
        EpisodeField::Title => "episode title",
        EpisodeField::Summary => "episode summary",
    }
}

fn scene_label(field: SceneField) -> &'static str {
    match field {
        SceneField::Title => "scene title",
        SceneField::Visual => "scene visual",
        SceneField::Description => "scene description",
        SceneField::Narrative => "scene narrative",
        SceneField::Dialogue => "scene dialogue",
        SceneField::UiSfx => "scene ui/sfx",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::GenerationError;
    use crate::application::test_support::MemoryStoryStore;
    use crate::domain::story::{Episode, Lore, Storyboard};
    use crate::infrastructure::adapters::FakeGenClient;

    fn service_with(generator: FakeGenClient) -> (Arc<DraftCommitStore>, RefineService) {
        let backend = Arc::new(MemoryStoryStore::default());
        let store = Arc::new(DraftCommitStore::with_committed(
            Storyboard::seeded(),
            backend,
        ));
        let service = RefineService::new(store.clone(), Arc::new(generator));
        (store, service)
    }

    #[tokio::test]
    async fn test_refine_writes_to_draft_and_marks_dirty() {
        let (store, service) = service_with(FakeGenClient::new());

        let outcome = service
            .refine_field(
                RefineTarget::Lore {
                    field: LoreField::Rules,
                },
                "更简洁",
            )
            .await
            .unwrap();

        assert!(outcome.refined);
        assert_eq!(store.draft().await.lore().rules, outcome.text);
        assert!(store.dirty().await);
        // 权威副本不受影响，等待提交
        assert_ne!(store.committed().await.lore().rules, outcome.text);
    }

    #[tokio::test]
    async fn test_refine_failure_falls_back_to_original() {
        let (store, service) = service_with(
            FakeGenClient::new().with_refine_error(GenerationError::Timeout),
        );
        let original = store.draft().await.scene(1, 1).unwrap().dialogue.clone();

        let outcome = service
            .refine_field(
                RefineTarget::Scene {
                    episode_id: 1,
                    scene_id: 1,
                    field: SceneField::Dialogue,
                },
                "更口语化",
            )
            .await
            .unwrap();

        assert!(!outcome.refined);
        assert_eq!(outcome.text, original);
        assert!(!store.dirty().await);
    }

    #[tokio::test]
    async fn test_refine_unknown_target_rejected() {
        let (_, service) = service_with(FakeGenClient::new());
        assert!(service
            .refine_field(
                RefineTarget::Episode {
                    episode_id: 99,
                    field: EpisodeField::Title
                },
                "x"
            )
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_ingest_replaces_draft() {
        let intel = StoryIntel {
            lore: Lore::new("新背景", "新角色", "新规则"),
            episodes: vec![Episode::placeholder(1), Episode::placeholder(2)],
        };
        let (store, service) = service_with(FakeGenClient::new().with_intel(intel));

        service.ingest("一篇小说原文……").await.unwrap();
        let draft = store.draft().await;
        assert_eq!(draft.lore().background, "新背景");
        assert_eq!(draft.episode_count(), 2);
        assert!(store.dirty().await);
    }

    #[tokio::test]
    async fn test_ingest_empty_text_rejected() {
        let (_, service) = service_with(FakeGenClient::new());
        assert!(service.ingest("  ").await.is_err());
    }

    #[tokio::test]
    async fn test_refine_all_keeps_committed_untouched() {
        let intel = StoryIntel {
            lore: Lore::new("润色背景", "润色角色", "润色规则"),
            episodes: vec![Episode::placeholder(1)],
        };
        let (store, service) = service_with(FakeGenClient::new().with_intel(intel));
        let committed = store.committed().await;

        service.refine_all("整体更紧凑").await.unwrap();
        assert_eq!(store.committed().await, committed);
        assert_eq!(store.draft().await.lore().background, "润色背景");
    }
}

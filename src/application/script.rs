//! Chapter Script Synthesis Workflow - 章节剧本合成评审流
//!
//! 以章节为粒度的 AI 重生成流程：合成 → 预览评审 → 保存或回退。
//! 评审用的旧分镜快照独立于全局草稿机制，合成结果直写权威副本。

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::domain::story::Scene;

use super::error::ApplicationError;
use super::ports::{EventSinkPort, GenerationPort, WorkflowEvent};
use super::store::DraftCommitStore;

/// 合成失败的用户可见消息前缀
const SYNTHESIS_FAILED: &str = "Script synthesis failed";

/// 单章节合成状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptState {
    /// 空闲
    Idle,
    /// 合成中（同一章节同时只允许一个合成任务）
    Synthesizing,
    /// 评审中（分镜已替换为新生成内容，可保存或回退）
    Reviewing,
}

impl ScriptState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptState::Idle => "idle",
            ScriptState::Synthesizing => "synthesizing",
            ScriptState::Reviewing => "reviewing",
        }
    }
}

/// 章节评审草稿（合成前旧分镜的快照）
struct EpisodeDraft {
    state: ScriptState,
    previous_scenes: Vec<Scene>,
}

/// Chapter Script Synthesis Workflow
pub struct ScriptSynthesisWorkflow {
    drafts: DashMap<u32, EpisodeDraft>,
    store: Arc<DraftCommitStore>,
    generator: Arc<dyn GenerationPort>,
    events: Arc<dyn EventSinkPort>,
}

impl ScriptSynthesisWorkflow {
    pub fn new(
        store: Arc<DraftCommitStore>,
        generator: Arc<dyn GenerationPort>,
        events: Arc<dyn EventSinkPort>,
    ) -> Self {
        Self {
            drafts: DashMap::new(),
            store,
            generator,
            events,
        }
    }

    /// 当前章节的合成状态
    pub fn state(&self, episode_id: u32) -> ScriptState {
        self.drafts
            .get(&episode_id)
            .map(|d| d.state)
            .unwrap_or(ScriptState::Idle)
    }

    /// 为章节合成新剧本
    ///
    /// 仅在 Idle 状态下有效。成功时替换权威副本中的章节分镜并进入
    /// Reviewing；失败或空产出时分镜保持不变，回到 Idle 并上报错误。
    pub async fn synthesize(&self, episode_id: u32) -> Result<(), ApplicationError> {
        let episode = self
            .store
            .committed_episode(episode_id)
            .await
            .ok_or_else(|| ApplicationError::not_found("Episode", episode_id))?;
        let lore = self.store.committed().await.lore().clone();

        // 原子占位：只有 Idle（或无记录）的章节可以开始合成
        {
            let mut entry = self.drafts.entry(episode_id).or_insert(EpisodeDraft {
                state: ScriptState::Idle,
                previous_scenes: Vec::new(),
            });
            if entry.state != ScriptState::Idle {
                return Err(ApplicationError::invalid_state(format!(
                    "Episode {} script is {}",
                    episode_id,
                    entry.state.as_str()
                )));
            }
            entry.state = ScriptState::Synthesizing;
        }
        self.publish(episode_id, ScriptState::Synthesizing, None);

        let result = self.generator.generate_chapter_script(&lore, &episode).await;

        let scenes = match result {
            Ok(scenes) if !scenes.is_empty() => scenes,
            Ok(_) => {
                return self.fail(episode_id, format!("{}: empty scene list", SYNTHESIS_FAILED))
            }
            Err(e) => return self.fail(episode_id, format!("{}: {}", SYNTHESIS_FAILED, e)),
        };

        // 合成期间可能被导航静默回退（记录被废弃）——结果直接丢弃
        match self.drafts.get(&episode_id).map(|d| d.state) {
            Some(ScriptState::Synthesizing) => {}
            _ => {
                tracing::debug!(episode_id, "Synthesis result discarded, draft abandoned");
                return Ok(());
            }
        }

        let previous = match self
            .store
            .update_committed(|b| b.replace_scenes(episode_id, scenes))
            .await
        {
            Ok(previous) => previous,
            Err(e) => return self.fail(episode_id, format!("{}: {}", SYNTHESIS_FAILED, e)),
        };

        if let Some(mut entry) = self.drafts.get_mut(&episode_id) {
            entry.state = ScriptState::Reviewing;
            entry.previous_scenes = previous;
        }
        self.publish(episode_id, ScriptState::Reviewing, None);
        tracing::info!(episode_id, "Chapter script synthesized, awaiting review");
        Ok(())
    }

    /// 保存评审中的剧本草稿（新分镜转为最终内容）
    pub fn save_draft(&self, episode_id: u32) -> Result<(), ApplicationError> {
        self.require_reviewing(episode_id)?;
        self.drafts.remove(&episode_id);
        self.publish(episode_id, ScriptState::Idle, None);
        tracing::info!(episode_id, "Script draft saved");
        Ok(())
    }

    /// 取消评审中的剧本草稿，逐字段恢复合成前快照
    pub async fn cancel_draft(&self, episode_id: u32) -> Result<(), ApplicationError> {
        self.require_reviewing(episode_id)?;

        let previous = self
            .drafts
            .get(&episode_id)
            .map(|d| d.previous_scenes.clone())
            .unwrap_or_default();

        self.store
            .update_committed(|b| b.replace_scenes(episode_id, previous))
            .await?;

        self.drafts.remove(&episode_id);
        self.publish(episode_id, ScriptState::Idle, None);
        tracing::info!(episode_id, "Script draft cancelled, scenes restored");
        Ok(())
    }

    /// 是否存在待处理的剧本草稿（评审中或合成中）
    pub fn has_pending(&self) -> bool {
        self.drafts
            .iter()
            .any(|entry| entry.state != ScriptState::Idle)
    }

    /// 静默回退所有待处理草稿（导航离开编排阶段时调用，不提示用户）
    ///
    /// 评审中的章节恢复合成前快照；合成中的记录被废弃，完成后的结果
    /// 会被直接丢弃。
    pub async fn revert_all(&self) {
        let pending: Vec<(u32, ScriptState)> = self
            .drafts
            .iter()
            .map(|entry| (*entry.key(), entry.state))
            .collect();

        for (episode_id, state) in pending {
            match state {
                ScriptState::Reviewing => {
                    if let Err(e) = self.cancel_draft(episode_id).await {
                        tracing::warn!(episode_id, error = %e, "Failed to revert script draft");
                    }
                }
                ScriptState::Synthesizing => {
                    self.drafts.remove(&episode_id);
                    self.publish(episode_id, ScriptState::Idle, None);
                    tracing::debug!(episode_id, "In-flight synthesis abandoned");
                }
                ScriptState::Idle => {}
            }
        }
    }

    fn require_reviewing(&self, episode_id: u32) -> Result<(), ApplicationError> {
        match self.state(episode_id) {
            ScriptState::Reviewing => Ok(()),
            other => Err(ApplicationError::invalid_state(format!(
                "Episode {} script is {}, expected reviewing",
                episode_id,
                other.as_str()
            ))),
        }
    }

    fn fail(&self, episode_id: u32, message: String) -> Result<(), ApplicationError> {
        self.drafts.remove(&episode_id);
        self.publish(episode_id, ScriptState::Idle, Some(message.clone()));
        tracing::warn!(episode_id, error = %message, "Script synthesis failed");
        Err(ApplicationError::ScriptSynthesis(message))
    }

    fn publish(&self, episode_id: u32, state: ScriptState, error: Option<String>) {
        self.events.publish(WorkflowEvent::ScriptState {
            episode_id,
            state: state.as_str().to_string(),
            error,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NullEventSink;
    use crate::application::test_support::MemoryStoryStore;
    use crate::domain::story::Storyboard;
    use crate::infrastructure::adapters::FakeGenClient;

    fn workflow_with(generator: FakeGenClient) -> ScriptSynthesisWorkflow {
        let backend = Arc::new(MemoryStoryStore::default());
        let store = Arc::new(DraftCommitStore::with_committed(
            Storyboard::seeded(),
            backend,
        ));
        ScriptSynthesisWorkflow::new(store, Arc::new(generator), Arc::new(NullEventSink))
    }

    fn generated_scenes(n: u32) -> Vec<Scene> {
        (1..=n)
            .map(|id| {
                let mut s = Scene::placeholder(id);
                s.title = format!("生成分镜 {}", id);
                s
            })
            .collect()
    }

    #[tokio::test]
    async fn test_synthesize_then_save() {
        let workflow = workflow_with(FakeGenClient::new().with_script(generated_scenes(8)));

        workflow.synthesize(1).await.unwrap();
        assert_eq!(workflow.state(1), ScriptState::Reviewing);
        assert_eq!(
            workflow.store.committed_episode(1).await.unwrap().scenes[0].title,
            "生成分镜 1"
        );

        workflow.save_draft(1).unwrap();
        assert_eq!(workflow.state(1), ScriptState::Idle);
        // 保存后新分镜即为最终内容
        assert_eq!(
            workflow.store.committed_episode(1).await.unwrap().scenes[0].title,
            "生成分镜 1"
        );
    }

    #[tokio::test]
    async fn test_cancel_restores_snapshot_exactly() {
        let workflow = workflow_with(FakeGenClient::new().with_script(generated_scenes(3)));
        let before = workflow.store.committed_episode(1).await.unwrap().scenes;

        workflow.synthesize(1).await.unwrap();
        assert_ne!(
            workflow.store.committed_episode(1).await.unwrap().scenes,
            before
        );

        workflow.cancel_draft(1).await.unwrap();
        assert_eq!(workflow.state(1), ScriptState::Idle);
        assert_eq!(
            workflow.store.committed_episode(1).await.unwrap().scenes,
            before
        );
    }

    #[tokio::test]
    async fn test_empty_result_leaves_scenes_untouched() {
        let workflow = workflow_with(FakeGenClient::new().with_script(Vec::new()));
        let before = workflow.store.committed_episode(1).await.unwrap().scenes;

        let err = workflow.synthesize(1).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ScriptSynthesis(_)));
        assert_eq!(workflow.state(1), ScriptState::Idle);
        assert_eq!(
            workflow.store.committed_episode(1).await.unwrap().scenes,
            before
        );
    }

    #[tokio::test]
    async fn test_save_requires_reviewing() {
        let workflow = workflow_with(FakeGenClient::new());
        assert!(workflow.save_draft(1).is_err());
        assert!(workflow.cancel_draft(1).await.is_err());
    }

    #[tokio::test]
    async fn test_revert_all_restores_reviewing_episodes() {
        let workflow = workflow_with(FakeGenClient::new().with_script(generated_scenes(2)));
        let before = workflow.store.committed_episode(1).await.unwrap().scenes;

        workflow.synthesize(1).await.unwrap();
        assert!(workflow.has_pending());

        workflow.revert_all().await;
        assert!(!workflow.has_pending());
        assert_eq!(
            workflow.store.committed_episode(1).await.unwrap().scenes,
            before
        );
    }

    #[tokio::test]
    async fn test_unknown_episode_rejected() {
        let workflow = workflow_with(FakeGenClient::new());
        assert!(workflow.synthesize(99).await.is_err());
    }
}

//! Phase Navigation Controller - 三阶段导航状态机
//!
//! FORGE（世界观锻造）→ ARCHITECT（章节编排）→ VISUALIZE（分镜视觉化）。
//! 无终止态，用户自由切换；离开阶段时按策略表执行守卫。
//!
//! 守卫不对称是刻意的产品决策：世界观/章节文本被视为有价值的编辑，
//! 丢弃前需确认；AI 重生成的剧本草稿被视为可抛弃的预览，静默回退。

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::ports::{EventSinkPort, WorkflowEvent};
use super::script::ScriptSynthesisWorkflow;
use super::store::DraftCommitStore;

/// 编辑阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Forge,
    Architect,
    Visualize,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Forge => "FORGE",
            Phase::Architect => "ARCHITECT",
            Phase::Visualize => "VISUALIZE",
        }
    }
}

/// 离开阶段时的守卫行为
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardBehavior {
    /// 直接放行
    Allow,
    /// 草稿偏离时要求确认；接受则放弃草稿后放行，拒绝则中止
    ConfirmDiscard,
    /// 静默回退所有待处理的剧本合成草稿后放行
    RevertScriptDraft,
}

/// 守卫策略表（phase → 离开该阶段时的行为）
#[derive(Debug, Clone)]
pub struct GuardPolicy {
    table: HashMap<Phase, GuardBehavior>,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        let mut table = HashMap::new();
        table.insert(Phase::Forge, GuardBehavior::ConfirmDiscard);
        table.insert(Phase::Architect, GuardBehavior::RevertScriptDraft);
        table.insert(Phase::Visualize, GuardBehavior::Allow);
        Self { table }
    }
}

impl GuardPolicy {
    pub fn behavior(&self, phase: Phase) -> GuardBehavior {
        self.table.get(&phase).copied().unwrap_or(GuardBehavior::Allow)
    }
}

/// 导航结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum NavigateOutcome {
    /// 已切换到目标阶段
    Moved,
    /// 需要用户确认（未发生任何状态变更）
    ConfirmationRequired,
    /// 用户拒绝确认，导航中止（未发生任何状态变更）
    Declined,
}

/// Phase Navigation Controller
pub struct PhaseController {
    phase: RwLock<Phase>,
    policy: GuardPolicy,
    store: Arc<DraftCommitStore>,
    script: Arc<ScriptSynthesisWorkflow>,
    events: Arc<dyn EventSinkPort>,
}

impl PhaseController {
    pub fn new(
        store: Arc<DraftCommitStore>,
        script: Arc<ScriptSynthesisWorkflow>,
        events: Arc<dyn EventSinkPort>,
    ) -> Self {
        Self::with_policy(GuardPolicy::default(), store, script, events)
    }

    pub fn with_policy(
        policy: GuardPolicy,
        store: Arc<DraftCommitStore>,
        script: Arc<ScriptSynthesisWorkflow>,
        events: Arc<dyn EventSinkPort>,
    ) -> Self {
        Self {
            phase: RwLock::new(Phase::Forge),
            policy,
            store,
            script,
            events,
        }
    }

    pub async fn current(&self) -> Phase {
        *self.phase.read().await
    }

    /// 导航到目标阶段
    ///
    /// confirm 携带用户对守卫提示的应答：None 表示尚未询问，
    /// Some(true)/Some(false) 表示接受/拒绝放弃草稿。
    pub async fn navigate(&self, target: Phase, confirm: Option<bool>) -> NavigateOutcome {
        let mut phase = self.phase.write().await;
        let current = *phase;
        if current == target {
            return NavigateOutcome::Moved;
        }

        match self.policy.behavior(current) {
            GuardBehavior::Allow => {}
            GuardBehavior::ConfirmDiscard => {
                if self.store.dirty().await {
                    match confirm {
                        None => return NavigateOutcome::ConfirmationRequired,
                        Some(false) => {
                            tracing::debug!(from = current.as_str(), to = target.as_str(),
                                "Navigation declined, draft kept");
                            return NavigateOutcome::Declined;
                        }
                        Some(true) => self.store.discard().await,
                    }
                }
            }
            GuardBehavior::RevertScriptDraft => {
                if self.script.has_pending() {
                    self.script.revert_all().await;
                }
            }
        }

        *phase = target;
        tracing::info!(from = current.as_str(), to = target.as_str(), "Phase changed");
        self.events.publish(WorkflowEvent::PhaseChanged {
            phase: target.as_str().to_string(),
        });
        NavigateOutcome::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NullEventSink;
    use crate::application::test_support::MemoryStoryStore;
    use crate::domain::story::{LorePatch, Scene, Storyboard};
    use crate::infrastructure::adapters::FakeGenClient;

    fn controller_with(generator: FakeGenClient) -> (Arc<DraftCommitStore>, Arc<ScriptSynthesisWorkflow>, PhaseController) {
        let backend = Arc::new(MemoryStoryStore::default());
        let store = Arc::new(DraftCommitStore::with_committed(
            Storyboard::seeded(),
            backend,
        ));
        let events: Arc<dyn EventSinkPort> = Arc::new(NullEventSink);
        let script = Arc::new(ScriptSynthesisWorkflow::new(
            store.clone(),
            Arc::new(generator),
            events.clone(),
        ));
        let controller = PhaseController::new(store.clone(), script.clone(), events);
        (store, script, controller)
    }

    #[tokio::test]
    async fn test_initial_phase_is_forge() {
        let (_, _, controller) = controller_with(FakeGenClient::new());
        assert_eq!(controller.current().await, Phase::Forge);
    }

    #[tokio::test]
    async fn test_clean_forge_navigates_freely() {
        let (_, _, controller) = controller_with(FakeGenClient::new());
        assert_eq!(
            controller.navigate(Phase::Architect, None).await,
            NavigateOutcome::Moved
        );
        assert_eq!(controller.current().await, Phase::Architect);
    }

    #[tokio::test]
    async fn test_dirty_forge_requires_confirmation() {
        let (store, _, controller) = controller_with(FakeGenClient::new());
        store
            .edit_lore(&LorePatch {
                background: Some("未保存的修改".to_string()),
                ..Default::default()
            })
            .await;

        // 未应答：提示确认，状态不变
        assert_eq!(
            controller.navigate(Phase::Architect, None).await,
            NavigateOutcome::ConfirmationRequired
        );
        assert_eq!(controller.current().await, Phase::Forge);
        assert_eq!(store.draft().await.lore().background, "未保存的修改");

        // 拒绝：中止导航，草稿保留
        assert_eq!(
            controller.navigate(Phase::Architect, Some(false)).await,
            NavigateOutcome::Declined
        );
        assert_eq!(controller.current().await, Phase::Forge);
        assert!(store.dirty().await);

        // 接受：放弃草稿并切换
        assert_eq!(
            controller.navigate(Phase::Architect, Some(true)).await,
            NavigateOutcome::Moved
        );
        assert_eq!(controller.current().await, Phase::Architect);
        assert!(!store.dirty().await);
        assert_eq!(store.draft().await, store.committed().await);
    }

    #[tokio::test]
    async fn test_architect_silently_reverts_script_draft() {
        let scenes: Vec<Scene> = (1..=2).map(Scene::placeholder).collect();
        let (store, script, controller) =
            controller_with(FakeGenClient::new().with_script(scenes));
        let before = store.committed_episode(1).await.unwrap().scenes;

        controller.navigate(Phase::Architect, None).await;
        script.synthesize(1).await.unwrap();
        assert!(script.has_pending());

        // 离开编排阶段：无提示、静默回退
        assert_eq!(
            controller.navigate(Phase::Visualize, None).await,
            NavigateOutcome::Moved
        );
        assert!(!script.has_pending());
        assert_eq!(store.committed_episode(1).await.unwrap().scenes, before);
    }

    #[tokio::test]
    async fn test_navigate_to_current_phase_skips_guard() {
        let (store, _, controller) = controller_with(FakeGenClient::new());
        store
            .edit_lore(&LorePatch {
                rules: Some("x".to_string()),
                ..Default::default()
            })
            .await;
        assert_eq!(
            controller.navigate(Phase::Forge, None).await,
            NavigateOutcome::Moved
        );
        assert!(store.dirty().await);
    }
}

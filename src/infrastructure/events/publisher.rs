//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现：工作流事件经全局广播通道分发给所有
//! 已连接客户端，无订阅者时静默丢弃。

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::application::ports::{EventSinkPort, WorkflowEvent};

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<WorkflowEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅工作流事件（每个 WebSocket 连接一个接收器）
    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.channel.subscribe()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSinkPort for EventPublisher {
    fn publish(&self, event: WorkflowEvent) {
        if let Err(e) = self.channel.send(event) {
            // 无订阅者是正常状态（还没有客户端连接）
            tracing::trace!(error = %e, "Workflow event dropped, no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe();

        publisher.publish(WorkflowEvent::PhaseChanged {
            phase: "ARCHITECT".to_string(),
        });

        match rx.recv().await.unwrap() {
            WorkflowEvent::PhaseChanged { phase } => assert_eq!(phase, "ARCHITECT"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let publisher = EventPublisher::new();
        publisher.publish(WorkflowEvent::StoryCommitted { episode_count: 1 });
    }

    #[test]
    fn test_event_wire_format() {
        let event = WorkflowEvent::SceneMedia {
            episode_id: 1,
            scene_id: 2,
            state: "image_ready".to_string(),
            message: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "SceneMedia");
        assert_eq!(json["data"]["scene_id"], 2);
        assert!(json["data"].get("message").is_none());
    }
}

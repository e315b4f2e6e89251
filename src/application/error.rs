//! 应用层错误定义

use thiserror::Error;

use crate::domain::story::StoryError;

use super::ports::StoreError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    Validation(String),

    /// 状态无效（操作在当前状态下不可用）
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 业务规则违反
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// 持久化失败（提交未生效，草稿保持未提交）
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// 剧本合成失败（章节分镜保持不变）
    #[error("Script synthesis failed: {0}")]
    ScriptSynthesis(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalService(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRule(message.into())
    }
}

impl From<StoreError> for ApplicationError {
    fn from(err: StoreError) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<StoryError> for ApplicationError {
    fn from(err: StoryError) -> Self {
        match err {
            StoryError::EpisodeNotFound(id) => Self::not_found("Episode", id),
            StoryError::SceneNotFound { episode, scene } => {
                Self::not_found("Scene", format!("{}-{}", episode, scene))
            }
            StoryError::LastEpisode | StoryError::EmptyScenes(_) | StoryError::EmptyStory => {
                Self::BusinessRule(err.to_string())
            }
        }
    }
}

//! Story Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoryError {
    #[error("Episode not found: {0}")]
    EpisodeNotFound(u32),

    #[error("Scene not found: episode {episode}, scene {scene}")]
    SceneNotFound { episode: u32, scene: u32 },

    #[error("The last remaining episode cannot be deleted")]
    LastEpisode,

    #[error("Episode {0} cannot be given an empty scene list")]
    EmptyScenes(u32),

    #[error("A storyboard must contain at least one episode")]
    EmptyStory,
}

//! Story Context - 故事板限界上下文
//!
//! 聚合根: Storyboard（Lore + Episode 列表）
//! 实体: Episode / Scene
//! 值对象: Lore / ImageSize / 字段选择器

mod aggregate;
mod defaults;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::Storyboard;
pub use defaults::{default_episodes, default_lore};
pub use entities::{Episode, Scene, SCENES_PER_EPISODE};
pub use errors::StoryError;
pub use value_objects::{
    EpisodeField, ImageSize, Lore, LoreField, LorePatch, SceneField, NONE_MARKER,
};

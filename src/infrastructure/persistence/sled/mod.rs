//! Sled 存储实现

mod story_store;

pub use story_store::SledStoryStore;

//! 媒体存储适配器

mod file_store;

pub use file_store::FileMediaStore;

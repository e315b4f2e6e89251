//! 生成模型客户端适配器

mod fake_client;
mod http_client;

pub use fake_client::FakeGenClient;
pub use http_client::{HttpGenClient, HttpGenClientConfig};

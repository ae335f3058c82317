//! 补全服务客户端抽象
//!
//! 菜单未命中的自由文本走这里：单轮 prompt → 单条回复。
//! 无流式、无对话历史；失败由调用方以 ⚠️ 文本呈现给用户，不重试。

mod mock;
mod openai;

pub use mock::MockLlmClient;
pub use openai::OpenAiClient;

use async_trait::async_trait;

/// 补全客户端 trait：单轮完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 将 prompt 原样发送，返回单条回复文本
    async fn complete(&self, prompt: &str) -> Result<String, String>;
}

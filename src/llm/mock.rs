//! Mock 补全客户端（测试用，无需 API）

use async_trait::async_trait;

use crate::llm::LlmClient;

/// Mock 客户端：回显 prompt
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, String> {
        Ok(format!("Echo from Mock: {}", prompt))
    }
}

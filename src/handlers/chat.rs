use anyhow::Result;
use std::sync::Arc;

use super::prompts;
use crate::models::ChatRequest;
use crate::services::{CohereClient, DeepAiClient};

/// Chat layer: templated prompt construction, Cohere chat as the primary
/// provider and DeepAI as the single fallback hop.
pub struct ChatHandler {
    cohere: Arc<CohereClient>,
    deepai: Arc<DeepAiClient>,
}

impl ChatHandler {
    pub fn new(cohere: Arc<CohereClient>, deepai: Arc<DeepAiClient>) -> Self {
        Self { cohere, deepai }
    }

    pub async fn ask(&self, request: &ChatRequest) -> Result<String> {
        let prompt = prompts::chatbot_prompt(request);
        log::debug!("💬 Chat prompt ({} chars)", prompt.len());

        match self.cohere.chat(&prompt, 0.6).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                log::error!("❌ Cohere chat error: {:#}, falling back to DeepAI", e);
                self.deepai.completion(&prompt).await
            }
        }
    }
}

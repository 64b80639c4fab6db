use async_trait::async_trait;
use rllm::{ builder::{ LLMBackend, LLMBuilder }, LLMProvider };
use std::error::Error as StdError;

use super::{ single_embedding, EmbeddingClient, EmbeddingResponse };
use crate::llm::LlmConfig;

pub const DEFAULT_MODEL: &str = "all-minilm";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Local alternative to the hosted MiniLM pipeline; `all-minilm` yields the same 384 dimensions,
/// so an index built from Hugging Face vectors can be queried with it.
pub struct OllamaEmbeddingClient {
    llm: Box<dyn LLMProvider + Send + Sync>,
    model: String,
    dimensions: Option<u32>,
}

impl OllamaEmbeddingClient {
    pub fn new(
        base_url: Option<String>,
        model: Option<String>,
        dimensions: Option<u32>
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let llm = LLMBuilder::new()
            .backend(LLMBackend::Ollama)
            .base_url(base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))
            .model(&model)
            .stream(false)
            .build()?;

        Ok(Self { llm, model, dimensions })
    }

    /// Ollama needs no key; `api_key` is ignored.
    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Self::new(
            config.base_url.clone(),
            config.embedding_model.clone(),
            config.embedding_dimensions
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimensions(&self) -> Option<u32> {
        self.dimensions
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn embed(
        &self,
        text: &str
    ) -> Result<EmbeddingResponse, Box<dyn StdError + Send + Sync>> {
        let batch = self.llm.embed(vec![text.to_string()]).await?;
        let embedding = single_embedding(batch, self.dimensions, "Ollama")?;
        Ok(EmbeddingResponse { embedding })
    }
}

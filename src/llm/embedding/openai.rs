use async_trait::async_trait;
use rllm::{ builder::{ LLMBackend, LLMBuilder }, LLMProvider };
use std::error::Error as StdError;

use super::{ single_embedding, EmbeddingClient, EmbeddingResponse };
use crate::llm::LlmConfig;

pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// OpenAI embeddings shortened to the index dimension through the `dimensions` request field.
pub struct OpenAIEmbeddingClient {
    llm: Box<dyn LLMProvider + Send + Sync>,
    model: String,
    dimensions: Option<u32>,
}

impl OpenAIEmbeddingClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        dimensions: Option<u32>
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::OpenAI)
            .api_key(api_key)
            .model(&model);
        if let Some(url) = base_url {
            builder = builder.base_url(url);
        }
        if let Some(dims) = dimensions {
            builder = builder.embedding_dimensions(dims);
        }

        Ok(Self { llm: builder.build()?, model, dimensions })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| "EMBEDDING_API_KEY is required for OpenAI embeddings".to_string())?;

        Self::new(
            api_key.to_string(),
            config.embedding_model.clone(),
            config.base_url.clone(),
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
impl EmbeddingClient for OpenAIEmbeddingClient {
    async fn embed(
        &self,
        text: &str
    ) -> Result<EmbeddingResponse, Box<dyn StdError + Send + Sync>> {
        let batch = self.llm.embed(vec![text.to_string()]).await?;
        let embedding = single_embedding(batch, self.dimensions, "OpenAI")?;
        Ok(EmbeddingResponse { embedding })
    }
}

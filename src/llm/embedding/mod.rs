pub mod huggingface;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::sync::Arc;

use super::{ LlmConfig, LlmType };
use self::huggingface::HuggingFaceEmbeddingClient;
use self::ollama::OllamaEmbeddingClient;
use self::openai::OpenAIEmbeddingClient;

#[derive(Debug, Clone)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f32>,
}

#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingResponse, Box<dyn StdError + Send + Sync>>;
}

/// Takes the vector for a single-input batch and checks it against the index dimension.
pub(crate) fn single_embedding(
    mut batch: Vec<Vec<f32>>,
    expected: Option<u32>,
    provider: &str
) -> Result<Vec<f32>, Box<dyn StdError + Send + Sync>> {
    let embedding = batch
        .pop()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| format!("{} embedding generation returned no results", provider))?;
    check_dimensions(embedding, expected, provider)
}

pub(crate) fn check_dimensions(
    embedding: Vec<f32>,
    expected: Option<u32>,
    provider: &str
) -> Result<Vec<f32>, Box<dyn StdError + Send + Sync>> {
    match expected {
        Some(dims) if embedding.len() != dims as usize =>
            Err(
                format!(
                    "{} returned a {}-dimension embedding but the index expects {}",
                    provider,
                    embedding.len(),
                    dims
                ).into()
            ),
        _ => Ok(embedding),
    }
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn EmbeddingClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn EmbeddingClient> = match config.llm_type {
        LlmType::HuggingFace => {
            let specific_client = HuggingFaceEmbeddingClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Ollama => {
            let specific_client = OllamaEmbeddingClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenAI => {
            let specific_client = OpenAIEmbeddingClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Euron => {
            return Err("Euron is configured for chat completions only; pick huggingface, ollama or openai for embeddings".into());
        }
    };
    Ok(client)
}

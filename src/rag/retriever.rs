use async_trait::async_trait;
use log::info;
use serde::{ Deserialize, Serialize };
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;
use vector_nexus::db::VectorStore;

use super::ChainError;
use crate::llm::embedding::EmbeddingClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub page_content: String,
    pub score: f32,
}

impl Document {
    pub fn new(id: impl Into<String>, page_content: impl Into<String>, score: f32) -> Self {
        Self { id: id.into(), page_content: page_content.into(), score }
    }

    /// Builds a document from a vector-store hit. Snippet text lives in the `text`
    /// metadata field written at ingestion time.
    pub fn from_hit(score: f32, id: String, value: &Value) -> Self {
        let page_content = ["text", "page_content"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string());

        Self { id, page_content, score }
    }
}

#[async_trait]
pub trait Retriever: Send + Sync {
    /// Returns at most `k` snippets, most similar first.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Document>, ChainError>;
}

pub struct VectorRetriever {
    vector_store: Arc<dyn VectorStore>,
    embedding_client: Arc<dyn EmbeddingClient>,
    index_name: String,
}

impl VectorRetriever {
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedding_client: Arc<dyn EmbeddingClient>,
        index_name: String
    ) -> Self {
        Self { vector_store, embedding_client, index_name }
    }
}

fn rank_by_score(mut docs: Vec<Document>, k: usize) -> Vec<Document> {
    docs.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    docs.truncate(k);
    docs
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Document>, ChainError> {
        let embedding = self.embedding_client
            .embed(query).await
            .map_err(|e| ChainError::Retrieval(format!("Embedding failed: {}", e)))?.embedding;

        let hits = self.vector_store
            .search_hybrid(&self.index_name, query, &embedding, k, None).await
            .map_err(|e| ChainError::Retrieval(format!("Vector search failed: {}", e)))?;

        let docs = hits
            .into_iter()
            .map(|(score, id, value)| Document::from_hit(score, id, &value))
            .collect::<Vec<_>>();
        let docs = rank_by_score(docs, k);
        info!("Retrieved {} document(s) from index '{}'", docs.len(), self.index_name);

        Ok(docs)
    }
}

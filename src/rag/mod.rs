pub mod chain;
pub mod retriever;

pub use chain::{ ChainOutput, RetrievalChain, DEFAULT_RETRIEVAL_K };
pub use retriever::{ Document, Retriever, VectorRetriever };

use crate::llm::chat::ChatError;

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Retrieval failed: {0}")]
    Retrieval(String),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("Chat model returned no generations")]
    EmptyGeneration,
    #[error("Error initializing RAG: {0}")]
    Build(String),
}

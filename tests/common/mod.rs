#![allow(dead_code)]

use async_trait::async_trait;
use portfolio_chat::llm::chat::{ ChatClient, ChatError, ChatResult };
use portfolio_chat::models::chat::InputMessage;
use portfolio_chat::rag::{ ChainError, Document, RetrievalChain, Retriever };
use portfolio_chat::server::AppState;
use portfolio_chat::session::{ LazyPipeline, PipelineFactory };
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{ AtomicUsize, Ordering };

pub struct PortfolioRetriever;

#[async_trait]
impl Retriever for PortfolioRetriever {
    async fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<Document>, ChainError> {
        let docs = vec![
            Document::new("1", "Shanin built an OCR automation pipeline with YOLOv8.", 0.91),
            Document::new("2", "Shanin created a RAG-powered portfolio chatbot.", 0.84),
            Document::new("3", "Shanin developed a glioma grading graph network.", 0.77)
        ];
        Ok(docs.into_iter().take(k).collect())
    }
}

/// Replies with the user question echoed back, or fails with a 401 when the
/// question contains "fail".
pub struct EchoChat {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ChatClient for EchoChat {
    async fn generate(&self, messages: &[InputMessage]) -> Result<ChatResult, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let question = messages
            .last()
            .map(|m| m.to_wire().content)
            .unwrap_or_default();
        if question.contains("fail") {
            return Err(ChatError::Provider { status: 401, body: "invalid api key".into() });
        }
        Ok(ChatResult::single(format!("You asked: {}", question)))
    }

    fn llm_type(&self) -> &'static str {
        "echo"
    }

    fn get_model(&self) -> String {
        "echo-1".into()
    }
}

pub struct StubFactory {
    pub builds: Arc<AtomicUsize>,
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PipelineFactory for StubFactory {
    async fn build(&self) -> Result<RetrievalChain, Box<dyn Error + Send + Sync>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(
            RetrievalChain::new(
                Arc::new(PortfolioRetriever),
                Arc::new(EchoChat { calls: Arc::clone(&self.calls) }),
                "Context:\n{context}".into()
            )
        )
    }
}

pub struct Harness {
    pub state: AppState,
    pub builds: Arc<AtomicUsize>,
    pub calls: Arc<AtomicUsize>,
}

pub fn harness() -> Harness {
    let builds = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = StubFactory { builds: Arc::clone(&builds), calls: Arc::clone(&calls) };
    let pipeline = Arc::new(LazyPipeline::new(Arc::new(factory)));
    Harness { state: AppState::new(pipeline), builds, calls }
}

use async_trait::async_trait;
use log::{ error, info };
use std::error::Error;
use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::models::chat::{ Role, Transcript };
use crate::rag::{ ChainError, RetrievalChain };

#[async_trait]
pub trait PipelineFactory: Send + Sync {
    async fn build(&self) -> Result<RetrievalChain, Box<dyn Error + Send + Sync>>;
}

/// Retrieval chain built on first use and shared for the rest of the process.
/// Concurrent first callers wait on a single build; a failed build is retried next time.
pub struct LazyPipeline {
    cell: OnceCell<Arc<RetrievalChain>>,
    factory: Arc<dyn PipelineFactory>,
}

impl LazyPipeline {
    pub fn new(factory: Arc<dyn PipelineFactory>) -> Self {
        Self { cell: OnceCell::new(), factory }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get(&self) -> Result<Arc<RetrievalChain>, ChainError> {
        let chain = self.cell.get_or_try_init(|| async {
            info!("Initializing RAG pipeline...");
            let chain = self.factory
                .build().await
                .map_err(|e| ChainError::Build(e.to_string()))?;
            info!("RAG pipeline ready");
            Ok::<_, ChainError>(Arc::new(chain))
        }).await?;

        Ok(Arc::clone(chain))
    }
}

pub struct ChatSession {
    transcript: Transcript,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self { transcript: Transcript::new(Uuid::new_v4().to_string()) }
    }

    pub fn id(&self) -> &str {
        &self.transcript.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Runs one turn. The user message is recorded before anything can fail, so a
    /// failed turn leaves it in the transcript and the next turn starts from there.
    pub async fn handle_turn(
        &mut self,
        pipeline: &LazyPipeline,
        input: &str
    ) -> Result<String, ChainError> {
        info!("[{}] User Input: {}", self.id(), input);
        self.transcript.push(Role::User, input);

        let result = match pipeline.get().await {
            Ok(chain) => chain.invoke(input).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(output) => {
                info!("[{}] Response: {}", self.id(), output.answer);
                self.transcript.push(Role::Assistant, output.answer.as_str());
                Ok(output.answer)
            }
            Err(e) => {
                error!("[{}] Turn failed: {}", self.id(), e);
                Err(e)
            }
        }
    }
}

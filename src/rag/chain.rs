use log::info;
use std::sync::Arc;

use super::{ ChainError, Document, Retriever };
use crate::config::prompt::render_system_prompt;
use crate::llm::chat::ChatClient;
use crate::models::chat::InputMessage;

pub const DEFAULT_RETRIEVAL_K: usize = 3;

#[derive(Debug, Clone)]
pub struct ChainOutput {
    pub input: String,
    pub answer: String,
    pub context: Vec<Document>,
}

/// Retrieve, stuff the snippets into the system prompt, ask the chat model.
pub struct RetrievalChain {
    retriever: Arc<dyn Retriever>,
    chat_client: Arc<dyn ChatClient>,
    system_prompt: String,
    k: usize,
}

impl RetrievalChain {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        chat_client: Arc<dyn ChatClient>,
        system_prompt: String
    ) -> Self {
        Self {
            retriever,
            chat_client,
            system_prompt,
            k: DEFAULT_RETRIEVAL_K,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub async fn invoke(&self, input: &str) -> Result<ChainOutput, ChainError> {
        let context = self.retriever.retrieve(input, self.k).await?;
        let messages = build_messages(&self.system_prompt, &context, input);

        info!(
            "Invoking {} ({}) with {} context document(s)",
            self.chat_client.llm_type(),
            self.chat_client.get_model(),
            context.len()
        );
        let result = self.chat_client.generate(&messages).await?;
        let answer = result.first_content().ok_or(ChainError::EmptyGeneration)?.to_string();

        Ok(ChainOutput {
            input: input.to_string(),
            answer,
            context,
        })
    }
}

pub fn stuff_documents(docs: &[Document]) -> String {
    docs.iter()
        .map(|d| d.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One system message carrying the stuffed context, then the user's question.
pub fn build_messages(system_prompt: &str, docs: &[Document], input: &str) -> Vec<InputMessage> {
    let system = render_system_prompt(system_prompt, &stuff_documents(docs));
    vec![InputMessage::system(system), InputMessage::human(input)]
}

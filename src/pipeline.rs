use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::sync::Arc;

use vector_nexus::db::{
    VectorStore,
    get_store_type as get_vector_store_type,
    create_vector_store,
    VectorStoreConfig,
};

use crate::cli::Args;
use crate::config::prompt;
use crate::llm::chat::{ ChatClient, new_client as new_chat_client };
use crate::llm::embedding::{ EmbeddingClient, new_client as new_embedding_client };
use crate::rag::{ RetrievalChain, VectorRetriever };
use crate::session::PipelineFactory;

/// Wires the hosted services named in `Args` into a `RetrievalChain`.
pub struct RagPipelineFactory {
    args: Args,
}

impl RagPipelineFactory {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    fn initialize_llm_clients(
        args: &Args
    ) -> Result<(Arc<dyn ChatClient>, Arc<dyn EmbeddingClient>), Box<dyn Error + Send + Sync>> {
        let chat_config = args.chat_config();
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={}, Endpoint={}",
            chat_config.llm_type,
            args.chat_model,
            chat_config.base_url.as_deref().unwrap_or("adapter default")
        );

        let embedding_config = args.embedding_config()?;
        let embedding_client = new_embedding_client(&embedding_config)?;
        info!(
            "Embedding client configured: Type={}, Model={}, BaseURL={}",
            embedding_config.llm_type,
            embedding_config.embedding_model.as_deref().unwrap_or("adapter default"),
            embedding_config.base_url.as_deref().unwrap_or("adapter default")
        );

        Ok((chat_client, embedding_client))
    }

    async fn initialize_vector_store(
        args: &Args
    ) -> Result<Arc<dyn VectorStore>, Box<dyn Error + Send + Sync>> {
        info!("Connecting to Pinecone index '{}' at: {}", args.index_name, args.pinecone_host);
        let vector_store_type = get_vector_store_type("pinecone").map_err(|e|
            format!("Failed to get vector store type: {}", e)
        )?;
        let vector_store_config = VectorStoreConfig {
            store_type: vector_store_type,
            host: args.pinecone_host.clone(),
            api_key: Some(args.pinecone_api_key.clone()),
            tenant: None,
            database: None,
            namespace: None,
            index_name: Some(args.index_name.clone()),
            user: None,
            pass: None,
            dimension: Some(args.dimension),
            metric: Some(args.metric.clone()),
        };
        create_vector_store(vector_store_config).await
    }
}

#[async_trait]
impl PipelineFactory for RagPipelineFactory {
    async fn build(&self) -> Result<RetrievalChain, Box<dyn Error + Send + Sync>> {
        let args = &self.args;
        let (chat_client, embedding_client) = Self::initialize_llm_clients(args)?;
        let vector_store = Self::initialize_vector_store(args).await?;
        let system_prompt = prompt::load_system_prompt(args.prompt_path.as_deref())?;

        let retriever = VectorRetriever::new(vector_store, embedding_client, args.index_name.clone());
        Ok(RetrievalChain::new(Arc::new(retriever), chat_client, system_prompt).with_k(args.retrieval_k))
    }
}

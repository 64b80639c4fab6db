pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod rag;
pub mod session;
pub mod pipeline;

use cli::{ Args, UiShell };
use log::info;
use pipeline::RagPipelineFactory;
use server::{ classic, reactive, AppState };
use session::LazyPipeline;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    args.validate()?;

    info!("--- Core Configuration ---");
    info!("UI Shell: {}", args.shell);
    info!("Server Address: {}:{}", args.host, args.port());
    info!("Chat Model: {}", args.chat_model);
    info!("Chat Max Tokens: {}", args.chat_max_tokens);
    info!("Chat Temperature: {}", args.chat_temperature);
    info!("Embedding LLM Type: {}", args.embedding_llm_type);
    info!("Vector Index: {}", args.index_name);
    info!("Retrieval K: {}", args.retrieval_k);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let factory = Arc::new(RagPipelineFactory::new(args.clone()));
    let pipeline = Arc::new(LazyPipeline::new(factory));
    let state = AppState::new(Arc::clone(&pipeline));

    let app = match args.shell {
        UiShell::Classic => {
            // Built before binding so a broken index or endpoint config stops startup.
            pipeline.get().await?;
            classic::router(state)
        }
        UiShell::Reactive => reactive::router(state),
    };

    server::serve(&args, app).await
}

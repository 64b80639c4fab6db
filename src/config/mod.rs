pub mod prompt;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is missing. Please set it in your environment.")]
    MissingCredential(&'static str),
    #[error("Invalid temperature {0}: expected a value between 0 and 2")]
    Temperature(f32),
    #[error("max_tokens must be a positive integer")]
    MaxTokens,
    #[error("Retrieval k must be at least 1")]
    RetrievalK,
    #[error("Invalid embedding type: {0}")]
    EmbeddingType(String),
    #[error("Failed to read prompt file '{path}': {source}")]
    PromptIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("System prompt must contain the {{context}} placeholder")]
    PromptMissingContext,
}

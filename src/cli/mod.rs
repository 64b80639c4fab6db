use clap::{ Parser, ValueEnum };
use std::fmt;

use crate::config::ConfigError;
use crate::llm::chat::euron::{ DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE };
use crate::llm::{ LlmConfig, LlmType };
use crate::rag::DEFAULT_RETRIEVAL_K;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UiShell {
    /// Request/response HTML page posting to `/get`.
    Classic,
    /// Single-page UI talking over a WebSocket.
    Reactive,
}

impl UiShell {
    pub fn default_port(&self) -> u16 {
        match self {
            UiShell::Classic => 8080,
            UiShell::Reactive => 2025,
        }
    }
}

impl fmt::Display for UiShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiShell::Classic => f.write_str("classic"),
            UiShell::Reactive => f.write_str("reactive"),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Which UI shell to serve (classic, reactive)
    #[arg(long, env = "UI_SHELL", value_enum, default_value_t = UiShell::Reactive)]
    pub shell: UiShell,

    /// Port to listen on. Defaults to 8080 for the classic shell and 2025 for the reactive one.
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Interface to bind.
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    // --- Credentials ---
    /// API key for the Euron chat completions endpoint.
    #[arg(long, env = "EURON_API_KEY", default_value = "", hide_env_values = true)]
    pub euron_api_key: String,

    /// API key for the Pinecone vector index.
    #[arg(long, env = "PINECONE_API_KEY", default_value = "", hide_env_values = true)]
    pub pinecone_api_key: String,

    // --- Chat Completion Args ---
    /// Completion model identifier.
    #[arg(long, env = "CHAT_MODEL", default_value = DEFAULT_MODEL)]
    pub chat_model: String,

    /// Maximum tokens in a completion.
    #[arg(long, env = "CHAT_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub chat_max_tokens: u32,

    /// Sampling temperature, between 0 and 2.
    #[arg(long, env = "CHAT_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub chat_temperature: f32,

    /// Override for the completion endpoint URL (e.g. a proxy).
    #[arg(long, env = "CHAT_ENDPOINT")]
    pub chat_endpoint: Option<String>,

    // --- Embedding Args ---
    /// Embedding provider (huggingface, ollama, openai)
    #[arg(long, env = "EMBEDDING_LLM_TYPE", default_value = "huggingface")]
    pub embedding_llm_type: String,

    /// Base URL for the embedding provider; adapters pick their own default if unset.
    #[arg(long, env = "EMBEDDING_BASE_URL")]
    pub embedding_base_url: Option<String>,

    /// API key for the embedding provider. Falls back to HF_TOKEN for Hugging Face.
    #[arg(long, env = "EMBEDDING_API_KEY", hide_env_values = true)]
    pub embedding_api_key: Option<String>,

    /// Hugging Face access token.
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Embedding model name; adapters pick their own default if unset.
    #[arg(long, env = "EMBEDDING_MODEL")]
    pub embedding_model: Option<String>,

    // --- Vector Store Args ---
    /// Pinecone index host.
    #[arg(long, env = "PINECONE_HOST", default_value = "")]
    pub pinecone_host: String,

    /// Index holding the portfolio documents.
    #[arg(long, env = "VECTOR_INDEX_NAME", default_value = "portfolio")]
    pub index_name: String,

    /// Vector dimension size
    #[arg(long, env = "VECTOR_DIMENSION", default_value = "384")]
    pub dimension: usize,

    /// Distance metric for vector similarity (cosine, euclidean, dotproduct)
    #[arg(long, env = "VECTOR_METRIC", default_value = "cosine")]
    pub metric: String,

    /// Number of snippets retrieved per question.
    #[arg(long, env = "RETRIEVAL_K", default_value_t = DEFAULT_RETRIEVAL_K)]
    pub retrieval_k: usize,

    /// Optional file holding the system prompt. Must contain `{context}`.
    #[arg(long, env = "PROMPT_PATH")]
    pub prompt_path: Option<String>,

    // --- TLS Args ---
    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    /// Path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,
}

impl Args {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.shell.default_port())
    }

    /// Startup checks; any failure aborts before the server binds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pinecone_api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("PINECONE_API_KEY"));
        }
        if self.euron_api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("EURON_API_KEY"));
        }
        if !(0.0..=2.0).contains(&self.chat_temperature) {
            return Err(ConfigError::Temperature(self.chat_temperature));
        }
        if self.chat_max_tokens == 0 {
            return Err(ConfigError::MaxTokens);
        }
        if self.retrieval_k == 0 {
            return Err(ConfigError::RetrievalK);
        }
        self.embedding_llm_type()?;
        Ok(())
    }

    pub fn embedding_llm_type(&self) -> Result<LlmType, ConfigError> {
        match self.embedding_llm_type.parse::<LlmType>() {
            Ok(LlmType::Euron) | Err(_) => Err(ConfigError::EmbeddingType(self.embedding_llm_type.clone())),
            Ok(llm_type) => Ok(llm_type),
        }
    }

    pub fn chat_config(&self) -> LlmConfig {
        LlmConfig {
            llm_type: LlmType::Euron,
            api_key: Some(self.euron_api_key.clone()),
            completion_model: Some(self.chat_model.clone()),
            base_url: self.chat_endpoint.clone(),
            max_tokens: Some(self.chat_max_tokens),
            temperature: Some(self.chat_temperature),
            ..LlmConfig::default()
        }
    }

    pub fn embedding_config(&self) -> Result<LlmConfig, ConfigError> {
        let llm_type = self.embedding_llm_type()?;
        let api_key = match llm_type {
            LlmType::HuggingFace => self.embedding_api_key.clone().or_else(|| self.hf_token.clone()),
            _ => self.embedding_api_key.clone(),
        };

        Ok(LlmConfig {
            llm_type,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            embedding_model: self.embedding_model.clone(),
            embedding_dimensions: u32::try_from(self.dimension).ok(),
            base_url: self.embedding_base_url.clone(),
            ..LlmConfig::default()
        })
    }
}

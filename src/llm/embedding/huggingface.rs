use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::AUTHORIZATION };
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;

use super::super::LlmConfig;
use super::{ check_dimensions, EmbeddingClient, EmbeddingResponse };

pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
const INFERENCE_BASE: &str = "https://router.huggingface.co/hf-inference/models";

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
}

/// The pipeline answers a single input with a flat vector, some deployments wrap it in a batch.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Flat(Vec<f32>),
    Batch(Vec<Vec<f32>>),
}

pub struct HuggingFaceEmbeddingClient {
    http: HttpClient,
    api_key: Option<String>,
    url: String,
    dimensions: Option<u32>,
}

impl HuggingFaceEmbeddingClient {
    pub fn new(
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let url = base_url.unwrap_or_else(|| {
            let model_name = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
            format!("{}/{}/pipeline/feature-extraction", INFERENCE_BASE, model_name)
        });
        let http = HttpClient::builder().build()?;

        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            url,
            dimensions: None,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let client = Self::new(
            config.api_key.clone(),
            config.embedding_model.clone(),
            config.base_url.clone()
        )?;
        Ok(client.with_dimensions(config.embedding_dimensions))
    }

    /// Rejects vectors whose length differs from the index dimension.
    pub fn with_dimensions(mut self, dimensions: Option<u32>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn into_embedding(
    response: FeatureExtractionResponse
) -> Result<Vec<f32>, Box<dyn StdError + Send + Sync>> {
    let embedding = match response {
        FeatureExtractionResponse::Flat(values) => values,
        FeatureExtractionResponse::Batch(rows) =>
            rows
                .into_iter()
                .next()
                .ok_or_else(|| "Hugging Face embedding generation returned no results".to_string())?,
    };
    if embedding.is_empty() {
        return Err("Hugging Face embedding generation returned an empty vector".into());
    }
    Ok(embedding)
}

#[async_trait]
impl EmbeddingClient for HuggingFaceEmbeddingClient {
    async fn embed(
        &self,
        text: &str
    ) -> Result<EmbeddingResponse, Box<dyn StdError + Send + Sync>> {
        let mut req = self.http.post(&self.url).json(&(FeatureExtractionRequest { inputs: text }));
        if let Some(key) = &self.api_key {
            req = req.header(AUTHORIZATION, format!("Bearer {}", key.trim()));
        }

        let resp = req.send().await?.error_for_status()?;
        let parsed: FeatureExtractionResponse = resp.json().await?;
        let embedding = check_dimensions(into_embedding(parsed)?, self.dimensions, "Hugging Face")?;
        debug!("Embedded query into {} dimensions", embedding.len());

        Ok(EmbeddingResponse { embedding })
    }
}

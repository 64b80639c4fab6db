use async_trait::async_trait;
use log::{ debug, info };
use reqwest::{ Client as HttpClient, StatusCode, header::{ CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };

use super::{ normalize_messages, ChatClient, ChatError, ChatResult };
use crate::llm::LlmConfig;
use crate::models::chat::{ ChatMessage, InputMessage };

pub const EURON_CHAT_URL: &str = "https://api.euron.one/api/v1/euri/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: Vec<ChatMessage>,
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat model backed by the Euron `euri` chat completions endpoint.
///
/// Every call is one POST with no retry, cache, stream or client-side timeout.
pub struct EuronChatClient {
    http: HttpClient,
    api_key: String,
    endpoint: String,
    params: CompletionParams,
}

impl EuronChatClient {
    pub fn new(
        api_key: String,
        endpoint: Option<String>,
        params: CompletionParams
    ) -> Result<Self, ChatError> {
        let http = HttpClient::builder().build()?;

        Ok(Self {
            http,
            api_key,
            endpoint: endpoint.unwrap_or_else(|| EURON_CHAT_URL.to_string()),
            params,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ChatError> {
        let params = CompletionParams {
            model: config.completion_model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        };

        // A blank key is accepted here and rejected per call in `complete`.
        Self::new(config.api_key.clone().unwrap_or_default(), config.base_url.clone(), params)
    }

    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = http;
        self
    }

    pub fn params(&self) -> &CompletionParams {
        &self.params
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends `messages` to the endpoint and returns the content of the first choice.
    pub async fn complete(
        &self,
        messages: &[InputMessage],
        params: &CompletionParams
    ) -> Result<String, ChatError> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(
                ChatError::Configuration(
                    "EURON_API_KEY is missing. Please set it in your environment.".to_string()
                )
            );
        }

        let payload = CompletionRequest {
            messages: normalize_messages(messages),
            model: &params.model,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };
        debug!(
            "Euron request: model={}, messages={}, max_tokens={}, temperature={}",
            params.model,
            payload.messages.len(),
            params.max_tokens,
            params.temperature
        );

        let resp = self.http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&payload)
            .send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status != StatusCode::OK {
            return Err(ChatError::Provider { status: status.as_u16(), body });
        }

        let reply = extract_reply(&body)?;
        info!("Euron reply received ({} chars)", reply.len());
        Ok(reply)
    }

    pub async fn simple_chat_completion(&self, user_message: &str) -> Result<String, ChatError> {
        let messages = [InputMessage::plain("user", user_message)];
        self.complete(&messages, &self.params).await
    }
}

/// Reads `choices[0].message.content`; further choices are ignored.
fn extract_reply(body: &str) -> Result<String, ChatError> {
    let parsed: CompletionResponse = serde_json
        ::from_str(body)
        .map_err(|e| ChatError::Parse(format!("{}: {}", e, body)))?;

    parsed.choices
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::Parse(format!("response contained no choices: {}", body)))?
        .message.content
        .ok_or_else(|| ChatError::Parse(format!("first choice has no content: {}", body)))
}

#[async_trait]
impl ChatClient for EuronChatClient {
    async fn generate(&self, messages: &[InputMessage]) -> Result<ChatResult, ChatError> {
        let reply = self.complete(messages, &self.params).await?;
        Ok(ChatResult::single(reply))
    }

    fn llm_type(&self) -> &'static str {
        "euron-chat"
    }

    fn get_model(&self) -> String {
        self.params.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{ extract::State, http::{ HeaderMap, StatusCode as AxumStatus }, routing::post, Json, Router };
    use serde_json::Value;
    use std::sync::Arc;
    use std::sync::atomic::{ AtomicUsize, Ordering };
    use tokio::sync::Mutex;

    const ROUTE: &str = "/api/v1/euri/chat/completions";

    #[derive(Clone)]
    struct Stub {
        status: AxumStatus,
        body: &'static str,
        hits: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn stub_handler(
        State(stub): State<Stub>,
        headers: HeaderMap,
        Json(payload): Json<Value>
    ) -> (AxumStatus, String) {
        stub.hits.fetch_add(1, Ordering::SeqCst);
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        stub.seen.lock().await.push((auth, payload));
        (stub.status, stub.body.to_string())
    }

    async fn spawn_stub(status: AxumStatus, body: &'static str) -> (String, Stub) {
        let stub = Stub {
            status,
            body,
            hits: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new().route(ROUTE, post(stub_handler)).with_state(stub.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}{}", addr, ROUTE), stub)
    }

    fn client(api_key: &str, endpoint: String) -> EuronChatClient {
        let http = HttpClient::builder().no_proxy().build().unwrap();
        EuronChatClient::new(api_key.to_string(), Some(endpoint), CompletionParams::default())
            .unwrap()
            .with_http_client(http)
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let (url, stub) = spawn_stub(
            AxumStatus::OK,
            r#"{"choices":[{"message":{"content":"Hello!"}}]}"#
        ).await;

        let reply = client("secret", url)
            .complete(&[InputMessage::human("hi")], &CompletionParams::default()).await
            .unwrap();

        assert_eq!(reply, "Hello!");
        assert_eq!(stub.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sends_bearer_token_and_normalized_payload() {
        let (url, stub) = spawn_stub(
            AxumStatus::OK,
            r#"{"choices":[{"message":{"content":"ok"}}]}"#
        ).await;
        let params = CompletionParams {
            model: "gpt-4.1-mini".into(),
            max_tokens: 42,
            temperature: 0.25,
        };
        let messages = [
            InputMessage::system("context"),
            InputMessage::human("question"),
            InputMessage::plain("assistant", "earlier answer"),
        ];

        client("  secret  ", url).complete(&messages, &params).await.unwrap();

        let seen = stub.seen.lock().await;
        let (auth, payload) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer secret"));
        assert_eq!(payload["model"], "gpt-4.1-mini");
        assert_eq!(payload["max_tokens"], 42);
        assert_eq!(payload["temperature"], 0.25);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["role"], "user");
        assert_eq!(payload["messages"][1]["content"], "question");
        assert_eq!(payload["messages"][2]["role"], "assistant");
    }

    #[tokio::test]
    async fn non_200_is_provider_error_with_status_and_body() {
        let (url, stub) = spawn_stub(AxumStatus::UNAUTHORIZED, "invalid api key").await;

        let err = client("secret", url)
            .complete(&[InputMessage::human("hi")], &CompletionParams::default()).await
            .unwrap_err();

        match &err {
            ChatError::Provider { status, body } => {
                assert_eq!(*status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
        let text = err.to_string();
        assert!(text.contains("401") && text.contains("invalid api key"));
        assert_eq!(stub.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_key_fails_before_any_request() {
        let (url, stub) = spawn_stub(
            AxumStatus::OK,
            r#"{"choices":[{"message":{"content":"never"}}]}"#
        ).await;

        let err = client("   ", url)
            .complete(&[InputMessage::human("hi")], &CompletionParams::default()).await
            .unwrap_err();

        assert!(matches!(err, ChatError::Configuration(_)));
        assert_eq!(stub.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn identical_requests_are_not_cached() {
        let (url, stub) = spawn_stub(
            AxumStatus::OK,
            r#"{"choices":[{"message":{"content":"same"}}]}"#
        ).await;
        let client = client("secret", url);
        let messages = [InputMessage::human("repeat me")];

        let first = client.generate(&messages).await.unwrap();
        let second = client.generate(&messages).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(stub.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn malformed_success_body_is_parse_error() {
        let (url, _stub) = spawn_stub(AxumStatus::OK, r#"{"result":"no choices here"}"#).await;

        let err = client("secret", url).simple_chat_completion("hi").await.unwrap_err();

        assert!(matches!(err, ChatError::Parse(_)));
    }

    #[test]
    fn extra_choices_are_dropped() {
        let body =
            r#"{"choices":[{"message":{"content":"first"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), "first");
    }

    #[test]
    fn empty_choices_is_parse_error() {
        assert!(matches!(extract_reply(r#"{"choices":[]}"#), Err(ChatError::Parse(_))));
        assert!(
            matches!(
                extract_reply(r#"{"choices":[{"message":{"content":null}}]}"#),
                Err(ChatError::Parse(_))
            )
        );
    }

    #[test]
    fn from_config_applies_defaults() {
        let config = LlmConfig { api_key: Some("k".into()), ..LlmConfig::default() };
        let client = EuronChatClient::from_config(&config).unwrap();
        assert_eq!(client.params(), &CompletionParams::default());
        assert_eq!(client.endpoint(), EURON_CHAT_URL);
        assert_eq!(client.get_model(), DEFAULT_MODEL);
    }
}

//! OpenAI-compatible chat client shared by every registered provider

use super::provider::{ProviderConfig, ProviderKind};
use super::request::{ChatRequest, Role};
use super::sse::SseReassembler;
use super::streaming::StreamEvent;
use super::{ApiError, ChatProvider};
use async_trait::async_trait;
use futures_util::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::debug;

/// Generic client for providers that speak the OpenAI chat-completions
/// protocol. Per-provider differences (base URL, default model, key page)
/// live in the registry; everything else is shared.
pub struct OpenAiCompatProvider {
    kind: ProviderKind,
    config: ProviderConfig,
    client: Client,
}

impl OpenAiCompatProvider {
    pub fn new(kind: ProviderKind, config: ProviderConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.is_empty()) {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            kind,
            config,
            client: builder.build()?,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_base().trim_end_matches('/'), path)
    }

    fn require_key(&self) -> Result<&str, ApiError> {
        if self.config.api_key.is_empty() {
            return Err(ApiError::MissingApiKey(self.kind));
        }
        Ok(&self.config.api_key)
    }

    fn build_chat_body(&self, request: &ChatRequest) -> Value {
        let mut messages = Vec::new();

        if let Some(system) = &request.system {
            messages.push(json!({
                "role": "system",
                "content": system
            }));
        }

        for msg in &request.messages {
            let role = match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(json!({
                "role": role,
                "content": msg.content
            }));
        }

        messages.push(json!({
            "role": "user",
            "content": request.prompt
        }));

        json!({
            "model": self.model(),
            "messages": messages,
            "temperature": request.temperature.unwrap_or(0.7),
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn api_base(&self) -> &str {
        self.config
            .api_base
            .as_deref()
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| self.kind.default_api_base())
    }

    fn model(&self) -> &str {
        self.config
            .model
            .as_deref()
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| self.kind.default_model())
    }

    async fn list_models(&self) -> Result<Vec<String>, ApiError> {
        let key = self.require_key()?;
        let url = self.endpoint("models");
        debug!("fetching model list from {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::Provider(format!("{}: {}", status, error_text)));
        }

        let json: Value = response.json().await?;
        let models = json["data"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }

    async fn send(&self, request: ChatRequest) -> Result<String, ApiError> {
        let key = self.require_key()?;
        let body = self.build_chat_body(&request);
        let url = self.endpoint("chat/completions");
        debug!("sending chat request to {} (model {})", url, self.model());

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::Provider(format!("{}: {}", status, error_text)));
        }

        let json: Value = response.json().await?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| ApiError::Provider("response missing message content".to_string()))?;

        Ok(strip_think(content))
    }

    async fn send_streaming(
        &self,
        request: ChatRequest,
    ) -> Result<mpsc::Receiver<StreamEvent>, ApiError> {
        let key = self.require_key()?;
        let mut body = self.build_chat_body(&request);
        body["stream"] = json!(true);
        let url = self.endpoint("chat/completions");
        debug!("opening stream to {} (model {})", url, self.model());

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::Provider(format!("{}: {}", status, error_text)));
        }

        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut reassembler = SseReassembler::new();

            while let Some(chunk_result) = stream.next().await {
                match chunk_result {
                    Ok(bytes) => {
                        // The sink is synchronous; stage events so they can
                        // be awaited onto the channel in the same order.
                        let mut flushed = Vec::new();
                        reassembler.feed(&String::from_utf8_lossy(&bytes), |text, kind| {
                            if let Some(event) = StreamEvent::from_decoded(text.to_string(), kind)
                            {
                                flushed.push(event);
                            }
                        });

                        for event in flushed {
                            if tx.send(event).await.is_err() {
                                return; // receiver dropped
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx
                            .send(StreamEvent::Error(format!("stream error: {}", e)))
                            .await;
                        return;
                    }
                }
            }

            let _ = tx.send(StreamEvent::Done).await;
        });

        Ok(rx)
    }
}

static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<think\b[^>]*>.*?</think>").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Remove inline `<think>...</think>` blocks some models leave in their final
/// text, then collapse the blank runs they leave behind.
pub fn strip_think(text: &str) -> String {
    let without_blocks = THINK_BLOCK.replace_all(text, "");
    let collapsed = BLANK_RUNS.replace_all(&without_blocks, "\n\n");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(kind: ProviderKind, config: ProviderConfig) -> OpenAiCompatProvider {
        OpenAiCompatProvider::new(kind, config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let p = provider(
            ProviderKind::OpenAi,
            ProviderConfig {
                api_key: "k".to_string(),
                ..ProviderConfig::default()
            },
        );
        assert_eq!(
            p.endpoint("chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );

        let p = provider(
            ProviderKind::OpenRouter,
            ProviderConfig {
                api_key: "k".to_string(),
                api_base: Some("https://gateway.example.com/".to_string()),
                ..ProviderConfig::default()
            },
        );
        assert_eq!(p.endpoint("models"), "https://gateway.example.com/v1/models");
    }

    #[test]
    fn test_build_chat_body_shape() {
        let p = provider(
            ProviderKind::OpenAi,
            ProviderConfig {
                api_key: "k".to_string(),
                ..ProviderConfig::default()
            },
        );
        let request = ChatRequest::new("What is SSE?")
            .with_system("Answer briefly.")
            .with_history(vec![
                crate::api::Message::user("hello"),
                crate::api::Message::assistant("hi there"),
            ]);

        let body = p.build_chat_body(&request);
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["temperature"], 0.7);

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "Answer briefly.");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["role"], "user");
        assert_eq!(messages[3]["content"], "What is SSE?");
    }

    #[test]
    fn test_build_chat_body_without_system() {
        let p = provider(
            ProviderKind::OpenRouter,
            ProviderConfig {
                api_key: "k".to_string(),
                ..ProviderConfig::default()
            },
        );
        let body = p.build_chat_body(&ChatRequest::new("hi").with_temperature(0.2));
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["model"], "openrouter/auto");
    }

    #[test]
    fn test_missing_key_is_an_explicit_error() {
        let p = provider(ProviderKind::OpenAi, ProviderConfig::default());
        let err = p.require_key().unwrap_err();
        assert!(matches!(err, ApiError::MissingApiKey(ProviderKind::OpenAi)));
    }

    #[test]
    fn test_strip_think_removes_blocks() {
        let text = "<think>\nstep 1\nstep 2\n</think>\n\n\nThe answer is 4.";
        assert_eq!(strip_think(text), "The answer is 4.");
    }

    #[test]
    fn test_strip_think_handles_attributes_and_case() {
        let text = "before <THINK budget=\"high\">secret</THINK> after";
        assert_eq!(strip_think(text), "before  after");
    }

    #[test]
    fn test_strip_think_leaves_plain_text_alone() {
        assert_eq!(strip_think("plain answer"), "plain answer");
    }

    #[test]
    fn test_strip_think_collapses_blank_runs() {
        assert_eq!(strip_think("a\n\n\n\nb"), "a\n\nb");
    }
}

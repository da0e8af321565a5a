//! Provider abstraction and stream decoding for OpenAI-compatible chat APIs

mod client;
mod decoder;
mod provider;
mod request;
mod sse;
mod streaming;

pub use client::{strip_think, OpenAiCompatProvider};
pub use decoder::{decode_delta, DecodedEvent, EventKind};
pub use provider::{create_provider, ProviderConfig, ProviderKind};
pub use request::{ChatRequest, Message, Role};
pub use sse::SseReassembler;
pub use streaming::{into_stream, StreamEvent};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("No API key configured for {} (create one at {})", .0.display_name(), .0.create_key_url())]
    MissingApiKey(ProviderKind),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Capability interface every registered provider satisfies
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Registry entry this provider was built from
    fn kind(&self) -> ProviderKind;

    /// Effective API base URL after configuration overrides
    fn api_base(&self) -> &str;

    /// Effective model name after configuration overrides
    fn model(&self) -> &str;

    /// Fetch the provider's model catalogue
    async fn list_models(&self) -> Result<Vec<String>, ApiError>;

    /// Send a chat request and wait for the complete reply text
    async fn send(&self, request: ChatRequest) -> Result<String, ApiError>;

    /// Send a chat request and stream decoded reply events.
    /// Dropping the receiver cancels the stream.
    async fn send_streaming(
        &self,
        request: ChatRequest,
    ) -> Result<mpsc::Receiver<StreamEvent>, ApiError>;
}

//! chat_conduit - One abstraction over interchangeable AI chat providers
//!
//! This library talks to OpenAI-compatible chat-completion APIs through a
//! closed provider registry and decodes their SSE streaming responses into a
//! uniform event sequence.
//!
//! ## Key Features
//!
//! - **Provider Registry**: OpenAI and OpenRouter behind one capability
//!   interface, resolved by name with explicit errors
//! - **Streaming Decoder**: fragmentation-safe SSE reassembly that separates
//!   answer text from reasoning ("thinking") tokens
//! - **Caller-Owned Config**: TOML + environment settings resolved into an
//!   explicit record per provider, no global state
//! - **Terminal Chat**: interactive shell with streamed, colored output

pub mod api;
pub mod config;
pub mod tui;

pub use api::{
    create_provider, decode_delta, ApiError, ChatProvider, ChatRequest, DecodedEvent, EventKind,
    Message, OpenAiCompatProvider, ProviderConfig, ProviderKind, Role, SseReassembler,
    StreamEvent,
};
pub use config::{Config, ConfigError, ProviderSettings};

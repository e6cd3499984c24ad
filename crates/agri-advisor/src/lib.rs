//! Agricultural advice chat for AgriChat
//!
//! Holds the conversation, composes location- and climate-aware prompts,
//! and talks to an OpenAI-compatible chat completion endpoint (OpenRouter).

pub mod chatbot;
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod prompt;
pub mod session;
pub mod types;

pub use chatbot::AgriChatbot;
pub use client::CompletionClient;
pub use dispatcher::{AdviceDispatcher, AdviceOutcome, FALLBACK_REPLY};
pub use error::AdviceError;
pub use prompt::PromptContext;
pub use session::ConversationSession;
pub use types::{ChatMessage, Role};

//! Advice Request Dispatcher: one exchange with the completion service.

use crate::client::CompletionClient;
use crate::error::AdviceError;
use crate::prompt::PromptContext;

/// Shown to the user in place of a reply whenever the exchange fails
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// Result of one exchange. Both branches produce an assistant message.
#[derive(Debug)]
pub enum AdviceOutcome {
    Reply(String),
    Fallback(AdviceError),
}

impl AdviceOutcome {
    /// Text to append to the conversation
    pub fn text(&self) -> &str {
        match self {
            AdviceOutcome::Reply(text) => text,
            AdviceOutcome::Fallback(_) => FALLBACK_REPLY,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AdviceOutcome::Fallback(_))
    }

    pub fn error(&self) -> Option<&AdviceError> {
        match self {
            AdviceOutcome::Reply(_) => None,
            AdviceOutcome::Fallback(e) => Some(e),
        }
    }
}

impl From<Result<String, AdviceError>> for AdviceOutcome {
    fn from(result: Result<String, AdviceError>) -> Self {
        match result {
            Ok(text) => AdviceOutcome::Reply(text),
            Err(e) => AdviceOutcome::Fallback(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdviceDispatcher {
    client: CompletionClient,
}

impl AdviceDispatcher {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// Ask for advice on `user_text`. Never fails; errors become [`AdviceOutcome::Fallback`].
    pub async fn dispatch(&self, context: &PromptContext, user_text: &str) -> AdviceOutcome {
        let messages = context.build_messages(user_text);
        let outcome = AdviceOutcome::from(self.client.complete(messages).await);

        if let Some(e) = outcome.error() {
            tracing::error!("Error calling OpenRouter API: {}", e);
        }
        outcome
    }
}

//! Conversation Session: ordered chat history plus pending-input state.
//!
//! Exchange lifecycle: Idle -> Sending (input cleared, loading set, user
//! message appended) -> reply or fallback appended -> Idle. Nothing here
//! performs I/O, so the whole lifecycle is testable without a runtime.

use crate::dispatcher::AdviceOutcome;
use crate::types::ChatMessage;

#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    messages: Vec<ChatMessage>,
    input: String,
    /// Exchanges between `begin_exchange` and `finish_exchange`
    in_flight: usize,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Advisory only: overlapping exchanges are allowed.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Start an exchange from the pending input.
    ///
    /// Returns the text to send, or `None` (and changes nothing) when the
    /// input is empty or whitespace.
    pub fn begin_exchange(&mut self) -> Option<String> {
        if self.input.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.input);
        self.messages.push(ChatMessage::user(text.clone()));
        self.in_flight += 1;
        Some(text)
    }

    /// Close an exchange by appending exactly one assistant message.
    ///
    /// Only the chatbot pairs this with `begin_exchange`; an unpaired call
    /// would leave an assistant message with no question before it.
    pub(crate) fn finish_exchange(&mut self, outcome: &AdviceOutcome) {
        debug_assert!(self.in_flight > 0, "finish_exchange without begin_exchange");
        self.messages.push(ChatMessage::assistant(outcome.text()));
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::FALLBACK_REPLY;
    use crate::error::AdviceError;
    use crate::types::Role;

    fn reply(text: &str) -> AdviceOutcome {
        AdviceOutcome::Reply(text.to_string())
    }

    #[test]
    fn test_begin_exchange_moves_input_into_history() {
        let mut session = ConversationSession::new();
        session.set_input("Is it too dry for beans?");

        let text = session.begin_exchange();

        assert_eq!(text.as_deref(), Some("Is it too dry for beans?"));
        assert_eq!(session.input(), "");
        assert!(session.is_loading());
        assert_eq!(session.messages(), &[ChatMessage::user("Is it too dry for beans?")]);
    }

    #[test]
    fn test_blank_input_is_noop() {
        let mut session = ConversationSession::new();
        for blank in ["", "   ", "\n\t "] {
            session.set_input(blank);
            assert!(session.begin_exchange().is_none());
        }
        assert!(session.is_empty());
        assert!(!session.is_loading());
        // Untouched so the user can keep editing
        assert_eq!(session.input(), "\n\t ");
    }

    #[test]
    fn test_input_is_sent_untrimmed() {
        let mut session = ConversationSession::new();
        session.set_input("  sorghum?  ");
        assert_eq!(session.begin_exchange().as_deref(), Some("  sorghum?  "));
    }

    #[test]
    fn test_finish_exchange_appends_reply_and_clears_loading() {
        let mut session = ConversationSession::new();
        session.set_input("When to plant?");
        session.begin_exchange();
        session.finish_exchange(&reply("Plant maize now."));

        assert!(!session.is_loading());
        assert_eq!(session.len(), 2);
        assert_eq!(session.messages()[1], ChatMessage::assistant("Plant maize now."));
    }

    #[test]
    fn test_fallback_is_appended_as_assistant_message() {
        let mut session = ConversationSession::new();
        session.set_input("When to plant?");
        session.begin_exchange();
        session.finish_exchange(&AdviceOutcome::Fallback(AdviceError::MissingApiKey));

        assert_eq!(session.messages()[1].role, Role::Assistant);
        assert_eq!(session.messages()[1].content, FALLBACK_REPLY);
    }

    #[test]
    fn test_n_exchanges_yield_2n_messages() {
        let mut session = ConversationSession::new();
        for i in 0..5 {
            session.set_input(format!("question {}", i));
            session.begin_exchange();
            let outcome = if i % 2 == 0 {
                reply("answer")
            } else {
                AdviceOutcome::Fallback(AdviceError::MalformedResponse("x".into()))
            };
            session.finish_exchange(&outcome);
        }
        assert_eq!(session.len(), 10);
        for pair in session.messages().chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
        }
    }

    #[test]
    fn test_overlapping_exchanges_keep_loading_until_last() {
        let mut session = ConversationSession::new();
        session.set_input("first");
        session.begin_exchange();
        session.set_input("second");
        session.begin_exchange();

        session.finish_exchange(&reply("a"));
        assert!(session.is_loading());
        session.finish_exchange(&reply("b"));
        assert!(!session.is_loading());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "finish_exchange without begin_exchange")]
    fn test_unpaired_finish_is_rejected() {
        let mut session = ConversationSession::new();
        session.finish_exchange(&reply("orphan"));
    }
}

//! Visible conversation history for one session.

use crate::gateway::ChatMessage;

/// Assistant greeting seeded into every new session.
pub const GREETING: &str = "Hello! I've analyzed your document. Ask me anything about it!";

/// Assistant message recorded when the provider fails mid-turn.
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Append-only chat transcript, seeded with the fixed greeting.
///
/// The greeting is presentation only: it is shown to callers but never replayed to the
/// provider, so prompt construction reads [`Conversation::prompt_history`] while views
/// read [`Conversation::visible`].
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Start a transcript containing only the greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
        }
    }

    /// Record one completed turn: the question, then the answer (or apology).
    pub fn record_turn(&mut self, question: &str, answer: String) {
        self.messages.push(ChatMessage::user(question));
        self.messages.push(ChatMessage::assistant(answer));
    }

    /// Full transcript as shown to callers, greeting included.
    pub fn visible(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Transcript as replayed to the provider: the seeded greeting is skipped.
    pub fn prompt_history(&self) -> &[ChatMessage] {
        &self.messages[1..]
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ChatRole;

    #[test]
    fn new_transcript_contains_only_the_greeting() {
        let conversation = Conversation::new();
        assert_eq!(conversation.visible(), &[ChatMessage::assistant(GREETING)]);
        assert!(conversation.prompt_history().is_empty());
    }

    #[test]
    fn each_turn_appends_exactly_two_messages() {
        let mut conversation = Conversation::new();
        conversation.record_turn("What is this about?", "It covers tidal energy.".into());

        assert_eq!(conversation.visible().len(), 3);
        assert_eq!(
            conversation.prompt_history(),
            &[
                ChatMessage::user("What is this about?"),
                ChatMessage::assistant("It covers tidal energy."),
            ]
        );
    }

    #[test]
    fn greeting_never_enters_prompt_history() {
        let mut conversation = Conversation::new();
        conversation.record_turn("Q1", "A1".into());
        conversation.record_turn("Q2", APOLOGY.into());

        assert!(
            conversation
                .prompt_history()
                .iter()
                .all(|message| message.content != GREETING)
        );
        assert_eq!(conversation.prompt_history().len(), 4);
        assert_eq!(conversation.visible()[0].role, ChatRole::Assistant);
    }
}

use anyhow::Result;

use crate::message::Message;

pub const GREETING_ID: &str = "welcome";
pub const GREETING_TEXT: &str = "What can I help you with?";
pub const SEND_FAILED: &str = "Failed to get response. Please try again.";

/// Send status of the live conversation. At most one send is in flight;
/// an error is a separate status, never an edit to the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendStatus {
    Idle,
    Sending,
    Error(String),
}

/// The live chat session: an append-only transcript, the draft being
/// composed, and the send status.
///
/// Sending is split in two so the remote call can run on a spawned task:
/// `begin_send` does the optimistic local work and hands back the text to
/// dispatch, `complete_send` reconciles the outcome. The transcript only
/// ever grows; a failed send keeps the user's message in place and
/// surfaces the error through the status.
pub struct Conversation {
    transcript: Vec<Message>,
    draft: String,
    status: SendStatus,
}

impl Conversation {
    /// A fresh session, seeded with the assistant greeting. Sessions are
    /// not persisted; every launch starts here.
    pub fn new() -> Self {
        let greeting = Message {
            id: GREETING_ID.to_string(),
            text: GREETING_TEXT.to_string(),
            is_user: false,
            timestamp: chrono::Utc::now(),
        };

        Self {
            transcript: vec![greeting],
            draft: String::new(),
            status: SendStatus::Idle,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft wholesale.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn status(&self) -> &SendStatus {
        &self.status
    }

    pub fn is_sending(&self) -> bool {
        self.status == SendStatus::Sending
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            SendStatus::Error(reason) => Some(reason),
            _ => None,
        }
    }

    /// Start a send. Appends the user's message, clears the draft and any
    /// prior error, and returns the text to dispatch to the service.
    ///
    /// A blank draft or a send already in flight is a silent no-op, which
    /// is what makes rapid repeated triggers safe. Note the draft is gone
    /// before the outcome is known, so a failed send has to be retyped.
    pub fn begin_send(&mut self) -> Option<String> {
        let text = self.draft.trim();
        if text.is_empty() || self.is_sending() {
            return None;
        }

        let text = text.to_string();
        self.transcript.push(Message::user(text.clone()));
        self.draft.clear();
        self.status = SendStatus::Sending;
        Some(text)
    }

    /// Reconcile the outcome of the in-flight send. Success appends the
    /// reply with a locally generated id and timestamp; failure only sets
    /// the error status, never touching the transcript.
    pub fn complete_send(&mut self, result: Result<String>) {
        match result {
            Ok(reply) => {
                self.transcript.push(Message::assistant(reply));
                self.status = SendStatus::Idle;
            }
            Err(_) => {
                self.status = SendStatus::Error(SEND_FAILED.to_string());
            }
        }
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
    use anyhow::anyhow;

    #[test]
    fn test_new_session_has_greeting_only() {
        let convo = Conversation::new();
        assert_eq!(convo.transcript().len(), 1);
        assert_eq!(convo.transcript()[0].id, GREETING_ID);
        assert_eq!(convo.transcript()[0].text, GREETING_TEXT);
        assert!(!convo.transcript()[0].is_user);
        assert_eq!(*convo.status(), SendStatus::Idle);
        assert!(convo.draft().is_empty());
    }

    #[test]
    fn test_successful_round_trip() {
        let mut convo = Conversation::new();
        convo.update_draft("hello");

        let outbound = convo.begin_send();
        assert_eq!(outbound.as_deref(), Some("hello"));
        assert_eq!(*convo.status(), SendStatus::Sending);
        assert!(convo.draft().is_empty());

        convo.complete_send(Ok("hi there".to_string()));

        let transcript = convo.transcript();
        assert_eq!(transcript.len(), 3);
        assert!(transcript[1].is_user);
        assert_eq!(transcript[1].text, "hello");
        assert!(!transcript[2].is_user);
        assert_eq!(transcript[2].text, "hi there");
        assert_eq!(*convo.status(), SendStatus::Idle);
    }

    #[test]
    fn test_transcript_grows_by_two_per_successful_send() {
        let mut convo = Conversation::new();
        let n = 5;
        for i in 0..n {
            convo.update_draft(format!("message {}", i));
            assert!(convo.begin_send().is_some());
            convo.complete_send(Ok(format!("reply {}", i)));
        }
        assert_eq!(convo.transcript().len(), 1 + 2 * n);
    }

    #[test]
    fn test_blank_draft_is_a_no_op() {
        let mut convo = Conversation::new();

        convo.update_draft("");
        assert!(convo.begin_send().is_none());

        convo.update_draft("   \t  ");
        assert!(convo.begin_send().is_none());

        assert_eq!(convo.transcript().len(), 1);
        assert_eq!(*convo.status(), SendStatus::Idle);
    }

    #[test]
    fn test_send_while_sending_is_a_no_op() {
        let mut convo = Conversation::new();
        convo.update_draft("first");
        assert!(convo.begin_send().is_some());

        convo.update_draft("second");
        assert!(convo.begin_send().is_none());

        // Still only greeting + first user message, still one call out.
        assert_eq!(convo.transcript().len(), 2);
        assert_eq!(convo.draft(), "second");
        assert_eq!(*convo.status(), SendStatus::Sending);
    }

    #[test]
    fn test_draft_is_trimmed_into_the_message() {
        let mut convo = Conversation::new();
        convo.update_draft("  hello  ");
        let outbound = convo.begin_send();
        assert_eq!(outbound.as_deref(), Some("hello"));
        assert_eq!(convo.transcript()[1].text, "hello");
    }

    #[test]
    fn test_failed_send_keeps_user_message_and_clears_draft() {
        let mut convo = Conversation::new();
        convo.update_draft("hello");
        convo.begin_send();

        convo.complete_send(Err(anyhow!("connection refused")));

        // The optimistic append is never rolled back, and the draft stays
        // empty: retrying means retyping.
        assert_eq!(convo.transcript().len(), 2);
        assert_eq!(convo.transcript()[1].text, "hello");
        assert_eq!(*convo.status(), SendStatus::Error(SEND_FAILED.to_string()));
        assert_eq!(convo.error(), Some(SEND_FAILED));
        assert!(convo.draft().is_empty());
    }

    #[test]
    fn test_retry_after_failure_clears_error() {
        let mut convo = Conversation::new();
        convo.update_draft("hello");
        convo.begin_send();
        convo.complete_send(Err(anyhow!("timeout")));

        convo.update_draft("hello again");
        assert!(convo.begin_send().is_some());
        assert_eq!(*convo.status(), SendStatus::Sending);
        assert!(convo.error().is_none());

        convo.complete_send(Ok("welcome back".to_string()));
        assert_eq!(*convo.status(), SendStatus::Idle);
        assert_eq!(convo.transcript().len(), 4);
    }

    #[test]
    fn test_update_draft_replaces_not_appends() {
        let mut convo = Conversation::new();
        convo.update_draft("one");
        convo.update_draft("two");
        assert_eq!(convo.draft(), "two");
    }
}

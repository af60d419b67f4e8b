//! Conversation session state.
//!
//! A [`Session`] stores an append-only message history plus a
//! monotonically growing summary. `message_count` counts every message
//! ever added, including those later folded into the summary, so it
//! never decreases.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// A conversation session keyed by a routing session key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Session key, e.g. `agent:main:telegram:direct:123`.
    pub key: String,

    /// Retained messages, oldest first.
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Accumulated summary of messages no longer retained.
    #[serde(default)]
    pub summary: String,

    /// Total messages ever added (monotone; summarization does not
    /// reduce it).
    #[serde(default)]
    pub message_count: u64,
}

impl Session {
    /// Create a new empty session with the given key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            messages: Vec::new(),
            summary: String::new(),
            message_count: 0,
        }
    }

    /// Append a message. Increases both the retained window and the
    /// total count by exactly one.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.message_count += 1;
    }

    /// Fold all but the last `keep_last` messages into the summary.
    ///
    /// The new summary text joins the existing summary with a blank
    /// line. `message_count` is unchanged; the retained window never
    /// grows.
    pub fn summarize(&mut self, new_summary: &str, keep_last: usize) {
        let keep = keep_last.min(self.messages.len());
        let split = self.messages.len() - keep;
        self.messages.drain(..split);

        if self.summary.is_empty() {
            self.summary = new_summary.to_string();
        } else {
            self.summary = format!("{}\n\n{}", self.summary, new_summary);
        }
    }

    /// Messages to feed the model: the summary (as a system prefix,
    /// when present) followed by the retained window.
    pub fn build_context(&self) -> Vec<Message> {
        if self.summary.is_empty() {
            return self.messages.clone();
        }
        let mut context = Vec::with_capacity(self.messages.len() + 1);
        context.push(Message::system(format!(
            "Previous conversation summary:\n{}",
            self.summary
        )));
        context.extend(self.messages.iter().cloned());
        context
    }

    /// Whether the retained window exceeds `max` messages.
    pub fn needs_summarization(&self, max: usize) -> bool {
        self.messages.len() > max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    fn session_with(n: usize) -> Session {
        let mut s = Session::new("agent:main:main");
        for i in 0..n {
            s.add_message(Message::user(format!("msg {i}")));
        }
        s
    }

    #[test]
    fn new_session_is_empty() {
        let s = Session::new("agent:main:main");
        assert!(s.messages.is_empty());
        assert!(s.summary.is_empty());
        assert_eq!(s.message_count, 0);
    }

    #[test]
    fn add_message_increments_both_counters() {
        let mut s = Session::new("k");
        s.add_message(Message::user("one"));
        s.add_message(Message::assistant("two"));
        assert_eq!(s.messages.len(), 2);
        assert_eq!(s.message_count, 2);
    }

    #[test]
    fn summarize_preserves_message_count() {
        let mut s = session_with(10);
        s.summarize("first ten messages", 3);
        assert_eq!(s.message_count, 10);
        assert_eq!(s.messages.len(), 3);
        assert_eq!(s.messages[0].content, "msg 7");
        assert_eq!(s.summary, "first ten messages");
    }

    #[test]
    fn summarize_appends_to_existing_summary() {
        let mut s = session_with(6);
        s.summarize("part one", 2);
        for i in 0..4 {
            s.add_message(Message::user(format!("later {i}")));
        }
        s.summarize("part two", 2);
        assert_eq!(s.summary, "part one\n\npart two");
        assert_eq!(s.message_count, 10);
    }

    #[test]
    fn summarize_keep_more_than_len_keeps_all() {
        let mut s = session_with(2);
        s.summarize("nothing dropped", 10);
        assert_eq!(s.messages.len(), 2);
        assert_eq!(s.summary, "nothing dropped");
    }

    #[test]
    fn build_context_without_summary() {
        let s = session_with(3);
        let ctx = s.build_context();
        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx[0].content, "msg 0");
    }

    #[test]
    fn build_context_prepends_summary_system_message() {
        let mut s = session_with(5);
        s.summarize("the early part", 2);
        let ctx = s.build_context();
        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx[0].role, Role::System);
        assert!(ctx[0]
            .content
            .starts_with("Previous conversation summary:\n"));
        assert!(ctx[0].content.contains("the early part"));
        assert_eq!(ctx[1].content, "msg 3");
    }

    #[test]
    fn needs_summarization_threshold() {
        let s = session_with(5);
        assert!(s.needs_summarization(4));
        assert!(!s.needs_summarization(5));
    }

    #[test]
    fn serde_roundtrip() {
        let mut s = session_with(2);
        s.summarize("old", 1);
        let json = serde_json::to_string(&s).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}

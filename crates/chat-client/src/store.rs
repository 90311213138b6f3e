//! The ordered message list for the active session.

use chrono::Utc;
use tracing::debug;

use crate::models::{Message, RawMessage, STATUS_SENT};

/// Owns the message list for one session.
///
/// Snapshots replace the list wholesale; ordering is arrival order from
/// the source, never re-sorted. An optimistic append survives only until
/// the next snapshot, which is expected to echo it back.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list with a normalized snapshot and report
    /// whether it grew.
    ///
    /// This is a full replace, not a merge: entries the server did not
    /// echo, optimistic ones included, are gone afterwards.
    pub fn replace_with_snapshot(&mut self, snapshot: Vec<RawMessage>) -> bool {
        let previous_len = self.messages.len();
        self.messages = snapshot.into_iter().map(Message::from_raw).collect();
        debug!(previous_len, len = self.messages.len(), "Applied message snapshot");
        self.messages.len() > previous_len
    }

    /// Append a transient local message ahead of server confirmation:
    /// no confirmed id, status "sent", created now.
    pub fn append_optimistic(&mut self, content: &str, sender_id: Option<&str>, chat_id: &str) {
        self.messages.push(Message {
            id: None,
            chat_id: chat_id.to_string(),
            sender_id: sender_id.map(str::to_string),
            receiver_id: None,
            content: content.to_string(),
            status: Some(STATUS_SENT.to_string()),
            created_at: Utc::now(),
        });
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

//! Domain and wire models for the support chat session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status stamped on an optimistic message before the server confirms it.
pub const STATUS_SENT: &str = "sent";

/// A user reference as the backend sometimes embeds it in place of a
/// plain identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Sender or receiver exactly as it appears on the wire: a plain
/// identifier or an embedded user reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ParticipantRef {
    Id(String),
    User(UserRef),
}

impl ParticipantRef {
    /// Collapse to a plain identifier. The embedded reference's id wins
    /// over the raw value.
    pub fn resolve(&self) -> &str {
        match self {
            ParticipantRef::Id(id) => id,
            ParticipantRef::User(user) => &user.id,
        }
    }
}

/// Collapse an optional wire participant to a plain identifier.
/// Empty identifiers count as unresolved.
pub fn resolve_participant(participant: Option<&ParticipantRef>) -> Option<String> {
    participant
        .map(ParticipantRef::resolve)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// A message exactly as delivered by the messaging service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub chat_id: String,
    #[serde(default)]
    pub sender_id: Option<ParticipantRef>,
    #[serde(default)]
    pub receiver_id: Option<ParticipantRef>,
    pub content: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A normalized message as the session holds it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Absent until the server has confirmed the message.
    pub id: Option<String>,
    pub chat_id: String,
    pub sender_id: Option<String>,
    pub receiver_id: Option<String>,
    pub content: String,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Normalize a wire message: participants collapse to plain
    /// identifiers, a missing timestamp becomes the current time.
    pub fn from_raw(raw: RawMessage) -> Self {
        Self {
            id: raw.id,
            chat_id: raw.chat_id,
            sender_id: resolve_participant(raw.sender_id.as_ref()),
            receiver_id: resolve_participant(raw.receiver_id.as_ref()),
            content: raw.content,
            status: raw.status,
            created_at: raw.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// The support agent assigned to the session, as the agent stream
/// delivers it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentProfile {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sender_as_plain_id() {
        let raw: RawMessage = serde_json::from_value(json!({
            "_id": "m-1",
            "chatId": "chat-1",
            "senderId": "user-1",
            "content": "hello",
        }))
        .unwrap();

        let message = Message::from_raw(raw);
        assert_eq!(message.id.as_deref(), Some("m-1"));
        assert_eq!(message.sender_id.as_deref(), Some("user-1"));
        assert_eq!(message.receiver_id, None);
    }

    #[test]
    fn test_sender_as_embedded_reference() {
        let raw: RawMessage = serde_json::from_value(json!({
            "id": "m-2",
            "chatId": "chat-1",
            "senderId": { "_id": "agent-1", "name": "Sam", "email": "sam@support.example" },
            "receiverId": "user-1",
            "content": "how can I help?",
            "status": "delivered",
            "createdAt": "2024-04-02T09:30:00Z",
        }))
        .unwrap();

        let message = Message::from_raw(raw);
        assert_eq!(message.id.as_deref(), Some("m-2"));
        assert_eq!(message.sender_id.as_deref(), Some("agent-1"));
        assert_eq!(message.receiver_id.as_deref(), Some("user-1"));
        assert_eq!(message.status.as_deref(), Some("delivered"));
    }

    #[test]
    fn test_null_sender_stays_unresolved() {
        let raw: RawMessage = serde_json::from_value(json!({
            "chatId": "chat-1",
            "senderId": null,
            "receiverId": "user-2",
            "content": "system notice",
        }))
        .unwrap();

        let message = Message::from_raw(raw);
        assert_eq!(message.id, None);
        assert_eq!(message.sender_id, None);
        assert_eq!(message.receiver_id.as_deref(), Some("user-2"));
    }

    #[test]
    fn test_empty_identifier_counts_as_unresolved() {
        assert_eq!(resolve_participant(Some(&ParticipantRef::Id(String::new()))), None);
        assert_eq!(
            resolve_participant(Some(&ParticipantRef::Id("user-1".into()))).as_deref(),
            Some("user-1")
        );
        assert_eq!(resolve_participant(None), None);
    }

    #[test]
    fn test_missing_timestamp_defaults_to_now() {
        let before = Utc::now();
        let raw: RawMessage = serde_json::from_value(json!({
            "chatId": "chat-1",
            "content": "no timestamp",
        }))
        .unwrap();

        let message = Message::from_raw(raw);
        assert!(message.created_at >= before);
    }
}

//! Session context: the identifiers a session is started with.

use chat_common::{stored_chat_id, stored_user_id};

/// Identifiers read once at session start and carried for its lifetime.
///
/// `user_id` may be absent; ownership resolution then falls back to its
/// heuristics. Without a `chat_id` the session will not start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: Option<String>,
    pub chat_id: Option<String>,
}

impl SessionContext {
    pub fn new(user_id: Option<String>, chat_id: Option<String>) -> Self {
        Self { user_id, chat_id }
    }

    /// Read the context from the persisted profile, environment
    /// overrides included. The reads happen here, once; the session
    /// never touches the profile store afterwards.
    pub fn from_profile() -> Self {
        Self {
            user_id: stored_user_id(),
            chat_id: stored_chat_id(),
        }
    }
}

//! Ownership resolution: deciding whether a message was authored by the
//! local user.

use crate::models::Message;

/// Whether `message` belongs to the local user.
///
/// A message whose sender matches the local user id is the local user's.
/// Fallback: a message with no resolvable sender also counts as the local
/// user's, unless it is addressed to the local user. Absent identifiers
/// never compare equal to anything.
// TODO: the no-sender fallback mirrors production behavior for messages
// whose sender reference the data source failed to resolve; awaiting
// product clarification before tightening it.
pub fn is_mine(message: &Message, local_user_id: Option<&str>) -> bool {
    let sender = message.sender_id.as_deref();
    let receiver = message.receiver_id.as_deref();

    let sender_is_local = matches!((sender, local_user_id), (Some(s), Some(l)) if s == l);
    if sender_is_local {
        return true;
    }

    let receiver_is_local = matches!((receiver, local_user_id), (Some(r), Some(l)) if r == l);
    if sender.is_none() && !receiver_is_local {
        return true;
    }

    false
}

//! Typing presence: local input signals out, remote typing state in.

use std::sync::Arc;

use crate::scroll::Scroller;
use crate::transport::ChatTransport;

/// Remote party's typing indicator.
///
/// Mutated only by remote deliveries. There is no timeout-based clear: a
/// lost stop event leaves the indicator set until the next delivery or
/// the end of the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypingState {
    pub active: bool,
}

/// Translates local input activity into typing signals and applies
/// remote typing deliveries.
#[derive(Clone)]
pub struct PresenceTracker {
    transport: Arc<dyn ChatTransport>,
    scroller: Scroller,
}

impl PresenceTracker {
    pub fn new(transport: Arc<dyn ChatTransport>, scroller: Scroller) -> Self {
        Self { transport, scroller }
    }

    /// Signal the collaborator on every local input change: a non-blank
    /// draft means typing, anything else stops it. Debouncing, if any,
    /// is the collaborator's concern.
    pub fn on_local_input(&self, text: &str) {
        if text.trim().is_empty() {
            self.transport.stop_typing();
        } else {
            self.transport.notify_typing();
        }
    }

    /// Apply a remote typing delivery and keep the indicator in view.
    /// Every delivery scrolls, changed or not.
    pub fn apply_remote(&self, state: &mut TypingState, active: bool) {
        state.active = active;
        self.scroller.request(false);
    }
}

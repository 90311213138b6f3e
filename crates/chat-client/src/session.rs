//! Session lifecycle: join, history hydration, subscription management,
//! compose, teardown.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::SessionContext;
use crate::models::{AgentProfile, Message, RawMessage};
use crate::presence::{PresenceTracker, TypingState};
use crate::scroll::{ScrollRequest, Scroller};
use crate::store::MessageStore;
use crate::transport::ChatTransport;

/// Delay before the first scroll of a fresh session, giving the render
/// layer one pass to lay out hydrated history.
const INITIAL_SCROLL_DELAY: Duration = Duration::from_millis(500);

/// One update delivered by any of the three subscription streams.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    MessageSnapshot(Vec<RawMessage>),
    Typing(bool),
    Agent(Option<AgentProfile>),
}

/// Observable session state, consumed by a render layer.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub store: MessageStore,
    pub typing: TypingState,
    pub agent: Option<AgentProfile>,
    /// True until the agent stream has delivered at least once.
    pub loading: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            store: MessageStore::new(),
            typing: TypingState::default(),
            agent: None,
            loading: true,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Render-layer surface of a session: the shared state, the scroll
/// request queue, and a revision that bumps after every applied update.
pub struct SessionHandle {
    pub state: Arc<RwLock<SessionState>>,
    pub revision: watch::Receiver<u64>,
    pub scroll_requests: mpsc::UnboundedReceiver<ScrollRequest>,
}

/// Orchestrates one chat session: join, history hydration, the three
/// update subscriptions, the compose path, and teardown.
pub struct SessionController {
    context: SessionContext,
    transport: Arc<dyn ChatTransport>,
    state: Arc<RwLock<SessionState>>,
    scroller: Scroller,
    presence: PresenceTracker,
    revision: watch::Sender<u64>,
    tasks: Vec<JoinHandle<()>>,
}

impl SessionController {
    /// Build a controller and the render-layer handle observing it.
    pub fn new(
        context: SessionContext,
        transport: Arc<dyn ChatTransport>,
    ) -> (Self, SessionHandle) {
        let state = Arc::new(RwLock::new(SessionState::new()));
        let (scroller, scroll_rx) = Scroller::channel();
        let (revision_tx, revision_rx) = watch::channel(0);
        let presence = PresenceTracker::new(transport.clone(), scroller.clone());

        let handle = SessionHandle {
            state: state.clone(),
            revision: revision_rx,
            scroll_requests: scroll_rx,
        };

        let controller = Self {
            context,
            transport,
            state,
            scroller,
            presence,
            revision: revision_tx,
            tasks: Vec::new(),
        };

        (controller, handle)
    }

    /// Join the configured chat, request a history snapshot, and register
    /// the message, typing and agent subscriptions.
    ///
    /// Without a configured chat id the session simply does not start:
    /// a warning, no commands, no error.
    pub fn start(&mut self) {
        let Some(chat_id) = self.context.chat_id.clone().filter(|id| !id.is_empty()) else {
            warn!("No chat id stored; session not started");
            return;
        };
        if !self.tasks.is_empty() {
            warn!(chat_id = %chat_id, "Session already active; ignoring start");
            return;
        }

        info!(chat_id = %chat_id, user_id = ?self.context.user_id, "Starting chat session");

        // Subscribe before issuing the requests whose results arrive on
        // the streams, so a prompt reply cannot slip past us.
        let messages_rx = self.transport.message_updates();
        let typing_rx = self.transport.typing_updates();
        let agent_rx = self.transport.agent_updates();

        self.transport.join_chat(&chat_id);
        self.transport.request_history(&chat_id);

        let (apply_tx, apply_rx) = mpsc::unbounded_channel();

        self.tasks.push(spawn_forwarder(
            messages_rx,
            apply_tx.clone(),
            SessionEvent::MessageSnapshot,
        ));
        self.tasks
            .push(spawn_forwarder(typing_rx, apply_tx.clone(), SessionEvent::Typing));
        self.tasks
            .push(spawn_forwarder(agent_rx, apply_tx, SessionEvent::Agent));
        self.tasks.push(self.spawn_apply_loop(apply_rx));
        self.tasks.push(self.spawn_initial_scroll());
    }

    /// Tear the session down: release every retained subscription exactly
    /// once and best-effort tell the collaborator we stopped typing.
    ///
    /// Safe to call at any time, repeatedly, with or without an active
    /// session.
    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.transport.stop_typing();
    }

    /// Compose path: optimistically append, then hand the text to the
    /// collaborator. Blank drafts are ignored.
    ///
    /// The optimistic entry is visible immediately and is superseded
    /// wholesale by the next snapshot once the server echoes it back.
    pub fn send(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        {
            let mut session = self.state.write();
            session.store.append_optimistic(
                text,
                self.context.user_id.as_deref(),
                self.context.chat_id.as_deref().unwrap_or_default(),
            );
            self.scroller.request(true);
        }
        self.revision.send_modify(|rev| *rev += 1);

        self.transport.send_message(text);
        self.transport.stop_typing();
    }

    /// Presence signal for every change of the local draft.
    pub fn on_input(&self, text: &str) {
        self.presence.on_local_input(text);
    }

    /// Whether `message` was authored by the local user.
    pub fn is_mine(&self, message: &Message) -> bool {
        crate::ownership::is_mine(message, self.context.user_id.as_deref())
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    fn spawn_apply_loop(&self, mut apply_rx: mpsc::UnboundedReceiver<SessionEvent>) -> JoinHandle<()> {
        let state = self.state.clone();
        let scroller = self.scroller.clone();
        let presence = self.presence.clone();
        let revision = self.revision.clone();

        tokio::spawn(async move {
            while let Some(event) = apply_rx.recv().await {
                apply_event(&state, &scroller, &presence, &revision, event);
            }
        })
    }

    fn spawn_initial_scroll(&self) -> JoinHandle<()> {
        let scroller = self.scroller.clone();
        tokio::spawn(async move {
            tokio::time::sleep(INITIAL_SCROLL_DELAY).await;
            scroller.request(false);
        })
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Apply one delivered update. All three streams funnel through here,
/// one event at a time: the state mutation and any resulting scroll
/// request happen under a single lock hold, then the render revision
/// bumps. One dispatch per event, in delivery order.
fn apply_event(
    state: &RwLock<SessionState>,
    scroller: &Scroller,
    presence: &PresenceTracker,
    revision: &watch::Sender<u64>,
    event: SessionEvent,
) {
    {
        let mut session = state.write();
        match event {
            SessionEvent::MessageSnapshot(snapshot) => {
                let grew = session.store.replace_with_snapshot(snapshot);
                if grew {
                    scroller.request(true);
                }
            }
            SessionEvent::Typing(active) => {
                presence.apply_remote(&mut session.typing, active);
            }
            SessionEvent::Agent(agent) => {
                session.agent = agent;
                session.loading = false;
            }
        }
    }
    revision.send_modify(|rev| *rev += 1);
}

/// Forward one broadcast stream into the shared apply funnel. Lagged
/// deliveries are skipped; the next snapshot is authoritative. A closed
/// stream ends the forwarder.
fn spawn_forwarder<T, F>(
    mut rx: broadcast::Receiver<T>,
    apply_tx: mpsc::UnboundedSender<SessionEvent>,
    wrap: F,
) -> JoinHandle<()>
where
    T: Clone + Send + 'static,
    F: Fn(T) -> SessionEvent + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(update) => {
                    if apply_tx.send(wrap(update)).is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscription lagged; waiting for the next delivery");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

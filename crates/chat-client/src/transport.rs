//! Collaborator contract for the messaging service, plus an in-memory
//! loopback implementation for tests and offline runs.

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{AgentProfile, ParticipantRef, RawMessage};

/// Capacity of the loopback broadcast channels.
const CHANNEL_CAPACITY: usize = 64;

/// Everything the synchronizer asks of the messaging service.
///
/// Commands are fire-and-forget: the core never awaits their completion
/// and failures surface, if at all, on the update streams. Each
/// `*_updates` call hands out an independent receiver; subscribe before
/// issuing a command whose result arrives on that stream, and drop the
/// receiver (or abort the task polling it) to release the subscription.
pub trait ChatTransport: Send + Sync {
    /// Register interest in a chat room.
    fn join_chat(&self, chat_id: &str);
    /// Ask for a history snapshot; the result arrives on the message stream.
    fn request_history(&self, chat_id: &str);
    /// Ask the service to persist and broadcast a new message.
    fn send_message(&self, content: &str);
    fn notify_typing(&self);
    fn stop_typing(&self);

    /// Full message-list snapshots, not deltas.
    fn message_updates(&self) -> broadcast::Receiver<Vec<RawMessage>>;
    /// Remote party's typing state.
    fn typing_updates(&self) -> broadcast::Receiver<bool>;
    /// Support agent assignment; `None` while unassigned.
    fn agent_updates(&self) -> broadcast::Receiver<Option<AgentProfile>>;
}

/// A command observed by the loopback transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    JoinChat(String),
    RequestHistory(String),
    SendMessage(String),
    NotifyTyping,
    StopTyping,
}

/// Loopback transport: records every command it receives and lets the
/// driving side push snapshots, typing states and agent assignments.
///
/// With echo enabled, `send_message` behaves like a round-trip through
/// the backend: the text comes back as a server-confirmed entry, with a
/// minted id, in a full snapshot.
pub struct InMemoryTransport {
    commands: Mutex<Vec<TransportCommand>>,
    history: Mutex<Vec<RawMessage>>,
    echo: Option<(String, String)>,
    messages_tx: broadcast::Sender<Vec<RawMessage>>,
    typing_tx: broadcast::Sender<bool>,
    agent_tx: broadcast::Sender<Option<AgentProfile>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        let (messages_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (typing_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (agent_tx, _) = broadcast::channel(CHANNEL_CAPACITY);

        Self {
            commands: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
            echo: None,
            messages_tx,
            typing_tx,
            agent_tx,
        }
    }

    /// Loopback with echo: sends come back attributed to `user_id` in
    /// `chat_id`.
    pub fn with_echo(chat_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        let mut transport = Self::new();
        transport.echo = Some((chat_id.into(), user_id.into()));
        transport
    }

    /// Commands observed so far, in order.
    pub fn commands(&self) -> Vec<TransportCommand> {
        self.commands.lock().clone()
    }

    /// Replace the backend-side history and broadcast it as a snapshot.
    pub fn push_snapshot(&self, snapshot: Vec<RawMessage>) {
        *self.history.lock() = snapshot.clone();
        let _ = self.messages_tx.send(snapshot);
    }

    /// Broadcast a remote typing state.
    pub fn set_typing(&self, active: bool) {
        let _ = self.typing_tx.send(active);
    }

    /// Broadcast an agent assignment.
    pub fn assign_agent(&self, agent: Option<AgentProfile>) {
        let _ = self.agent_tx.send(agent);
    }

    fn record(&self, command: TransportCommand) {
        self.commands.lock().push(command);
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTransport for InMemoryTransport {
    fn join_chat(&self, chat_id: &str) {
        self.record(TransportCommand::JoinChat(chat_id.to_string()));
    }

    fn request_history(&self, chat_id: &str) {
        self.record(TransportCommand::RequestHistory(chat_id.to_string()));
        let snapshot = self.history.lock().clone();
        let _ = self.messages_tx.send(snapshot);
    }

    fn send_message(&self, content: &str) {
        self.record(TransportCommand::SendMessage(content.to_string()));

        if let Some((chat_id, user_id)) = &self.echo {
            let confirmed = RawMessage {
                id: Some(Uuid::new_v4().to_string()),
                chat_id: chat_id.clone(),
                sender_id: Some(ParticipantRef::Id(user_id.clone())),
                receiver_id: None,
                content: content.to_string(),
                status: Some("delivered".to_string()),
                created_at: Some(Utc::now()),
            };

            let mut history = self.history.lock();
            history.push(confirmed);
            let _ = self.messages_tx.send(history.clone());
        }
    }

    fn notify_typing(&self) {
        self.record(TransportCommand::NotifyTyping);
    }

    fn stop_typing(&self) {
        self.record(TransportCommand::StopTyping);
    }

    fn message_updates(&self) -> broadcast::Receiver<Vec<RawMessage>> {
        self.messages_tx.subscribe()
    }

    fn typing_updates(&self) -> broadcast::Receiver<bool> {
        self.typing_tx.subscribe()
    }

    fn agent_updates(&self) -> broadcast::Receiver<Option<AgentProfile>> {
        self.agent_tx.subscribe()
    }
}

//! Support-chat client session synchronizer.
//!
//! Keeps a client-side view of one active conversation consistent with a
//! remote message stream: optimistic sends, full-snapshot reconciliation,
//! typing presence and support-agent assignment, without ever blocking
//! on a network round-trip. Transport, auth and rendering live outside;
//! this crate only speaks the collaborator contract in [`transport`].

pub mod config;
pub mod models;
pub mod ownership;
pub mod presence;
pub mod scroll;
pub mod session;
pub mod store;
pub mod transport;

pub use config::SessionContext;
pub use models::{AgentProfile, Message, ParticipantRef, RawMessage, UserRef, STATUS_SENT};
pub use ownership::is_mine;
pub use presence::{PresenceTracker, TypingState};
pub use scroll::{ScrollRequest, Scroller};
pub use session::{SessionController, SessionEvent, SessionHandle, SessionState};
pub use store::MessageStore;
pub use transport::{ChatTransport, InMemoryTransport, TransportCommand};

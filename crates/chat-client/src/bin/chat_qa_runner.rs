//! Scripted loopback run of the session synchronizer.
//!
//! Drives the core against the in-memory transport and prints what a
//! render layer would observe: hydration, the optimistic append, the
//! snapshot that supersedes it, typing presence and agent assignment.

use std::sync::Arc;
use std::time::Duration;

use chat_client::{
    AgentProfile, InMemoryTransport, SessionController, SessionContext, SessionHandle,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const SETTLE: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let context = SessionContext::new(Some("local-user".into()), Some("chat-qa".into()));
    let transport = Arc::new(InMemoryTransport::with_echo("chat-qa", "local-user"));

    // Seed backend history so hydration has something to deliver.
    transport.push_snapshot(vec![serde_json::from_value(serde_json::json!({
        "_id": "m-0",
        "chatId": "chat-qa",
        "senderId": { "_id": "agent-1", "name": "Sam", "email": "sam@support.example" },
        "receiverId": "local-user",
        "content": "Welcome! How can I help?",
        "status": "delivered",
        "createdAt": "2024-04-02T09:30:00Z",
    }))?]);

    let (mut controller, mut handle) = SessionController::new(context, transport.clone());

    controller.start();
    settle(&controller, &handle, "after hydration").await;

    controller.on_input("h");
    controller.on_input("hi");
    controller.send("hi");
    settle(&controller, &handle, "after echo round-trip").await;

    transport.set_typing(true);
    transport.assign_agent(Some(AgentProfile {
        id: Some("agent-1".into()),
        name: Some("Sam".into()),
        email: Some("sam@support.example".into()),
    }));
    transport.set_typing(false);
    settle(&controller, &handle, "after presence and assignment").await;

    controller.stop();

    let mut scrolls = 0;
    while handle.scroll_requests.try_recv().is_ok() {
        scrolls += 1;
    }
    info!(scrolls, "Scroll requests the render layer would have drained");
    info!(commands = ?transport.commands(), "Commands the backend observed");

    Ok(())
}

/// Let in-flight deliveries apply, then print the observable state.
async fn settle(controller: &SessionController, handle: &SessionHandle, label: &str) {
    tokio::time::sleep(SETTLE).await;

    let session = handle.state.read();
    info!(
        label,
        loading = session.loading,
        typing = session.typing.active,
        agent = ?session.agent.as_ref().and_then(|a| a.name.clone()),
        "Session state"
    );
    for message in session.store.messages() {
        let tag = if controller.is_mine(message) { "me" } else { "them" };
        info!(
            "  [{tag}] {:<30} id={:?} status={:?}",
            message.content, message.id, message.status
        );
    }
}

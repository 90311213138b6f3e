//! Autoscroll requests from the synchronizer to the render layer.

use tokio::sync::mpsc;
use tracing::warn;

/// A request to scroll the transcript to its end.
///
/// `force` marks content growth; non-forced requests accompany presence
/// churn and the initial render, and the render layer may skip them when
/// the user has scrolled away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub force: bool,
}

/// Queues scroll requests for the render layer to drain after its next
/// render pass. Delivery is best-effort: a missing consumer is logged
/// and the request dropped, never an error, never retried.
#[derive(Clone)]
pub struct Scroller {
    tx: mpsc::UnboundedSender<ScrollRequest>,
}

impl Scroller {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ScrollRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Request a scroll to the end of the transcript.
    pub fn request(&self, force: bool) {
        if self.tx.send(ScrollRequest { force }).is_err() {
            warn!("Scroll target is not available; dropping scroll request");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_are_queued_in_order() {
        let (scroller, mut rx) = Scroller::channel();
        scroller.request(true);
        scroller.request(false);

        assert_eq!(rx.try_recv().unwrap(), ScrollRequest { force: true });
        assert_eq!(rx.try_recv().unwrap(), ScrollRequest { force: false });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_missing_consumer_is_swallowed() {
        let (scroller, rx) = Scroller::channel();
        drop(rx);
        // Logged and dropped; must not panic or error.
        scroller.request(true);
    }
}

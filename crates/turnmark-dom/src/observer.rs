//! Subtree mutation observation.
//!
//! Pages publish [`TreeMutation`]s on a broadcast channel. A
//! [`MutationObserver`] is one subscription: created by
//! [`HostTree::observe`](crate::HostTree::observe), stopped by
//! [`MutationObserver::disconnect`] or drop.

use tokio::sync::broadcast;

/// Default capacity of a page's mutation channel.
pub const MUTATION_CHANNEL_CAPACITY: usize = 256;

/// What changed in the observed tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeMutation {
    /// Nodes were inserted under an existing element.
    Inserted,
    /// A subtree was detached.
    Removed,
    /// An element's children were replaced wholesale.
    ChildrenReplaced,
    /// The whole document was re-rendered.
    DocumentReplaced,
    /// The observer fell behind; some notifications were coalesced.
    Lagged(u64),
}

/// A live subscription to a page's mutation notifications.
#[derive(Debug)]
pub struct MutationObserver {
    rx: Option<broadcast::Receiver<TreeMutation>>,
}

impl MutationObserver {
    /// Wrap a broadcast receiver.
    pub fn new(rx: broadcast::Receiver<TreeMutation>) -> Self {
        Self { rx: Some(rx) }
    }

    /// An observer that never yields.
    pub fn disconnected() -> Self {
        Self { rx: None }
    }

    /// Whether the observer is still subscribed.
    pub fn is_connected(&self) -> bool {
        self.rx.is_some()
    }

    /// Stop observing. Pending notifications are discarded.
    pub fn disconnect(&mut self) {
        self.rx = None;
    }

    /// Wait for the next mutation.
    ///
    /// Never resolves while disconnected. Returns `None` once the page is
    /// dropped, after which the observer is disconnected.
    pub async fn changed(&mut self) -> Option<TreeMutation> {
        let Some(rx) = self.rx.as_mut() else {
            return std::future::pending().await;
        };
        match rx.recv().await {
            Ok(mutation) => Some(mutation),
            Err(broadcast::error::RecvError::Lagged(missed)) => Some(TreeMutation::Lagged(missed)),
            Err(broadcast::error::RecvError::Closed) => {
                self.rx = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receives_published_mutation() {
        let (tx, rx) = broadcast::channel(8);
        let mut observer = MutationObserver::new(rx);
        let _ = tx.send(TreeMutation::Inserted);
        assert_eq!(observer.changed().await, Some(TreeMutation::Inserted));
    }

    #[tokio::test]
    async fn lag_is_reported_not_fatal() {
        let (tx, rx) = broadcast::channel(2);
        let mut observer = MutationObserver::new(rx);
        for _ in 0..5 {
            let _ = tx.send(TreeMutation::Inserted);
        }
        assert_eq!(observer.changed().await, Some(TreeMutation::Lagged(3)));
        assert!(observer.is_connected());
    }

    #[tokio::test]
    async fn closed_channel_disconnects() {
        let (tx, rx) = broadcast::channel::<TreeMutation>(2);
        let mut observer = MutationObserver::new(rx);
        drop(tx);
        assert_eq!(observer.changed().await, None);
        assert!(!observer.is_connected());
    }

    #[test]
    fn disconnect_stops_delivery() {
        let (tx, rx) = broadcast::channel(8);
        let mut observer = MutationObserver::new(rx);
        assert_eq!(tx.receiver_count(), 1);
        observer.disconnect();
        assert_eq!(tx.receiver_count(), 0);
        assert!(!observer.is_connected());
    }
}

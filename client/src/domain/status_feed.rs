//! Latest human-readable status of client activity.
//!
//! Publishers overwrite the current message; subscribers hold a
//! `watch::Receiver` and observe every change from the point they subscribed.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared status message with change notification.
///
/// Clones share the same channel.
///
/// # Examples
/// ```
/// use item_client::domain::StatusFeed;
///
/// let feed = StatusFeed::new();
/// let receiver = feed.subscribe();
/// feed.publish("Loaded 3 items");
/// assert_eq!(*receiver.borrow(), "Loaded 3 items");
/// ```
#[derive(Debug, Clone)]
pub struct StatusFeed {
    sender: Arc<watch::Sender<String>>,
}

impl StatusFeed {
    /// Feed with an empty initial message.
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(String::new());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Replace the current message and notify subscribers.
    ///
    /// Publishing without subscribers still updates the current message.
    pub fn publish(&self, message: impl Into<String>) {
        self.sender.send_replace(message.into());
    }

    /// Current message.
    pub fn current(&self) -> String {
        self.sender.borrow().clone()
    }

    /// Receiver observing future changes.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.sender.subscribe()
    }
}

impl Default for StatusFeed {
    fn default() -> Self {
        Self::new()
    }
}

// ── Event bus ──
//
// Topic-keyed fan-out. Every subscriber owns a bounded channel; publishing
// awaits each channel in turn, so a subscriber that stops reading while
// its channel is full stalls the publisher until it reads again or drops
// its `Subscription`. Dropped subscribers are pruned on the next publish.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::trace;

/// Topic carrying [`crate::NavigationEvent`]s after the displayed list
/// changes.
pub const LIST_NAVIGATED: &str = "list.navigated";

pub struct EventBus<T> {
    topics: DashMap<String, Vec<mpsc::Sender<T>>>,
    capacity: usize,
}

impl<T: Clone + Send> EventBus<T> {
    /// Bus whose subscriber channels hold `capacity` undelivered events
    /// (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn subscribe(&self, topic: &str) -> Subscription<T> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.topics.entry(topic.to_owned()).or_default().push(tx);
        Subscription {
            topic: topic.to_owned(),
            rx,
        }
    }

    /// Deliver `payload` to every live subscriber of `topic`.
    ///
    /// Waits while a subscriber's channel is full. Returns the number of
    /// subscribers that received the event.
    pub async fn publish(&self, topic: &str, payload: T) -> usize {
        // Clone the senders out so no map guard is held across an await.
        let senders: Vec<mpsc::Sender<T>> = match self.topics.get(topic) {
            Some(list) => list.clone(),
            None => return 0,
        };

        let mut delivered = 0;
        let mut closed = false;
        for tx in &senders {
            if tx.send(payload.clone()).await.is_ok() {
                delivered += 1;
            } else {
                closed = true;
            }
        }

        if closed {
            if let Some(mut list) = self.topics.get_mut(topic) {
                list.retain(|tx| !tx.is_closed());
            }
        }
        trace!(topic, delivered, "event published");
        delivered
    }

    /// Live subscribers currently registered for `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .get(topic)
            .map_or(0, |list| list.iter().filter(|tx| !tx.is_closed()).count())
    }
}

impl<T: Clone + Send> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Receiving end of one subscription. Dropping it unsubscribes.
pub struct Subscription<T> {
    topic: String,
    rx: mpsc::Receiver<T>,
}

impl<T> Subscription<T> {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Next event, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

use std::collections::BTreeMap;

use foundation::ids::ViewToken;
use tracing::debug;

/// Routes events to the view instance that owns a token.
///
/// Producers (widget callbacks, DOM listeners) only know the token carried by
/// the markup they fired from. Events for a token without a live subscription
/// are dropped, so a torn-down view never receives late callbacks.
#[derive(Debug)]
pub struct EventBus<E> {
    queues: BTreeMap<ViewToken, Vec<E>>,
    dropped: u64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            queues: BTreeMap::new(),
            dropped: 0,
        }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `token` was already subscribed.
    pub fn subscribe(&mut self, token: ViewToken) -> bool {
        if self.queues.contains_key(&token) {
            return false;
        }
        self.queues.insert(token, Vec::new());
        true
    }

    /// Removes the subscription and discards anything still queued for it.
    pub fn unsubscribe(&mut self, token: ViewToken) -> bool {
        match self.queues.remove(&token) {
            Some(pending) => {
                if !pending.is_empty() {
                    debug!("discarding {} queued events for view {token}", pending.len());
                }
                true
            }
            None => false,
        }
    }

    pub fn is_subscribed(&self, token: ViewToken) -> bool {
        self.queues.contains_key(&token)
    }

    /// Queues `event` for `token`. Returns `false` if nobody is listening.
    pub fn emit(&mut self, token: ViewToken, event: E) -> bool {
        match self.queues.get_mut(&token) {
            Some(queue) => {
                queue.push(event);
                true
            }
            None => {
                self.dropped += 1;
                debug!("dropping event for unsubscribed view {token}");
                false
            }
        }
    }

    pub fn pending(&self, token: ViewToken) -> usize {
        self.queues.get(&token).map_or(0, Vec::len)
    }

    /// Takes the queued events for `token` in emission order.
    pub fn drain(&mut self, token: ViewToken) -> Vec<E> {
        self.queues
            .get_mut(&token)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Number of events dropped because their token had no subscriber.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use foundation::ids::ViewToken;

    #[test]
    fn delivers_events_in_order_per_token() {
        let mut bus = EventBus::new();
        let a = ViewToken::new(1);
        let b = ViewToken::new(2);
        bus.subscribe(a);
        bus.subscribe(b);
        bus.emit(a, "first");
        bus.emit(b, "other");
        bus.emit(a, "second");
        assert_eq!(bus.drain(a), vec!["first", "second"]);
        assert_eq!(bus.drain(b), vec!["other"]);
        assert!(bus.drain(a).is_empty());
    }

    #[test]
    fn drops_events_without_subscriber() {
        let mut bus = EventBus::new();
        let t = ViewToken::new(7);
        assert!(!bus.emit(t, 1));
        assert_eq!(bus.dropped(), 1);

        bus.subscribe(t);
        assert!(bus.emit(t, 2));
        assert!(bus.unsubscribe(t));
        assert!(!bus.emit(t, 3));
        assert_eq!(bus.dropped(), 2);
        assert!(bus.drain(t).is_empty());
    }

    #[test]
    fn double_subscribe_keeps_queue() {
        let mut bus = EventBus::new();
        let t = ViewToken::new(3);
        assert!(bus.subscribe(t));
        bus.emit(t, 'x');
        assert!(!bus.subscribe(t));
        assert_eq!(bus.pending(t), 1);
    }
}

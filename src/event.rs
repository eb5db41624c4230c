use crate::{BlockId, LinkIntent, Position, Size};
use anyhow::Result;
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A graph event with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEvent {
    pub timestamp: DateTime<Utc>,
    pub event: EventType,
}

impl GraphEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }

    /// Create a new event with a specific timestamp
    pub fn with_timestamp(timestamp: DateTime<Utc>, event: EventType) -> Self {
        Self { timestamp, event }
    }
}

/// Mutations announced by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventType {
    BlockCreated {
        id: BlockId,
        block_type: String,
        position: Position,
        size: Size,
    },

    /// Content or type tag changed
    BlockUpdated {
        id: BlockId,
        content: String,
        block_type: String,
    },

    BlockMoved {
        id: BlockId,
        position: Position,
    },

    BlockResized {
        id: BlockId,
        size: Size,
    },

    BlockDeleted {
        id: BlockId,
    },

    BlocksLinked {
        from: BlockId,
        to: BlockId,
        intent: LinkIntent,
    },

    BlocksUnlinked {
        from: BlockId,
        to: BlockId,
    },

    BlocksImported {
        count: usize,
    },

    BlocksArranged {
        count: usize,
    },
}

impl EventType {
    /// Wire name used by renderer collaborators
    pub fn name(&self) -> &'static str {
        match self {
            EventType::BlockCreated { .. } => "blockCreated",
            EventType::BlockUpdated { .. } => "blockUpdated",
            EventType::BlockMoved { .. } => "blockMoved",
            EventType::BlockResized { .. } => "blockResized",
            EventType::BlockDeleted { .. } => "blockDeleted",
            EventType::BlocksLinked { .. } => "blocksLinked",
            EventType::BlocksUnlinked { .. } => "blocksUnlinked",
            EventType::BlocksImported { .. } => "blocksImported",
            EventType::BlocksArranged { .. } => "blocksArranged",
        }
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GraphEvent) -> Result<()>>;

/// Synchronous publish/subscribe channel.
///
/// Listeners run in registration order. A listener returning an error is
/// logged and skipped; the remaining listeners still see the event.
///
/// Published events are also appended to a log that callers can drain. Until
/// [`EventBus::set_recording`] is called, the log is kept only while nobody is
/// subscribed, so a listener-driven bus does not grow it without bound.
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
    log: Vec<GraphEvent>,
    recording: Option<bool>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
            log: Vec::new(),
            recording: None,
        }
    }

    /// Register a listener; it receives every event published afterwards
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GraphEvent) -> Result<()> + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Dispatch an event to all listeners, then record it
    pub fn publish(&mut self, event: EventType) {
        let event = GraphEvent::new(event);

        for (id, listener) in self.listeners.iter_mut() {
            if let Err(err) = listener(&event) {
                warn!(
                    "event=listener_failed module=event status=error \
                     subscription={} event_name={} error={:#}",
                    id.0,
                    event.event.name(),
                    err
                );
            }
        }

        if self.is_recording() {
            self.log.push(event);
        }
    }

    /// Turn the event log on or off regardless of subscribers; listeners are
    /// unaffected
    pub fn set_recording(&mut self, recording: bool) {
        self.recording = Some(recording);
        if !recording {
            self.log.clear();
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.unwrap_or(self.listeners.is_empty())
    }

    /// Get all recorded events
    pub fn events(&self) -> &[GraphEvent] {
        &self.log
    }

    /// Take all recorded events, leaving the log empty
    pub fn drain(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.log)
    }

    /// Clear event log
    pub fn clear(&mut self) {
        self.log.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("events", &self.log.len())
            .field("recording", &self.is_recording())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn deleted(id: &str) -> EventType {
        EventType::BlockDeleted { id: id.into() }
    }

    #[test]
    fn test_event_creation() {
        let event = GraphEvent::new(deleted("a"));
        assert!(event.timestamp <= Utc::now());
        assert_eq!(event.event.name(), "blockDeleted");
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |_| {
                seen.borrow_mut().push(tag);
                Ok(())
            });
        }

        bus.publish(deleted("a"));
        assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_failing_listener_is_isolated() {
        let mut bus = EventBus::new();
        bus.set_recording(true);
        let count = Rc::new(RefCell::new(0));

        bus.subscribe(|_| Err(anyhow!("renderer exploded")));
        let counter = Rc::clone(&count);
        bus.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        bus.publish(deleted("a"));
        bus.publish(deleted("b"));

        assert_eq!(*count.borrow(), 2);
        assert_eq!(bus.events().len(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let id = bus.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        bus.publish(deleted("a"));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(deleted("b"));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_drain_and_recording() {
        let mut bus = EventBus::new();
        bus.publish(deleted("a"));
        bus.publish(EventType::BlocksArranged { count: 3 });

        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert!(bus.events().is_empty());

        bus.set_recording(false);
        bus.publish(deleted("c"));
        assert!(bus.events().is_empty());
    }

    #[test]
    fn test_log_off_while_subscribed() {
        let mut bus = EventBus::new();
        assert!(bus.is_recording());

        let id = bus.subscribe(|_| Ok(()));
        assert!(!bus.is_recording());
        for _ in 0..100 {
            bus.publish(deleted("a"));
        }
        assert!(bus.events().is_empty());

        bus.unsubscribe(id);
        bus.publish(deleted("b"));
        assert_eq!(bus.events().len(), 1);

        bus.subscribe(|_| Ok(()));
        bus.set_recording(true);
        bus.publish(deleted("c"));
        assert_eq!(bus.events().len(), 2);
    }

    #[test]
    fn test_event_serialization() {
        let event = GraphEvent::new(EventType::BlocksLinked {
            from: "a".into(),
            to: "b".into(),
            intent: LinkIntent::Reverse,
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: GraphEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.event, event.event);
    }
}

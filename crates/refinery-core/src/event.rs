//! Converter notifications with synchronous fan-out.
//!
//! Every notification is delivered inside the call that caused it, to the
//! listeners registered for its [`EventKind`], in registration order. A
//! bounded [`EventLog`] keeps the most recent events for inspection.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`]. Suppressed
//! events are neither delivered nor logged.

use slotmap::SlotMap;

use crate::id::{ItemTypeId, Quantity, SubscriptionId};
use crate::recipe::Recipe;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A converter notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Storage --
    SourceAdded {
        item_type: ItemTypeId,
        quantity: Quantity,
    },
    SourceRemoved {
        item_type: ItemTypeId,
        quantity: Quantity,
    },
    TargetRemoved {
        item_type: ItemTypeId,
        quantity: Quantity,
    },

    // -- Conversion --
    StartedConverting {
        recipe: Recipe,
    },
    Converted {
        recipe: Recipe,
    },
    StoppedConverting {
        recipe: Recipe,
    },

    // -- Control --
    EnabledChanged {
        enabled: bool,
    },
}

/// Discriminant tag for event types, used for subscription and suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SourceAdded,
    SourceRemoved,
    TargetRemoved,
    StartedConverting,
    Converted,
    StoppedConverting,
    EnabledChanged,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 7;

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::SourceAdded { .. } => EventKind::SourceAdded,
            Event::SourceRemoved { .. } => EventKind::SourceRemoved,
            Event::TargetRemoved { .. } => EventKind::TargetRemoved,
            Event::StartedConverting { .. } => EventKind::StartedConverting,
            Event::Converted { .. } => EventKind::Converted,
            Event::StoppedConverting { .. } => EventKind::StoppedConverting,
            Event::EnabledChanged { .. } => EventKind::EnabledChanged,
        }
    }
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; EVENT_KIND_COUNT] = [
        EventKind::SourceAdded,
        EventKind::SourceRemoved,
        EventKind::TargetRemoved,
        EventKind::StartedConverting,
        EventKind::Converted,
        EventKind::StoppedConverting,
        EventKind::EnabledChanged,
    ];

    /// Convert to usize index for array lookups.
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventLog: pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer of recent events. Fixed capacity; when full,
/// the oldest events are dropped.
#[derive(Debug)]
pub struct EventLog {
    events: Vec<Option<Event>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
    /// Events overwritten before anyone cleared them.
    dropped: u64,
}

impl EventLog {
    /// Create a new ring buffer with the given capacity.
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
            dropped: 0,
        }
    }

    /// Push an event. If full, the oldest event is dropped.
    pub fn push(&mut self, event: Event) {
        if self.events[self.head].replace(event).is_some() {
            self.dropped += 1;
        }
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Number of events that were dropped because the buffer was full.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Iterate over events in order from oldest to newest.
    pub fn iter(&self) -> EventLogIter<'_> {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head is the next write position, which holds the oldest entry
            self.head
        };
        EventLogIter {
            log: self,
            index: start,
            remaining: self.len,
        }
    }

    /// Clear stored events. `total_written` and `dropped_count` keep counting;
    /// cleared events are not counted as dropped.
    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

/// Iterator over events in an [`EventLog`], from oldest to newest.
pub struct EventLogIter<'a> {
    log: &'a EventLog,
    index: usize,
    remaining: usize,
}

impl<'a> Iterator for EventLogIter<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let event = self.log.events[self.index].as_ref();
        self.index = (self.index + 1) % self.log.capacity();
        self.remaining -= 1;
        event
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for EventLogIter<'_> {}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// A listener receives events read-only.
pub type Listener = Box<dyn FnMut(&Event)>;

/// Optional predicate that filters events for a listener.
pub type EventFilter = Box<dyn Fn(&Event) -> bool>;

struct SubscriberEntry {
    id: SubscriptionId,
    listener: Listener,
    filter: Option<EventFilter>,
}

impl std::fmt::Debug for SubscriberEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberEntry")
            .field("id", &self.id)
            .field("listener", &"<fn>")
            .field(
                "filter",
                &if self.filter.is_some() {
                    "Some(<fn>)"
                } else {
                    "None"
                },
            )
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Per-kind listener lists, suppression flags, and the recent-event log.
pub struct EventBus {
    /// Listeners indexed by event kind, in registration order.
    subscribers: [Vec<SubscriberEntry>; EVENT_KIND_COUNT],

    /// Which kind each live subscription belongs to.
    subscriptions: SlotMap<SubscriptionId, EventKind>,

    suppressed: [bool; EVENT_KIND_COUNT],

    log: EventLog,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers)
            .field("suppressed", &self.suppressed)
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Create a bus whose log keeps the last `log_capacity` events.
    pub fn new(log_capacity: usize) -> Self {
        Self {
            subscribers: Default::default(),
            subscriptions: SlotMap::with_key(),
            suppressed: [false; EVENT_KIND_COUNT],
            log: EventLog::new(log_capacity),
        }
    }

    /// Register a listener for an event kind.
    pub fn subscribe(&mut self, kind: EventKind, listener: Listener) -> SubscriptionId {
        self.subscribe_filtered(kind, None, listener)
    }

    /// Register a listener that only sees events passing `filter`.
    pub fn subscribe_filtered(
        &mut self,
        kind: EventKind,
        filter: Option<EventFilter>,
        listener: Listener,
    ) -> SubscriptionId {
        let id = self.subscriptions.insert(kind);
        self.subscribers[kind.index()].push(SubscriberEntry {
            id,
            listener,
            filter,
        });
        id
    }

    /// Remove a listener. Returns false if the id was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(kind) = self.subscriptions.remove(id) else {
            return false;
        };
        self.subscribers[kind.index()].retain(|entry| entry.id != id);
        true
    }

    /// Number of live listeners for a kind.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers[kind.index()].len()
    }

    /// Deliver an event to its listeners now and record it in the log.
    /// No-ops if the event kind is suppressed.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }

        for entry in &mut self.subscribers[idx] {
            if let Some(ref filter) = entry.filter
                && !filter(&event)
            {
                continue;
            }
            (entry.listener)(&event);
        }

        self.log.push(event);
    }

    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Recent events, oldest first.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Fixed64;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn wood() -> ItemTypeId {
        ItemTypeId(0)
    }

    fn recipe() -> Recipe {
        Recipe::new(wood(), 5, ItemTypeId(1), 1, Fixed64::from_num(1)).unwrap()
    }

    fn added(quantity: Quantity) -> Event {
        Event::SourceAdded {
            item_type: wood(),
            quantity,
        }
    }

    #[test]
    fn event_kind_matches_variant() {
        assert_eq!(added(1).kind(), EventKind::SourceAdded);
        assert_eq!(
            Event::Converted { recipe: recipe() }.kind(),
            EventKind::Converted
        );
        assert_eq!(
            Event::EnabledChanged { enabled: true }.kind(),
            EventKind::EnabledChanged
        );
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn event_log_wraps_and_drops_oldest() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            log.push(added(i));
        }

        assert_eq!(log.len(), 3);
        assert_eq!(log.total_written(), 5);
        assert_eq!(log.dropped_count(), 2);

        let quantities: Vec<Quantity> = log
            .iter()
            .map(|e| match e {
                Event::SourceAdded { quantity, .. } => *quantity,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(quantities, vec![2, 3, 4]);
    }

    #[test]
    fn cleared_events_are_not_counted_as_dropped() {
        let mut log = EventLog::new(3);
        for i in 0..3 {
            log.push(added(i));
        }
        log.clear();
        log.push(added(3));
        log.push(added(4));

        assert_eq!(log.total_written(), 5);
        assert_eq!(log.dropped_count(), 0);

        for i in 5..7 {
            log.push(added(i));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.dropped_count(), 1);
    }

    #[test]
    fn event_log_zero_capacity_clamped() {
        let log = EventLog::new(0);
        assert_eq!(log.capacity(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn emit_delivers_synchronously_in_registration_order() {
        let mut bus = EventBus::default();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            bus.subscribe(
                EventKind::SourceAdded,
                Box::new(move |_| order.borrow_mut().push(tag)),
            );
        }

        bus.emit(added(1));
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn listeners_only_see_their_kind() {
        let mut bus = EventBus::default();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        bus.subscribe(EventKind::Converted, Box::new(move |_| *c.borrow_mut() += 1));

        bus.emit(added(1));
        bus.emit(Event::EnabledChanged { enabled: true });
        assert_eq!(*count.borrow(), 0);

        bus.emit(Event::Converted { recipe: recipe() });
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn filtered_listener_skips_rejected_events() {
        let mut bus = EventBus::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        bus.subscribe_filtered(
            EventKind::SourceAdded,
            Some(Box::new(|e| matches!(e, Event::SourceAdded { quantity, .. } if *quantity >= 3))),
            Box::new(move |e| s.borrow_mut().push(e.clone())),
        );

        bus.emit(added(1));
        bus.emit(added(4));
        assert_eq!(*seen.borrow(), vec![added(4)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::default();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let id = bus.subscribe(EventKind::SourceAdded, Box::new(move |_| *c.borrow_mut() += 1));

        bus.emit(added(1));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(added(1));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.subscriber_count(EventKind::SourceAdded), 0);
    }

    #[test]
    fn suppressed_kind_is_neither_delivered_nor_logged() {
        let mut bus = EventBus::default();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        bus.subscribe(EventKind::SourceAdded, Box::new(move |_| *c.borrow_mut() += 1));

        bus.suppress(EventKind::SourceAdded);
        assert!(bus.is_suppressed(EventKind::SourceAdded));
        bus.emit(added(1));
        assert_eq!(*count.borrow(), 0);
        assert!(bus.log().is_empty());

        bus.unsuppress(EventKind::SourceAdded);
        bus.emit(added(1));
        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.log().len(), 1);
    }

    #[test]
    fn clear_log_keeps_subscribers() {
        let mut bus = EventBus::new(4);
        bus.subscribe(EventKind::SourceAdded, Box::new(|_| {}));
        bus.emit(added(1));
        bus.clear_log();
        assert!(bus.log().is_empty());
        assert_eq!(bus.log().total_written(), 1);
        assert_eq!(bus.subscriber_count(EventKind::SourceAdded), 1);
    }
}

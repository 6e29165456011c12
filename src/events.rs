//! Named-topic gesture event registry.
//!
//! Trackers publish edge-triggered gesture events here; consumers register
//! per topic and receive synchronous callbacks during state recomputation.
//! Dispatch order within a topic is unspecified. Registration returns an
//! explicit handle so unregistration is deterministic.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::gesture::GestureState;
use crate::hand::Hand;

// ── Topics ─────────────────────────────────────────────────

/// The named gesture topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureTopic {
    /// Pinch became active this tick.
    PinchStart,
    /// Fired every tick while the pinch is active.
    Pinch,
    /// Pinch became inactive this tick.
    PinchEnd,
    /// Fist closed past the grab threshold.
    GrabStart,
    /// Fist left the grab band.
    GrabEnd,
    /// Hand opened past the open threshold.
    OpenStart,
    /// Hand left the open band.
    OpenEnd,
}

impl GestureTopic {
    /// Topic name used for registration by string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PinchStart => "pinchstart",
            Self::Pinch => "pinch",
            Self::PinchEnd => "pinchend",
            Self::GrabStart => "grabstart",
            Self::GrabEnd => "grabend",
            Self::OpenStart => "openstart",
            Self::OpenEnd => "openend",
        }
    }

    /// Parse a topic name string.
    pub fn from_name(s: &str) -> Option<GestureTopic> {
        match s {
            "pinchstart" => Some(Self::PinchStart),
            "pinch" => Some(Self::Pinch),
            "pinchend" => Some(Self::PinchEnd),
            "grabstart" => Some(Self::GrabStart),
            "grabend" => Some(Self::GrabEnd),
            "openstart" => Some(Self::OpenStart),
            "openend" => Some(Self::OpenEnd),
            _ => None,
        }
    }
}

// ── Events ─────────────────────────────────────────────────

/// A gesture edge (or per-tick pinch notification) with its hand's state
/// at the moment of firing.
#[derive(Debug, Clone)]
pub struct GestureEvent {
    pub topic: GestureTopic,
    pub hand: Hand,
    /// The hand's state after this tick's recomputation.
    pub state: GestureState,
    /// Clock time of the tick, in seconds.
    pub time: f64,
    /// Elapsed time since the previous tick, in seconds.
    pub delta: f64,
}

// ── Registry ───────────────────────────────────────────────

type Handler = Rc<RefCell<dyn FnMut(&GestureEvent)>>;

struct Listener {
    id: u64,
    handler: Handler,
}

/// Handle returned by [`EventBus::register`]; pass back to
/// [`EventBus::unregister`] to stop delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    topic: GestureTopic,
    id: u64,
}

impl Subscription {
    pub fn topic(&self) -> GestureTopic {
        self.topic
    }
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: HashMap<GestureTopic, Vec<Listener>>,
}

/// Synchronous, single-threaded event registry shared between trackers
/// and consumers via `Rc`.
#[derive(Default)]
pub struct EventBus {
    inner: RefCell<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a topic. The returned handle unregisters it.
    pub fn register<F>(&self, topic: GestureTopic, handler: F) -> Subscription
    where
        F: FnMut(&GestureEvent) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.entry(topic).or_default().push(Listener {
            id,
            handler: Rc::new(RefCell::new(handler)),
        });
        Subscription { topic, id }
    }

    /// Register by topic name string. Returns `None` for unknown names.
    pub fn register_by_name<F>(&self, topic: &str, handler: F) -> Option<Subscription>
    where
        F: FnMut(&GestureEvent) + 'static,
    {
        GestureTopic::from_name(topic).map(|t| self.register(t, handler))
    }

    /// Remove a previously registered handler. Returns whether it was
    /// still registered.
    pub fn unregister(&self, subscription: Subscription) -> bool {
        let mut inner = self.inner.borrow_mut();
        if let Some(listeners) = inner.listeners.get_mut(&subscription.topic) {
            let before = listeners.len();
            listeners.retain(|l| l.id != subscription.id);
            return listeners.len() < before;
        }
        false
    }

    /// Number of handlers registered for a topic.
    pub fn listener_count(&self, topic: GestureTopic) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(&topic)
            .map_or(0, |l| l.len())
    }

    /// Deliver an event to every handler registered for its topic.
    ///
    /// The handler list is snapshotted before dispatch, so handlers may
    /// register or unregister from within a callback; such changes take
    /// effect from the next dispatch.
    pub fn dispatch(&self, event: &GestureEvent) {
        let handlers: Vec<Handler> = {
            let inner = self.inner.borrow();
            match inner.listeners.get(&event.topic) {
                Some(listeners) => listeners.iter().map(|l| Rc::clone(&l.handler)).collect(),
                None => return,
            }
        };
        for handler in handlers {
            (&mut *handler.borrow_mut())(event);
        }
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn test_event(topic: GestureTopic) -> GestureEvent {
    GestureEvent {
        topic,
        hand: Hand::Left,
        state: GestureState::default(),
        time: 1.0,
        delta: 1.0 / 60.0,
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_topic_names_round_trip() {
        let topics = [
            GestureTopic::PinchStart,
            GestureTopic::Pinch,
            GestureTopic::PinchEnd,
            GestureTopic::GrabStart,
            GestureTopic::GrabEnd,
            GestureTopic::OpenStart,
            GestureTopic::OpenEnd,
        ];
        for topic in topics {
            assert_eq!(GestureTopic::from_name(topic.as_str()), Some(topic));
        }
        assert_eq!(GestureTopic::from_name("wave"), None);
    }

    #[test]
    fn test_register_and_dispatch() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let hits_cb = Rc::clone(&hits);
        bus.register(GestureTopic::PinchStart, move |_| {
            hits_cb.set(hits_cb.get() + 1);
        });

        bus.dispatch(&test_event(GestureTopic::PinchStart));
        bus.dispatch(&test_event(GestureTopic::PinchStart));
        assert_eq!(hits.get(), 2);

        // Other topics do not reach the handler.
        bus.dispatch(&test_event(GestureTopic::GrabStart));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_unregister_stops_delivery() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let hits_cb = Rc::clone(&hits);
        let sub = bus.register(GestureTopic::GrabEnd, move |_| {
            hits_cb.set(hits_cb.get() + 1);
        });

        bus.dispatch(&test_event(GestureTopic::GrabEnd));
        assert_eq!(hits.get(), 1);

        assert!(bus.unregister(sub));
        bus.dispatch(&test_event(GestureTopic::GrabEnd));
        assert_eq!(hits.get(), 1);

        // Second unregister is a no-op.
        assert!(!bus.unregister(sub));
    }

    #[test]
    fn test_listener_count() {
        let bus = EventBus::new();
        assert_eq!(bus.listener_count(GestureTopic::Pinch), 0);
        let a = bus.register(GestureTopic::Pinch, |_| {});
        let _b = bus.register(GestureTopic::Pinch, |_| {});
        assert_eq!(bus.listener_count(GestureTopic::Pinch), 2);
        bus.unregister(a);
        assert_eq!(bus.listener_count(GestureTopic::Pinch), 1);
    }

    #[test]
    fn test_register_by_name() {
        let bus = EventBus::new();
        let sub = bus.register_by_name("openstart", |_| {});
        assert!(sub.is_some());
        assert_eq!(sub.unwrap().topic(), GestureTopic::OpenStart);
        assert!(bus.register_by_name("nonsense", |_| {}).is_none());
    }

    #[test]
    fn test_multiple_handlers_all_fire() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let hits_cb = Rc::clone(&hits);
            bus.register(GestureTopic::OpenEnd, move |_| {
                hits_cb.set(hits_cb.get() + 1);
            });
        }
        bus.dispatch(&test_event(GestureTopic::OpenEnd));
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn test_unregister_from_within_handler() {
        let bus = Rc::new(EventBus::new());
        let hits = Rc::new(Cell::new(0));
        let sub_slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let bus_cb = Rc::clone(&bus);
        let hits_cb = Rc::clone(&hits);
        let slot_cb = Rc::clone(&sub_slot);
        let sub = bus.register(GestureTopic::PinchEnd, move |_| {
            hits_cb.set(hits_cb.get() + 1);
            if let Some(sub) = slot_cb.borrow_mut().take() {
                bus_cb.unregister(sub);
            }
        });
        *sub_slot.borrow_mut() = Some(sub);

        bus.dispatch(&test_event(GestureTopic::PinchEnd));
        bus.dispatch(&test_event(GestureTopic::PinchEnd));
        assert_eq!(hits.get(), 1, "handler unregistered itself after one hit");
    }
}

#![forbid(unsafe_code)]

//! Fan-out of change events to live subscribers.
//!
//! [`ChangeBus`] is a [`ChangeSink`] that forwards every event to a list of
//! callbacks. It is the dependency-tracking extension point: a fine-grained
//! renderer would register the currently-rendering consumer on `Read` events
//! and schedule re-renders on `Write` events. The bus carries the events;
//! scheduling policy stays with the subscriber.
//!
//! # Invariants
//!
//! 1. Callbacks run in registration order.
//! 2. Dropping a [`Subscription`] removes its callback before the next
//!    `emit`.
//! 3. A callback may subscribe or unsubscribe during `emit`; the change
//!    takes effect on the next event.

use core::fmt;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::event::{ChangeEvent, ChangeSink};
use crate::observable::Subscription;

type BusCallback = Rc<dyn Fn(&ChangeEvent)>;

/// Broadcasts each emitted event to every live subscriber.
///
/// Clones share the subscriber list, so the handle kept by the caller and
/// the clone handed to [`observe`] stay connected.
///
/// [`observe`]: crate::tree::observe
#[derive(Default, Clone)]
pub struct ChangeBus {
    subscribers: Rc<RefCell<Vec<Weak<dyn Fn(&ChangeEvent)>>>>,
}

impl ChangeBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` to run for every event the bus receives.
    ///
    /// The callback stays registered as long as the returned
    /// [`Subscription`] is alive.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&ChangeEvent) + 'static) -> Subscription {
        let callback: BusCallback = Rc::new(callback);
        self.subscribers
            .borrow_mut()
            .push(Rc::downgrade(&callback));
        Subscription::holding(callback)
    }

    /// Number of live subscribers. Dead entries are pruned as a side effect.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|weak| weak.strong_count() > 0);
        subscribers.len()
    }
}

impl ChangeSink for ChangeBus {
    fn emit(&self, event: &ChangeEvent) {
        // Snapshot live callbacks so the borrow is released before user code
        // runs; a callback may subscribe without tripping the RefCell.
        let callbacks: Vec<BusCallback> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in callbacks {
            callback(event);
        }
    }
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus")
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use weft_core::KeyPath;

    fn write_to(path: &str) -> ChangeEvent {
        ChangeEvent::Write {
            path: KeyPath::parse(path),
        }
    }

    #[test]
    fn subscribers_see_every_event() {
        let bus = ChangeBus::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = bus.subscribe(move |_| c.set(c.get() + 1));

        bus.emit(&write_to("a"));
        bus.emit(&write_to("b"));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn callbacks_run_in_registration_order() {
        let bus = ChangeBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = Rc::clone(&order);
        let _s1 = bus.subscribe(move |_| o1.borrow_mut().push("first"));
        let o2 = Rc::clone(&order);
        let _s2 = bus.subscribe(move |_| o2.borrow_mut().push("second"));

        bus.emit(&write_to("x"));
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn dropped_subscription_is_skipped() {
        let bus = ChangeBus::new();
        let count = Rc::new(Cell::new(0));

        let c = Rc::clone(&count);
        let sub = bus.subscribe(move |_| c.set(c.get() + 1));
        bus.emit(&write_to("x"));
        drop(sub);
        bus.emit(&write_to("x"));

        assert_eq!(count.get(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn callback_receives_the_event_payload() {
        let bus = ChangeBus::new();
        let seen = Rc::new(RefCell::new(None));

        let s = Rc::clone(&seen);
        let _sub = bus.subscribe(move |event| *s.borrow_mut() = Some(event.clone()));
        bus.emit(&write_to("address.city"));

        assert_eq!(*seen.borrow(), Some(write_to("address.city")));
    }

    #[test]
    fn clones_share_the_subscriber_list() {
        let bus = ChangeBus::new();
        let clone = bus.clone();

        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = clone.subscribe(move |_| c.set(c.get() + 1));

        bus.emit(&write_to("x"));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn subscribing_during_emit_defers_to_the_next_event() {
        let bus = ChangeBus::new();
        let late_fired = Rc::new(Cell::new(0));
        let holder = Rc::new(RefCell::new(Vec::new()));

        let bus_inner = bus.clone();
        let late = Rc::clone(&late_fired);
        let hold = Rc::clone(&holder);
        let _sub = bus.subscribe(move |_| {
            let l = Rc::clone(&late);
            hold.borrow_mut()
                .push(bus_inner.subscribe(move |_| l.set(l.get() + 1)));
        });

        bus.emit(&write_to("x"));
        assert_eq!(late_fired.get(), 0, "not yet registered when emit started");

        bus.emit(&write_to("x"));
        assert_eq!(late_fired.get(), 1);
    }
}

#![forbid(unsafe_code)]

//! A shared, version-tracked value wrapper with change notification.
//!
//! [`Observable<T>`] uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are stored as `Weak` function pointers and cleaned
//! up lazily during notification; the strong half lives in the
//! [`Subscription`] handed back by [`Observable::subscribe`].
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version bump,
//!    no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. Callbacks registered during a notification cycle first fire on the
//!    next one.

use core::fmt;
use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<dyn Fn(&T)>>,
}

// ---------------------------------------------------------------------------
// Observable<T>
// ---------------------------------------------------------------------------

/// A shared mutable value that notifies subscribers when it changes.
///
/// Cloning an `Observable` shares the underlying state: all clones see the
/// same value, version, and subscriber list.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a new observable holding `value`, at version 0.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value, bumping the version and notifying subscribers.
    ///
    /// If `value` equals the current value nothing happens.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Mutate the value in place. Notifies only if the mutation actually
    /// changed it.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.value.clone();
            f(&mut inner.value);
            if inner.value == before {
                false
            } else {
                inner.version += 1;
                true
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Current version. Starts at 0 and increments once per value change.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Register `callback` to run after every value change.
    ///
    /// The callback receives the new value. It stays registered as long as
    /// the returned [`Subscription`] is alive.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&callback));
        Subscription::holding(callback)
    }

    /// Number of live subscribers. Dead entries are pruned as a side effect.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|weak| weak.strong_count() > 0);
        inner.subscribers.len()
    }

    fn notify(&self) {
        // Snapshot the live callbacks first so none of the borrows are held
        // while user code runs. A callback may freely get(), set(), or
        // subscribe() without tripping the RefCell.
        let callbacks: Vec<Callback<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|weak| weak.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        if callbacks.is_empty() {
            return;
        }
        let value = self.inner.borrow().value.clone();
        for callback in callbacks {
            callback(&value);
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription — RAII guard
// ---------------------------------------------------------------------------

/// RAII guard for a subscriber callback.
///
/// Holds the only strong reference to the callback; dropping the guard
/// releases it, and the source prunes the dead entry lazily.
pub struct Subscription {
    _keepalive: Box<dyn Any>,
}

impl Subscription {
    pub(crate) fn holding<T: 'static>(callback: Rc<dyn Fn(&T)>) -> Self {
        Self {
            _keepalive: Box::new(callback),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

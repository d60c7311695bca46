//! engine::bus
//!
//! Synchronous publish/subscribe channel for command results.
//!
//! # Architecture
//!
//! Commands report subprocess results by broadcasting an [`Event`] on the
//! [`Notifier`]. Observers (the terminal log pane, tests) are called
//! synchronously in registration order.
//!
//! # Invariants
//!
//! - Delivery is synchronous and ordered by subscription
//! - The observer list is snapshotted before delivery, so an observer may
//!   subscribe or broadcast reentrantly
//!
//! # Example
//!
//! ```
//! use stagehand::engine::bus::{Event, Notifier};
//!
//! let bus = Notifier::new();
//! let seen = bus.recorder();
//! bus.log(0, "Staging: a.txt");
//! assert_eq!(seen.borrow().len(), 1);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

/// Events delivered to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Result of a command, for the log pane.
    LogCmd {
        /// Exit status (0 for informational messages)
        status: i32,
        /// Human-readable text
        text: String,
    },

    /// Amend mode was entered or left.
    Amend {
        /// True when entering
        entering: bool,
    },
}

impl Event {
    /// Text of a `LogCmd` event.
    pub fn log_text(&self) -> Option<&str> {
        match self {
            Event::LogCmd { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// A subscribed callback.
pub type Observer = Rc<dyn Fn(&Event)>;

/// The notification bus.
#[derive(Default)]
pub struct Notifier {
    observers: RefCell<Vec<Observer>>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn subscribe(&self, observer: impl Fn(&Event) + 'static) {
        self.observers.borrow_mut().push(Rc::new(observer));
    }

    /// Deliver `event` to every observer.
    pub fn broadcast(&self, event: &Event) {
        let observers: Vec<Observer> = self.observers.borrow().clone();
        for observer in observers {
            observer(event);
        }
    }

    /// Broadcast a `LogCmd` event.
    pub fn log(&self, status: i32, text: impl Into<String>) {
        self.broadcast(&Event::LogCmd {
            status,
            text: text.into(),
        });
    }

    /// Subscribe an observer that records every event.
    pub fn recorder(&self) -> Rc<RefCell<Vec<Event>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        self.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observers_run_in_registration_order() {
        let bus = Notifier::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for id in 0..3 {
            let order = Rc::clone(&order);
            bus.subscribe(move |_| order.borrow_mut().push(id));
        }
        bus.broadcast(&Event::Amend { entering: true });
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn reentrant_broadcast_is_allowed() {
        let bus = Rc::new(Notifier::new());
        let seen = bus.recorder();
        let inner = Rc::clone(&bus);
        bus.subscribe(move |event| {
            if let Event::Amend { .. } = event {
                inner.log(0, "amend observed");
            }
        });

        bus.broadcast(&Event::Amend { entering: false });

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].log_text(), Some("amend observed"));
    }

    #[test]
    fn no_observers_is_fine() {
        Notifier::new().log(1, "nobody listens");
    }
}

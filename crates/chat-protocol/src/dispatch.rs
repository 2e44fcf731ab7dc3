//! Subscriber registration and synchronous event fan-out.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use crate::event::{ChatEvent, EventKind};

/// A caller-supplied handler bound to one event kind.
pub type Handler = Box<dyn Fn(&ChatEvent) + Send + Sync>;

/// An insertion-ordered, kind-keyed table of subscriber callbacks.
///
/// `emit` invokes every handler for a kind synchronously, in registration
/// order, on the caller's thread — there is no worker pool here. A handler
/// that panics is caught and logged as a `HandlerFault`; subsequent
/// handlers for the same event still run. Handlers must not block: the
/// dispatcher does not isolate slow handlers from one another.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<EventKind, Vec<Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the list for `kind`. There is no unsubscribe in
    /// the core; callers that need one wrap the dispatcher themselves.
    pub fn subscribe(&mut self, kind: EventKind, handler: impl Fn(&ChatEvent) + Send + Sync + 'static) {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    /// Invoke every handler registered for `event.kind()`, in registration
    /// order. Never propagates a handler panic.
    pub fn emit(&self, event: &ChatEvent) {
        let Some(handlers) = self.handlers.get(&event.kind()) else {
            return;
        };
        for handler in handlers {
            let result = panic::catch_unwind(AssertUnwindSafe(|| handler(event)));
            if let Err(payload) = result {
                let message = panic_message(&payload);
                tracing::error!(kind = ?event.kind(), %message, "subscriber handler panicked");
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    fn raw_event() -> ChatEvent {
        ChatEvent::raw(vec![1, 2, 3], Utc::now())
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();

        let o1 = order.clone();
        dispatcher.subscribe(EventKind::Raw, move |_| o1.lock().unwrap().push(1));
        let o2 = order.clone();
        dispatcher.subscribe(EventKind::Raw, move |_| o2.lock().unwrap().push(2));

        dispatcher.emit(&raw_event());
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn emit_with_no_subscribers_is_a_no_op() {
        let dispatcher = Dispatcher::new();
        dispatcher.emit(&raw_event());
    }

    #[test]
    fn panicking_handler_does_not_stop_later_handlers() {
        let ran = Arc::new(Mutex::new(false));
        let mut dispatcher = Dispatcher::new();

        dispatcher.subscribe(EventKind::Raw, |_| panic!("boom"));
        let ran2 = ran.clone();
        dispatcher.subscribe(EventKind::Raw, move |_| *ran2.lock().unwrap() = true);

        dispatcher.emit(&raw_event());
        assert!(*ran.lock().unwrap(), "second handler must still run");
    }

    #[test]
    fn only_handlers_for_the_matching_kind_run() {
        let count = Arc::new(Mutex::new(0));
        let mut dispatcher = Dispatcher::new();
        let c1 = count.clone();
        dispatcher.subscribe(EventKind::Chat, move |_| *c1.lock().unwrap() += 1);

        dispatcher.emit(&raw_event());
        assert_eq!(*count.lock().unwrap(), 0);
    }
}

// Typed notification bus for the hierarchy store.

use std::fmt;

use super::HierarchyNode;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Added,
    Cleared,
    Selected,
}

#[derive(Debug, Copy, Clone)]
pub enum HierarchyEvent<'a> {
    Added(&'a HierarchyNode),
    Cleared,
    Selected(&'a HierarchyNode),
}

impl HierarchyEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            HierarchyEvent::Added(_) => EventKind::Added,
            HierarchyEvent::Cleared => EventKind::Cleared,
            HierarchyEvent::Selected(_) => EventKind::Selected,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&HierarchyEvent<'_>)>;

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, EventKind, Listener)>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus").field("listeners", &self.listeners.len()).finish()
    }
}

impl EventBus {
    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&HierarchyEvent<'_>) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind, Box::new(listener)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Listeners run in subscription order.
    pub fn emit(&mut self, event: &HierarchyEvent<'_>) {
        let kind = event.kind();
        for (_, wanted, listener) in self.listeners.iter_mut() {
            if *wanted == kind {
                listener(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_only_matching_kind_is_delivered() {
        let mut bus = EventBus::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(EventKind::Cleared, move |e| sink.borrow_mut().push(e.kind()));

        bus.emit(&HierarchyEvent::Cleared);
        bus.emit(&HierarchyEvent::Cleared);
        assert_eq!(*seen.borrow(), vec![EventKind::Cleared, EventKind::Cleared]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut bus = EventBus::default();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = bus.subscribe(EventKind::Cleared, move |_| *sink.borrow_mut() += 1);

        bus.emit(&HierarchyEvent::Cleared);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&HierarchyEvent::Cleared);
        assert_eq!(*count.borrow(), 1);
    }
}

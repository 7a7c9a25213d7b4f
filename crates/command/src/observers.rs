//! Per-action change notifications.
//!
//! Each `Action` owns an `ActionObservers` channel and fires one event per
//! direction: `Redo` (carrying the data just applied) after perform and redo,
//! `Undo` (carrying the data just restored) after undo. Delivery is synchronous
//! and in subscription order.
//!
//! Channels can forward to a parent channel; the `CommandManager` uses this to
//! offer a single stream covering every action it creates.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::action::ActionId;
use crate::action_data::ActionData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionEventKind {
    Redo,
    Undo,
}

#[derive(Debug, Clone, Copy)]
pub struct ActionEvent<'a> {
    pub kind: ActionEventKind,
    pub data: &'a ActionData,
    pub action: ActionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type Handler = Rc<RefCell<dyn FnMut(&ActionEvent<'_>)>>;

#[derive(Default)]
pub struct ActionObservers {
    subscribers: RefCell<Vec<(SubscriptionId, Handler)>>,
    next_id: Cell<u64>,
    forward: Option<Rc<ActionObservers>>,
}

impl ActionObservers {
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel that re-delivers everything it receives to `parent`, after
    /// its own subscribers.
    pub fn forwarding_to(parent: Rc<ActionObservers>) -> Self {
        Self { forward: Some(parent), ..Self::default() }
    }

    pub fn subscribe(&self, handler: impl FnMut(&ActionEvent<'_>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let handler: Handler = Rc::new(RefCell::new(handler));
        self.subscribers.borrow_mut().push((id, handler));
        id
    }

    /// Returns false if `id` was not subscribed here.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    pub fn notify(&self, event: &ActionEvent<'_>) {
        // Snapshot so handlers may subscribe or unsubscribe while we deliver.
        let snapshot: Vec<Handler> = self.subscribers.borrow().iter().map(|(_, h)| Rc::clone(h)).collect();
        for handler in snapshot {
            // A handler that is already running further up the stack is skipped.
            if let Ok(mut handler) = handler.try_borrow_mut() {
                (*handler)(event);
            }
        }
        if let Some(parent) = &self.forward {
            parent.notify(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ActionObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionObservers")
            .field("subscribers", &self.len())
            .field("forwarding", &self.forward.is_some())
            .finish()
    }
}

/// Owned copy of an `ActionEvent`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub kind: ActionEventKind,
    pub data: ActionData,
    pub action: ActionId,
}

/// Simple event collector for testing and replay reports.
#[derive(Debug, Clone, Default)]
pub struct EventCollector {
    events: Rc<RefCell<Vec<RecordedEvent>>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that records into this collector.
    pub fn handler(&self) -> impl FnMut(&ActionEvent<'_>) + 'static {
        let events = Rc::clone(&self.events);
        move |event| {
            events.borrow_mut().push(RecordedEvent {
                kind: event.kind,
                data: event.data.clone(),
                action: event.action,
            })
        }
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Filter to only Redo events.
    pub fn redos(&self) -> Vec<RecordedEvent> {
        self.of_kind(ActionEventKind::Redo)
    }

    /// Filter to only Undo events.
    pub fn undos(&self) -> Vec<RecordedEvent> {
        self.of_kind(ActionEventKind::Undo)
    }

    fn of_kind(&self, kind: ActionEventKind) -> Vec<RecordedEvent> {
        self.events.borrow().iter().filter(|e| e.kind == kind).cloned().collect()
    }
}

//! Pointer events and listener registration for the rendering surface

use crate::renderer::ElementId;
use std::collections::HashMap;

/// Pointer event types the tagging surface listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    MouseOver,
    MouseOut,
}

/// Keyboard modifier keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

/// A pointer event aimed at one element of the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerEvent {
    pub event_type: EventType,
    pub target: ElementId,
    /// Click count: 1 for a single click, 2 for the second click of a double-click
    pub detail: u32,
    pub modifiers: Modifiers,
    pub default_prevented: bool,
}

impl PointerEvent {
    /// Create a new event
    pub fn new(event_type: EventType, target: ElementId) -> Self {
        Self {
            event_type,
            target,
            detail: 0,
            modifiers: Modifiers::default(),
            default_prevented: false,
        }
    }

    /// Create a single click event
    pub fn click(target: ElementId) -> Self {
        Self {
            detail: 1,
            ..Self::new(EventType::Click, target)
        }
    }

    /// Create the second click of a double-click
    pub fn double_click(target: ElementId) -> Self {
        Self {
            detail: 2,
            ..Self::new(EventType::Click, target)
        }
    }

    /// Create a click with modifier keys held
    pub fn click_with(target: ElementId, modifiers: Modifiers) -> Self {
        Self {
            modifiers,
            ..Self::click(target)
        }
    }

    /// Pointer entered `target`
    pub fn enter(target: ElementId) -> Self {
        Self::new(EventType::MouseOver, target)
    }

    /// Pointer left `target`
    pub fn leave(target: ElementId) -> Self {
        Self::new(EventType::MouseOut, target)
    }

    /// Double-click or modifier-click: asks for a refined selector
    pub fn wants_refinement(&self) -> bool {
        self.detail == 2 || self.modifiers.ctrl || self.modifiers.meta
    }

    /// Prevent default action (link navigation inside the surface)
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Handle returned by [`EventDispatcher::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registry of listeners per event type
///
/// `H` is whatever the owner needs to route an event; dispatch order is
/// registration order.
#[derive(Debug)]
pub struct EventDispatcher<H> {
    listeners: HashMap<EventType, Vec<(ListenerId, H)>>,
    next_id: u64,
}

impl<H> EventDispatcher<H> {
    /// Create a new event dispatcher
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 0,
        }
    }

    /// Register a listener
    pub fn subscribe(&mut self, event_type: EventType, handler: H) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(event_type).or_default().push((id, handler));
        id
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        for listeners in self.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|(listener, _)| *listener != id);
            removed |= listeners.len() != before;
        }
        removed
    }

    /// Listeners for an event type, in registration order
    pub fn listeners(&self, event_type: EventType) -> impl Iterator<Item = &H> {
        self.listeners
            .get(&event_type)
            .into_iter()
            .flat_map(|listeners| listeners.iter().map(|(_, handler)| handler))
    }

    /// Get listener count for an event type
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.listeners.get(&event_type).map(|l| l.len()).unwrap_or(0)
    }
}

impl<H> Default for EventDispatcher<H> {
    fn default() -> Self {
        Self::new()
    }
}

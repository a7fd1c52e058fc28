//! Pointer interaction with the rendering surface

mod controller;
pub mod events;

pub use controller::{ControllerState, EventOutcome, InteractionContext, InteractionController};
pub use events::{EventDispatcher, EventType, ListenerId, Modifiers, PointerEvent};

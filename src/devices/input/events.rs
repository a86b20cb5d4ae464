//! # Input Event Types
//!
//! Defines the input events the frame scheduler hands to its consumer.
//!
//! ## Event Types
//!
//! - `InputEvent::Key(char)`: a decoded key press
//! - `InputEvent::Pointer(PointerState)`: the pointer moved or a button changed since the
//!   last poll
//!
//! ## InputEventHandler Trait
//!
//! Consumers implement this trait to receive input events:
//!
//! ```ignore
//! impl InputEventHandler for Desktop {
//!     fn handle_key(&mut self, ch: char) {
//!         // Handle key press
//!     }
//!     fn handle_pointer(&mut self, state: PointerState) {
//!         // Move the cursor
//!     }
//! }
//! ```
//!
//! Events can be dispatched via `InputEvent::dispatch()`.

use crate::devices::drivers::PointerState;

/// Unified input event type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(char),
    Pointer(PointerState),
}

/// Input event handler trait
pub trait InputEventHandler {
    fn handle_key(&mut self, ch: char);
    fn handle_pointer(&mut self, state: PointerState);
}

impl InputEvent {
    pub fn dispatch<E: InputEventHandler>(self, handler: &mut E) {
        match self {
            InputEvent::Key(ch) => handler.handle_key(ch),
            InputEvent::Pointer(state) => handler.handle_pointer(state),
        }
    }
}

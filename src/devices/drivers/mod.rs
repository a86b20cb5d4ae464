//! Device Drivers
//!
//! This module contains drivers for the legacy 8042 controller:
//! - `ps2_controller`: port access and bounded handshakes
//! - PS/2 Keyboard (IRQ1): scancode queue and character decoding
//! - PS/2 Mouse (IRQ12): packet assembly and pointer state

pub mod ps2_controller;
pub mod ps2_keyboard;
pub mod ps2_mouse;

pub use ps2_controller::{PollBudget, Ps2Io};
pub use ps2_keyboard::{KeyboardDecoder, ScancodeQueue, SCANCODES};
pub use ps2_mouse::{Bounds, Mouse, PointerState, MOUSE};

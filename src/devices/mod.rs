//! Device Subsystem
//!
//! Hardware device drivers and abstractions:
//! - `drivers`: PS/2 controller, keyboard queue and mouse driver
//! - `framebuffer`: display negotiation and drawing backends
//! - `input`: input events handed to the frame consumer

pub mod drivers;
pub mod framebuffer;
pub mod input;

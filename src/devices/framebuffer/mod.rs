//! # Framebuffer Graphics Module
//!
//! Display backend selection and drawing.
//!
//! ## Modules
//!
//! - `descriptor`: the bootloader's framebuffer record and its validation
//! - `backend`: `DisplayBackend` trait and capability flags
//! - `linear`: 32 bpp linear framebuffer backend with an optional back buffer
//! - `display`: `Display`, the negotiated front end (also an embedded-graphics `DrawTarget`)
//! - `color`: `Color` type with common color constants
//!
//! ## Negotiation
//!
//! Exactly one backend is chosen at boot. The linear backend only accepts a present,
//! RGB, 32 bits per pixel framebuffer; anything else leaves the display inactive and
//! every drawing call becomes a no-op.

pub mod backend;
pub mod color;
pub mod descriptor;
pub mod display;
pub mod linear;

pub use backend::{Capabilities, DisplayBackend};
pub use color::Color;
pub use descriptor::{FramebufferDescriptor, FramebufferLayout, Unsupported};
pub use display::Display;
pub use linear::LinearFramebuffer;

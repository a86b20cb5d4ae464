//! # Cinser I/O and timing core
//!
//! Interrupt-driven pieces shared between the kernel binary and host-side unit tests:
//!
//! - `core::interrupts`: IRQ controller seam, interrupt-masking guard, tick service
//! - `core::scheduler`: cooperative frame loop
//! - `devices::drivers`: PS/2 controller access and the pointing-device driver
//! - `devices::framebuffer`: display negotiation, backends and software fallback
//! - `devices::input`: input events handed to the frame consumer
//! - `ui`: the desktop drawn by the frame loop
//!
//! Everything that touches ports or privileged instructions sits behind a trait so the
//! state machines can be exercised off-target.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod core;
pub mod devices;
pub mod ui;

pub use config::KernelConfig;

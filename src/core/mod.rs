//! # Core Kernel Module
//!
//! Interrupt-side primitives and the cooperative main loop.
//!
//! ## Submodules
//!
//! - `interrupts`: IRQ controller seam, interrupt-masking guard, halt primitive, tick service
//! - `scheduler`: the frame scheduler that drains input, throttles, renders and presents

pub mod interrupts;
pub mod scheduler;

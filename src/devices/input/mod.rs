//! # Input Device Module
//!
//! Provides unified input event handling for keyboard and mouse.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐
//! │ Scancode     │    │    Mouse     │
//! │ queue        │    │   poll()     │
//! └──────┬───────┘    └──────┬───────┘
//!        │                   │
//!        ▼                   ▼
//! ┌──────────────────────────────────┐
//! │          InputEvent              │
//! │    (Key(char) | Pointer)         │
//! └──────────────┬───────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────────┐
//! │       InputEventHandler          │
//! │   (implemented by the consumer)  │
//! └──────────────────────────────────┘
//! ```

/// Unified input event system
pub mod events;

pub use events::*;

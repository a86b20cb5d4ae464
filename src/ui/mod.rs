//! # User Interface Module
//!
//! The desktop the frame scheduler renders.
//!
//! ## Modules
//!
//! - `desktop`: `Desktop`, the frame consumer (text line, pointer status, cursor)
//! - `cursor`: arrow sprite
//! - `text`: fixed-capacity text line usable with `write!`
//! - `theme`: desktop colors
//!
//! Everything draws through `Display`, either directly or as an `embedded_graphics`
//! `DrawTarget`, so an inactive display costs nothing.

pub mod cursor;
pub mod desktop;
pub mod text;
pub mod theme;

pub use desktop::Desktop;
pub use theme::Theme;

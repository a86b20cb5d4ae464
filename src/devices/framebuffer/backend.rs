//! The interface every video backend implements.

use bitflags::bitflags;

use super::color::Color;

bitflags! {
    /// Optional operations a backend advertises. `put_pixel` is always available.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        /// Native rectangle fill.
        const FILL_RECT = 1 << 0;
        /// Drawing goes to a back buffer that `present` publishes.
        const PRESENT = 1 << 1;
    }
}

/// A drawing surface selected at boot.
///
/// `fill_rect` and `present` are only called when the matching capability is advertised.
/// Coordinates outside the surface are the backend's to discard.
pub trait DisplayBackend {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: Color);

    /// `width` and `height` are positive.
    fn fill_rect(&mut self, _x: i32, _y: i32, _width: i32, _height: i32, _color: Color) {}

    fn present(&mut self) {}
}

//! The display the rest of the kernel draws through.
//!
//! Holds at most one backend, chosen once at boot. When negotiation failed every drawing
//! call is a silent no-op, so consumers never check whether a screen exists.

use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::Rgb888,
    primitives::Rectangle,
    Pixel,
};

use super::backend::{Capabilities, DisplayBackend};
use super::color::Color;
use super::descriptor::{FramebufferDescriptor, FramebufferLayout};
use super::linear::LinearFramebuffer;

pub struct Display<B: DisplayBackend> {
    backend: Option<B>,
}

impl<B: DisplayBackend> Display<B> {
    pub const fn inactive() -> Self {
        Self { backend: None }
    }

    pub fn with_backend(backend: B) -> Self {
        Self { backend: Some(backend) }
    }

    /// Validates `desc` and, if it is usable, builds the backend from the checked layout.
    /// A rejected descriptor leaves the display inactive.
    pub fn negotiate_with<F>(desc: &FramebufferDescriptor, activate: F) -> Self
    where
        F: FnOnce(FramebufferLayout) -> B,
    {
        match desc.validate() {
            Ok(layout) => {
                log::info!(
                    "display: {}x{} pitch {} at {:#x}",
                    layout.width,
                    layout.height,
                    layout.pitch,
                    layout.address
                );
                Self::with_backend(activate(layout))
            }
            Err(reason) => {
                log::warn!("display: no backend ({})", reason);
                Self::inactive()
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.backend
            .as_ref()
            .map_or(Capabilities::empty(), |b| b.capabilities())
    }

    /// `(0, 0)` when inactive.
    pub fn dimensions(&self) -> (usize, usize) {
        self.backend
            .as_ref()
            .map_or((0, 0), |b| (b.width(), b.height()))
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(backend) = self.backend.as_mut() {
            backend.put_pixel(x, y, color);
        }
    }

    /// Uses the backend's native fill when it has one, otherwise plots row by row.
    /// An empty or negative size draws nothing.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        if width <= 0 || height <= 0 {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        if backend.capabilities().contains(Capabilities::FILL_RECT) {
            backend.fill_rect(x, y, width, height, color);
            return;
        }

        for row in 0..height {
            for col in 0..width {
                backend.put_pixel(x.saturating_add(col), y.saturating_add(row), color);
            }
        }
    }

    pub fn clear(&mut self, color: Color) {
        let (w, h) = self.dimensions();
        self.fill_rect(0, 0, w as i32, h as i32, color);
    }

    /// Publishes the back buffer. Nothing to do for backends that draw direct.
    pub fn present(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            if backend.capabilities().contains(Capabilities::PRESENT) {
                backend.present();
            }
        }
    }
}

impl<'a> Display<LinearFramebuffer<'a>> {
    /// Picks the linear framebuffer backend if the boot descriptor allows it.
    ///
    /// # Safety
    /// If `desc` validates, its address must point at `pitch * height` bytes of writable
    /// video memory that nothing else references for `'a`.
    pub unsafe fn negotiate(desc: &FramebufferDescriptor, back: Option<&'a mut [u32]>) -> Self {
        Self::negotiate_with(desc, |layout| LinearFramebuffer::from_layout(layout, back))
    }
}

impl<B: DisplayBackend> DrawTarget for Display<B> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.put_pixel(point.x, point.y, color.into());
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(
            area.top_left.x,
            area.top_left.y,
            area.size.width.min(i32::MAX as u32) as i32,
            area.size.height.min(i32::MAX as u32) as i32,
            color.into(),
        );
        Ok(())
    }
}

impl<B: DisplayBackend> OriginDimensions for Display<B> {
    fn size(&self) -> Size {
        let (w, h) = self.dimensions();
        Size::new(w as u32, h as u32)
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Op {
        Pixel(i32, i32, Color),
        Fill(i32, i32, i32, i32, Color),
        Present,
    }

    /// Backend that remembers every call it receives.
    pub struct RecordingBackend {
        pub caps: Capabilities,
        pub ops: Vec<Op>,
        pub width: usize,
        pub height: usize,
    }

    impl RecordingBackend {
        pub fn new(caps: Capabilities) -> Self {
            Self { caps, ops: Vec::new(), width: 64, height: 48 }
        }

        pub fn presents(&self) -> usize {
            self.ops.iter().filter(|op| matches!(op, Op::Present)).count()
        }
    }

    impl DisplayBackend for RecordingBackend {
        fn width(&self) -> usize {
            self.width
        }

        fn height(&self) -> usize {
            self.height
        }

        fn capabilities(&self) -> Capabilities {
            self.caps
        }

        fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
            self.ops.push(Op::Pixel(x, y, color));
        }

        fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
            self.ops.push(Op::Fill(x, y, w, h, color));
        }

        fn present(&mut self) {
            self.ops.push(Op::Present);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::recording::{Op, RecordingBackend};
    use super::*;
    use crate::devices::framebuffer::descriptor::rgb32;
    use embedded_graphics::{
        prelude::*,
        primitives::{PrimitiveStyle, Rectangle as EgRect},
    };

    #[test]
    fn test_inactive_display_ignores_everything() {
        let mut display: Display<RecordingBackend> = Display::inactive();
        display.put_pixel(1, 1, Color::WHITE);
        display.fill_rect(0, 0, 10, 10, Color::WHITE);
        display.present();
        assert!(!display.is_active());
        assert_eq!(display.dimensions(), (0, 0));
    }

    #[test]
    fn test_negotiation_activates_on_conforming_descriptor() {
        let display = Display::negotiate_with(&rgb32(64, 48), |_| {
            RecordingBackend::new(Capabilities::empty())
        });
        assert!(display.is_active());
    }

    #[test]
    fn test_negotiation_rejects_without_building() {
        let mut desc = rgb32(64, 48);
        desc.bpp = 16;
        let mut built = false;
        let display: Display<RecordingBackend> = Display::negotiate_with(&desc, |_| {
            built = true;
            RecordingBackend::new(Capabilities::empty())
        });
        assert!(!display.is_active());
        assert!(!built);
    }

    #[test]
    fn test_fill_rect_falls_back_to_pixels() {
        let mut display = Display::with_backend(RecordingBackend::new(Capabilities::empty()));
        display.fill_rect(2, 3, 2, 2, Color::RED);

        let ops = &display.backend().unwrap().ops;
        assert_eq!(
            ops.as_slice(),
            &[
                Op::Pixel(2, 3, Color::RED),
                Op::Pixel(3, 3, Color::RED),
                Op::Pixel(2, 4, Color::RED),
                Op::Pixel(3, 4, Color::RED),
            ]
        );
    }

    #[test]
    fn test_fill_rect_uses_native_fill() {
        let mut display = Display::with_backend(RecordingBackend::new(Capabilities::FILL_RECT));
        display.fill_rect(2, 3, 20, 10, Color::RED);
        assert_eq!(
            display.backend().unwrap().ops.as_slice(),
            &[Op::Fill(2, 3, 20, 10, Color::RED)]
        );
    }

    #[test]
    fn test_empty_fill_draws_nothing() {
        for caps in [Capabilities::empty(), Capabilities::FILL_RECT] {
            let mut display = Display::with_backend(RecordingBackend::new(caps));
            display.fill_rect(0, 0, 0, 5, Color::RED);
            display.fill_rect(0, 0, 5, -1, Color::RED);
            assert!(display.backend().unwrap().ops.is_empty());
        }
    }

    #[test]
    fn test_present_only_when_advertised() {
        let mut display = Display::with_backend(RecordingBackend::new(Capabilities::FILL_RECT));
        display.present();
        assert_eq!(display.backend().unwrap().presents(), 0);

        let mut display = Display::with_backend(RecordingBackend::new(Capabilities::PRESENT));
        display.present();
        assert_eq!(display.backend().unwrap().presents(), 1);
    }

    #[test]
    fn test_embedded_graphics_fill_goes_through_fill_rect() {
        let mut display = Display::with_backend(RecordingBackend::new(Capabilities::FILL_RECT));
        EgRect::new(Point::new(1, 2), Size::new(3, 4))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::new(0, 0, 255)))
            .draw(&mut display)
            .unwrap();

        assert_eq!(
            display.backend().unwrap().ops.as_slice(),
            &[Op::Fill(1, 2, 3, 4, Color::BLUE)]
        );
    }
}

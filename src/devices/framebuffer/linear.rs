//! Linear 32 bpp framebuffer backend.
//!
//! Without a back buffer every write lands in video memory directly. With one, drawing
//! goes to the back buffer and `present` copies it to the screen a scanline at a time.

use super::backend::{Capabilities, DisplayBackend};
use super::color::Color;
use super::descriptor::{ChannelOrder, FramebufferLayout};

const BYTES_PER_PIXEL: usize = 4;

pub struct LinearFramebuffer<'a> {
    front: &'a mut [u8],
    /// Tightly packed, `width` pixels per row, already in video memory byte order.
    back: Option<&'a mut [u32]>,
    width: usize,
    height: usize,
    pitch: usize,
    order: ChannelOrder,
}

impl<'a> LinearFramebuffer<'a> {
    /// Wraps already mapped video memory. `front` must hold `layout.byte_len()` bytes.
    /// A back buffer smaller than one full frame is ignored.
    pub fn new(layout: FramebufferLayout, front: &'a mut [u8], back: Option<&'a mut [u32]>) -> Self {
        let pixels = layout.width * layout.height;
        let back = match back {
            Some(buf) if buf.len() >= pixels => Some(buf),
            Some(buf) => {
                log::warn!(
                    "back buffer holds {} pixels, frame needs {}; drawing direct",
                    buf.len(),
                    pixels
                );
                None
            }
            None => None,
        };

        // Never index past the memory we were handed, whatever the layout claims.
        let height = layout.height.min(front.len() / layout.pitch.max(1));

        Self {
            front,
            back,
            width: layout.width,
            height,
            pitch: layout.pitch,
            order: layout.channel_order,
        }
    }

    /// Maps the layout's address as the front buffer.
    ///
    /// # Safety
    /// `layout.address` must be the start of `layout.byte_len()` bytes of writable
    /// video memory that nothing else references for `'a`.
    pub unsafe fn from_layout(layout: FramebufferLayout, back: Option<&'a mut [u32]>) -> Self {
        let front = core::slice::from_raw_parts_mut(layout.address as *mut u8, layout.byte_len());
        Self::new(layout, front, back)
    }

    pub fn has_back_buffer(&self) -> bool {
        self.back.is_some()
    }

    fn encode(&self, color: Color) -> u32 {
        let (r, g, b) = (color.r as u32, color.g as u32, color.b as u32);
        match self.order {
            ChannelOrder::Bgr => (r << 16) | (g << 8) | b,
            ChannelOrder::Rgb => (b << 16) | (g << 8) | r,
        }
    }

    /// Clips a rectangle to the surface; `None` when nothing is left.
    fn clip(&self, x: i32, y: i32, w: i32, h: i32) -> Option<(usize, usize, usize, usize)> {
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + w as i64).min(self.width as i64);
        let y1 = (y as i64 + h as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }

    fn write_front(front: &mut [u8], offset: usize, value: u32) {
        if let Some(px) = front.get_mut(offset..offset + BYTES_PER_PIXEL) {
            px.copy_from_slice(&value.to_le_bytes());
        }
    }
}

impl DisplayBackend for LinearFramebuffer<'_> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn capabilities(&self) -> Capabilities {
        if self.back.is_some() {
            Capabilities::FILL_RECT | Capabilities::PRESENT
        } else {
            Capabilities::FILL_RECT
        }
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let value = self.encode(color);

        match self.back.as_deref_mut() {
            Some(back) => back[y * self.width + x] = value,
            None => Self::write_front(self.front, y * self.pitch + x * BYTES_PER_PIXEL, value),
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        let value = self.encode(color);
        let row_bytes = value.to_le_bytes();

        for row in y0..y1 {
            match self.back.as_deref_mut() {
                Some(back) => {
                    let start = row * self.width;
                    back[start + x0..start + x1].fill(value);
                }
                None => {
                    let start = row * self.pitch;
                    let span = &mut self.front
                        [start + x0 * BYTES_PER_PIXEL..start + x1 * BYTES_PER_PIXEL];
                    for px in span.chunks_exact_mut(BYTES_PER_PIXEL) {
                        px.copy_from_slice(&row_bytes);
                    }
                }
            }
        }
    }

    fn present(&mut self) {
        let Some(back) = self.back.as_deref() else {
            return;
        };
        let row_len = self.width * BYTES_PER_PIXEL;

        for (row, pixels) in back.chunks_exact(self.width).take(self.height).enumerate() {
            let dst = &mut self.front[row * self.pitch..row * self.pitch + row_len];
            for (px, value) in dst.chunks_exact_mut(BYTES_PER_PIXEL).zip(pixels) {
                px.copy_from_slice(&value.to_le_bytes());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::framebuffer::descriptor::rgb32;

    fn pixel(front: &[u8], pitch: usize, x: usize, y: usize) -> [u8; 4] {
        let off = y * pitch + x * 4;
        [front[off], front[off + 1], front[off + 2], front[off + 3]]
    }

    #[test]
    fn test_direct_put_pixel_bgr() {
        let layout = rgb32(4, 3).validate().unwrap();
        let mut front = vec![0u8; layout.byte_len()];
        let mut fb = LinearFramebuffer::new(layout, &mut front, None);

        assert_eq!(fb.capabilities(), Capabilities::FILL_RECT);
        fb.put_pixel(1, 2, Color::new(0x11, 0x22, 0x33));
        fb.put_pixel(-1, 0, Color::WHITE);
        fb.put_pixel(4, 0, Color::WHITE);
        drop(fb);

        assert_eq!(pixel(&front, 16, 1, 2), [0x33, 0x22, 0x11, 0]);
        assert_eq!(front.iter().filter(|&&b| b != 0).count(), 3);
    }

    #[test]
    fn test_rgb_order() {
        let mut desc = rgb32(2, 2);
        desc.channel_order = ChannelOrder::Rgb;
        let layout = desc.validate().unwrap();
        let mut front = vec![0u8; layout.byte_len()];
        let mut fb = LinearFramebuffer::new(layout, &mut front, None);
        fb.put_pixel(0, 0, Color::new(0x11, 0x22, 0x33));
        drop(fb);

        assert_eq!(pixel(&front, 8, 0, 0), [0x11, 0x22, 0x33, 0]);
    }

    #[test]
    fn test_fill_rect_clips() {
        let layout = rgb32(4, 4).validate().unwrap();
        let mut front = vec![0u8; layout.byte_len()];
        let mut fb = LinearFramebuffer::new(layout, &mut front, None);
        fb.fill_rect(2, 2, 10, 10, Color::WHITE);
        drop(fb);

        let lit = (0..4)
            .flat_map(|y| (0..4).map(move |x| (x, y)))
            .filter(|&(x, y)| pixel(&front, 16, x, y) == [0xFF, 0xFF, 0xFF, 0])
            .count();
        assert_eq!(lit, 4);
    }

    #[test]
    fn test_back_buffer_holds_until_present() {
        let mut desc = rgb32(3, 2);
        desc.pitch = 16; // padded scanlines
        let layout = desc.validate().unwrap();
        let mut front = vec![0u8; layout.byte_len()];
        let mut back = vec![0u32; 6];
        let mut fb = LinearFramebuffer::new(layout, &mut front, Some(back.as_mut_slice()));

        assert!(fb.capabilities().contains(Capabilities::PRESENT));
        fb.fill_rect(0, 0, 3, 2, Color::BLUE);
        fb.put_pixel(2, 1, Color::RED);

        fb.present();
        drop(fb);

        assert_eq!(pixel(&front, 16, 0, 0), [0xFF, 0, 0, 0]);
        assert_eq!(pixel(&front, 16, 2, 1), [0, 0, 0xFF, 0]);
        // padding past the visible row is left alone
        assert_eq!(&front[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_small_back_buffer_is_ignored() {
        let layout = rgb32(4, 4).validate().unwrap();
        let mut front = vec![0u8; layout.byte_len()];
        let mut back = vec![0u32; 3];
        let fb = LinearFramebuffer::new(layout, &mut front, Some(back.as_mut_slice()));
        assert!(!fb.has_back_buffer());
        assert!(!fb.capabilities().contains(Capabilities::PRESENT));
    }
}

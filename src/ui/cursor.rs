//! # Mouse Cursor
//!
//! Arrow sprite drawn at the pointer position. The hot spot is the top-left pixel.

use crate::devices::framebuffer::{Color, Display, DisplayBackend};

pub const CURSOR_WIDTH: usize = 12;
pub const CURSOR_HEIGHT: usize = 19;

/// 0 = transparent, 1 = outline, 2 = fill
#[rustfmt::skip]
const CURSOR_BITMAP: [[u8; CURSOR_WIDTH]; CURSOR_HEIGHT] = [
    [1,0,0,0,0,0,0,0,0,0,0,0],
    [1,1,0,0,0,0,0,0,0,0,0,0],
    [1,2,1,0,0,0,0,0,0,0,0,0],
    [1,2,2,1,0,0,0,0,0,0,0,0],
    [1,2,2,2,1,0,0,0,0,0,0,0],
    [1,2,2,2,2,1,0,0,0,0,0,0],
    [1,2,2,2,2,2,1,0,0,0,0,0],
    [1,2,2,2,2,2,2,1,0,0,0,0],
    [1,2,2,2,2,2,2,2,1,0,0,0],
    [1,2,2,2,2,2,2,2,2,1,0,0],
    [1,2,2,2,2,2,2,2,2,2,1,0],
    [1,2,2,2,2,2,2,1,1,1,1,1],
    [1,2,2,2,1,2,2,1,0,0,0,0],
    [1,2,2,1,0,1,2,2,1,0,0,0],
    [1,2,1,0,0,1,2,2,1,0,0,0],
    [1,1,0,0,0,0,1,2,2,1,0,0],
    [1,0,0,0,0,0,1,2,2,1,0,0],
    [0,0,0,0,0,0,0,1,2,2,1,0],
    [0,0,0,0,0,0,0,1,1,1,1,0],
];

/// Plots the arrow with its tip at `(x, y)`. Pixels off screen are dropped by the display.
pub fn draw<B: DisplayBackend>(display: &mut Display<B>, x: i32, y: i32, outline: Color, fill: Color) {
    for (row, bitmap_row) in CURSOR_BITMAP.iter().enumerate() {
        for (col, &pixel) in bitmap_row.iter().enumerate() {
            let color = match pixel {
                1 => outline,
                2 => fill,
                _ => continue,
            };
            display.put_pixel(x + col as i32, y + row as i32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::framebuffer::display::recording::{Op, RecordingBackend};
    use crate::devices::framebuffer::Capabilities;

    #[test]
    fn test_tip_is_hot_spot() {
        let mut display = Display::with_backend(RecordingBackend::new(Capabilities::empty()));
        draw(&mut display, 10, 20, Color::BLACK, Color::WHITE);

        let ops = &display.backend().unwrap().ops;
        assert_eq!(ops[0], Op::Pixel(10, 20, Color::BLACK));
        assert!(ops.contains(&Op::Pixel(11, 22, Color::WHITE)));
        assert!(!ops.iter().any(|op| matches!(op, Op::Pixel(x, y, _) if *x < 10 || *y < 20)));
    }
}

use crate::devices::framebuffer::color::Color;

/// Desktop colors
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub accent: Color,
    pub cursor_outline: Color,
    pub cursor_fill: Color,
}

impl Theme {
    pub const fn dark() -> Self {
        Self {
            background: Color::from_hex(0x121212),
            surface: Color::from_hex(0x1E1E1E),
            text: Color::from_hex(0xFFFFFF),
            text_secondary: Color::from_hex(0xB0B0B0),
            accent: Color::from_hex(0x2196F3),
            cursor_outline: Color::BLACK,
            cursor_fill: Color::WHITE,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

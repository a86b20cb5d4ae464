//! The frame consumer the kernel boots into: a title bar, a line of typed text, a status
//! line with the pointer state and the mouse cursor.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::{ascii::FONT_8X13, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    text::Text,
};

use super::cursor;
use super::text::TextLine;
use super::theme::Theme;
use crate::core::scheduler::FrameConsumer;
use crate::devices::drivers::PointerState;
use crate::devices::framebuffer::{Display, DisplayBackend};
use crate::devices::input::InputEventHandler;

const LINE_CAPACITY: usize = 96;
const TITLE_HEIGHT: i32 = 24;
const MARGIN: i32 = 8;
const LINE_HEIGHT: i32 = 16;

const BACKSPACE: char = '\x08';

pub struct Desktop {
    theme: Theme,
    line: TextLine<LINE_CAPACITY>,
    pointer: PointerState,
}

impl Desktop {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            line: TextLine::new(),
            pointer: PointerState::default(),
        }
    }

    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    fn text<B: DisplayBackend>(
        display: &mut Display<B>,
        s: &str,
        x: i32,
        y: i32,
        style: MonoTextStyle<'_, Rgb888>,
    ) {
        Text::new(s, Point::new(x, y), style).draw(display).ok();
    }
}

impl InputEventHandler for Desktop {
    fn handle_key(&mut self, ch: char) {
        match ch {
            '\n' => self.line.clear(),
            BACKSPACE => {
                self.line.pop();
            }
            ch => {
                self.line.push(ch);
            }
        }
    }

    fn handle_pointer(&mut self, state: PointerState) {
        self.pointer = state;
    }
}

impl FrameConsumer for Desktop {
    fn draw<B: DisplayBackend>(&mut self, display: &mut Display<B>) {
        let (width, height) = display.dimensions();
        let (width, height) = (width as i32, height as i32);
        let text = MonoTextStyle::new(&FONT_8X13, self.theme.text.to_rgb888());
        let dim = MonoTextStyle::new(&FONT_8X13, self.theme.text_secondary.to_rgb888());

        display.clear(self.theme.background);

        display.fill_rect(0, 0, width, TITLE_HEIGHT, self.theme.surface);
        display.fill_rect(0, TITLE_HEIGHT - 2, width, 2, self.theme.accent);
        Self::text(display, "cinser", MARGIN, 16, text);

        let prompt_y = TITLE_HEIGHT + MARGIN + LINE_HEIGHT;
        Self::text(display, ">", MARGIN, prompt_y, dim);
        Self::text(display, self.line.as_str(), MARGIN + 16, prompt_y, text);

        let mut status = TextLine::<64>::new();
        let p = self.pointer;
        write!(status, "pointer {},{}  buttons {:03b}", p.x, p.y, p.buttons).ok();
        Self::text(display, status.as_str(), MARGIN, height - MARGIN, dim);

        cursor::draw(display, p.x, p.y, self.theme.cursor_outline, self.theme.cursor_fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::framebuffer::display::recording::{Op, RecordingBackend};
    use crate::devices::framebuffer::{Capabilities, Color};

    #[test]
    fn test_line_editing() {
        let mut desktop = Desktop::new(Theme::dark());
        for ch in "hi!".chars() {
            desktop.handle_key(ch);
        }
        desktop.handle_key(BACKSPACE);
        assert_eq!(desktop.line(), "hi");

        desktop.handle_key('\t');
        assert_eq!(desktop.line(), "hi");

        desktop.handle_key('\n');
        assert_eq!(desktop.line(), "");
    }

    #[test]
    fn test_pointer_is_remembered() {
        let mut desktop = Desktop::new(Theme::dark());
        let state = PointerState { x: 7, y: 9, dx: 1, dy: 1, buttons: 0 };
        desktop.handle_pointer(state);
        assert_eq!(desktop.pointer(), state);
    }

    #[test]
    fn test_frame_starts_with_background_and_ends_with_cursor() {
        let theme = Theme::dark();
        let mut desktop = Desktop::new(theme);
        desktop.handle_pointer(PointerState { x: 5, y: 6, ..Default::default() });

        let mut display = Display::with_backend(RecordingBackend::new(Capabilities::FILL_RECT));
        desktop.draw(&mut display);

        let ops = &display.backend().unwrap().ops;
        assert_eq!(ops[0], Op::Fill(0, 0, 64, 48, theme.background));
        // last row of the arrow, last outline pixel
        assert_eq!(*ops.last().unwrap(), Op::Pixel(5 + 10, 6 + 18, Color::BLACK));
    }

    #[test]
    fn test_draw_on_inactive_display_is_harmless() {
        let mut desktop = Desktop::new(Theme::dark());
        let mut display: Display<RecordingBackend> = Display::inactive();
        desktop.draw(&mut display);
    }
}

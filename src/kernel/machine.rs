//! The real hardware behind the frame scheduler.

use x86_64::instructions::port::PortReadOnly;

use cinser::core::interrupts::{timer::TICKS, Halt, Hlt};
use cinser::core::scheduler::Machine;
use cinser::devices::drivers::{KeyboardDecoder, PointerState, MOUSE, SCANCODES};

/// VGA input status register 1.
const INPUT_STATUS_1: u16 = 0x3DA;
const VERTICAL_RETRACE: u8 = 1 << 3;

pub struct KernelMachine {
    cpu: Hlt,
    keyboard: KeyboardDecoder,
    input_status: PortReadOnly<u8>,
}

impl KernelMachine {
    pub fn new() -> Self {
        Self {
            cpu: Hlt,
            keyboard: KeyboardDecoder::new(),
            input_status: PortReadOnly::new(INPUT_STATUS_1),
        }
    }
}

impl Halt for KernelMachine {
    fn halt(&mut self) {
        self.cpu.halt();
    }
}

impl Machine for KernelMachine {
    fn next_char(&mut self) -> Option<char> {
        self.keyboard.next_char(&SCANCODES)
    }

    fn poll_pointer(&mut self) -> Option<PointerState> {
        let (state, dirty) = MOUSE.poll();
        dirty.then_some(state)
    }

    fn in_vertical_retrace(&mut self) -> bool {
        unsafe { self.input_status.read() & VERTICAL_RETRACE != 0 }
    }

    fn elapsed_ticks(&self) -> u32 {
        TICKS.elapsed_ticks()
    }
}

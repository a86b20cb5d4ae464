//! # Interrupt Handling Module
//!
//! The pieces of interrupt handling that the drivers depend on. Vector dispatch, the IDT and
//! the 8259 programming live in the kernel binary; drivers only see the [`IrqController`]
//! seam and the [`Halt`] primitive.
//!
//! ## IRQ Lines
//!
//! | IRQ | Device                         |
//! |-----|--------------------------------|
//! | 0   | Timer (PIT, drives `Ticks`)    |
//! | 1   | Keyboard                       |
//! | 2   | Cascade to the secondary PIC   |
//! | 12  | PS/2 mouse                     |

pub mod guard;
pub mod timer;

pub use guard::InterruptGuard;
pub use timer::Ticks;

pub const IRQ_TIMER: u8 = 0;
pub const IRQ_KEYBOARD: u8 = 1;
pub const IRQ_CASCADE: u8 = 2;
pub const IRQ_MOUSE: u8 = 12;

/// Handler invoked once per interrupt on its line, after which the dispatcher sends EOI.
pub type IrqHandler = fn();

/// Per-line handler registration and masking.
pub trait IrqController {
    fn install_handler(&mut self, irq: u8, handler: IrqHandler);
    fn unmask(&mut self, irq: u8);
    fn mask(&mut self, irq: u8);
    fn is_masked(&self, irq: u8) -> bool;
}

/// Suspends the CPU until the next interrupt arrives.
///
/// This is the only blocking primitive in the kernel. Calling it with interrupts disabled
/// never returns.
pub trait Halt {
    fn halt(&mut self);
}

/// The `hlt` instruction.
#[derive(Debug, Default, Clone, Copy)]
pub struct Hlt;

#[cfg(target_arch = "x86_64")]
impl Halt for Hlt {
    #[inline]
    fn halt(&mut self) {
        x86_64::instructions::hlt();
    }
}

//! # Programmable Interrupt Controller (8259 PIC)
//!
//! Remaps the chained 8259s above the CPU exception vectors and owns the table of
//! per-line handlers that the hardware vectors dispatch through.
//!
//! | IRQ | Vector | Device    |
//! |-----|--------|-----------|
//! | 0   | 32     | Timer     |
//! | 1   | 33     | Keyboard  |
//! | 2   | 34     | Cascade   |
//! | 12  | 44     | Mouse     |

use pic8259::ChainedPics;
use spin::Mutex;

use cinser::core::interrupts::{guard::without_interrupts, IrqController, IrqHandler};

pub const PIC_1_OFFSET: u8 = 32;
pub const PIC_2_OFFSET: u8 = 40;
pub const IRQ_LINES: usize = 16;

pub static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

// Only written with interrupts disabled, so the vector stubs never spin on it.
static HANDLERS: Mutex<[Option<IrqHandler>; IRQ_LINES]> = Mutex::new([None; IRQ_LINES]);

pub const fn vector(irq: u8) -> u8 {
    PIC_1_OFFSET + irq
}

/// Remaps both chips and masks every line. Lines are opened one by one with `unmask`.
pub fn init() {
    without_interrupts(|| {
        let mut pics = PICS.lock();
        unsafe {
            pics.initialize();
            pics.write_masks(0xFF, 0xFF);
        }
    });
}

/// Body of every hardware vector: run the line's handler, then acknowledge.
pub fn dispatch(irq: u8) {
    let handler = HANDLERS.lock()[irq as usize];
    if let Some(handler) = handler {
        handler();
    }
    unsafe {
        PICS.lock().notify_end_of_interrupt(vector(irq));
    }
}

/// The chained 8259 pair as seen by drivers.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pic;

impl IrqController for Pic {
    fn install_handler(&mut self, irq: u8, handler: IrqHandler) {
        if irq as usize >= IRQ_LINES {
            log::warn!("PIC: no IRQ line {}", irq);
            return;
        }
        without_interrupts(|| HANDLERS.lock()[irq as usize] = Some(handler));
    }

    fn unmask(&mut self, irq: u8) {
        if set_masked(irq, false) {
            log::debug!("PIC: IRQ{} unmasked", irq);
        }
    }

    fn mask(&mut self, irq: u8) {
        if set_masked(irq, true) {
            log::debug!("PIC: IRQ{} masked", irq);
        }
    }

    fn is_masked(&self, irq: u8) -> bool {
        if irq as usize >= IRQ_LINES {
            return true;
        }
        let [primary, secondary] = without_interrupts(|| unsafe { PICS.lock().read_masks() });
        let masks = u16::from(primary) | (u16::from(secondary) << 8);
        masks & (1 << irq) != 0
    }
}

/// Sets or clears the line's mask bit. `false` for a line the PICs don't have.
fn set_masked(irq: u8, masked: bool) -> bool {
    if irq as usize >= IRQ_LINES {
        log::warn!("PIC: no IRQ line {}", irq);
        return false;
    }
    without_interrupts(|| {
        let mut pics = PICS.lock();
        unsafe {
            let [primary, secondary] = pics.read_masks();
            let mut masks = u16::from(primary) | (u16::from(secondary) << 8);
            if masked {
                masks |= 1 << irq;
            } else {
                masks &= !(1 << irq);
            }
            pics.write_masks(masks as u8, (masks >> 8) as u8);
        }
    });
    true
}

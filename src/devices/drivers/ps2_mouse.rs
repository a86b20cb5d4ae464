//! PS/2 Mouse Driver
//!
//! Handles IRQ12 and turns the device's 3-byte packets into an absolute, clamped pointer
//! position plus deltas accumulated since the last [`Mouse::poll`].
//!
//! # Architecture
//! - The IRQ handler reads one byte per interrupt and feeds the [`PacketAssembler`]
//! - A complete, non-overflowed packet is committed straight into atomic state fields
//! - The main loop reads a [`PointerState`] copy with [`Mouse::snapshot`] or consumes
//!   deltas and the dirty flag with [`Mouse::poll`]
//!
//! `snapshot` reads fields one by one and can mix two packets if an interrupt lands in
//! between. `poll` and `set_bounds` run under an [`InterruptGuard`].
//!
//! # Usage
//! ```ignore
//! // In the IRQ12 handler:
//! ps2_mouse::MOUSE.handle_interrupt(&mut controller);
//!
//! // In the main loop:
//! let (state, moved) = ps2_mouse::MOUSE.poll();
//! ```

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering};

use spin::Mutex;

use crate::core::interrupts::guard::{without_interrupts, InterruptGuard};
use crate::core::interrupts::{
    IrqController, IrqHandler, IRQ_CASCADE, IRQ_KEYBOARD, IRQ_MOUSE,
};

use super::ps2_controller::{
    Handshake, PollBudget, Ps2Io, Ps2Timeout, CMD_ENABLE_AUX, CMD_READ_CONFIG,
    CMD_WRITE_CONFIG, CONFIG_AUX_IRQ, CONFIG_PRIMARY_IRQ, DEVICE_ACK,
    DEVICE_ENABLE_REPORTING, DEVICE_SET_DEFAULTS, STATUS_AUX_DATA, STATUS_OUTPUT_FULL,
};

pub const BUTTON_LEFT: u8 = 0x01;
pub const BUTTON_RIGHT: u8 = 0x02;
pub const BUTTON_MIDDLE: u8 = 0x04;

/// Configuration byte: auxiliary clock disabled.
const CONFIG_AUX_CLOCK_DISABLED: u8 = 1 << 5;

const PACKET_SYNC: u8 = 0x08;
const PACKET_OVERFLOW: u8 = 0xC0;
const PACKET_BUTTONS: u8 = 0x07;

// =============================================================================
// POINTER STATE
// =============================================================================

/// Copy of the driver state handed to the rest of the kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    /// Absolute position, clamped to the current [`Bounds`]
    pub x: i32,
    pub y: i32,
    /// Movement since the last poll, in screen orientation (positive = down)
    pub dx: i32,
    pub dy: i32,
    /// Button states: bit 0 = left, bit 1 = right, bit 2 = middle
    pub buttons: u8,
}

impl PointerState {
    #[inline]
    pub fn left_button(&self) -> bool {
        (self.buttons & BUTTON_LEFT) != 0
    }

    #[inline]
    pub fn right_button(&self) -> bool {
        (self.buttons & BUTTON_RIGHT) != 0
    }

    #[inline]
    pub fn middle_button(&self) -> bool {
        (self.buttons & BUTTON_MIDDLE) != 0
    }
}

/// Inclusive clamp rectangle. An axis whose `max < min` is left unclamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub const UNCLAMPED: Bounds = Bounds::new(0, 0, -1, -1);

    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    #[inline]
    pub fn clamp_x(&self, x: i32) -> i32 {
        clamp_axis(x, self.min_x, self.max_x)
    }

    #[inline]
    pub fn clamp_y(&self, y: i32) -> i32 {
        clamp_axis(y, self.min_y, self.max_y)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::UNCLAMPED
    }
}

#[inline]
fn clamp_axis(value: i32, min: i32, max: i32) -> i32 {
    if max >= min {
        value.clamp(min, max)
    } else {
        value
    }
}

// =============================================================================
// PACKET ASSEMBLY
// =============================================================================

/// A complete 3-byte packet.
///
/// - Byte 0: buttons (bits 0-2), sync (bit 3), overflow (bits 6-7)
/// - Byte 1: horizontal movement, two's complement
/// - Byte 2: vertical movement, two's complement, positive = up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet([u8; 3]);

impl Packet {
    pub const fn new(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    /// Either motion counter overflowed; the deltas are meaningless.
    #[inline]
    pub fn overflowed(&self) -> bool {
        self.0[0] & PACKET_OVERFLOW != 0
    }

    #[inline]
    pub fn buttons(&self) -> u8 {
        self.0[0] & PACKET_BUTTONS
    }

    #[inline]
    pub fn dx(&self) -> i32 {
        self.0[1] as i8 as i32
    }

    /// Vertical movement in screen orientation (the device reports up as positive).
    #[inline]
    pub fn dy(&self) -> i32 {
        -(self.0[2] as i8 as i32)
    }
}

/// Packet framing state machine.
///
/// `index` is the number of bytes collected so far: 0 awaits the first byte, 1 the second,
/// 2 the third. The third byte completes the packet and resets to 0.
pub struct PacketAssembler {
    buffer: [u8; 3],
    index: usize,
}

impl PacketAssembler {
    pub const fn new() -> Self {
        Self {
            buffer: [0; 3],
            index: 0,
        }
    }

    /// Feeds one byte, returning the packet when it is complete.
    pub fn push(&mut self, byte: u8) -> Option<Packet> {
        // First byte must carry the sync bit; anything else means we joined mid-packet.
        if self.index == 0 && (byte & PACKET_SYNC) == 0 {
            return None;
        }

        self.buffer[self.index] = byte;
        self.index += 1;

        if self.index == self.buffer.len() {
            self.index = 0;
            Some(Packet(self.buffer))
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Default for PacketAssembler {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// DRIVER
// =============================================================================

/// Global mouse instance fed by IRQ12.
pub static MOUSE: Mouse = Mouse::new();

pub struct Mouse {
    x: AtomicI32,
    y: AtomicI32,
    dx: AtomicI32,
    dy: AtomicI32,
    buttons: AtomicU8,
    dirty: AtomicBool,

    min_x: AtomicI32,
    min_y: AtomicI32,
    max_x: AtomicI32,
    max_y: AtomicI32,

    assembler: Mutex<PacketAssembler>,
    initialized: AtomicBool,
}

impl Mouse {
    pub const fn new() -> Self {
        Self {
            x: AtomicI32::new(0),
            y: AtomicI32::new(0),
            dx: AtomicI32::new(0),
            dy: AtomicI32::new(0),
            buttons: AtomicU8::new(0),
            dirty: AtomicBool::new(false),
            min_x: AtomicI32::new(Bounds::UNCLAMPED.min_x),
            min_y: AtomicI32::new(Bounds::UNCLAMPED.min_y),
            max_x: AtomicI32::new(Bounds::UNCLAMPED.max_x),
            max_y: AtomicI32::new(Bounds::UNCLAMPED.max_y),
            assembler: Mutex::new(PacketAssembler::new()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Resets the driver state, enables the auxiliary port and its interrupt, switches the
    /// device to streaming, then installs `handler` on IRQ12 and unmasks it together with
    /// the cascade line.
    ///
    /// IRQ1 is masked for the handshake, since the keyboard handler would otherwise take
    /// the configuration byte off the port. It is unmasked again afterwards if it was open.
    ///
    /// Handshake timeouts and missing ACKs are logged and otherwise ignored.
    pub fn initialize<IO, IRQ>(
        &self,
        io: &mut IO,
        irq: &mut IRQ,
        handler: IrqHandler,
        budget: PollBudget,
    ) where
        IO: Ps2Io,
        IRQ: IrqController,
    {
        without_interrupts(|| {
            self.x.store(0, Ordering::Relaxed);
            self.y.store(0, Ordering::Relaxed);
            self.dx.store(0, Ordering::Relaxed);
            self.dy.store(0, Ordering::Relaxed);
            self.buttons.store(0, Ordering::Relaxed);
            self.dirty.store(false, Ordering::Relaxed);
            self.assembler.lock().reset();
        });

        let keyboard_open = !irq.is_masked(IRQ_KEYBOARD);
        irq.mask(IRQ_KEYBOARD);

        let mut ps2 = Handshake::new(io, budget);

        log_timeout("enable aux", ps2.send_command(CMD_ENABLE_AUX));

        log_timeout("read config", ps2.send_command(CMD_READ_CONFIG));
        let (config, read) = ps2.read_data();
        log_timeout("read config", read);

        let config = (config | CONFIG_AUX_IRQ | CONFIG_PRIMARY_IRQ) & !CONFIG_AUX_CLOCK_DISABLED;
        log_timeout("write config", ps2.send_command(CMD_WRITE_CONFIG));
        log_timeout("write config", ps2.send_data(config));

        for command in [DEVICE_SET_DEFAULTS, DEVICE_ENABLE_REPORTING] {
            let (response, result) = ps2.send_aux_command(command);
            match result {
                Err(e) => log::debug!("PS/2 mouse: command {:#04x}: {}", command, e),
                Ok(()) if response != DEVICE_ACK => {
                    log::debug!("PS/2 mouse: command {:#04x} answered {:#04x}", command, response)
                }
                Ok(()) => {}
            }
        }

        if keyboard_open {
            irq.unmask(IRQ_KEYBOARD);
        }

        irq.install_handler(IRQ_MOUSE, handler);
        irq.unmask(IRQ_CASCADE);
        irq.unmask(IRQ_MOUSE);

        self.initialized.store(true, Ordering::Release);
        log::info!("PS/2 mouse initialized (config {:#04x})", config);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// IRQ12 body. Consumes at most one byte and never blocks.
    pub fn handle_interrupt<IO: Ps2Io>(&self, io: &mut IO) {
        let status = io.read_status();
        if status & STATUS_OUTPUT_FULL == 0 || status & STATUS_AUX_DATA == 0 {
            return;
        }

        let byte = io.read_data();

        // Only `initialize` contends for the lock, and it masks interrupts while holding it.
        let Some(mut assembler) = self.assembler.try_lock() else {
            return;
        };
        let packet = assembler.push(byte);
        drop(assembler);

        if let Some(packet) = packet {
            self.commit(packet);
        }
    }

    fn commit(&self, packet: Packet) {
        // Overflowed counters produce huge bogus jumps; drop the whole packet.
        if packet.overflowed() {
            return;
        }

        let dx = packet.dx();
        let dy = packet.dy();
        let bounds = self.bounds();

        let x = bounds.clamp_x(self.x.load(Ordering::Relaxed).wrapping_add(dx));
        let y = bounds.clamp_y(self.y.load(Ordering::Relaxed).wrapping_add(dy));

        self.dx.fetch_add(dx, Ordering::Relaxed);
        self.dy.fetch_add(dy, Ordering::Relaxed);
        self.x.store(x, Ordering::Relaxed);
        self.y.store(y, Ordering::Relaxed);
        self.buttons.store(packet.buttons(), Ordering::Relaxed);
        self.dirty.store(true, Ordering::Release);
    }

    /// Sets the clamp rectangle and re-clamps the current position right away.
    pub fn set_bounds(&self, min_x: i32, min_y: i32, max_x: i32, max_y: i32) {
        let _guard = InterruptGuard::acquire();

        self.min_x.store(min_x, Ordering::Relaxed);
        self.min_y.store(min_y, Ordering::Relaxed);
        self.max_x.store(max_x, Ordering::Relaxed);
        self.max_y.store(max_y, Ordering::Relaxed);

        let bounds = Bounds::new(min_x, min_y, max_x, max_y);
        let x = bounds.clamp_x(self.x.load(Ordering::Relaxed));
        let y = bounds.clamp_y(self.y.load(Ordering::Relaxed));
        self.x.store(x, Ordering::Relaxed);
        self.y.store(y, Ordering::Relaxed);
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.min_x.load(Ordering::Relaxed),
            self.min_y.load(Ordering::Relaxed),
            self.max_x.load(Ordering::Relaxed),
            self.max_y.load(Ordering::Relaxed),
        )
    }

    /// Current state without consuming deltas. Best effort, see module docs.
    pub fn snapshot(&self) -> PointerState {
        PointerState {
            x: self.x.load(Ordering::Relaxed),
            y: self.y.load(Ordering::Relaxed),
            dx: self.dx.load(Ordering::Relaxed),
            dy: self.dy.load(Ordering::Relaxed),
            buttons: self.buttons.load(Ordering::Relaxed),
        }
    }

    /// Returns the current state and whether any packet was committed since the last
    /// poll, then zeroes the accumulated deltas and the dirty flag.
    pub fn poll(&self) -> (PointerState, bool) {
        let _guard = InterruptGuard::acquire();

        let state = self.snapshot();
        self.dx.store(0, Ordering::Relaxed);
        self.dy.store(0, Ordering::Relaxed);
        let dirty = self.dirty.swap(false, Ordering::Acquire);

        (state, dirty)
    }
}

impl Default for Mouse {
    fn default() -> Self {
        Self::new()
    }
}

fn log_timeout(step: &str, result: Result<(), Ps2Timeout>) {
    if let Err(e) = result {
        log::debug!("PS/2 mouse: {}: {}", step, e);
    }
}

//! PS/2 keyboard input path.
//!
//! IRQ1 pushes raw scancodes into a lock-free SPSC ring; the main loop pops them and
//! translates them to characters with `pc-keyboard` (scancode set 1, US layout).
//! Translation itself is not this kernel's business, only the buffering is.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use pc_keyboard::{layouts, DecodedKey, HandleControl, Keyboard, ScancodeSet1};

use super::ps2_controller::{Ps2Io, STATUS_AUX_DATA, STATUS_OUTPUT_FULL};

const BUFFER_SIZE: usize = 256;

/// Global scancode queue fed by IRQ1.
pub static SCANCODES: ScancodeQueue = ScancodeQueue::new();

/// Single-producer (IRQ handler) / single-consumer (main loop) ring of scancodes.
pub struct ScancodeQueue {
    buf: UnsafeCell<[u8; BUFFER_SIZE]>,
    head: AtomicUsize,
    tail: AtomicUsize,
}

// The producer only writes the slot at `head` before publishing it, the consumer only reads
// the slot at `tail` after observing the publish.
unsafe impl Sync for ScancodeQueue {}

impl ScancodeQueue {
    pub const fn new() -> Self {
        Self {
            buf: UnsafeCell::new([0; BUFFER_SIZE]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Producer side. Drops the scancode when the ring is full; never blocks.
    pub fn push(&self, scancode: u8) {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) % BUFFER_SIZE;
        let tail = self.tail.load(Ordering::Acquire);

        if next != tail {
            unsafe {
                (*self.buf.get())[head] = scancode;
            }
            self.head.store(next, Ordering::Release);
        }
    }

    /// Consumer side.
    pub fn pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail == head {
            None
        } else {
            let scancode = unsafe { (*self.buf.get())[tail] };
            self.tail.store((tail + 1) % BUFFER_SIZE, Ordering::Release);
            Some(scancode)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Relaxed)
    }

    /// IRQ1 body. Bytes from the auxiliary port are left for the mouse handler.
    pub fn handle_interrupt<IO: Ps2Io>(&self, io: &mut IO) {
        let status = io.read_status();
        if status & STATUS_OUTPUT_FULL == 0 || status & STATUS_AUX_DATA != 0 {
            return;
        }
        self.push(io.read_data());
    }
}

impl Default for ScancodeQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns queued scancodes into characters.
pub struct KeyboardDecoder {
    keyboard: Keyboard<layouts::Us104Key, ScancodeSet1>,
}

impl KeyboardDecoder {
    pub fn new() -> Self {
        Self {
            keyboard: Keyboard::new(ScancodeSet1::new(), layouts::Us104Key, HandleControl::Ignore),
        }
    }

    /// Feeds one scancode; returns a character once a key press decodes to one.
    pub fn decode(&mut self, scancode: u8) -> Option<char> {
        let event = self.keyboard.add_byte(scancode).ok().flatten()?;
        match self.keyboard.process_keyevent(event)? {
            DecodedKey::Unicode(ch) => Some(ch),
            DecodedKey::RawKey(_) => None,
        }
    }

    /// Pops scancodes until one yields a character or the queue runs dry.
    pub fn next_char(&mut self, queue: &ScancodeQueue) -> Option<char> {
        while let Some(scancode) = queue.pop() {
            if let Some(ch) = self.decode(scancode) {
                return Some(ch);
            }
        }
        None
    }
}

impl Default for KeyboardDecoder {
    fn default() -> Self {
        Self::new()
    }
}

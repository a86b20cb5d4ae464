//! # Tick Service
//!
//! Monotonic tick counter advanced by the timer interrupt, plus blocking delays built on
//! [`Halt`].
//!
//! The counter is a `u32` that wraps. Every comparison is done as
//! `now.wrapping_sub(start)`, so a wrap in the middle of a wait neither ends it early nor
//! makes it endless.
//!
//! Millisecond conversion stays in single-width integer arithmetic; no 64-bit division
//! is needed on 32-bit targets.

use core::sync::atomic::{AtomicU32, Ordering};

use super::Halt;

pub const DEFAULT_TICK_RATE: u32 = 1000;

/// Global tick service fed by IRQ0.
pub static TICKS: Ticks = Ticks::new();

pub struct Ticks {
    count: AtomicU32,
    rate: AtomicU32,
}

impl Ticks {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
            rate: AtomicU32::new(DEFAULT_TICK_RATE),
        }
    }

    /// Sets the tick rate (ticks per second) and resets the counter.
    ///
    /// `rate` must match the frequency the timer hardware was programmed with. Zero
    /// falls back to [`DEFAULT_TICK_RATE`].
    pub fn initialize(&self, rate: u32) {
        let rate = if rate == 0 { DEFAULT_TICK_RATE } else { rate };
        self.rate.store(rate, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }

    /// Called from the timer interrupt.
    #[inline]
    pub fn tick(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn elapsed_ticks(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn rate(&self) -> u32 {
        self.rate.load(Ordering::Relaxed)
    }

    /// Ticks elapsed since `start`, wrap-safe.
    #[inline]
    pub fn since(&self, start: u32) -> u32 {
        self.elapsed_ticks().wrapping_sub(start)
    }

    /// Halts until at least `ticks` timer interrupts have been counted.
    ///
    /// Interrupts must be enabled by the caller.
    pub fn wait_ticks<H: Halt>(&self, ticks: u32, cpu: &mut H) {
        if ticks == 0 {
            return;
        }

        let start = self.elapsed_ticks();
        while self.since(start) < ticks {
            cpu.halt();
        }
    }

    pub fn wait_seconds<H: Halt>(&self, seconds: u32, cpu: &mut H) {
        let rate = self.rate();
        for _ in 0..seconds {
            self.wait_ticks(rate, cpu);
        }
    }

    pub fn wait_milliseconds<H: Halt>(&self, ms: u32, cpu: &mut H) {
        if ms == 0 {
            return;
        }
        self.wait_ticks(ms_to_ticks(ms, self.rate()), cpu);
    }

    #[cfg(test)]
    pub(crate) fn starting_at(rate: u32, count: u32) -> Self {
        Self {
            count: AtomicU32::new(count),
            rate: AtomicU32::new(rate),
        }
    }
}

impl Default for Ticks {
    fn default() -> Self {
        Self::new()
    }
}

/// `ceil(ms * rate / 1000)`, at least one tick for any non-zero `ms`.
///
/// Splits `ms` into whole seconds and a sub-second remainder so that the only product
/// that must not overflow is `remainder * rate` with `remainder < 1000`. The whole-second
/// part saturates.
pub fn ms_to_ticks(ms: u32, rate: u32) -> u32 {
    if ms == 0 {
        return 0;
    }

    let whole = ms / 1000;
    let rem = ms % 1000;

    let scaled = rem.saturating_mul(rate);
    let mut ticks = whole
        .saturating_mul(rate)
        .saturating_add(scaled / 1000);
    if scaled % 1000 != 0 {
        ticks = ticks.saturating_add(1);
    }

    ticks.max(1)
}

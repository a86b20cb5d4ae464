//! Boot-time configuration.
//!
//! There is no configuration source on a freestanding target, so every value is a `const`
//! default that the kernel can override before the subsystems start.

use log::LevelFilter;

use crate::devices::drivers::ps2_controller::PollBudget;

#[derive(Debug, Clone, Copy)]
pub struct KernelConfig {
    /// Timer interrupt frequency. The PIT and `Ticks::initialize` must agree on it.
    pub tick_rate: u32,
    /// Minimum number of ticks between two rendered frames (16 ≈ 60 fps at 1000 Hz).
    pub frame_interval_ticks: u32,
    /// Status-register polls allowed per PS/2 handshake step.
    ///
    /// This is an iteration count, not wall-clock time, so the effective timeout scales
    /// with CPU speed.
    pub ps2_poll_budget: PollBudget,
    /// Polls allowed per phase of the vertical retrace wait.
    pub retrace_poll_budget: PollBudget,
    pub log_level: LevelFilter,
    pub boot_splash_seconds: u32,
}

impl KernelConfig {
    pub const DEFAULT: KernelConfig = KernelConfig {
        tick_rate: 1000,
        frame_interval_ticks: 16,
        ps2_poll_budget: PollBudget::new(100_000),
        retrace_poll_budget: PollBudget::new(1_000_000),
        log_level: LevelFilter::Info,
        boot_splash_seconds: 1,
    };
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

//! Scoped interrupt masking.
//!
//! Used by cooperative-loop operations that must look atomic to interrupt handlers
//! (consuming pointer deltas, changing clamp bounds). Handlers themselves never take it.

/// Disables interrupts on creation and restores the previous interrupt flag on drop.
///
/// Nesting is fine: an inner guard sees interrupts already disabled and leaves them
/// disabled when it goes away.
#[must_use = "interrupts are re-enabled as soon as the guard is dropped"]
pub struct InterruptGuard {
    was_enabled: bool,
}

impl InterruptGuard {
    pub fn acquire() -> Self {
        let was_enabled = flag::are_enabled();
        if was_enabled {
            flag::disable();
        }
        Self { was_enabled }
    }

    pub fn was_enabled(&self) -> bool {
        self.was_enabled
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        if self.was_enabled {
            flag::enable();
        }
    }
}

/// Runs `f` with interrupts masked.
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = InterruptGuard::acquire();
    f()
}

#[cfg(all(target_arch = "x86_64", not(test)))]
mod flag {
    pub use x86_64::instructions::interrupts::{are_enabled, disable, enable};
}

// Host builds run unprivileged; `cli`/`sti` would fault there.
#[cfg(any(test, not(target_arch = "x86_64")))]
mod flag {
    pub fn are_enabled() -> bool {
        false
    }

    pub fn disable() {}

    pub fn enable() {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_interrupts_returns_value() {
        assert_eq!(without_interrupts(|| 7), 7);
    }

    #[test]
    fn test_guard_does_not_claim_enabled_flag_off_target() {
        let guard = InterruptGuard::acquire();
        assert!(!guard.was_enabled());
    }
}

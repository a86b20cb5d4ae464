//! # Frame Scheduler
//!
//! The kernel's main loop as an explicit state machine.
//!
//! ```text
//! Idle -> DrainInput -> Throttle -> Idle
//!                          |
//!                          v
//!                       Render -> Synchronize -> Present -> Idle
//! ```
//!
//! `Idle` is the only place the CPU sleeps. Input is drained completely on every wake-up,
//! but frames are rate limited: a redraw request waits in `Throttle` until at least
//! `frame_interval_ticks` have passed since the previous frame, so a burst of keystrokes
//! collapses into a single render.

use crate::config::KernelConfig;
use crate::core::interrupts::Halt;
use crate::devices::drivers::{PointerState, PollBudget};
use crate::devices::framebuffer::{Display, DisplayBackend};
use crate::devices::input::{InputEvent, InputEventHandler};

/// Everything the scheduler needs from the hardware.
pub trait Machine: Halt {
    /// Next decoded character, if any is buffered.
    fn next_char(&mut self) -> Option<char>;

    /// The pointer state, if it changed since the last call. Consumes accumulated deltas.
    fn poll_pointer(&mut self) -> Option<PointerState>;

    /// Whether the display is in vertical retrace right now.
    fn in_vertical_retrace(&mut self) -> bool;

    fn elapsed_ticks(&self) -> u32;
}

/// The thing the scheduler renders.
pub trait FrameConsumer: InputEventHandler {
    fn draw<B: DisplayBackend>(&mut self, display: &mut Display<B>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    DrainInput,
    Throttle,
    Render,
    Synchronize,
    Present,
}

pub struct FrameScheduler<M, C, B>
where
    M: Machine,
    C: FrameConsumer,
    B: DisplayBackend,
{
    machine: M,
    consumer: C,
    display: Display<B>,
    phase: Phase,
    need_redraw: bool,
    last_frame_tick: u32,
    frame_interval: u32,
    retrace_budget: PollBudget,
    frames: u64,
}

impl<M, C, B> FrameScheduler<M, C, B>
where
    M: Machine,
    C: FrameConsumer,
    B: DisplayBackend,
{
    /// Starts in `Idle` with a redraw pending, so the first frame goes out as soon as the
    /// throttle allows.
    pub fn new(machine: M, consumer: C, display: Display<B>, config: &KernelConfig) -> Self {
        Self {
            machine,
            consumer,
            display,
            phase: Phase::Idle,
            need_redraw: true,
            last_frame_tick: 0,
            frame_interval: config.frame_interval_ticks,
            retrace_budget: config.retrace_poll_budget,
            frames: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn need_redraw(&self) -> bool {
        self.need_redraw
    }

    pub fn last_frame_tick(&self) -> u32 {
        self.last_frame_tick
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut M {
        &mut self.machine
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn display(&self) -> &Display<B> {
        &self.display
    }

    /// Runs the current phase and moves to the next one.
    pub fn step(&mut self) {
        self.phase = match self.phase {
            Phase::Idle => self.idle(),
            Phase::DrainInput => self.drain_input(),
            Phase::Throttle => self.throttle(),
            Phase::Render => self.render(),
            Phase::Synchronize => self.synchronize(),
            Phase::Present => self.present(),
        };
    }

    pub fn run(&mut self) -> ! {
        log::info!(
            "frame scheduler running, one frame per {} ticks at most",
            self.frame_interval
        );
        loop {
            self.step();
        }
    }

    fn idle(&mut self) -> Phase {
        self.machine.halt();
        Phase::DrainInput
    }

    fn drain_input(&mut self) -> Phase {
        while let Some(ch) = self.machine.next_char() {
            InputEvent::Key(ch).dispatch(&mut self.consumer);
            self.need_redraw = true;
        }

        if let Some(state) = self.machine.poll_pointer() {
            InputEvent::Pointer(state).dispatch(&mut self.consumer);
            self.need_redraw = true;
        }

        Phase::Throttle
    }

    fn throttle(&mut self) -> Phase {
        if !self.need_redraw {
            return Phase::Idle;
        }

        let now = self.machine.elapsed_ticks();
        if now.wrapping_sub(self.last_frame_tick) < self.frame_interval {
            return Phase::Idle;
        }

        Phase::Render
    }

    fn render(&mut self) -> Phase {
        self.last_frame_tick = self.machine.elapsed_ticks();
        self.consumer.draw(&mut self.display);
        Phase::Synchronize
    }

    /// Waits for the end of the current retrace, then for the start of the next one.
    /// Each half gives up after the poll budget; nothing to wait for without a display.
    fn synchronize(&mut self) -> Phase {
        if self.display.is_active() {
            let machine = &mut self.machine;
            if !self.retrace_budget.spin_until(|| !machine.in_vertical_retrace())
                || !self.retrace_budget.spin_until(|| machine.in_vertical_retrace())
            {
                // Hardware without a VGA status register never toggles bit 3.
                log::trace!("retrace wait ran out of polls");
            }
        }
        Phase::Present
    }

    fn present(&mut self) -> Phase {
        self.display.present();
        self.need_redraw = false;
        self.frames += 1;
        Phase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::framebuffer::display::recording::RecordingBackend;
    use crate::devices::framebuffer::{Capabilities, Color};
    use std::collections::VecDeque;

    struct FakeMachine {
        ticks: u32,
        chars: VecDeque<char>,
        pointer: Option<PointerState>,
        retrace: bool,
        retrace_polls: u32,
    }

    impl FakeMachine {
        fn at(ticks: u32) -> Self {
            Self {
                ticks,
                chars: VecDeque::new(),
                pointer: None,
                retrace: true,
                retrace_polls: 0,
            }
        }
    }

    impl Halt for FakeMachine {
        fn halt(&mut self) {
            self.ticks = self.ticks.wrapping_add(1);
        }
    }

    impl Machine for FakeMachine {
        fn next_char(&mut self) -> Option<char> {
            self.chars.pop_front()
        }

        fn poll_pointer(&mut self) -> Option<PointerState> {
            self.pointer.take()
        }

        // Starts inside a retrace and flips on every poll.
        fn in_vertical_retrace(&mut self) -> bool {
            self.retrace_polls += 1;
            self.retrace = !self.retrace;
            self.retrace
        }

        fn elapsed_ticks(&self) -> u32 {
            self.ticks
        }
    }

    #[derive(Default)]
    struct Recorder {
        keys: Vec<char>,
        pointers: Vec<PointerState>,
        draws: Vec<usize>,
    }

    impl InputEventHandler for Recorder {
        fn handle_key(&mut self, ch: char) {
            self.keys.push(ch);
        }

        fn handle_pointer(&mut self, state: PointerState) {
            self.pointers.push(state);
        }
    }

    impl FrameConsumer for Recorder {
        fn draw<B: DisplayBackend>(&mut self, display: &mut Display<B>) {
            self.draws.push(self.keys.len());
            display.put_pixel(0, 0, Color::WHITE);
        }
    }

    type Scheduler = FrameScheduler<FakeMachine, Recorder, RecordingBackend>;

    fn scheduler(machine: FakeMachine) -> Scheduler {
        let display = Display::with_backend(RecordingBackend::new(Capabilities::PRESENT));
        FrameScheduler::new(machine, Recorder::default(), display, &KernelConfig::DEFAULT)
    }

    /// Steps until the scheduler is back in `Idle` after at least one step.
    fn cycle(s: &mut Scheduler) {
        s.step();
        while s.phase() != Phase::Idle {
            s.step();
        }
    }

    fn presents(s: &Scheduler) -> usize {
        s.display().backend().unwrap().presents()
    }

    #[test]
    fn test_phase_order_for_one_frame() {
        let mut s = scheduler(FakeMachine::at(100));
        let mut seen = vec![s.phase()];
        for _ in 0..6 {
            s.step();
            seen.push(s.phase());
        }
        assert_eq!(
            seen,
            vec![
                Phase::Idle,
                Phase::DrainInput,
                Phase::Throttle,
                Phase::Render,
                Phase::Synchronize,
                Phase::Present,
                Phase::Idle,
            ]
        );
        assert_eq!(s.frames(), 1);
        assert!(!s.need_redraw());
    }

    #[test]
    fn test_redraw_deferred_until_interval_elapses() {
        let mut s = scheduler(FakeMachine::at(0));

        // Ticks 1..=15: too soon after tick 0.
        for _ in 0..15 {
            cycle(&mut s);
            assert!(s.consumer().draws.is_empty());
            assert!(s.need_redraw());
        }
        assert_eq!(presents(&s), 0);

        cycle(&mut s);
        assert_eq!(s.machine().ticks, 16);
        assert_eq!(s.consumer().draws.len(), 1);
        assert_eq!(presents(&s), 1);
        assert_eq!(s.last_frame_tick(), 16);
        assert!(!s.need_redraw());

        // Nothing new to show: no more frames.
        for _ in 0..100 {
            cycle(&mut s);
        }
        assert_eq!(s.consumer().draws.len(), 1);
        assert_eq!(presents(&s), 1);
    }

    #[test]
    fn test_keystroke_burst_renders_once() {
        let mut s = scheduler(FakeMachine::at(1000));
        cycle(&mut s);
        assert_eq!(s.frames(), 1);

        s.machine_mut().chars.extend(['a', 'b', 'c']);
        for _ in 0..15 {
            cycle(&mut s);
        }
        // All three keys were delivered, but the throttle is still closed.
        assert_eq!(s.consumer().keys, vec!['a', 'b', 'c']);
        assert_eq!(s.frames(), 1);

        cycle(&mut s);
        assert_eq!(s.frames(), 2);
        assert_eq!(s.consumer().draws, vec![0, 3]);
    }

    #[test]
    fn test_pointer_change_requests_redraw() {
        let mut s = scheduler(FakeMachine::at(500));
        cycle(&mut s);
        assert!(!s.need_redraw());

        let state = PointerState { x: 3, y: 4, dx: 3, dy: 4, buttons: 1 };
        s.machine_mut().pointer = Some(state);
        s.step();
        s.step();
        assert_eq!(s.consumer().pointers, vec![state]);
        assert!(s.need_redraw());
    }

    #[test]
    fn test_throttle_survives_tick_wrap() {
        let mut s = scheduler(FakeMachine::at(u32::MAX - 4));
        cycle(&mut s);
        assert_eq!(s.frames(), 1);

        s.machine_mut().chars.push_back('x');
        for _ in 0..15 {
            cycle(&mut s);
        }
        assert_eq!(s.frames(), 1);
        cycle(&mut s);
        assert_eq!(s.frames(), 2);
        assert_eq!(s.last_frame_tick(), 12);
    }

    #[test]
    fn test_synchronize_waits_two_phases() {
        let mut s = scheduler(FakeMachine::at(100));
        while s.phase() != Phase::Synchronize {
            s.step();
        }
        s.step();
        // out-of-retrace seen on poll 1, retrace start on poll 2
        assert_eq!(s.machine().retrace_polls, 2);
        assert_eq!(s.phase(), Phase::Present);
    }

    #[test]
    fn test_inactive_display_skips_retrace_wait() {
        let display: Display<RecordingBackend> = Display::inactive();
        let mut s = FrameScheduler::new(
            FakeMachine::at(100),
            Recorder::default(),
            display,
            &KernelConfig::DEFAULT,
        );
        cycle(&mut s);
        assert_eq!(s.machine().retrace_polls, 0);
        assert_eq!(s.consumer().draws.len(), 1);
        assert_eq!(s.frames(), 1);
    }
}

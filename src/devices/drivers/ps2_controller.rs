//! 8042 PS/2 controller access.
//!
//! [`Ps2Io`] is the byte-level port interface the drivers are written against;
//! [`Ps2Controller`] is the real port-mapped implementation. Handshakes poll the status
//! register a bounded number of times ([`PollBudget`]) and never fail hard: a timeout is
//! reported to the caller, which logs it and carries on with whatever the data port holds.

use core::fmt;

pub const DATA_PORT: u16 = 0x60;
pub const STATUS_PORT: u16 = 0x64;
pub const COMMAND_PORT: u16 = 0x64;

/// Status register: output buffer full (a byte can be read).
pub const STATUS_OUTPUT_FULL: u8 = 1 << 0;
/// Status register: input buffer full (controller not ready for a write).
pub const STATUS_INPUT_FULL: u8 = 1 << 1;
/// Status register: the pending byte came from the auxiliary device.
pub const STATUS_AUX_DATA: u8 = 1 << 5;

pub const CMD_READ_CONFIG: u8 = 0x20;
pub const CMD_WRITE_CONFIG: u8 = 0x60;
pub const CMD_ENABLE_AUX: u8 = 0xA8;
pub const CMD_WRITE_AUX: u8 = 0xD4;

/// Configuration byte: primary port (keyboard) interrupt enable.
pub const CONFIG_PRIMARY_IRQ: u8 = 1 << 0;
/// Configuration byte: auxiliary port (mouse) interrupt enable.
pub const CONFIG_AUX_IRQ: u8 = 1 << 1;

pub const DEVICE_SET_DEFAULTS: u8 = 0xF6;
pub const DEVICE_ENABLE_REPORTING: u8 = 0xF4;
pub const DEVICE_ACK: u8 = 0xFA;

/// Raw register access to the controller.
pub trait Ps2Io {
    fn read_status(&mut self) -> u8;
    fn read_data(&mut self) -> u8;
    fn write_command(&mut self, command: u8);
    fn write_data(&mut self, data: u8);
}

/// Maximum number of status polls before a handshake step gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget(u32);

impl PollBudget {
    pub const DEFAULT: PollBudget = PollBudget(100_000);

    pub const fn new(polls: u32) -> Self {
        Self(polls)
    }

    pub const fn polls(self) -> u32 {
        self.0
    }

    /// Polls `ready` until it returns true or the budget runs out.
    pub fn spin_until<F: FnMut() -> bool>(self, mut ready: F) -> bool {
        for _ in 0..self.0 {
            if ready() {
                return true;
            }
            core::hint::spin_loop();
        }
        false
    }
}

impl Default for PollBudget {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The controller did not become ready within the poll budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ps2Timeout {
    Write,
    Read,
}

impl fmt::Display for Ps2Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ps2Timeout::Write => write!(f, "PS/2 controller write timeout"),
            Ps2Timeout::Read => write!(f, "PS/2 controller read timeout"),
        }
    }
}

/// Handshake helpers layered over any [`Ps2Io`].
pub struct Handshake<'a, IO: Ps2Io> {
    io: &'a mut IO,
    budget: PollBudget,
}

impl<'a, IO: Ps2Io> Handshake<'a, IO> {
    pub fn new(io: &'a mut IO, budget: PollBudget) -> Self {
        Self { io, budget }
    }

    fn wait_for_write(&mut self) -> Result<(), Ps2Timeout> {
        let io = &mut *self.io;
        if self.budget.spin_until(|| io.read_status() & STATUS_INPUT_FULL == 0) {
            Ok(())
        } else {
            Err(Ps2Timeout::Write)
        }
    }

    fn wait_for_read(&mut self) -> Result<(), Ps2Timeout> {
        let io = &mut *self.io;
        if self.budget.spin_until(|| io.read_status() & STATUS_OUTPUT_FULL != 0) {
            Ok(())
        } else {
            Err(Ps2Timeout::Read)
        }
    }

    /// Writes a controller command. The write happens even if the wait timed out.
    pub fn send_command(&mut self, command: u8) -> Result<(), Ps2Timeout> {
        let ready = self.wait_for_write();
        self.io.write_command(command);
        ready
    }

    /// Writes to the data port. The write happens even if the wait timed out.
    pub fn send_data(&mut self, data: u8) -> Result<(), Ps2Timeout> {
        let ready = self.wait_for_write();
        self.io.write_data(data);
        ready
    }

    /// Reads the data port once the output buffer fills, or after the budget runs out.
    ///
    /// The port is read either way; the second element says whether the controller
    /// actually signalled a byte.
    pub fn read_data(&mut self) -> (u8, Result<(), Ps2Timeout>) {
        let ready = self.wait_for_read();
        (self.io.read_data(), ready)
    }

    /// Sends `command` to the auxiliary device and returns its response byte.
    ///
    /// The response is not validated here; the caller decides what a non-ack means.
    pub fn send_aux_command(&mut self, command: u8) -> (u8, Result<(), Ps2Timeout>) {
        let prefix = self.send_command(CMD_WRITE_AUX);
        let write = self.send_data(command);
        let (response, read) = self.read_data();
        (response, prefix.and(write).and(read))
    }
}

/// Port-mapped 8042 controller.
#[cfg(target_arch = "x86_64")]
pub struct Ps2Controller {
    data: x86_64::instructions::port::Port<u8>,
    status: x86_64::instructions::port::PortReadOnly<u8>,
    command: x86_64::instructions::port::PortWriteOnly<u8>,
}

#[cfg(target_arch = "x86_64")]
impl Ps2Controller {
    /// # Safety
    /// The caller must own the 8042 ports; concurrent users would interleave bytes.
    pub const unsafe fn new() -> Self {
        use x86_64::instructions::port::{Port, PortReadOnly, PortWriteOnly};

        Self {
            data: Port::new(DATA_PORT),
            status: PortReadOnly::new(STATUS_PORT),
            command: PortWriteOnly::new(COMMAND_PORT),
        }
    }
}

#[cfg(target_arch = "x86_64")]
impl Ps2Io for Ps2Controller {
    #[inline]
    fn read_status(&mut self) -> u8 {
        unsafe { self.status.read() }
    }

    #[inline]
    fn read_data(&mut self) -> u8 {
        unsafe { self.data.read() }
    }

    fn write_command(&mut self, command: u8) {
        unsafe { self.command.write(command) }
    }

    fn write_data(&mut self, data: u8) {
        unsafe { self.data.write(data) }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted controller used by driver tests.

    use std::collections::VecDeque;
    use std::vec::Vec;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Write {
        Command(u8),
        Data(u8),
    }

    /// Queued bytes sit in the output buffer; `busy` keeps the input buffer full.
    #[derive(Default)]
    pub struct FakeController {
        pub output: VecDeque<(u8, u8)>,
        pub writes: Vec<Write>,
        pub busy: bool,
    }

    impl FakeController {
        /// Queues `byte` with the given status bits (output-full is added automatically).
        pub fn push(&mut self, status: u8, byte: u8) {
            self.output.push_back((status | STATUS_OUTPUT_FULL, byte));
        }

        pub fn push_aux(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.push(STATUS_AUX_DATA, b);
            }
        }
    }

    impl Ps2Io for FakeController {
        fn read_status(&mut self) -> u8 {
            let busy = if self.busy { STATUS_INPUT_FULL } else { 0 };
            busy | self.output.front().map_or(0, |&(status, _)| status)
        }

        fn read_data(&mut self) -> u8 {
            self.output.pop_front().map_or(0, |(_, byte)| byte)
        }

        fn write_command(&mut self, command: u8) {
            self.writes.push(Write::Command(command));
        }

        fn write_data(&mut self, data: u8) {
            self.writes.push(Write::Data(data));
        }
    }
}

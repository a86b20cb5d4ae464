//! Serial logger for the `log` facade (COM1).

use core::fmt::{self, Write};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;
use uart_16550::SerialPort;

use cinser::core::interrupts::guard::without_interrupts;

pub static SERIAL: Mutex<SerialPort> = Mutex::new(unsafe { SerialPort::new(0x3F8) });

#[macro_export]
macro_rules! println {
    ($($arg:tt)*) => {{
        use core::fmt::Write;
        let mut serial = $crate::kernel::logger::SERIAL.lock();
        let _ = writeln!($crate::kernel::logger::WriterWithCr::new(&mut *serial), $($arg)*);
    }};
}

struct SerialLogger;

static LOGGER: SerialLogger = SerialLogger;

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // An interrupt arriving while the port is locked must not find it locked.
        without_interrupts(|| {
            let mut serial = SERIAL.lock();
            let _ = writeln!(
                WriterWithCr::new(&mut *serial),
                "{:5} {}",
                record.level(),
                record.args()
            );
        });
    }

    fn flush(&self) {}
}

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    SERIAL.lock().init();
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Turns `\n` into `\r\n` for serial terminals.
pub struct WriterWithCr<T> {
    writer: T,
}

impl<T> WriterWithCr<T> {
    pub const fn new(writer: T) -> Self {
        Self { writer }
    }
}

impl<T: Write> Write for WriterWithCr<T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for (i, part) in s.split('\n').enumerate() {
            if i > 0 {
                self.writer.write_str("\r\n")?;
            }
            self.writer.write_str(part)?;
        }
        Ok(())
    }
}

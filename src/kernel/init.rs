/// Kernel initialization phases
use bootloader_api::info::FrameBuffer;

use cinser::core::interrupts::{timer::TICKS, IrqController, IRQ_KEYBOARD, IRQ_TIMER};
use cinser::devices::drivers::ps2_controller::{Ps2Controller, Ps2Io, STATUS_OUTPUT_FULL};
use cinser::devices::drivers::MOUSE;
use cinser::KernelConfig;

use super::display::{self, KernelDisplay};
use super::pic::{self, Pic};
use super::{gdt, idt, logger, pit};

/// Bytes left in the controller from firmware before we take over.
const STALE_BYTE_LIMIT: usize = 16;

/// Brings the machine up in order and hands back the negotiated display.
///
/// Interrupts are enabled on success.
pub fn init_kernel(
    config: &KernelConfig,
    framebuffer: Option<&FrameBuffer>,
) -> Result<KernelDisplay, &'static str> {
    logger::init(config.log_level).map_err(|_| "logger already installed")?;
    log::info!("cinser {} booting", env!("CARGO_PKG_VERSION"));

    init_phase("interrupts", init_interrupts)?;
    init_phase("timer", || init_timer(config))?;

    let mut display = KernelDisplay::inactive();
    init_phase("display", || {
        display = display::negotiate(framebuffer);
        Ok(())
    })?;

    init_phase("keyboard", init_keyboard)?;
    init_phase("mouse", || init_mouse(config, &display))?;

    x86_64::instructions::interrupts::enable();

    log::info!("kernel initialization complete");
    Ok(display)
}

fn init_phase<F>(name: &'static str, init_fn: F) -> Result<(), &'static str>
where
    F: FnOnce() -> Result<(), &'static str>,
{
    log::debug!("initializing {}", name);
    match init_fn() {
        Ok(()) => {
            log::info!("{} initialized", name);
            Ok(())
        }
        Err(e) => {
            log::error!("{} failed: {}", name, e);
            Err(e)
        }
    }
}

fn init_interrupts() -> Result<(), &'static str> {
    gdt::init();
    idt::init();
    pic::init();
    Ok(())
}

fn init_timer(config: &KernelConfig) -> Result<(), &'static str> {
    TICKS.initialize(config.tick_rate);
    let divisor = pit::init(TICKS.rate());
    log::debug!("PIT divisor {} for {} Hz", divisor, TICKS.rate());

    let mut pic = Pic;
    pic.install_handler(IRQ_TIMER, idt::timer);
    pic.unmask(IRQ_TIMER);
    Ok(())
}

fn init_keyboard() -> Result<(), &'static str> {
    let mut ps2 = unsafe { Ps2Controller::new() };
    for _ in 0..STALE_BYTE_LIMIT {
        if ps2.read_status() & STATUS_OUTPUT_FULL == 0 {
            break;
        }
        ps2.read_data();
    }

    let mut pic = Pic;
    pic.install_handler(IRQ_KEYBOARD, idt::keyboard);
    pic.unmask(IRQ_KEYBOARD);
    Ok(())
}

fn init_mouse(config: &KernelConfig, display: &KernelDisplay) -> Result<(), &'static str> {
    let mut ps2 = unsafe { Ps2Controller::new() };
    MOUSE.initialize(&mut ps2, &mut Pic, idt::mouse, config.ps2_poll_budget);

    let (width, height) = display.dimensions();
    if width > 0 && height > 0 {
        MOUSE.set_bounds(0, 0, width as i32 - 1, height as i32 - 1);
    }
    Ok(())
}

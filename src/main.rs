#![no_std]
#![no_main]
#![feature(abi_x86_interrupt)]

extern crate rlibc;

mod kernel;

use bootloader_api::{entry_point, BootInfo};
use core::panic::PanicInfo;

use cinser::core::interrupts::{timer::TICKS, Hlt};
use cinser::core::scheduler::FrameScheduler;
use cinser::ui::{Desktop, Theme};
use cinser::KernelConfig;

use crate::kernel::machine::KernelMachine;

entry_point!(kernel_main);

pub fn kernel_main(boot_info: &'static mut BootInfo) -> ! {
    let config = KernelConfig::DEFAULT;

    let display = match kernel::init_kernel(&config, boot_info.framebuffer.as_ref()) {
        Ok(display) => display,
        // the failing phase has already been logged
        Err(_) => halt_forever(),
    };

    TICKS.wait_seconds(config.boot_splash_seconds, &mut Hlt);

    let mut scheduler =
        FrameScheduler::new(KernelMachine::new(), Desktop::new(Theme::dark()), display, &config);
    scheduler.run()
}

fn halt_forever() -> ! {
    x86_64::instructions::interrupts::disable();
    loop {
        x86_64::instructions::hlt();
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    // The panicking code may have been holding the port.
    unsafe { kernel::logger::SERIAL.force_unlock() };
    println!("PANIC: {}", info);
    halt_forever()
}

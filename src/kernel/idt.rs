//! # Interrupt Descriptor Table and Handlers
//!
//! | Exception              | Action                              |
//! |------------------------|-------------------------------------|
//! | Breakpoint (#BP)       | Print the frame, continue           |
//! | Page Fault (#PF)       | Print the address, then panic       |
//! | Divide Error (#DE)     | Panic                               |
//! | Invalid Opcode (#UD)   | Panic                               |
//! | General Protection     | Panic with error code               |
//! | Double Fault (#DF)     | Panic (uses IST stack)              |
//!
//! Vectors 32-47 are one stub per IRQ line, each calling [`pic::dispatch`]. What a line
//! does is decided by the handler installed for it; the bodies below run to completion
//! and never log.

use spin::Lazy;
use x86_64::structures::idt::{
    HandlerFunc, InterruptDescriptorTable, InterruptStackFrame, PageFaultErrorCode,
};

use cinser::core::interrupts::timer::TICKS;
use cinser::devices::drivers::ps2_controller::Ps2Controller;
use cinser::devices::drivers::{MOUSE, SCANCODES};

use super::{gdt, pic};
use crate::println;

macro_rules! irq_stubs {
    ($($name:ident => $irq:expr),* $(,)?) => {
        $(
            extern "x86-interrupt" fn $name(_stack_frame: InterruptStackFrame) {
                pic::dispatch($irq);
            }
        )*

        const IRQ_STUBS: [HandlerFunc; pic::IRQ_LINES] = [$($name),*];
    };
}

irq_stubs! {
    irq0 => 0, irq1 => 1, irq2 => 2, irq3 => 3,
    irq4 => 4, irq5 => 5, irq6 => 6, irq7 => 7,
    irq8 => 8, irq9 => 9, irq10 => 10, irq11 => 11,
    irq12 => 12, irq13 => 13, irq14 => 14, irq15 => 15,
}

static IDT: Lazy<InterruptDescriptorTable> = Lazy::new(|| {
    let mut idt = InterruptDescriptorTable::new();

    idt.breakpoint.set_handler_fn(breakpoint_handler);
    idt.page_fault.set_handler_fn(page_fault_handler);
    idt.divide_error.set_handler_fn(divide_error_handler);
    idt.invalid_opcode.set_handler_fn(invalid_opcode_handler);
    idt.general_protection_fault.set_handler_fn(general_protection_fault_handler);
    unsafe {
        idt.double_fault
            .set_handler_fn(double_fault_handler)
            .set_stack_index(gdt::DOUBLE_FAULT_IST_INDEX);
    }

    for (irq, stub) in IRQ_STUBS.iter().enumerate() {
        idt[pic::vector(irq as u8)].set_handler_fn(*stub);
    }

    idt
});

pub fn init() {
    IDT.load();
}

// IRQ line bodies, installed through `IrqController::install_handler`.

pub fn timer() {
    TICKS.tick();
}

pub fn keyboard() {
    let mut ps2 = unsafe { Ps2Controller::new() };
    SCANCODES.handle_interrupt(&mut ps2);
}

pub fn mouse() {
    let mut ps2 = unsafe { Ps2Controller::new() };
    MOUSE.handle_interrupt(&mut ps2);
}

extern "x86-interrupt" fn breakpoint_handler(stack_frame: InterruptStackFrame) {
    println!("EXCEPTION: BREAKPOINT\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn divide_error_handler(stack_frame: InterruptStackFrame) {
    panic!("EXCEPTION: DIVIDE BY ZERO\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn invalid_opcode_handler(stack_frame: InterruptStackFrame) {
    panic!("EXCEPTION: INVALID OPCODE\n{:#?}", stack_frame);
}

extern "x86-interrupt" fn general_protection_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) {
    panic!(
        "EXCEPTION: GENERAL PROTECTION FAULT (error code: {})\n{:#?}",
        error_code, stack_frame
    );
}

extern "x86-interrupt" fn double_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: u64,
) -> ! {
    panic!("EXCEPTION: DOUBLE FAULT (code {})\n{:#?}", error_code, stack_frame);
}

extern "x86-interrupt" fn page_fault_handler(
    stack_frame: InterruptStackFrame,
    error_code: PageFaultErrorCode,
) {
    use x86_64::registers::control::Cr2;

    panic!(
        "EXCEPTION: PAGE FAULT at {:?} ({:?})\n{:#?}",
        Cr2::read(),
        error_code,
        stack_frame
    );
}

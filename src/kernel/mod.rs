//! Kernel bring-up: descriptor tables, interrupt controller, timer, logging and the
//! hardware side of the frame loop.

pub mod display;
pub mod gdt;
pub mod idt;
pub mod init;
pub mod logger;
pub mod machine;
pub mod pic;
pub mod pit;

pub use init::init_kernel;

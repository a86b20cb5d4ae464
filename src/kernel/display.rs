//! Display negotiation with the boot framebuffer and the static back buffer.

use core::sync::atomic::{AtomicBool, Ordering};

use bootloader_api::info::FrameBuffer;

use cinser::devices::framebuffer::{Display, FramebufferDescriptor, LinearFramebuffer};

/// Largest mode the back buffer covers. Bigger framebuffers are drawn to directly.
const BACK_BUFFER_WIDTH: usize = 1920;
const BACK_BUFFER_HEIGHT: usize = 1080;
const BACK_BUFFER_PIXELS: usize = BACK_BUFFER_WIDTH * BACK_BUFFER_HEIGHT;

#[repr(align(4096))]
struct BackBuffer([u32; BACK_BUFFER_PIXELS]);

static mut BACK_BUFFER: BackBuffer = BackBuffer([0; BACK_BUFFER_PIXELS]);
static BACK_BUFFER_TAKEN: AtomicBool = AtomicBool::new(false);

fn take_back_buffer() -> Option<&'static mut [u32]> {
    if BACK_BUFFER_TAKEN.swap(true, Ordering::AcqRel) {
        return None;
    }
    Some(unsafe { &mut (*core::ptr::addr_of_mut!(BACK_BUFFER)).0 })
}

pub type KernelDisplay = Display<LinearFramebuffer<'static>>;

pub fn negotiate(framebuffer: Option<&FrameBuffer>) -> KernelDisplay {
    let desc = FramebufferDescriptor::from_boot_framebuffer(framebuffer);
    let display = unsafe {
        // The bootloader maps the framebuffer at `desc.address`; the boot info record is
        // never used to reach it again.
        Display::negotiate(&desc, take_back_buffer())
    };

    if let Some(fb) = display.backend() {
        log::info!(
            "display: {} buffered",
            if fb.has_back_buffer() { "double" } else { "single" }
        );
    }
    display
}

//! Boot-supplied framebuffer description and the checks a backend needs before it may
//! touch that memory.

use core::fmt;

use bootloader_api::info::{FrameBuffer, PixelFormat};

/// Flags word: the framebuffer fields are valid.
pub const FLAG_FRAMEBUFFER_INFO: u32 = 1 << 12;

pub const COLOR_MODEL_INDEXED: u8 = 0;
pub const COLOR_MODEL_RGB: u8 = 1;
pub const COLOR_MODEL_EGA_TEXT: u8 = 2;
/// No multiboot equivalent; the bootloader reported a layout we can't name.
pub const COLOR_MODEL_UNKNOWN: u8 = 0xFF;

/// The only depth the linear backend writes.
pub const SUPPORTED_BPP: u8 = 32;

/// Byte order of a pixel in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    /// Red at the lowest address.
    Rgb,
    /// Blue at the lowest address (`0x00RRGGBB` as a little-endian word).
    #[default]
    Bgr,
}

/// Read-only input to backend negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferDescriptor {
    pub flags: u32,
    pub color_model: u8,
    pub bpp: u8,
    pub address: u64,
    /// Bytes per scanline
    pub pitch: u32,
    pub width: u32,
    pub height: u32,
    pub channel_order: ChannelOrder,
}

/// What a backend may rely on once a descriptor passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferLayout {
    pub address: u64,
    pub pitch: usize,
    pub width: usize,
    pub height: usize,
    pub channel_order: ChannelOrder,
}

impl FramebufferLayout {
    pub fn byte_len(&self) -> usize {
        self.pitch * self.height
    }
}

/// Why a descriptor was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    NotPresent,
    ColorModel(u8),
    Depth(u8),
    Geometry { width: u32, height: u32, pitch: u32 },
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsupported::NotPresent => write!(f, "no framebuffer info from the bootloader"),
            Unsupported::ColorModel(tag) => write!(f, "color model {} is not RGB", tag),
            Unsupported::Depth(bpp) => write!(f, "{} bits per pixel, need {}", bpp, SUPPORTED_BPP),
            Unsupported::Geometry { width, height, pitch } => {
                write!(f, "bad geometry {}x{} with pitch {}", width, height, pitch)
            }
        }
    }
}

impl FramebufferDescriptor {
    /// Descriptor for "the bootloader gave us nothing".
    pub const ABSENT: FramebufferDescriptor = FramebufferDescriptor {
        flags: 0,
        color_model: COLOR_MODEL_UNKNOWN,
        bpp: 0,
        address: 0,
        pitch: 0,
        width: 0,
        height: 0,
        channel_order: ChannelOrder::Bgr,
    };

    pub fn is_present(&self) -> bool {
        self.flags & FLAG_FRAMEBUFFER_INFO != 0
    }

    /// Accepts only a present, 32 bpp RGB framebuffer whose scanlines hold `width` pixels.
    pub fn validate(&self) -> Result<FramebufferLayout, Unsupported> {
        if !self.is_present() {
            return Err(Unsupported::NotPresent);
        }
        if self.color_model != COLOR_MODEL_RGB {
            return Err(Unsupported::ColorModel(self.color_model));
        }
        if self.bpp != SUPPORTED_BPP {
            return Err(Unsupported::Depth(self.bpp));
        }

        let bytes_per_pixel = (SUPPORTED_BPP / 8) as u64;
        if self.width == 0
            || self.height == 0
            || (self.pitch as u64) < self.width as u64 * bytes_per_pixel
        {
            return Err(Unsupported::Geometry {
                width: self.width,
                height: self.height,
                pitch: self.pitch,
            });
        }

        Ok(FramebufferLayout {
            address: self.address,
            pitch: self.pitch as usize,
            width: self.width as usize,
            height: self.height as usize,
            channel_order: self.channel_order,
        })
    }

    /// Translates the bootloader's framebuffer record.
    pub fn from_boot_framebuffer(fb: Option<&FrameBuffer>) -> Self {
        let Some(fb) = fb else {
            return Self::ABSENT;
        };
        let info = fb.info();

        let (color_model, channel_order) = match info.pixel_format {
            PixelFormat::Rgb => (COLOR_MODEL_RGB, ChannelOrder::Rgb),
            PixelFormat::Bgr => (COLOR_MODEL_RGB, ChannelOrder::Bgr),
            PixelFormat::U8 => (COLOR_MODEL_INDEXED, ChannelOrder::Bgr),
            _ => (COLOR_MODEL_UNKNOWN, ChannelOrder::Bgr),
        };

        FramebufferDescriptor {
            flags: FLAG_FRAMEBUFFER_INFO,
            color_model,
            bpp: (info.bytes_per_pixel * 8).min(u8::MAX as usize) as u8,
            address: fb.buffer().as_ptr() as u64,
            pitch: (info.stride * info.bytes_per_pixel) as u32,
            width: info.width as u32,
            height: info.height as u32,
            channel_order,
        }
    }
}

#[cfg(test)]
pub(crate) fn rgb32(width: u32, height: u32) -> FramebufferDescriptor {
    FramebufferDescriptor {
        flags: FLAG_FRAMEBUFFER_INFO,
        color_model: COLOR_MODEL_RGB,
        bpp: 32,
        address: 0xFD00_0000,
        pitch: width * 4,
        width,
        height,
        channel_order: ChannelOrder::Bgr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conforming_descriptor_validates() {
        let layout = rgb32(640, 480).validate().unwrap();
        assert_eq!(layout.width, 640);
        assert_eq!(layout.pitch, 2560);
        assert_eq!(layout.byte_len(), 2560 * 480);
    }

    #[test]
    fn test_rejections() {
        let mut desc = rgb32(640, 480);
        desc.flags &= !FLAG_FRAMEBUFFER_INFO;
        assert_eq!(desc.validate(), Err(Unsupported::NotPresent));

        let mut desc = rgb32(640, 480);
        desc.color_model = COLOR_MODEL_EGA_TEXT;
        assert_eq!(desc.validate(), Err(Unsupported::ColorModel(COLOR_MODEL_EGA_TEXT)));

        let mut desc = rgb32(640, 480);
        desc.bpp = 24;
        assert_eq!(desc.validate(), Err(Unsupported::Depth(24)));

        let mut desc = rgb32(640, 480);
        desc.pitch = 640;
        assert!(matches!(desc.validate(), Err(Unsupported::Geometry { .. })));
    }

    #[test]
    fn test_other_flag_bits_do_not_matter() {
        let mut desc = rgb32(8, 8);
        desc.flags |= 0x0000_0FFF;
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_absent_descriptor() {
        assert!(!FramebufferDescriptor::ABSENT.is_present());
        assert_eq!(FramebufferDescriptor::from_boot_framebuffer(None), FramebufferDescriptor::ABSENT);
    }
}

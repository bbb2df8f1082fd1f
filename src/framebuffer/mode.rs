// src/framebuffer/mode.rs

//! Firmware mode tables and the descriptor the mode selector consumes.
//!
//! A multiboot loader hands the kernel two VBE tables: the controller info
//! block (512 bytes) and the info block of the active mode (256 bytes).
//! Kernels booted through `bootloader_api` get a ready-made linear
//! framebuffer instead; both sources reduce to a [`ModeDescriptor`].

use crate::constants::VBE_BOOT_VERSION;
use bootloader_api::info::FrameBufferInfo;

bitflags::bitflags! {
    /// VBE mode attribute word
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModeAttributes: u16 {
        /// Mode supported by the present hardware configuration
        const SUPPORTED = 0x0001;
        /// BIOS TTY output functions available
        const TTY = 0x0004;
        /// Linear framebuffer usable by the kernel
        const LINEAR_CAPABLE = 0x0008;
        /// Graphics (not text) mode
        const GRAPHICS = 0x0010;
        /// Linear framebuffer mode available
        const LINEAR_FRAMEBUFFER = 0x0080;
    }
}

/// VBE controller information block (`4F00h`)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct VbeControllerInfo {
    pub signature: [u8; 4],
    /// BCD version, 0x0200 for VBE 2.0
    pub version: u16,
    pub oem_string_ptr: u32,
    pub capabilities: u32,
    pub video_mode_ptr: u32,
    /// Memory size in 64 KiB blocks
    pub total_memory: u16,
    pub oem_software_rev: u16,
    pub oem_vendor_name_ptr: u32,
    pub oem_product_name_ptr: u32,
    pub oem_product_rev_ptr: u32,
    pub reserved: [u8; 222],
    pub oem_data: [u8; 256],
}

/// VBE mode information block (`4F01h`)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct VbeModeInfo {
    pub attributes: u16,
    pub window_a: u8,
    pub window_b: u8,
    pub granularity: u16,
    pub window_size: u16,
    pub segment_a: u16,
    pub segment_b: u16,
    pub win_func_ptr: u32,
    /// Bytes per scanline
    pub pitch: u16,
    pub width: u16,
    pub height: u16,
    pub w_char: u8,
    pub y_char: u8,
    pub planes: u8,
    pub bpp: u8,
    pub banks: u8,
    pub memory_model: u8,
    pub bank_size: u8,
    pub image_pages: u8,
    pub reserved0: u8,
    pub red_mask: u8,
    pub red_position: u8,
    pub green_mask: u8,
    pub green_position: u8,
    pub blue_mask: u8,
    pub blue_position: u8,
    pub reserved_mask: u8,
    pub reserved_position: u8,
    pub direct_color_attributes: u8,
    /// Physical address of the linear framebuffer
    pub framebuffer: u32,
    pub off_screen_mem_off: u32,
    pub off_screen_mem_size: u16,
    pub reserved1: [u8; 206],
}

const _: () = assert!(core::mem::size_of::<VbeControllerInfo>() == 512);
const _: () = assert!(core::mem::size_of::<VbeModeInfo>() == 256);

/// What the mode selector needs to know about the boot video mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDescriptor {
    pub width: u16,
    pub height: u16,
    pub bits_per_pixel: u8,
    /// Physical address of the linear framebuffer, 0 if none
    pub framebuffer: u64,
    /// Bytes per scanline
    pub pitch: u32,
    pub attributes: ModeAttributes,
    /// BCD controller version (0x0200 = 2.0)
    pub controller_version: u16,
}

impl ModeDescriptor {
    /// Read the firmware tables.
    pub fn from_vbe(controller: &VbeControllerInfo, mode: &VbeModeInfo) -> Self {
        // Copy out of the packed structs before use; no references into them.
        let version = controller.version;
        let attributes = mode.attributes;
        let pitch = mode.pitch;
        Self {
            width: mode.width,
            height: mode.height,
            bits_per_pixel: mode.bpp,
            framebuffer: u64::from(mode.framebuffer),
            pitch: u32::from(pitch),
            attributes: ModeAttributes::from_bits_retain(attributes),
            controller_version: version,
        }
    }

    /// Read the firmware tables from the addresses a multiboot loader reports.
    ///
    /// # Safety
    ///
    /// Both pointers must reference readable, fully initialized tables.
    pub unsafe fn from_raw(
        controller: *const VbeControllerInfo,
        mode: *const VbeModeInfo,
    ) -> Self {
        // SAFETY: caller guarantees validity; unaligned reads suit packed data.
        let (controller, mode) = unsafe {
            (
                core::ptr::read_unaligned(controller),
                core::ptr::read_unaligned(mode),
            )
        };
        Self::from_vbe(&controller, &mode)
    }

    /// Describe a `bootloader_api` framebuffer located at physical `phys`.
    ///
    /// Reported as a VBE 3.0 linear mode; dimensions beyond `u16` saturate.
    pub fn from_boot_framebuffer(info: &FrameBufferInfo, phys: u64) -> Self {
        let saturate = |value: usize| u16::try_from(value).unwrap_or(u16::MAX);
        let bits_per_pixel = u8::try_from(info.bytes_per_pixel * 8).unwrap_or(0);
        let pitch = u32::try_from(info.stride * info.bytes_per_pixel).unwrap_or(u32::MAX);
        Self {
            width: saturate(info.width),
            height: saturate(info.height),
            bits_per_pixel,
            framebuffer: phys,
            pitch,
            attributes: ModeAttributes::SUPPORTED
                | ModeAttributes::LINEAR_CAPABLE
                | ModeAttributes::GRAPHICS
                | ModeAttributes::LINEAR_FRAMEBUFFER,
            controller_version: VBE_BOOT_VERSION,
        }
    }

    /// Legacy VGA text mode 0x03: no framebuffer, 80x25 cells.
    pub const fn vga_text() -> Self {
        Self {
            width: 80,
            height: 25,
            bits_per_pixel: 4,
            framebuffer: 0,
            pitch: 160,
            attributes: ModeAttributes::SUPPORTED.union(ModeAttributes::TTY),
            controller_version: 0,
        }
    }

    pub fn resolution(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// `bits_per_pixel / 8`
    pub fn bytes_per_pixel(&self) -> u8 {
        self.bits_per_pixel / 8
    }
}

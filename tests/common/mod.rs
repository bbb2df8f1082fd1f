//! Recording doubles for the mode selector's collaborators.

#![allow(dead_code)]

use tiny_display::framebuffer::{
    LegacyBios, ModeAttributes, ModeDescriptor, SurfaceDescriptor, WindowSystem,
};
use tiny_display::memory::PageMapper;
use tiny_display::MapError;
use x86_64::structures::paging::PageTableFlags;
use x86_64::{PhysAddr, VirtAddr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapCall {
    Fresh(u64, PageTableFlags),
    Identity(u64, PageTableFlags),
}

#[derive(Debug, Default)]
pub struct RecordingMapper {
    pub calls: Vec<MapCall>,
    /// Fail the call with this index
    pub fail_at: Option<(usize, MapError)>,
}

impl RecordingMapper {
    fn record(&mut self, call: MapCall) -> Result<(), MapError> {
        if let Some((index, err)) = self.fail_at {
            if index == self.calls.len() {
                return Err(err);
            }
        }
        self.calls.push(call);
        Ok(())
    }
}

impl PageMapper for RecordingMapper {
    fn map_fresh(&mut self, virt: VirtAddr, flags: PageTableFlags) -> Result<(), MapError> {
        self.record(MapCall::Fresh(virt.as_u64(), flags))
    }

    fn identity_map(&mut self, phys: PhysAddr, flags: PageTableFlags) -> Result<(), MapError> {
        self.record(MapCall::Identity(phys.as_u64(), flags))
    }
}

#[derive(Debug, Default)]
pub struct RecordingBios {
    pub modes: Vec<u8>,
}

impl LegacyBios for RecordingBios {
    fn set_text_mode(&mut self, mode: u8) {
        self.modes.push(mode);
    }
}

#[derive(Debug, Default)]
pub struct RecordingWindows {
    pub ready: Vec<SurfaceDescriptor>,
}

impl WindowSystem for RecordingWindows {
    fn graphics_ready(&mut self, surface: &SurfaceDescriptor) {
        self.ready.push(*surface);
    }
}

/// VBE 2.0 linear mode with an unpadded pitch
pub fn linear_mode(width: u16, height: u16, bits_per_pixel: u8) -> ModeDescriptor {
    ModeDescriptor {
        width,
        height,
        bits_per_pixel,
        framebuffer: 0xFD00_0000,
        pitch: u32::from(width) * u32::from(bits_per_pixel / 8),
        attributes: ModeAttributes::SUPPORTED
            | ModeAttributes::LINEAR_CAPABLE
            | ModeAttributes::GRAPHICS
            | ModeAttributes::LINEAR_FRAMEBUFFER,
        controller_version: 0x0200,
    }
}

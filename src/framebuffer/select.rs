// src/framebuffer/select.rs

//! One-shot text/graphics decision and framebuffer mapping.

use super::mode::{ModeAttributes, ModeDescriptor};
use super::surface::SurfaceDescriptor;
use crate::constants::{
    PAGE_SIZE, SUPPORTED_DEPTHS, TEXT_MODE_NUMBER, TEXT_MODE_RESOLUTION, VBE_MIN_VERSION,
};
use crate::errors::{MapError, ModeError};
use crate::memory::PageMapper;
use core::fmt;
use x86_64::structures::paging::PageTableFlags;
use x86_64::{PhysAddr, VirtAddr};

/// Legacy firmware mode switch
pub trait LegacyBios {
    /// Switch the adapter to numbered text mode `mode`.
    fn set_text_mode(&mut self, mode: u8);
}

/// Receiver of the one-time "graphics ready" signal
pub trait WindowSystem {
    fn graphics_ready(&mut self, surface: &SurfaceDescriptor);
}

/// Why a mode cannot drive the graphics backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    NoFramebuffer,
    /// Controller older than VBE 2.0
    ControllerVersion(u16),
    NoLinearFramebuffer,
    Depth(u8),
    /// Scanline shorter than one row of pixels
    Pitch { pitch: u32, required: u32 },
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsupported::NoFramebuffer => f.write_str("no framebuffer address"),
            Unsupported::ControllerVersion(version) => {
                write!(f, "VBE controller version {:#06x} below 2.0", version)
            }
            Unsupported::NoLinearFramebuffer => f.write_str("linear framebuffer not supported"),
            Unsupported::Depth(bpp) => write!(f, "unsupported depth {} bpp", bpp),
            Unsupported::Pitch { pitch, required } => {
                write!(f, "pitch {} shorter than row of {} bytes", pitch, required)
            }
        }
    }
}

/// Text mode stays active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFallback {
    pub reason: Unsupported,
    /// Whether the BIOS was asked to switch to text mode 0x03
    pub bios_switch_issued: bool,
}

/// Outcome of mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSelection {
    Graphics(SurfaceDescriptor),
    Text(TextFallback),
}

impl ModeSelection {
    pub fn surface(&self) -> Option<&SurfaceDescriptor> {
        match self {
            ModeSelection::Graphics(surface) => Some(surface),
            ModeSelection::Text(_) => None,
        }
    }

    pub fn is_text_mode(&self) -> bool {
        matches!(self, ModeSelection::Text(_))
    }
}

/// Check `mode` against what the graphics backend can drive.
///
/// # Errors
///
/// The first failing condition, in this order: framebuffer address,
/// controller version, linear framebuffer bit, depth, pitch.
pub fn probe(mode: &ModeDescriptor) -> Result<SurfaceDescriptor, Unsupported> {
    if mode.framebuffer == 0 {
        return Err(Unsupported::NoFramebuffer);
    }
    if mode.controller_version < VBE_MIN_VERSION {
        return Err(Unsupported::ControllerVersion(mode.controller_version));
    }
    if !mode.attributes.contains(ModeAttributes::LINEAR_CAPABLE) {
        return Err(Unsupported::NoLinearFramebuffer);
    }
    if !SUPPORTED_DEPTHS.contains(&mode.bits_per_pixel) {
        return Err(Unsupported::Depth(mode.bits_per_pixel));
    }
    let required = u32::from(mode.width) * u32::from(mode.bytes_per_pixel());
    if mode.pitch < required {
        return Err(Unsupported::Pitch {
            pitch: mode.pitch,
            required,
        });
    }
    Ok(SurfaceDescriptor::from_mode(mode))
}

/// Ask the BIOS for text mode unless the mode is already text-sized.
///
/// Only an exact 80x25 resolution skips the switch; a mode matching one
/// dimension (80x30, 100x25) still switches.
fn force_text_mode<B: LegacyBios + ?Sized>(mode: &ModeDescriptor, bios: &mut B) -> bool {
    if mode.resolution() == TEXT_MODE_RESOLUTION {
        return false;
    }
    bios.set_text_mode(TEXT_MODE_NUMBER);
    true
}

/// Map every page of both buffers: back page first, then front page.
fn map_surface<P: PageMapper + ?Sized>(
    surface: &SurfaceDescriptor,
    mapper: &mut P,
) -> Result<(), ModeError> {
    let flags = PageTableFlags::PRESENT | PageTableFlags::WRITABLE;
    let fail = |page: u64| move |source: MapError| ModeError::MappingFailed { page, source };

    for index in 0..surface.page_count() {
        let offset = index * PAGE_SIZE;
        let back = VirtAddr::try_new(surface.back_base + offset)
            .map_err(|_| fail(offset)(MapError::InvalidAddress))?;
        let front = PhysAddr::try_new(surface.front_page_base() + offset)
            .map_err(|_| fail(offset)(MapError::InvalidAddress))?;

        log::trace!("mapping framebuffer page {:#x}", offset);
        mapper.map_fresh(back, flags).map_err(fail(offset))?;
        mapper.identity_map(front, flags).map_err(fail(offset))?;
    }
    Ok(())
}

/// Decide between text and graphics mode and prepare the chosen backend.
///
/// Unsupported modes are not errors: they yield [`ModeSelection::Text`],
/// and `mapper` is never called. A supported mode has its front buffer
/// identity mapped and its back buffer backed by fresh frames, after which
/// `windows` is told graphics is ready.
///
/// # Errors
///
/// [`ModeError::MappingFailed`] if a page cannot be mapped. Text mode is
/// forced through `bios` before returning so the screen stays usable.
pub fn init_graphics<P, B, W>(
    mode: &ModeDescriptor,
    mapper: &mut P,
    bios: &mut B,
    windows: &mut W,
) -> Result<ModeSelection, ModeError>
where
    P: PageMapper + ?Sized,
    B: LegacyBios + ?Sized,
    W: WindowSystem + ?Sized,
{
    let surface = match probe(mode) {
        Ok(surface) => surface,
        Err(reason) => {
            let bios_switch_issued = force_text_mode(mode, bios);
            log::warn!(
                "graphics unsupported ({}), staying in text mode{}",
                reason,
                if bios_switch_issued { " via BIOS mode 0x03" } else { "" }
            );
            return Ok(ModeSelection::Text(TextFallback {
                reason,
                bios_switch_issued,
            }));
        }
    };

    log::info!(
        "graphics mode {}x{}x{} pitch {} front {:#x} back {:#x}",
        surface.xres,
        surface.yres,
        surface.bits_per_pixel,
        surface.pitch,
        surface.front_base,
        surface.back_base
    );

    if let Err(err) = map_surface(&surface, mapper) {
        log::error!("{}", err);
        force_text_mode(mode, bios);
        return Err(err);
    }

    windows.graphics_ready(&surface);
    Ok(ModeSelection::Graphics(surface))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Fresh(u64),
        Identity(u64),
    }

    #[derive(Default)]
    struct RecordingMapper {
        calls: Vec<Call>,
        fail_at: Option<usize>,
    }

    impl RecordingMapper {
        fn record(&mut self, call: Call) -> Result<(), MapError> {
            if self.fail_at == Some(self.calls.len()) {
                return Err(MapError::FrameAllocationFailed);
            }
            self.calls.push(call);
            Ok(())
        }
    }

    impl PageMapper for RecordingMapper {
        fn map_fresh(&mut self, virt: VirtAddr, _flags: PageTableFlags) -> Result<(), MapError> {
            self.record(Call::Fresh(virt.as_u64()))
        }

        fn identity_map(&mut self, phys: PhysAddr, _flags: PageTableFlags) -> Result<(), MapError> {
            self.record(Call::Identity(phys.as_u64()))
        }
    }

    #[derive(Default)]
    struct RecordingBios {
        modes: Vec<u8>,
    }

    impl LegacyBios for RecordingBios {
        fn set_text_mode(&mut self, mode: u8) {
            self.modes.push(mode);
        }
    }

    #[derive(Default)]
    struct RecordingWindows {
        ready: Vec<SurfaceDescriptor>,
    }

    impl WindowSystem for RecordingWindows {
        fn graphics_ready(&mut self, surface: &SurfaceDescriptor) {
            self.ready.push(*surface);
        }
    }

    fn linear_mode(width: u16, height: u16, bpp: u8) -> ModeDescriptor {
        ModeDescriptor {
            width,
            height,
            bits_per_pixel: bpp,
            framebuffer: 0xFD00_0000,
            pitch: u32::from(width) * u32::from(bpp / 8),
            attributes: ModeAttributes::SUPPORTED
                | ModeAttributes::LINEAR_CAPABLE
                | ModeAttributes::GRAPHICS,
            controller_version: 0x0200,
        }
    }

    fn run(
        mode: &ModeDescriptor,
        mapper: &mut RecordingMapper,
    ) -> (Result<ModeSelection, ModeError>, RecordingBios, RecordingWindows) {
        let mut bios = RecordingBios::default();
        let mut windows = RecordingWindows::default();
        let result = init_graphics(mode, mapper, &mut bios, &mut windows);
        (result, bios, windows)
    }

    #[test]
    fn test_probe_order() {
        let mut mode = linear_mode(640, 480, 16);
        mode.framebuffer = 0;
        mode.controller_version = 0x0102;
        assert_eq!(probe(&mode), Err(Unsupported::NoFramebuffer));
        mode.framebuffer = 0xE000_0000;
        assert_eq!(probe(&mode), Err(Unsupported::ControllerVersion(0x0102)));
        mode.controller_version = 0x0300;
        mode.attributes = ModeAttributes::SUPPORTED | ModeAttributes::LINEAR_FRAMEBUFFER;
        assert_eq!(probe(&mode), Err(Unsupported::NoLinearFramebuffer));
        mode.attributes |= ModeAttributes::LINEAR_CAPABLE;
        assert_eq!(probe(&mode), Err(Unsupported::Depth(16)));
        mode.bits_per_pixel = 32;
        assert_eq!(
            probe(&mode),
            Err(Unsupported::Pitch {
                pitch: 1280,
                required: 2560
            })
        );
        mode.pitch = 2560;
        assert!(probe(&mode).is_ok());
    }

    #[test]
    fn test_no_framebuffer_stays_in_text_mode() {
        let mut mode = linear_mode(1024, 768, 32);
        mode.framebuffer = 0;
        let mut mapper = RecordingMapper::default();
        let (result, bios, windows) = run(&mode, &mut mapper);

        let selection = result.expect("fallback is not an error");
        assert!(selection.is_text_mode());
        assert_eq!(
            selection,
            ModeSelection::Text(TextFallback {
                reason: Unsupported::NoFramebuffer,
                bios_switch_issued: true
            })
        );
        assert!(mapper.calls.is_empty());
        assert_eq!(bios.modes, vec![TEXT_MODE_NUMBER]);
        assert!(windows.ready.is_empty());
    }

    #[test]
    fn test_text_sized_mode_skips_bios_switch() {
        let mut mode = linear_mode(80, 25, 32);
        mode.controller_version = 0x0100;
        let mut mapper = RecordingMapper::default();
        let (result, bios, _) = run(&mode, &mut mapper);

        match result {
            Ok(ModeSelection::Text(fallback)) => assert!(!fallback.bios_switch_issued),
            other => panic!("unexpected {:?}", other),
        }
        assert!(bios.modes.is_empty());
    }

    #[test]
    fn test_width_match_alone_still_switches() {
        let mut mode = linear_mode(80, 30, 32);
        mode.framebuffer = 0;
        let mut mapper = RecordingMapper::default();
        let (_, bios, _) = run(&mode, &mut mapper);
        assert_eq!(bios.modes, vec![TEXT_MODE_NUMBER]);

        let mut mode = linear_mode(100, 25, 32);
        mode.framebuffer = 0;
        let (_, bios, _) = run(&mode, &mut mapper);
        assert_eq!(bios.modes, vec![TEXT_MODE_NUMBER]);
        assert!(mapper.calls.is_empty());
    }

    #[test]
    fn test_supported_mode_maps_back_then_front() {
        // 100 x 25 x 32bpp = 10000 bytes -> 3 pages, the last one partial
        let mode = linear_mode(100, 25, 32);
        let mut mapper = RecordingMapper::default();
        let (result, bios, windows) = run(&mode, &mut mapper);

        let surface = *result.expect("mapping succeeds").surface().expect("graphics");
        assert_eq!(surface.size_bytes, 100 * 25 * 4);
        assert_eq!(surface.back_base, 0xFD00_3000);
        let expected: Vec<Call> = (0..3u64)
            .flat_map(|i| {
                [
                    Call::Fresh(surface.back_base + i * PAGE_SIZE),
                    Call::Identity(surface.front_base + i * PAGE_SIZE),
                ]
            })
            .collect();
        assert_eq!(mapper.calls, expected);
        assert!(bios.modes.is_empty());
        assert_eq!(windows.ready, vec![surface]);
    }

    #[test]
    fn test_mapping_failure_forces_text_mode() {
        let mode = linear_mode(1024, 768, 32);
        let mut mapper = RecordingMapper {
            fail_at: Some(3),
            ..Default::default()
        };
        let (result, bios, windows) = run(&mode, &mut mapper);

        assert_eq!(
            result,
            Err(ModeError::MappingFailed {
                page: PAGE_SIZE,
                source: MapError::FrameAllocationFailed
            })
        );
        assert_eq!(mapper.calls.len(), 3);
        assert_eq!(bios.modes, vec![TEXT_MODE_NUMBER]);
        assert!(windows.ready.is_empty());
    }
}

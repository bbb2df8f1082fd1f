// src/memory/frame.rs

//! Physical frame allocation from the bootloader memory map.

use bootloader_api::info::{MemoryRegionKind, MemoryRegions};
use x86_64::structures::paging::{FrameAllocator, PhysFrame, Size4KiB};
use x86_64::PhysAddr;

/// Bump allocator over the usable regions of the boot memory map.
///
/// Frames are never returned. Backing the framebuffer's back buffer is a
/// one-time boot allocation, so nothing more is needed.
#[derive(Debug)]
pub struct BootInfoFrameAllocator {
    memory_map: &'static MemoryRegions,
    next: usize,
}

impl BootInfoFrameAllocator {
    /// # Safety
    ///
    /// Every region marked usable must really be unused, and only one
    /// allocator may be created from the same map.
    pub unsafe fn init(memory_map: &'static MemoryRegions) -> Self {
        debug_assert!(memory_map.iter().all(|region| region.start <= region.end));
        Self {
            memory_map,
            next: 0,
        }
    }

    fn usable_frames(&self) -> impl Iterator<Item = PhysFrame> + '_ {
        self.memory_map
            .iter()
            .filter(|region| region.kind == MemoryRegionKind::Usable && region.end > region.start)
            .flat_map(|region| {
                let start = PhysFrame::containing_address(PhysAddr::new(region.start));
                let end = PhysFrame::containing_address(PhysAddr::new(region.end - 1));
                PhysFrame::range_inclusive(start, end)
            })
    }

    /// Frames handed out so far
    pub fn allocated(&self) -> usize {
        self.next
    }
}

// SAFETY: only frames from usable regions are returned, each at most once.
unsafe impl FrameAllocator<Size4KiB> for BootInfoFrameAllocator {
    fn allocate_frame(&mut self) -> Option<PhysFrame<Size4KiB>> {
        let frame = self.usable_frames().nth(self.next);
        if frame.is_some() {
            self.next += 1;
        }
        frame
    }
}

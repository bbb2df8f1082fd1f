// src/memory/paging.rs

//! Page mapping seam used by the mode selector.

use crate::errors::MapError;
use x86_64::structures::paging::mapper::{MapToError, MapperFlush};
use x86_64::structures::paging::{
    FrameAllocator, Mapper, Page, PageSize, PageTableFlags, PhysFrame, Size4KiB,
};
use x86_64::{PhysAddr, VirtAddr};

/// Maps single 4 KiB pages on behalf of the display subsystem.
pub trait PageMapper {
    /// Map the page at `virt` to a newly allocated frame.
    fn map_fresh(&mut self, virt: VirtAddr, flags: PageTableFlags) -> Result<(), MapError>;

    /// Map the frame at `phys` at the same virtual address.
    ///
    /// An existing mapping to that same frame is accepted.
    fn identity_map(&mut self, phys: PhysAddr, flags: PageTableFlags) -> Result<(), MapError>;
}

impl From<MapToError<Size4KiB>> for MapError {
    fn from(err: MapToError<Size4KiB>) -> Self {
        match err {
            MapToError::FrameAllocationFailed => MapError::FrameAllocationFailed,
            MapToError::ParentEntryHugePage => MapError::HugePageConflict,
            MapToError::PageAlreadyMapped(_) => MapError::AlreadyMapped,
        }
    }
}

/// [`PageMapper`] over the `x86_64` crate's page table types.
pub struct X86PageMapper<'a, M, A> {
    mapper: &'a mut M,
    frames: &'a mut A,
}

impl<'a, M, A> X86PageMapper<'a, M, A>
where
    M: Mapper<Size4KiB>,
    A: FrameAllocator<Size4KiB>,
{
    pub fn new(mapper: &'a mut M, frames: &'a mut A) -> Self {
        Self { mapper, frames }
    }
}

impl<M, A> core::fmt::Debug for X86PageMapper<'_, M, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("X86PageMapper").finish_non_exhaustive()
    }
}

impl<M, A> PageMapper for X86PageMapper<'_, M, A>
where
    M: Mapper<Size4KiB>,
    A: FrameAllocator<Size4KiB>,
{
    fn map_fresh(&mut self, virt: VirtAddr, flags: PageTableFlags) -> Result<(), MapError> {
        let page = Page::<Size4KiB>::from_start_address(virt)
            .map_err(|_| MapError::InvalidAddress)?;
        let frame = self
            .frames
            .allocate_frame()
            .ok_or(MapError::FrameAllocationFailed)?;

        // SAFETY: the frame was just allocated and is referenced nowhere else.
        let flush = unsafe { self.mapper.map_to(page, frame, flags, &mut *self.frames) }?;
        flush_tlb(flush);
        Ok(())
    }

    fn identity_map(&mut self, phys: PhysAddr, flags: PageTableFlags) -> Result<(), MapError> {
        let frame = PhysFrame::<Size4KiB>::from_start_address(phys)
            .map_err(|_| MapError::InvalidAddress)?;
        let page = Page::<Size4KiB>::from_start_address(
            VirtAddr::try_new(phys.as_u64()).map_err(|_| MapError::InvalidAddress)?,
        )
        .map_err(|_| MapError::InvalidAddress)?;

        // SAFETY: the frame is device memory; aliasing it at its own address
        // does not invalidate any existing reference.
        match unsafe { self.mapper.map_to(page, frame, flags, &mut *self.frames) } {
            Ok(flush) => {
                flush_tlb(flush);
                Ok(())
            }
            Err(MapToError::PageAlreadyMapped(existing)) if existing == frame => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(target_os = "none")]
fn flush_tlb<S: PageSize>(flush: MapperFlush<S>) {
    flush.flush();
}

// `invlpg` is privileged; hosted page tables are never loaded into CR3.
#[cfg(not(target_os = "none"))]
fn flush_tlb<S: PageSize>(flush: MapperFlush<S>) {
    flush.ignore();
}

/// Build an [`OffsetPageTable`] over the active level 4 table.
///
/// # Safety
///
/// All physical memory must be mapped at `physical_memory_offset`, and this
/// must be called only once so the returned table is the sole `&mut` alias.
#[cfg(target_os = "none")]
pub unsafe fn init(
    physical_memory_offset: VirtAddr,
) -> x86_64::structures::paging::OffsetPageTable<'static> {
    use x86_64::structures::paging::{OffsetPageTable, PageTable};

    let (level_4_frame, _) = x86_64::registers::control::Cr3::read();
    let table_ptr: *mut PageTable =
        (physical_memory_offset + level_4_frame.start_address().as_u64()).as_mut_ptr();
    // SAFETY: guaranteed by the caller.
    unsafe { OffsetPageTable::new(&mut *table_ptr, physical_memory_offset) }
}

// src/memory/mod.rs

//! Paging and frame allocation for framebuffer setup.
//!
//! The mode selector only sees the [`PageMapper`] trait; [`X86PageMapper`]
//! backs it with the `x86_64` crate's page tables and a frame allocator.

pub mod frame;
pub mod paging;

pub use frame::BootInfoFrameAllocator;
pub use paging::{PageMapper, X86PageMapper};

#[cfg(target_os = "none")]
pub use paging::init;

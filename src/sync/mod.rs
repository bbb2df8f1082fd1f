// src/sync/mod.rs

//! Synchronization helpers
//!
//! Every global display lock (console, back buffer, serial port) is taken
//! inside an interrupt-masked critical section so an interrupt handler that
//! prints or draws cannot deadlock against the code it interrupted.

pub mod interrupt;

pub use interrupt::{without_interrupts, ArchInterrupts, InterruptController};

// src/errors/mod.rs

//! Error handling for the display subsystem
//!
//! Every fallible display operation reports one of the small `Copy` enums
//! defined in [`unified`]; [`DisplayError`] wraps them for callers that
//! only need a single error type.

pub mod unified;

pub use unified::{DisplayError, DrawError, ErrorContext, MapError, ModeError, Result};

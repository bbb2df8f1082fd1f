// src/task/mod.rs

//! Cooperative task runtime the refresh loop is scheduled on.

pub mod executor;
pub mod yield_now;

pub use executor::{Executor, TaskId};
pub use yield_now::{yield_now, Yield};

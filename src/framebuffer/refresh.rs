// src/framebuffer/refresh.rs

//! Per-frame compose-and-publish task.
//!
//! Each frame runs in one critical section that holds the back buffer
//! lock: the compositor paints, the back buffer is copied to the front
//! buffer, and the frame clock advances. Direct drawing calls take the same
//! lock, so they land either wholly before or wholly after a publish.

use super::surface::{Canvas, FrontBuffer};
use crate::task::yield_now;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use spin::Mutex;

/// Fills the back buffer with desktop content once per frame.
pub trait Compositor {
    fn paint_desktop(&mut self, canvas: &mut Canvas<'_>);
}

/// Count of frames published so far
#[derive(Debug, Default)]
pub struct FrameClock {
    generation: AtomicU64,
}

impl FrameClock {
    pub const fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Republishes the back buffer until asked to stop.
pub struct RefreshLoop<'a, 'b, C> {
    back: &'a Mutex<Canvas<'b>>,
    front: FrontBuffer<'a>,
    compositor: C,
    clock: &'a FrameClock,
    stop: &'a AtomicBool,
}

impl<'a, 'b, C: Compositor> RefreshLoop<'a, 'b, C> {
    pub fn new(
        back: &'a Mutex<Canvas<'b>>,
        front: FrontBuffer<'a>,
        compositor: C,
        clock: &'a FrameClock,
        stop: &'a AtomicBool,
    ) -> Self {
        Self {
            back,
            front,
            compositor,
            clock,
            stop,
        }
    }

    /// Paint and publish one frame; returns its generation.
    pub fn refresh_once(&mut self) -> u64 {
        crate::sync::without_interrupts(|| {
            let mut back = self.back.lock();
            self.compositor.paint_desktop(&mut back);
            self.front.publish(&back);
            self.clock.advance()
        })
    }

    /// Refresh forever, yielding between frames, until the stop flag is set.
    pub async fn run(mut self) {
        log::info!("refresh loop started");
        while !self.stop.load(Ordering::Acquire) {
            let generation = self.refresh_once();
            log::trace!("published frame {}", generation);
            yield_now().await;
        }
        log::info!("refresh loop stopped after {} frames", self.clock.generation());
    }
}

impl<C> fmt::Debug for RefreshLoop<'_, '_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshLoop")
            .field("front", &self.front)
            .field("clock", &self.clock)
            .field("stop", &self.stop)
            .finish_non_exhaustive()
    }
}

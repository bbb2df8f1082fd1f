//! Interrupt controller abstraction.

/// A trait for controlling CPU interrupts.
///
/// This trait abstracts over the hardware-specific details of enabling and
/// disabling interrupts.
pub trait InterruptController {
    /// Run `f` with interrupts disabled, restoring the previous state after.
    fn without_interrupts<F, R>(f: F) -> R
    where
        F: FnOnce() -> R;
}

/// An implementation of `InterruptController` for the x86_64 architecture.
#[derive(Debug)]
pub struct X64InterruptController;

impl InterruptController for X64InterruptController {
    fn without_interrupts<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        x86_64::instructions::interrupts::without_interrupts(f)
    }
}

/// Hosted builds run in user mode where `cli` faults; there is nothing to mask.
#[derive(Debug)]
pub struct HostedInterruptController;

impl InterruptController for HostedInterruptController {
    fn without_interrupts<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        f()
    }
}

#[cfg(target_os = "none")]
pub type ArchInterrupts = X64InterruptController;

#[cfg(not(target_os = "none"))]
pub type ArchInterrupts = HostedInterruptController;

/// Run `f` inside a critical section of the current architecture.
#[inline]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    ArchInterrupts::without_interrupts(f)
}

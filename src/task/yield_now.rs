// src/task/yield_now.rs

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

/// Future that is pending exactly once, re-queueing its task.
#[derive(Debug, Default)]
pub struct Yield {
    yielded: bool,
}

impl Future for Yield {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Give the other queued tasks a turn.
pub fn yield_now() -> Yield {
    Yield::default()
}

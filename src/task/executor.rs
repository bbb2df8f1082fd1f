// src/task/executor.rs

//! Run-to-idle executor for cooperative kernel tasks.
//!
//! Woken tasks are queued by id; [`Executor::run`] polls queued tasks until
//! the queue drains. A task that yields re-queues itself, so `run` returns
//! only once every task has finished or is waiting on an outside wake.

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, VecDeque};
use alloc::sync::Arc;
use alloc::task::Wake;
use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicU64, Ordering};
use core::task::{Context, Poll, Waker};
use spin::Mutex;

struct Task {
    future: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl Task {
    fn new(future: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            future: Box::pin(future),
        }
    }

    fn poll(&mut self, context: &mut Context<'_>) -> Poll<()> {
        self.future.as_mut().poll(context)
    }
}

/// Identifier handed out by [`Executor::spawn`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskId(u64);

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(0);

impl TaskId {
    fn new() -> Self {
        Self(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type TaskQueue = Arc<Mutex<VecDeque<TaskId>>>;

struct TaskWaker {
    task_id: TaskId,
    queue: TaskQueue,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.queue.lock().push_back(self.task_id);
    }
}

/// Cooperative executor
pub struct Executor {
    task_queue: TaskQueue,
    tasks: Mutex<BTreeMap<TaskId, Task>>,
}

impl Executor {
    pub fn new() -> Self {
        Self {
            task_queue: Arc::new(Mutex::new(VecDeque::new())),
            tasks: Mutex::new(BTreeMap::new()),
        }
    }

    /// Queue `future` for its first poll.
    pub fn spawn(&self, future: impl Future<Output = ()> + Send + 'static) -> TaskId {
        let task_id = TaskId::new();
        self.tasks.lock().insert(task_id, Task::new(future));
        self.task_queue.lock().push_back(task_id);
        task_id
    }

    /// Poll queued tasks until the queue is empty.
    pub fn run(&self) {
        loop {
            let Some(task_id) = self.task_queue.lock().pop_front() else {
                break;
            };

            // Stale wake for a task that already finished.
            let Some(mut task) = self.tasks.lock().remove(&task_id) else {
                continue;
            };

            let waker = Waker::from(Arc::new(TaskWaker {
                task_id,
                queue: Arc::clone(&self.task_queue),
            }));
            let mut context = Context::from_waker(&waker);

            if task.poll(&mut context).is_pending() {
                self.tasks.lock().insert(task_id, task);
            }
        }
    }

    /// Tasks spawned and not yet finished
    pub fn task_count(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Executor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Executor")
            .field("tasks", &self.task_count())
            .field("queued", &self.task_queue.lock().len())
            .finish()
    }
}

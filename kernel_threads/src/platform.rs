//! Collaborator interfaces consumed by the thread core
//!
//! Task management, device queues, and resource ownership live outside
//! this crate. The core reaches them only through the traits below, which
//! a platform (simulated or real) implements as one bundle.

use core_types::{PageTableId, Priority, TaskId, ThreadId};
use hal::{IntervalTimer, MmuHal};
use thiserror::Error;

/// Errors surfaced by task-side thread registration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The task is not known to the registry
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// The task refused the thread (its own limit, or a count race)
    #[error("Thread registration rejected by task {0}")]
    RegistrationRejected(TaskId),
}

/// Task-side bookkeeping the core relies on
///
/// The registry owns task lifetimes. The core never invents task state;
/// it registers and unregisters threads, reads counts, and maintains each
/// task's current-thread pointer as threads move on and off the processor.
pub trait TaskRegistry {
    /// Registers a thread with its owning task; the task may refuse
    fn add_thread(&mut self, task: TaskId, thread: ThreadId) -> Result<(), TaskError>;

    /// Unregisters a thread from its owning task
    fn remove_thread(&mut self, task: TaskId, thread: ThreadId);

    /// Number of live threads registered with the task
    fn thread_count(&self, task: TaskId) -> usize;

    /// The task's current thread, if one is on the processor
    fn current_thread(&self, task: TaskId) -> Option<ThreadId>;

    /// Records (or clears) the task's current thread
    fn set_current_thread(&mut self, task: TaskId, current: Option<ThreadId>);

    /// The task's advisory priority
    fn task_priority(&self, task: TaskId) -> Priority;

    /// The task's page table, or `None` for an unknown task
    fn page_table(&self, task: TaskId) -> Option<PageTableId>;

    /// Tears the task down once its last thread is gone
    fn kill_task(&mut self, task: TaskId);
}

/// The system's device table
///
/// Devices queue I/O requests on behalf of threads; killing a thread must
/// purge its pending requests from every device queue. Finding and
/// cancelling the requests is each device's responsibility.
pub trait DeviceTable {
    /// Number of devices in the table
    fn device_count(&self) -> usize;

    /// Cancels every pending request the thread has on one device
    fn cancel_pending_requests(&mut self, device: usize, thread: ThreadId);
}

/// Resource ownership release
pub trait ResourceReclaim {
    /// Releases every resource the thread holds
    fn release_all_resources(&mut self, thread: ThreadId);
}

/// The full collaborator surface, as one bundle
///
/// Every mutating operation of the thread core takes one `&mut impl
/// Platform`; the design assumes operations run to completion one at a
/// time, so a host that is genuinely concurrent must serialize access to
/// the platform and the manager together.
pub trait Platform: TaskRegistry + DeviceTable + ResourceReclaim + MmuHal + IntervalTimer {}

impl<T> Platform for T where T: TaskRegistry + DeviceTable + ResourceReclaim + MmuHal + IntervalTimer {}

//! Thread control block

use crate::status::ThreadStatus;
use core_types::{PageTableId, Priority, TaskId, ThreadId};
use serde::{Deserialize, Serialize};

/// Per-thread bookkeeping owned by the thread manager
///
/// A thread belongs to exactly one task for its whole lifetime. The
/// owning task's page table is captured at creation so dispatch can load
/// the page-table register without a registry round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadControlBlock {
    /// The thread's unique identifier
    pub id: ThreadId,
    /// The owning task
    pub task: TaskId,
    /// The owning task's page table
    pub page_table: PageTableId,
    /// Current life-cycle status
    pub status: ThreadStatus,
    /// Advisory priority, copied from the task at creation; never
    /// consulted by dispatch
    pub priority: Priority,
}

impl ThreadControlBlock {
    /// Allocates a control block in the `Created` state
    pub fn new(task: TaskId, page_table: PageTableId, priority: Priority) -> Self {
        Self {
            id: ThreadId::new(),
            task,
            page_table,
            status: ThreadStatus::Created,
            priority,
        }
    }
}

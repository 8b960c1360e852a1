//! Page-table register abstraction
//!
//! The MMU's page-table register is the single source of truth for which
//! task (and hence which thread) currently owns the processor. The thread
//! core loads it on dispatch and clears it when the processor goes idle.

use core_types::{PageTableId, TaskId};
use serde::{Deserialize, Serialize};

/// Contents of the page-table register
///
/// The handle carries the owning task alongside the table identity so the
/// register can be walked back to the task's current thread without a
/// reverse lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTableHandle {
    /// The page table loaded into the register
    pub table: PageTableId,
    /// The task that owns the page table
    pub task: TaskId,
}

impl PageTableHandle {
    pub fn new(table: PageTableId, task: TaskId) -> Self {
        Self { table, task }
    }
}

/// MMU page-table register operations
///
/// An empty register (`None`) means the processor is idle. Readers must
/// treat every step of the walk from register to running thread as
/// fallible; a stale or empty register is an expected state, not a fault.
pub trait MmuHal {
    /// Loads the register, or clears it with `None`
    fn set_active_page_table(&mut self, handle: Option<PageTableHandle>);

    /// Returns the current register contents
    fn active_page_table(&self) -> Option<PageTableHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestMmu {
        register: Option<PageTableHandle>,
    }

    impl MmuHal for TestMmu {
        fn set_active_page_table(&mut self, handle: Option<PageTableHandle>) {
            self.register = handle;
        }

        fn active_page_table(&self) -> Option<PageTableHandle> {
            self.register
        }
    }

    #[test]
    fn test_register_starts_loadable_and_clearable() {
        let mut mmu = TestMmu { register: None };
        assert_eq!(mmu.active_page_table(), None);

        let handle = PageTableHandle::new(PageTableId::new(), TaskId::new());
        mmu.set_active_page_table(Some(handle));
        assert_eq!(mmu.active_page_table(), Some(handle));

        mmu.set_active_page_table(None);
        assert_eq!(mmu.active_page_table(), None);
    }
}

//! Thread life-cycle manager and dispatcher
//!
//! Every mutating operation (create, kill, suspend, resume) funnels into
//! [`ThreadManager::dispatch`], the single convergence point that
//! re-establishes the "at most one running thread" invariant after any
//! state change.

use crate::event::Event;
use crate::platform::Platform;
use crate::ready_queue::ReadyQueue;
use crate::status::ThreadStatus;
use crate::thread::ThreadControlBlock;
use core_types::{TaskId, ThreadId};
use hal::PageTableHandle;
use serde::{Deserialize, Serialize};
use services_logger::{DiagnosticsLog, LogEntry, LogLevel};
use std::collections::HashMap;

/// Outcome of a dispatch step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchOutcome {
    /// A thread occupies the processor (retained or newly selected)
    Running(ThreadId),
    /// No runnable work exists; the page-table register has been cleared
    Idle,
}

impl DispatchOutcome {
    pub fn is_running(&self) -> bool {
        matches!(self, DispatchOutcome::Running(_))
    }
}

/// Scheduling decision recorded for the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchEvent {
    /// A thread was taken from the ready queue and put on the processor
    ThreadSelected { thread: ThreadId },
    /// Dispatch found no runnable thread and idled the processor
    ProcessorIdle,
}

/// Thread manager configuration
#[derive(Debug, Clone)]
pub struct ThreadManagerConfig {
    /// Maximum number of live threads a single task may hold
    pub max_threads_per_task: usize,
}

impl Default for ThreadManagerConfig {
    fn default() -> Self {
        Self {
            max_threads_per_task: 10,
        }
    }
}

/// Single-processor thread life-cycle manager and dispatcher
///
/// Owns the thread table and the one global ready queue. The processor
/// itself is represented by the platform's page-table register: the
/// register is the source of truth for "who is running", not a flag on
/// the thread.
///
/// Operations assume run-to-completion semantics: no operation suspends
/// internally, and no two operations run concurrently. A concurrent host
/// must serialize access to the manager and its platform together.
pub struct ThreadManager {
    config: ThreadManagerConfig,
    threads: HashMap<ThreadId, ThreadControlBlock>,
    ready_queue: ReadyQueue,
    /// Audit log for scheduling decisions (test-only)
    audit_log: Vec<DispatchEvent>,
    diagnostics: DiagnosticsLog,
}

impl ThreadManager {
    /// Creates a manager with default configuration
    pub fn new() -> Self {
        Self::with_config(ThreadManagerConfig::default())
    }

    /// Creates a manager with custom configuration
    pub fn with_config(config: ThreadManagerConfig) -> Self {
        Self {
            config,
            threads: HashMap::new(),
            ready_queue: ReadyQueue::new(),
            audit_log: Vec::new(),
            diagnostics: DiagnosticsLog::new(),
        }
    }

    /// Resets the manager to its initial state
    ///
    /// Empties the thread table, the ready queue, the audit log and the
    /// diagnostics log, so one manager can be reused across simulation
    /// runs. The platform's register is not touched; reset it separately
    /// if the platform outlives the run.
    pub fn reset(&mut self) {
        self.threads.clear();
        self.ready_queue.clear();
        self.audit_log.clear();
        self.diagnostics.clear();
    }

    /// Sets up a new thread belonging to `task`
    ///
    /// Fails (returning `None`) when `task` is `None`, when the task is
    /// unknown, when the task already holds the configured maximum number
    /// of threads, or when the task independently refuses registration.
    /// Every path, including the failure paths, triggers a re-dispatch;
    /// on success the new thread joins the tail of the ready queue and
    /// may be put on the processor immediately if it was idle.
    pub fn create<P: Platform>(
        &mut self,
        task: Option<TaskId>,
        platform: &mut P,
    ) -> Option<ThreadId> {
        let Some(task) = task else {
            self.dispatch(platform);
            return None;
        };
        let Some(page_table) = platform.page_table(task) else {
            self.dispatch(platform);
            return None;
        };
        if platform.thread_count(task) >= self.config.max_threads_per_task {
            self.dispatch(platform);
            return None;
        }

        let mut tcb = ThreadControlBlock::new(task, page_table, platform.task_priority(task));
        let thread = tcb.id;
        if platform.add_thread(task, thread).is_err() {
            self.dispatch(platform);
            return None;
        }

        tcb.status = ThreadStatus::Ready;
        self.threads.insert(thread, tcb);
        self.ready_queue.enqueue(thread);
        self.dispatch(platform);
        Some(thread)
    }

    /// Kills a thread in any non-terminal state
    ///
    /// Removes it from the ready queue or off the processor as its status
    /// requires, unregisters it from its task, purges its pending I/O
    /// from every device, releases its resources, re-dispatches, and
    /// finally tears the owning task down if this was its last thread.
    pub fn kill<P: Platform>(&mut self, thread: ThreadId, platform: &mut P) {
        let Some((task, status)) = self.task_and_status(thread) else {
            self.warn_unknown("kill", thread);
            return;
        };
        if status.is_terminal() {
            self.diagnostics.push(
                LogEntry::new(
                    LogLevel::Warn,
                    format!("attempt to kill {}, which is already killed", thread),
                )
                .with_source(thread),
            );
            return;
        }

        match status {
            ThreadStatus::Ready => self.ready_queue.remove(thread),
            ThreadStatus::Running => {
                if self.thread_owns_processor(thread, platform) {
                    platform.set_active_page_table(None);
                    platform.set_current_thread(task, None);
                }
            }
            _ => {}
        }

        self.set_status(thread, ThreadStatus::Killed);
        platform.remove_thread(task, thread);

        for device in 0..platform.device_count() {
            platform.cancel_pending_requests(device, thread);
        }
        platform.release_all_resources(thread);

        self.dispatch(platform);

        if platform.thread_count(task) == 0 {
            platform.kill_task(task);
        }
    }

    /// Suspends a thread on an event
    ///
    /// A running thread that truly owns the processor goes to
    /// `Waiting { depth: 1 }` and the processor is idled. A thread
    /// already waiting stacks one more wait cause. Anything else (ready,
    /// or marked running without actually holding the processor) goes to
    /// `Waiting { depth: 1 }` without touching processor state. In every
    /// case the thread leaves the ready queue, joins the event's waiting
    /// list, and a re-dispatch runs.
    pub fn suspend<P: Platform>(&mut self, thread: ThreadId, event: &mut Event, platform: &mut P) {
        let Some((task, status)) = self.task_and_status(thread) else {
            self.warn_unknown("suspend", thread);
            return;
        };
        if status.is_terminal() {
            self.diagnostics.push(
                LogEntry::new(
                    LogLevel::Warn,
                    format!("attempt to suspend {}, which is killed", thread),
                )
                .with_source(thread),
            );
            return;
        }

        match status {
            ThreadStatus::Running if self.thread_owns_processor(thread, platform) => {
                self.set_status(thread, ThreadStatus::Waiting { depth: 1 });
                platform.set_active_page_table(None);
                platform.set_current_thread(task, None);
            }
            ThreadStatus::Waiting { depth } => {
                self.set_status(
                    thread,
                    ThreadStatus::Waiting {
                        depth: depth.saturating_add(1),
                    },
                );
            }
            _ => {
                self.set_status(thread, ThreadStatus::Waiting { depth: 1 });
            }
        }

        if self.ready_queue.contains(thread) {
            self.ready_queue.remove(thread);
        }
        event.add_thread(thread);
        self.dispatch(platform);
    }

    /// Resumes a waiting thread by one wait cause
    ///
    /// Only a waiting thread can be resumed; anything else is a misuse,
    /// reported as a diagnostic and otherwise ignored. At depth 1 the
    /// thread becomes ready and rejoins the tail of the ready queue; at
    /// greater depths it stays waiting one level shallower. A re-dispatch
    /// runs either way.
    pub fn resume<P: Platform>(&mut self, thread: ThreadId, platform: &mut P) {
        let Some((_, status)) = self.task_and_status(thread) else {
            self.warn_unknown("resume", thread);
            return;
        };
        let ThreadStatus::Waiting { depth } = status else {
            self.diagnostics.push(
                LogEntry::new(
                    LogLevel::Warn,
                    format!("attempt to resume {}, which is not waiting", thread),
                )
                .with_source(thread)
                .with_field("status".to_string(), status.to_string()),
            );
            return;
        };

        if depth == 1 {
            self.set_status(thread, ThreadStatus::Ready);
            self.ready_queue.enqueue(thread);
        } else {
            self.set_status(thread, ThreadStatus::Waiting { depth: depth - 1 });
        }

        self.dispatch(platform);
    }

    /// Resumes every thread waiting on `event`, draining its queue
    ///
    /// Each waiter is resumed exactly once; a depth-2 waiter therefore
    /// stays waiting until its other cause also fires.
    pub fn notify_event<P: Platform>(&mut self, event: &mut Event, platform: &mut P) {
        for thread in event.drain_waiting() {
            self.resume(thread, platform);
        }
    }

    /// Single-processor scheduling step
    ///
    /// Runs after every mutating operation and every timer tick:
    ///
    /// 1. If the register walks back to a thread whose status is still
    ///    `Running`, keep it; nothing to decide this call.
    /// 2. Otherwise, with an empty ready queue, clear the register and
    ///    report an idle processor.
    /// 3. Otherwise, take the head of the ready queue (strict FIFO,
    ///    priority never consulted), mark it running, load its page
    ///    table, record it as its task's current thread, and restart the
    ///    interrupt timer for a fresh slice.
    pub fn dispatch<P: Platform>(&mut self, platform: &mut P) -> DispatchOutcome {
        if let Some(current) = self.processor_thread(platform) {
            if self.thread_status(current) == Some(ThreadStatus::Running) {
                return DispatchOutcome::Running(current);
            }
        }

        while let Some(next) = self.ready_queue.dequeue() {
            // Queue membership implies a live control block.
            let Some(tcb) = self.threads.get_mut(&next) else {
                continue;
            };
            tcb.status = ThreadStatus::Running;
            let task = tcb.task;
            let table = tcb.page_table;
            platform.set_active_page_table(Some(PageTableHandle::new(table, task)));
            platform.set_current_thread(task, Some(next));
            platform.set_timer(0);
            self.audit_log.push(DispatchEvent::ThreadSelected { thread: next });
            return DispatchOutcome::Running(next);
        }

        platform.set_active_page_table(None);
        self.audit_log.push(DispatchEvent::ProcessorIdle);
        DispatchOutcome::Idle
    }

    /// Returns the thread currently on the processor, if any
    ///
    /// Walks register → owning task → current thread and checks the
    /// status is still `Running`. A stale or empty register yields
    /// `None`.
    pub fn running_thread<P: Platform>(&self, platform: &P) -> Option<ThreadId> {
        let current = self.processor_thread(platform)?;
        match self.thread_status(current) {
            Some(ThreadStatus::Running) => Some(current),
            _ => None,
        }
    }

    /// Returns a thread's status, if the thread is known
    pub fn thread_status(&self, thread: ThreadId) -> Option<ThreadStatus> {
        self.threads.get(&thread).map(|tcb| tcb.status)
    }

    /// Returns a thread's control block, if the thread is known
    pub fn thread(&self, thread: ThreadId) -> Option<&ThreadControlBlock> {
        self.threads.get(&thread)
    }

    /// Number of threads in the ready queue
    pub fn ready_count(&self) -> usize {
        self.ready_queue.len()
    }

    /// Returns true if the ready queue holds the thread
    pub fn is_ready(&self, thread: ThreadId) -> bool {
        self.ready_queue.contains(thread)
    }

    /// Returns the manager's configuration
    pub fn config(&self) -> &ThreadManagerConfig {
        &self.config
    }

    /// Returns a reference to the audit log
    ///
    /// Used in tests to verify scheduling behavior.
    pub fn audit_log(&self) -> &[DispatchEvent] {
        &self.audit_log
    }

    /// Clears the audit log
    pub fn clear_audit_log(&mut self) {
        self.audit_log.clear();
    }

    /// Returns the diagnostics collected so far
    pub fn diagnostics(&self) -> &DiagnosticsLog {
        &self.diagnostics
    }

    fn task_and_status(&self, thread: ThreadId) -> Option<(TaskId, ThreadStatus)> {
        self.threads.get(&thread).map(|tcb| (tcb.task, tcb.status))
    }

    fn set_status(&mut self, thread: ThreadId, status: ThreadStatus) {
        if let Some(tcb) = self.threads.get_mut(&thread) {
            tcb.status = status;
        }
    }

    /// Walks the page-table register back to the task's current thread
    fn processor_thread<P: Platform>(&self, platform: &P) -> Option<ThreadId> {
        let handle = platform.active_page_table()?;
        platform.current_thread(handle.task)
    }

    /// True only if the register walk lands on exactly this thread
    ///
    /// A thread can be marked running in bookkeeping while another thread
    /// occupies the processor during a transition window; shared
    /// processor state is only cleared for the thread that truly owns it.
    fn thread_owns_processor<P: Platform>(&self, thread: ThreadId, platform: &P) -> bool {
        self.processor_thread(platform) == Some(thread)
    }

    fn warn_unknown(&mut self, operation: &str, thread: ThreadId) {
        self.diagnostics.push(
            LogEntry::new(
                LogLevel::Warn,
                format!("attempt to {} unknown thread {}", operation, thread),
            )
            .with_source(thread),
        );
    }
}

impl Default for ThreadManager {
    fn default() -> Self {
        Self::new()
    }
}


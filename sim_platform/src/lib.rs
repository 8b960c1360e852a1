//! # Simulated Platform
//!
//! This crate provides a simulated implementation of the collaborator
//! surface the thread core runs against.
//!
//! ## Purpose
//!
//! The simulated platform allows testing scheduling behavior without
//! hardware:
//! - Runs under `cargo test`
//! - Deterministic (no real time, no real concurrency)
//! - Inspectable (task, device, resource and register state is
//!   directly accessible)
//!
//! ## Philosophy
//!
//! **Testability is a first-class design constraint.**
//!
//! This is not a mock: it is a full implementation of the task registry,
//! device table, resource table, page-table register and interval timer
//! that happens to run in-process. A single fault-injection knob covers
//! the one failure the core must tolerate from outside: a task refusing
//! thread registration.

use core_types::{PageTableId, Priority, TaskId, ThreadId};
use hal::{IntervalTimer, MmuHal, PageTableHandle};
use kernel_threads::{DeviceTable, ResourceReclaim, TaskError, TaskRegistry};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from the simulation-control API
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimPlatformError {
    /// No device exists at the given table index
    #[error("Unknown device index: {0}")]
    UnknownDevice(usize),
}

#[derive(Debug)]
struct SimTask {
    priority: Priority,
    page_table: PageTableId,
    threads: Vec<ThreadId>,
    current: Option<ThreadId>,
    alive: bool,
    kill_count: u32,
}

#[derive(Debug)]
struct SimDevice {
    #[allow(dead_code)]
    name: String,
    pending: Vec<ThreadId>,
}

/// Simulated platform state
///
/// # Examples
///
/// ```
/// use core_types::Priority;
/// use sim_platform::SimPlatform;
///
/// let mut platform = SimPlatform::new();
/// let task = platform.create_task(Priority::new(1));
/// assert_eq!(platform.task_kill_count(task), 0);
/// ```
#[derive(Debug, Default)]
pub struct SimPlatform {
    tasks: HashMap<TaskId, SimTask>,
    devices: Vec<SimDevice>,
    resources: HashMap<ThreadId, Vec<String>>,
    register: Option<PageTableHandle>,
    timer_resets: Vec<u64>,
    fail_next_registration: bool,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a task with the given advisory priority
    ///
    /// The task gets a fresh page table and starts with no threads.
    pub fn create_task(&mut self, priority: Priority) -> TaskId {
        let id = TaskId::new();
        self.tasks.insert(
            id,
            SimTask {
                priority,
                page_table: PageTableId::new(),
                threads: Vec::new(),
                current: None,
                alive: true,
                kill_count: 0,
            },
        );
        id
    }

    /// Adds a device to the table, returning its index
    pub fn add_device(&mut self, name: impl Into<String>) -> usize {
        self.devices.push(SimDevice {
            name: name.into(),
            pending: Vec::new(),
        });
        self.devices.len() - 1
    }

    /// Queues a pending I/O request for a thread on a device
    pub fn queue_request(
        &mut self,
        device: usize,
        thread: ThreadId,
    ) -> Result<(), SimPlatformError> {
        let device = self
            .devices
            .get_mut(device)
            .ok_or(SimPlatformError::UnknownDevice(device))?;
        device.pending.push(thread);
        Ok(())
    }

    /// Number of pending requests on a device
    pub fn pending_requests(&self, device: usize) -> usize {
        self.devices.get(device).map_or(0, |d| d.pending.len())
    }

    /// Records a resource as held by a thread
    pub fn grant_resource(&mut self, thread: ThreadId, resource: impl Into<String>) {
        self.resources.entry(thread).or_default().push(resource.into());
    }

    /// Number of resources a thread currently holds
    pub fn held_resources(&self, thread: ThreadId) -> usize {
        self.resources.get(&thread).map_or(0, |r| r.len())
    }

    /// Makes the next `add_thread` call fail, then clears itself
    ///
    /// Models a task rejecting registration in the window between the
    /// core's thread-count check and the registration itself.
    pub fn fail_next_thread_registration(&mut self) {
        self.fail_next_registration = true;
    }

    /// Every `set_timer` call observed, in order
    pub fn timer_resets(&self) -> &[u64] {
        &self.timer_resets
    }

    /// How many times the task has been torn down
    pub fn task_kill_count(&self, task: TaskId) -> u32 {
        self.tasks.get(&task).map_or(0, |t| t.kill_count)
    }

    /// Whether the task is still alive
    pub fn is_task_alive(&self, task: TaskId) -> bool {
        self.tasks.get(&task).is_some_and(|t| t.alive)
    }

    fn live_task(&self, task: TaskId) -> Option<&SimTask> {
        self.tasks.get(&task).filter(|t| t.alive)
    }

    fn live_task_mut(&mut self, task: TaskId) -> Option<&mut SimTask> {
        self.tasks.get_mut(&task).filter(|t| t.alive)
    }
}

impl TaskRegistry for SimPlatform {
    fn add_thread(&mut self, task: TaskId, thread: ThreadId) -> Result<(), TaskError> {
        if self.fail_next_registration {
            self.fail_next_registration = false;
            return Err(TaskError::RegistrationRejected(task));
        }
        let entry = self
            .live_task_mut(task)
            .ok_or(TaskError::TaskNotFound(task))?;
        entry.threads.push(thread);
        Ok(())
    }

    fn remove_thread(&mut self, task: TaskId, thread: ThreadId) {
        if let Some(entry) = self.live_task_mut(task) {
            entry.threads.retain(|&t| t != thread);
        }
    }

    fn thread_count(&self, task: TaskId) -> usize {
        self.live_task(task).map_or(0, |t| t.threads.len())
    }

    fn current_thread(&self, task: TaskId) -> Option<ThreadId> {
        self.live_task(task).and_then(|t| t.current)
    }

    fn set_current_thread(&mut self, task: TaskId, current: Option<ThreadId>) {
        if let Some(entry) = self.live_task_mut(task) {
            entry.current = current;
        }
    }

    fn task_priority(&self, task: TaskId) -> Priority {
        self.live_task(task).map_or_else(Priority::default, |t| t.priority)
    }

    fn page_table(&self, task: TaskId) -> Option<PageTableId> {
        self.live_task(task).map(|t| t.page_table)
    }

    fn kill_task(&mut self, task: TaskId) {
        if let Some(entry) = self.tasks.get_mut(&task) {
            entry.alive = false;
            entry.current = None;
            entry.kill_count += 1;
        }
    }
}

impl DeviceTable for SimPlatform {
    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn cancel_pending_requests(&mut self, device: usize, thread: ThreadId) {
        if let Some(device) = self.devices.get_mut(device) {
            device.pending.retain(|&t| t != thread);
        }
    }
}

impl ResourceReclaim for SimPlatform {
    fn release_all_resources(&mut self, thread: ThreadId) {
        self.resources.remove(&thread);
    }
}

impl MmuHal for SimPlatform {
    fn set_active_page_table(&mut self, handle: Option<PageTableHandle>) {
        self.register = handle;
    }

    fn active_page_table(&self) -> Option<PageTableHandle> {
        self.register
    }
}

impl IntervalTimer for SimPlatform {
    fn set_timer(&mut self, ticks: u64) {
        self.timer_resets.push(ticks);
    }
}

//! # Scheduling Integration Tests
//!
//! End-to-end tests for the thread life-cycle core against the simulated
//! platform.
//!
//! ## Test Philosophy
//!
//! - **Happy path**: create → dispatch → suspend → resume → kill
//! - **Invariants**: one running thread, queue membership matches status
//! - **FIFO**: priority values never influence dispatch order
//! - **Teardown**: killing the last thread tears the task down once
//! - **Diagnostics**: misuse is reported, never escalated

#![cfg(test)]

use core_types::Priority;
use hal::MmuHal;
use kernel_threads::{
    DispatchOutcome, Event, TaskRegistry, ThreadManager, ThreadManagerConfig, ThreadStatus,
    TimerInterruptHandler,
};
use services_logger::LogLevel;
use sim_platform::SimPlatform;

#[test]
fn test_thread_lifecycle_end_to_end() {
    // Setup: a fresh manager and platform with one task (0/5 threads).
    let mut platform = SimPlatform::new();
    let mut manager = ThreadManager::with_config(ThreadManagerConfig {
        max_threads_per_task: 5,
    });
    let task = platform.create_task(Priority::new(2));

    // Step 1: The first thread is created ready, and the idle processor
    // picks it up in the dispatch that runs inside create.
    let first = manager.create(Some(task), &mut platform).unwrap();
    assert_eq!(manager.thread_status(first), Some(ThreadStatus::Running));
    assert_eq!(platform.current_thread(task), Some(first));

    // Step 2: A second thread is appended ready and stays ready; the
    // processor is busy with the first.
    let second = manager.create(Some(task), &mut platform).unwrap();
    assert_eq!(manager.thread_status(second), Some(ThreadStatus::Ready));

    // Step 3: Suspending the running thread idles it onto the event and
    // promotes the second thread.
    let mut io = Event::new();
    manager.suspend(first, &mut io, &mut platform);
    assert_eq!(
        manager.thread_status(first),
        Some(ThreadStatus::Waiting { depth: 1 })
    );
    assert_eq!(manager.thread_status(second), Some(ThreadStatus::Running));
    assert_eq!(io.waiting_threads(), &[first]);

    // Step 4: The event fires; the first thread becomes ready again and
    // queues behind nothing, but the processor stays with the second.
    manager.notify_event(&mut io, &mut platform);
    assert_eq!(manager.thread_status(first), Some(ThreadStatus::Ready));
    assert_eq!(manager.thread_status(second), Some(ThreadStatus::Running));

    // Step 5: Killing the running thread hands the processor back to the
    // first, FIFO style.
    manager.kill(second, &mut platform);
    assert_eq!(manager.thread_status(first), Some(ThreadStatus::Running));

    // Step 6: Killing the last thread empties the task, which is torn
    // down exactly once, and the processor goes idle.
    manager.kill(first, &mut platform);
    assert_eq!(platform.task_kill_count(task), 1);
    assert_eq!(platform.active_page_table(), None);
    assert_eq!(manager.dispatch(&mut platform), DispatchOutcome::Idle);
}

#[test]
fn test_create_at_limit_leaves_state_unchanged() {
    let mut platform = SimPlatform::new();
    let mut manager = ThreadManager::with_config(ThreadManagerConfig {
        max_threads_per_task: 2,
    });
    let task = platform.create_task(Priority::new(1));

    let first = manager.create(Some(task), &mut platform).unwrap();
    let second = manager.create(Some(task), &mut platform).unwrap();
    let register_before = platform.active_page_table();

    let third = manager.create(Some(task), &mut platform);

    assert_eq!(third, None);
    assert_eq!(platform.thread_count(task), 2);
    assert_eq!(manager.thread_status(first), Some(ThreadStatus::Running));
    assert_eq!(manager.thread_status(second), Some(ThreadStatus::Ready));
    assert_eq!(platform.active_page_table(), register_before);
}

#[test]
fn test_fifo_dispatch_ignores_priority() {
    let mut platform = SimPlatform::new();
    let mut manager = ThreadManager::new();

    // Three tasks with wildly different priorities; creation order is
    // the only thing that matters.
    let low = platform.create_task(Priority::new(0));
    let high = platform.create_task(Priority::new(99));
    let mid = platform.create_task(Priority::new(50));

    let a = manager.create(Some(low), &mut platform).unwrap();
    let b = manager.create(Some(high), &mut platform).unwrap();
    let c = manager.create(Some(mid), &mut platform).unwrap();

    assert_eq!(manager.running_thread(&platform), Some(a));
    manager.kill(a, &mut platform);
    assert_eq!(manager.running_thread(&platform), Some(b));
    manager.kill(b, &mut platform);
    assert_eq!(manager.running_thread(&platform), Some(c));
}

#[test]
fn test_stacked_waits_need_matching_resumes() {
    let mut platform = SimPlatform::new();
    let mut manager = ThreadManager::new();
    let task = platform.create_task(Priority::new(1));

    let thread = manager.create(Some(task), &mut platform).unwrap();

    // The thread waits on an I/O completion, then a page fault stacks a
    // second wait on top.
    let mut io = Event::new();
    let mut page_fault = Event::new();
    manager.suspend(thread, &mut io, &mut platform);
    manager.suspend(thread, &mut page_fault, &mut platform);
    assert_eq!(
        manager.thread_status(thread),
        Some(ThreadStatus::Waiting { depth: 2 })
    );

    // One cause fires: still waiting, still not in the ready queue.
    manager.notify_event(&mut page_fault, &mut platform);
    assert_eq!(
        manager.thread_status(thread),
        Some(ThreadStatus::Waiting { depth: 1 })
    );
    assert!(!manager.is_ready(thread));
    assert_eq!(manager.dispatch(&mut platform), DispatchOutcome::Idle);

    // The second cause fires: ready, and dispatched onto the idle
    // processor.
    manager.notify_event(&mut io, &mut platform);
    assert_eq!(manager.thread_status(thread), Some(ThreadStatus::Running));
}

#[test]
fn test_kill_waiting_thread_cleans_up_io_and_task() {
    let mut platform = SimPlatform::new();
    let disk = platform.add_device("disk");
    let mut manager = ThreadManager::new();
    let task = platform.create_task(Priority::new(1));

    let thread = manager.create(Some(task), &mut platform).unwrap();
    let mut io = Event::new();
    manager.suspend(thread, &mut io, &mut platform);
    platform.queue_request(disk, thread).unwrap();
    platform.grant_resource(thread, "buffer-3");

    manager.kill(thread, &mut platform);

    assert_eq!(manager.thread_status(thread), Some(ThreadStatus::Killed));
    assert_eq!(platform.pending_requests(disk), 0);
    assert_eq!(platform.held_resources(thread), 0);
    assert_eq!(platform.task_kill_count(task), 1);
}

#[test]
fn test_resume_misuse_is_diagnostic_only() {
    let mut platform = SimPlatform::new();
    let mut manager = ThreadManager::new();
    let task = platform.create_task(Priority::new(1));

    let running = manager.create(Some(task), &mut platform).unwrap();

    manager.resume(running, &mut platform);

    assert_eq!(manager.thread_status(running), Some(ThreadStatus::Running));
    assert_eq!(manager.diagnostics().entries_at(LogLevel::Warn).count(), 1);

    // The system keeps working after the misuse.
    let next = manager.create(Some(task), &mut platform).unwrap();
    assert_eq!(manager.thread_status(next), Some(ThreadStatus::Ready));
}

#[test]
fn test_invariants_hold_across_a_busy_run() {
    let mut platform = SimPlatform::new();
    let mut manager = ThreadManager::new();
    let handler = TimerInterruptHandler::new();
    let task_a = platform.create_task(Priority::new(1));
    let task_b = platform.create_task(Priority::new(2));

    let mut event = Event::new();
    let mut threads = Vec::new();
    for _ in 0..2 {
        threads.push(manager.create(Some(task_a), &mut platform).unwrap());
        threads.push(manager.create(Some(task_b), &mut platform).unwrap());
    }

    manager.suspend(threads[0], &mut event, &mut platform);
    handler.handle_interrupt(&mut manager, &mut platform);
    manager.kill(threads[1], &mut platform);
    manager.notify_event(&mut event, &mut platform);
    handler.handle_interrupt(&mut manager, &mut platform);

    // At most one running thread, and it is the one the register names.
    let running: Vec<_> = threads
        .iter()
        .copied()
        .filter(|&t| manager.thread_status(t) == Some(ThreadStatus::Running))
        .collect();
    assert_eq!(running.len(), 1);
    assert_eq!(manager.running_thread(&platform), Some(running[0]));

    // Ready-queue membership matches status for every thread.
    for &thread in &threads {
        let ready = manager.thread_status(thread) == Some(ThreadStatus::Ready);
        assert_eq!(manager.is_ready(thread), ready);
    }
}

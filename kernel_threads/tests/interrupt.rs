//! Integration tests for the timer interrupt handler.
//!
//! Located here (not a unit-test module) for the same dependency-cycle
//! reason as the manager tests: they reference `SimPlatform`.
use core_types::Priority;
use kernel_threads::{DispatchEvent, ThreadManager, ThreadStatus, TimerInterruptHandler};
use sim_platform::SimPlatform;

mod tests {
    use super::*;

    #[test]
    fn test_interrupt_resets_timer_and_dispatches() {
        let mut platform = SimPlatform::new();
        let mut manager = ThreadManager::new();
        let handler = TimerInterruptHandler::new();
        let task = platform.create_task(Priority::new(1));

        let thread = manager.create(Some(task), &mut platform).unwrap();
        let resets = platform.timer_resets().len();

        handler.handle_interrupt(&mut manager, &mut platform);

        assert_eq!(platform.timer_resets().len(), resets + 1);
        assert_eq!(manager.thread_status(thread), Some(ThreadStatus::Running));
    }

    #[test]
    fn test_interrupt_on_idle_processor_records_idle_decision() {
        let mut platform = SimPlatform::new();
        let mut manager = ThreadManager::new();
        let handler = TimerInterruptHandler::new();

        manager.clear_audit_log();
        handler.handle_interrupt(&mut manager, &mut platform);

        assert_eq!(manager.audit_log(), &[DispatchEvent::ProcessorIdle]);
    }

    #[test]
    fn test_interrupt_picks_up_newly_ready_work() {
        let mut platform = SimPlatform::new();
        let mut manager = ThreadManager::new();
        let handler = TimerInterruptHandler::new();
        let task = platform.create_task(Priority::new(1));

        let first = manager.create(Some(task), &mut platform).unwrap();
        let second = manager.create(Some(task), &mut platform).unwrap();
        manager.kill(first, &mut platform);

        handler.handle_interrupt(&mut manager, &mut platform);

        assert_eq!(manager.thread_status(second), Some(ThreadStatus::Running));
    }
}

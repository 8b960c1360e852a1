//! Timer interrupt handling
//!
//! The timer interrupt is a pure edge trigger: it holds no state and
//! makes no scheduling decision of its own. Resetting the timer and
//! re-running dispatch is enough to time-slice threads that never
//! voluntarily suspend, because dispatch re-reads the recorded status of
//! whatever the register says is running.

use crate::manager::ThreadManager;
use crate::platform::Platform;

/// Timer interrupt edge trigger
#[derive(Debug, Default)]
pub struct TimerInterruptHandler;

impl TimerInterruptHandler {
    pub fn new() -> Self {
        Self
    }

    /// Answers one timer interrupt: reset the timer, then dispatch
    pub fn handle_interrupt<P: Platform>(&self, manager: &mut ThreadManager, platform: &mut P) {
        platform.set_timer(0);
        manager.dispatch(platform);
    }
}


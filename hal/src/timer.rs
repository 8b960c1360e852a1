//! # Interval Timer Device
//!
//! Hardware abstraction for the single-shot interrupt timer.
//!
//! ## Philosophy
//!
//! **Time is a service, not a global variable.**
//!
//! This trait models the timer that drives preemptive re-dispatch. It
//! does NOT:
//! - Provide wall-clock time (no UTC, no timezones)
//! - Block or sleep
//! - Implement scheduling (that's for the kernel)
//!
//! ## Design Principles
//!
//! 1. **Single-shot**: The timer counts one slice, then interrupts
//! 2. **Non-blocking**: `set_timer` always returns immediately
//! 3. **Frequency-agnostic**: No assumptions about tick rate at this layer

/// Single-shot interval timer trait
///
/// The dispatcher restarts the timer with `set_timer(0)` whenever a
/// thread is placed on the processor, giving it a fresh time slice. When
/// the slice expires the hardware raises a timer interrupt, which the
/// interrupt handler answers by resetting the timer and re-running
/// dispatch.
///
/// # Implementation Notes
///
/// - `set_timer` replaces any previously programmed slice
/// - Tick frequency is implementation-defined
/// - Must not block
pub trait IntervalTimer {
    /// Restarts the timer with `ticks` already elapsed in the new slice
    ///
    /// `set_timer(0)` starts a full, fresh slice.
    fn set_timer(&mut self, ticks: u64);
}

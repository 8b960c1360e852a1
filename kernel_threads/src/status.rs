//! Thread status state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Thread status
///
/// The life cycle is `Created → Ready → Running → Waiting { depth } →
/// Ready → … → Killed`. Waiting is a ladder rather than a single state:
/// depth 1 is a plain wait, and depth n means the thread is blocked on n
/// stacked causes and must be resumed once per cause before it becomes
/// ready again. `Killed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadStatus {
    /// Freshly allocated inside `create`; never observable outside it
    Created,
    /// Runnable; the thread is in the ready queue
    Ready,
    /// On the processor
    Running,
    /// Blocked on `depth` stacked wait causes (`depth >= 1`)
    Waiting { depth: u32 },
    /// Terminal; no further transitions are valid
    Killed,
}

impl ThreadStatus {
    /// Returns true for any waiting depth
    pub fn is_waiting(&self) -> bool {
        matches!(self, ThreadStatus::Waiting { .. })
    }

    /// Returns the waiting depth, if waiting
    pub fn waiting_depth(&self) -> Option<u32> {
        match self {
            ThreadStatus::Waiting { depth } => Some(*depth),
            _ => None,
        }
    }

    /// Returns true once the thread has been killed
    pub fn is_terminal(&self) -> bool {
        matches!(self, ThreadStatus::Killed)
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadStatus::Created => write!(f, "created"),
            ThreadStatus::Ready => write!(f, "ready"),
            ThreadStatus::Running => write!(f, "running"),
            ThreadStatus::Waiting { depth } => write!(f, "waiting(depth {})", depth),
            ThreadStatus::Killed => write!(f, "killed"),
        }
    }
}

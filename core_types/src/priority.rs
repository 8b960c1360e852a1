//! Advisory scheduling priority

use serde::{Deserialize, Serialize};
use std::fmt;

/// Advisory scheduling priority
///
/// Every task carries a priority, and every thread inherits its task's
/// priority at creation time. The value is informational: the dispatcher
/// is strictly FIFO and never compares priorities. It is kept so that
/// collaborators (and future policies) can read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Priority(pub u32);

impl Priority {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(0)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "priority {}", self.0)
    }
}

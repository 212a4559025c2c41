//! Port reporting whether the primary database is currently reachable.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cheap connectivity flag read on every storage call.
#[cfg_attr(test, mockall::automock)]
pub trait DatabaseLiveness: Send + Sync {
    /// `true` while the database connection is established.
    fn is_connected(&self) -> bool;
}

/// Shared flag that an outbound monitor flips and readers observe.
///
/// # Examples
/// ```
/// use institute::domain::ports::{DatabaseLiveness, LivenessFlag};
///
/// let flag = LivenessFlag::new(false);
/// let reader = flag.clone();
/// flag.set(true);
/// assert!(reader.is_connected());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LivenessFlag(Arc<AtomicBool>);

impl LivenessFlag {
    /// Create a flag with an initial state.
    pub fn new(connected: bool) -> Self {
        Self(Arc::new(AtomicBool::new(connected)))
    }

    /// Store a new state and return the previous one.
    pub fn set(&self, connected: bool) -> bool {
        self.0.swap(connected, Ordering::AcqRel)
    }
}

impl DatabaseLiveness for LivenessFlag {
    fn is_connected(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_returns_previous_state() {
        let flag = LivenessFlag::new(true);
        assert!(flag.set(false));
        assert!(!flag.set(true));
        assert!(flag.is_connected());
    }

    #[test]
    fn default_is_disconnected() {
        assert!(!LivenessFlag::default().is_connected());
    }
}

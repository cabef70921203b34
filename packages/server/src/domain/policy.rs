//! Capacity/admission and history policy.

use super::DEFAULT_ROOM_CAPACITY;

/// Default number of messages replayed on join
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Upper bound for the history replay size
pub const MAX_HISTORY_LIMIT: usize = 100;

/// Per-room policy applied by the use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomPolicy {
    /// Admission ceiling, checked only at join time
    pub max_users: usize,
    /// Number of messages replayed to a joining connection
    pub history_limit: usize,
}

impl RoomPolicy {
    /// Build a policy, clamping the history limit to `MAX_HISTORY_LIMIT`
    pub fn new(max_users: usize, history_limit: usize) -> Self {
        Self {
            max_users,
            history_limit: history_limit.min(MAX_HISTORY_LIMIT),
        }
    }
}

impl Default for RoomPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ROOM_CAPACITY, DEFAULT_HISTORY_LIMIT)
    }
}

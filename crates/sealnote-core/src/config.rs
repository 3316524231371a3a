//! Runtime configuration for the lockout policy and note limits.
//!
//! Thresholds and penalties are deployment inputs, not constants. The
//! defaults match the reference deployment.

use serde::{Deserialize, Serialize};

/// Account lockout thresholds and penalty durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Failure count at which the short lock window applies.
    pub min_failure_threshold: u32,

    /// Failure count at which the long lock window applies.
    pub high_failure_threshold: u32,

    /// Short penalty duration in milliseconds.
    pub min_penalty_ms: u64,

    /// Long penalty duration in milliseconds.
    pub high_penalty_ms: u64,

    /// When true, every failure at or past a threshold recomputes the lock
    /// window from the current time, extending an existing lock. When
    /// false, an existing window is left in place.
    pub recompute_on_repeat_failure: bool,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            min_failure_threshold: 3,
            high_failure_threshold: 5,
            min_penalty_ms: 60_000,
            high_penalty_ms: 3_600_000,
            recompute_on_repeat_failure: true,
        }
    }
}

/// Size and count limits applied to note payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteLimits {
    /// Maximum number of notes a single owner may hold.
    pub max_notes_per_user: u32,

    /// Maximum note header length in bytes.
    pub max_header_bytes: usize,

    /// Maximum note content length in bytes.
    pub max_content_bytes: usize,
}

impl Default for NoteLimits {
    fn default() -> Self {
        Self {
            max_notes_per_user: 10,
            max_header_bytes: 64,
            max_content_bytes: 5000,
        }
    }
}

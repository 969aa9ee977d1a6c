//! Render attempt identity and results.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::engine::RenderError;
use crate::markup::RenderedMarkup;

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Identifies one render attempt.
///
/// Derived from the instant the attempt was triggered plus a process-wide
/// sequence number, so two attempts started within the same clock tick
/// still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId {
    started_at_micros: u64,
    sequence: u64,
}

impl AttemptId {
    pub fn next() -> Self {
        let started_at_micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or_default();
        Self {
            started_at_micros,
            sequence: NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Unix-epoch microseconds at which the attempt was triggered.
    pub fn started_at_micros(&self) -> u64 {
        self.started_at_micros
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mermaid-{}-{}", self.started_at_micros, self.sequence)
    }
}

/// Result of compiling one description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Success(RenderedMarkup),
    Failure(RenderError),
}

/// What happened to an attempt's outcome once it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    /// The outcome replaced the mount point's content.
    Committed,
    /// A newer description (or a clear) was requested first; the outcome
    /// was discarded.
    Superseded,
    /// The attempt's task did not run to completion.
    Aborted,
}

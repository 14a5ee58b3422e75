#![forbid(unsafe_code)]

//! Error types for the paging engine.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | [`PagerError::ConsistencyViolation`] | Adapter count changed without `notify_adapter_changed` | Fatal; controller refuses further work |
//! | [`PagerError::Adapter`] | `instantiate` / `destroy` returned an error | Recoverable; pass completes, index retried next pass |
//! | Out-of-range index | `set_current_index` past the ends | Clamped, never an error |
//! | Lost pointer | Tracked pointer vanished | Re-anchored or released, never an error |

use std::fmt;

/// Error returned by a [`PageAdapter`](crate::adapter::PageAdapter)
/// operation.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AdapterError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl AdapterError {
    /// Create an error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause (builder).
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Which adapter operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterOp {
    /// Creating the content for an index.
    Instantiate,
    /// Releasing the content for an index.
    Destroy,
}

impl fmt::Display for AdapterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instantiate => f.write_str("instantiate"),
            Self::Destroy => f.write_str("destroy"),
        }
    }
}

/// One failed adapter call within a population pass.
#[derive(Debug, thiserror::Error)]
#[error("{op} failed for page {index}: {source}")]
pub struct PageFailure {
    /// Page index the call was made for.
    pub index: usize,
    /// Operation that failed.
    pub op: AdapterOp,
    /// Error reported by the adapter.
    #[source]
    pub source: AdapterError,
}

/// Every adapter failure collected during one pass.
#[derive(Debug, Default)]
pub struct AdapterFailures(pub Vec<PageFailure>);

impl AdapterFailures {
    /// Whether no failure was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the failures in the order they happened.
    pub fn iter(&self) -> impl Iterator<Item = &PageFailure> {
        self.0.iter()
    }

    /// Indices whose operation failed, in order.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.0.iter().map(|f| f.index).collect()
    }
}

impl fmt::Display for AdapterFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} adapter call(s) failed", self.0.len())?;
        for failure in &self.0 {
            write!(f, "; {failure}")?;
        }
        Ok(())
    }
}

/// Errors surfaced to the host by the paging engine.
#[derive(Debug, thiserror::Error)]
pub enum PagerError {
    /// The adapter's item count changed without a
    /// `notify_adapter_changed` call. Offsets computed against the stale
    /// count are unsafe, so the engine stops.
    #[error(
        "adapter contents changed without notify_adapter_changed: expected {expected} items, found {found}"
    )]
    ConsistencyViolation {
        /// Count recorded at the last adapter-change pass.
        expected: usize,
        /// Count the adapter reports now.
        found: usize,
    },
    /// One or more adapter calls failed. Affected indices stay
    /// unmaterialized and are retried on the next pass.
    #[error("{0}")]
    Adapter(AdapterFailures),
}

impl PagerError {
    /// Whether the engine can keep running after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Adapter(_))
    }
}

/// Result alias for engine operations.
pub type Result<T, E = PagerError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

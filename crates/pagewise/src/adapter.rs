#![forbid(unsafe_code)]

//! The adapter port: the engine's view of the paged data source.
//!
//! An adapter owns page content. The engine asks it to create content for an
//! index, keeps the returned handle while the page is materialized, and hands
//! the handle back when the page is evicted. Handles are opaque to the
//! engine; typically they are cheap keys into adapter-owned storage.
//!
//! # Protocol
//!
//! 1. Every population pass is bracketed by [`PageAdapter::begin_update`] and
//!    [`PageAdapter::finish_update`]. All destroys of a pass happen before any
//!    instantiate, inside the same bracket.
//! 2. [`PageAdapter::count`] must only change between calls to the
//!    controller's `notify_adapter_changed`. A change observed at any other
//!    time is a fatal consistency violation.
//! 3. [`PageAdapter::position_of`] reports where previously returned content
//!    lives now; it is consulted during every pass.

use crate::error::AdapterError;

/// Where a previously instantiated page's content lives now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemPosition {
    /// Still at the index it was instantiated for.
    Unchanged,
    /// Moved to a new index.
    Moved(usize),
    /// No longer part of the data set.
    Removed,
}

/// Data source for a pager.
pub trait PageAdapter {
    /// Opaque reference to one page's content.
    type Handle;

    /// Number of pages.
    fn count(&self) -> usize;

    /// Create the content for `index`.
    ///
    /// # Errors
    ///
    /// Failure leaves the index unmaterialized; the engine retries it on the
    /// next pass.
    fn instantiate(&mut self, index: usize) -> Result<Self::Handle, AdapterError>;

    /// Release the content previously created for `index`.
    ///
    /// # Errors
    ///
    /// Failure keeps the handle queued; the engine retries the destroy on the
    /// next pass.
    fn destroy(&mut self, index: usize, handle: &Self::Handle) -> Result<(), AdapterError>;

    /// Report whether `handle`'s content moved or was removed.
    fn position_of(&self, handle: &Self::Handle) -> ItemPosition {
        let _ = handle;
        ItemPosition::Unchanged
    }

    /// Width of page `index` as a fraction of the container width.
    fn width_fraction(&self, index: usize) -> f32 {
        let _ = index;
        1.0
    }

    /// Called before the first change of a pass.
    fn begin_update(&mut self) {}

    /// Called after the last change of a pass.
    fn finish_update(&mut self) {}

    /// Called once per pass with the page the pager is centered on.
    fn set_primary(&mut self, index: usize, handle: Option<&Self::Handle>) {
        let _ = (index, handle);
    }

    /// Opaque adapter state to persist alongside the current index.
    fn save_state(&self) -> Option<Vec<u8>> {
        None
    }

    /// Restore state produced by [`PageAdapter::save_state`].
    fn restore_state(&mut self, state: &[u8]) {
        let _ = state;
    }
}

/// Positive, finite width for `index`.
///
/// Widths feed every offset computation, so a non-positive or non-finite
/// value would break offset monotonicity. Such values fall back to 1.0.
pub(crate) fn sanitized_width<A: PageAdapter + ?Sized>(adapter: &A, index: usize) -> f32 {
    let width = adapter.width_fraction(index);
    if width.is_finite() && width > 0.0 {
        width
    } else {
        tracing::warn!(index, width, "adapter returned invalid page width; using 1.0");
        1.0
    }
}

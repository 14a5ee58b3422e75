#![forbid(unsafe_code)]

//! Window population: which pages are materialized, and where they sit.
//!
//! [`VirtualizationEngine::populate`] keeps the closed range
//! `[anchor - limit, anchor + limit]` (clipped to the data set) materialized
//! and everything else evicted. Every pass runs inside one adapter update
//! bracket and follows a fixed order:
//!
//! 1. Check that the adapter's count still matches the recorded count.
//! 2. Revalidate materialized pages against [`PageAdapter::position_of`]:
//!    removed pages are destroyed, moved pages are reindexed.
//! 3. Destroy every page outside the range, plus destroys that failed on an
//!    earlier pass.
//! 4. Instantiate every missing index in the range.
//! 5. Recompute offsets by sweeping outward from the anchor.
//!
//! Adapter failures never abort a pass; they are collected in the returned
//! [`WindowDelta`] and the affected work is retried on the next pass.

use std::cmp::Ordering;

use crate::adapter::{ItemPosition, PageAdapter, sanitized_width};
use crate::config::MIN_OFFSCREEN_LIMIT;
use crate::error::{AdapterFailures, AdapterOp, PageFailure, PagerError, Result};
use crate::window::{Page, PageWindow};

/// Order in which missing indices are instantiated: `(anchor, a, b)`.
pub type InstantiateOrder = fn(usize, usize, usize) -> Ordering;

/// Instantiate the anchor first, then pages by increasing distance from it,
/// lower index first on ties.
#[must_use]
pub fn nearest_first(anchor: usize, a: usize, b: usize) -> Ordering {
    a.abs_diff(anchor)
        .cmp(&b.abs_diff(anchor))
        .then_with(|| a.cmp(&b))
}

/// Instantiate in ascending index order.
#[must_use]
pub fn ascending(_anchor: usize, a: usize, b: usize) -> Ordering {
    a.cmp(&b)
}

/// Structural changes made by one population pass.
#[derive(Debug, Default)]
pub struct WindowDelta {
    /// Indices instantiated, in call order.
    pub instantiated: Vec<usize>,
    /// Indices destroyed because they left the range, in call order.
    pub destroyed: Vec<usize>,
    /// Indices whose content the adapter reported removed.
    pub removed: Vec<usize>,
    /// `(old, new)` index pairs for content the adapter reported moved.
    pub moved: Vec<(usize, usize)>,
    /// Shift applied to every offset so that page 0 sits at zero, in
    /// container widths.
    pub rebase_shift: f32,
    /// Whether revalidation recomputed offsets because pages moved, went
    /// away, or changed width.
    pub relaid_out: bool,
    /// Adapter calls that failed during the pass.
    pub failures: AdapterFailures,
}

impl WindowDelta {
    /// Whether the pass changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instantiated.is_empty()
            && self.destroyed.is_empty()
            && self.removed.is_empty()
            && self.moved.is_empty()
            && self.rebase_shift == 0.0
            && !self.relaid_out
            && self.failures.is_empty()
    }

    /// Where the content that was at `index` lives after the pass, and
    /// whether the adapter removed it. Indices the pass did not touch map
    /// to themselves.
    #[must_use]
    pub fn index_after(&self, index: usize) -> (usize, bool) {
        if self.removed.contains(&index) {
            return (index, true);
        }
        let to = self
            .moved
            .iter()
            .find(|(from, _)| *from == index)
            .map_or(index, |&(_, to)| to);
        (to, false)
    }
}

/// What revalidation found for the page at a given index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFate {
    /// Still at the same index.
    Unchanged,
    /// Content moved to a new index.
    Moved(usize),
    /// Content no longer exists.
    Removed,
    /// The index was not materialized.
    Missing,
}

/// Result of a standalone revalidation pass.
#[derive(Debug)]
pub struct Revalidation {
    /// Fate of the page that was current before the pass.
    pub current: PageFate,
    /// Structural changes, with `instantiated` and `destroyed` always empty.
    pub delta: WindowDelta,
}

/// Decides which pages are materialized and computes their offsets.
#[derive(Debug)]
pub struct VirtualizationEngine<H> {
    order: InstantiateOrder,
    pending_destroy: Vec<(usize, H)>,
}

impl<H> Default for VirtualizationEngine<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> VirtualizationEngine<H> {
    /// Create an engine that instantiates nearest pages first.
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: nearest_first,
            pending_destroy: Vec::new(),
        }
    }

    /// Set the instantiation order (builder).
    #[must_use]
    pub fn with_order(mut self, order: InstantiateOrder) -> Self {
        self.order = order;
        self
    }

    /// Number of destroys waiting to be retried.
    #[must_use]
    pub fn pending_destroys(&self) -> usize {
        self.pending_destroy.len()
    }

    /// Bring `window` in line with `anchor` and `limit`.
    ///
    /// `item_count` is the count recorded at the last adapter-change pass.
    /// `margin` is the page margin in container widths.
    ///
    /// # Errors
    ///
    /// [`PagerError::ConsistencyViolation`] when the adapter's count differs
    /// from `item_count`. The window is left untouched in that case. Adapter
    /// failures are reported through [`WindowDelta::failures`] instead.
    pub fn populate<A>(
        &mut self,
        adapter: &mut A,
        window: &mut PageWindow<H>,
        anchor: usize,
        limit: usize,
        item_count: usize,
        margin: f32,
    ) -> Result<WindowDelta>
    where
        A: PageAdapter<Handle = H>,
    {
        let found = adapter.count();
        if found != item_count {
            tracing::error!(
                expected = item_count,
                found,
                "adapter count changed without notify_adapter_changed"
            );
            return Err(PagerError::ConsistencyViolation {
                expected: item_count,
                found,
            });
        }

        let mut delta = WindowDelta::default();
        adapter.begin_update();
        self.revalidate_pass(adapter, window, anchor, item_count, margin, &mut delta);
        self.retry_destroys(adapter, &mut delta.failures);

        if item_count == 0 {
            for page in window.take_all() {
                let index = page.index;
                if self.destroy(adapter, index, page.handle, &mut delta.failures) {
                    delta.destroyed.push(index);
                }
            }
            adapter.finish_update();
            tracing::debug!(destroyed = delta.destroyed.len(), "window emptied");
            return Ok(delta);
        }

        let anchor = anchor.min(item_count - 1);
        let limit = limit.max(MIN_OFFSCREEN_LIMIT);
        let range = anchor.saturating_sub(limit)..=anchor.saturating_add(limit).min(item_count - 1);

        // Resolve the anchor's offset while the old window is still intact.
        let anchor_offset = window
            .offset_of(anchor, margin, |i| sanitized_width(&*adapter, i))
            .unwrap_or(0.0);

        let mut evicted = window.drain_outside(&range);
        evicted.sort_by_key(|p| p.index);
        for page in evicted {
            let index = page.index;
            if self.destroy(adapter, index, page.handle, &mut delta.failures) {
                delta.destroyed.push(index);
            }
        }

        let mut missing: Vec<usize> = range.clone().filter(|&i| !window.contains(i)).collect();
        let order = self.order;
        missing.sort_by(|&a, &b| order(anchor, a, b));
        for index in missing {
            match adapter.instantiate(index) {
                Ok(handle) => {
                    let width = sanitized_width(&*adapter, index);
                    if window.insert(Page::new(index, handle, width)).is_ok() {
                        delta.instantiated.push(index);
                    }
                }
                Err(source) => {
                    tracing::warn!(index, error = %source, "instantiate failed; will retry");
                    delta.failures.0.push(PageFailure {
                        index,
                        op: AdapterOp::Instantiate,
                        source,
                    });
                }
            }
        }

        adapter.set_primary(anchor, window.get(anchor).map(Page::handle));
        adapter.finish_update();

        delta.rebase_shift += sweep(window, anchor, anchor_offset, margin, item_count, |i| {
            sanitized_width(&*adapter, i)
        });

        tracing::debug!(
            anchor,
            first = range.start(),
            last = range.end(),
            instantiated = delta.instantiated.len(),
            destroyed = delta.destroyed.len(),
            failures = delta.failures.len(),
            "populated window"
        );
        Ok(delta)
    }

    /// Revalidate every materialized page against the adapter, outside of a
    /// population pass.
    ///
    /// Used when the host reports that the data set changed. `item_count`
    /// is the adapter's new count; `current` is the index that was current
    /// before the change.
    pub fn revalidate<A>(
        &mut self,
        adapter: &mut A,
        window: &mut PageWindow<H>,
        current: usize,
        item_count: usize,
        margin: f32,
    ) -> Revalidation
    where
        A: PageAdapter<Handle = H>,
    {
        let mut delta = WindowDelta::default();
        adapter.begin_update();
        let fate = self.revalidate_pass(adapter, window, current, item_count, margin, &mut delta);
        adapter.finish_update();

        tracing::debug!(
            current,
            ?fate,
            removed = delta.removed.len(),
            moved = delta.moved.len(),
            "revalidated window"
        );
        Revalidation {
            current: fate,
            delta,
        }
    }

    /// Recompute offsets around `anchor` without changing which pages are
    /// materialized. Returns the rebase shift in container widths.
    pub fn relayout<A>(
        &self,
        adapter: &A,
        window: &mut PageWindow<H>,
        anchor: usize,
        margin: f32,
        item_count: usize,
    ) -> f32
    where
        A: PageAdapter<Handle = H>,
    {
        let Some(anchor_offset) = window.offset_of(anchor, margin, |i| sanitized_width(&*adapter, i))
        else {
            return 0.0;
        };
        sweep(window, anchor, anchor_offset, margin, item_count, |i| {
            sanitized_width(&*adapter, i)
        })
    }

    fn revalidate_pass<A>(
        &mut self,
        adapter: &mut A,
        window: &mut PageWindow<H>,
        current: usize,
        item_count: usize,
        margin: f32,
        delta: &mut WindowDelta,
    ) -> PageFate
    where
        A: PageAdapter<Handle = H>,
    {
        if window.is_empty() {
            return PageFate::Missing;
        }
        let mut fate = if window.contains(current) {
            PageFate::Unchanged
        } else {
            PageFate::Missing
        };

        let positions: Vec<ItemPosition> = window
            .iter()
            .map(|page| resolve_position(&*adapter, page, item_count))
            .collect();
        let structural = positions.iter().any(|p| *p != ItemPosition::Unchanged);

        // Offsets of pages that stayed put are still valid; the rest are
        // laid out around the first of them.
        let mut reference = None;
        if structural {
            let mut entries = Vec::with_capacity(positions.len());
            for (mut page, position) in window.take_all().into_iter().zip(positions) {
                let original = page.index;
                match position {
                    ItemPosition::Unchanged => {
                        reference.get_or_insert((page.index, page.offset));
                        entries.push((page, original, false));
                    }
                    ItemPosition::Moved(to) => {
                        delta.moved.push((original, to));
                        page.index = to;
                        entries.push((page, original, true));
                    }
                    ItemPosition::Removed => {
                        if original == current {
                            fate = PageFate::Removed;
                        }
                        delta.removed.push(original);
                        self.destroy(adapter, original, page.handle, &mut delta.failures);
                    }
                }
            }

            // Pages that stayed put win over pages moved onto their index.
            entries.sort_by_key(|(page, _, moved)| (page.index, *moved));
            for (page, original, moved) in entries {
                let index = page.index;
                match window.insert(page) {
                    Ok(()) => {
                        if moved && original == current {
                            fate = PageFate::Moved(index);
                        }
                    }
                    Err(dup) => {
                        tracing::warn!(index, from = original, "duplicate page after reindex; evicting");
                        if original == current {
                            fate = PageFate::Removed;
                        }
                        self.destroy(adapter, index, dup.handle, &mut delta.failures);
                    }
                }
            }
        }

        let mut widths_changed = false;
        for page in window.pages_mut() {
            let width = sanitized_width(&*adapter, page.index);
            if (width - page.width_fraction).abs() > f32::EPSILON {
                page.width_fraction = width;
                widths_changed = true;
            }
        }

        if !structural && !widths_changed {
            return fate;
        }
        delta.relaid_out = true;
        let reference = reference.or_else(|| window.first().map(|p| (p.index, p.offset)));
        if let Some((index, offset)) = reference {
            delta.rebase_shift += sweep(window, index, offset, margin, item_count, |i| {
                sanitized_width(&*adapter, i)
            });
        }
        fate
    }

    fn retry_destroys<A>(&mut self, adapter: &mut A, failures: &mut AdapterFailures)
    where
        A: PageAdapter<Handle = H>,
    {
        if self.pending_destroy.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_destroy);
        tracing::debug!(count = pending.len(), "retrying failed destroys");
        for (index, handle) in pending {
            self.destroy(adapter, index, handle, failures);
        }
    }

    /// Destroy the content at `index`, queueing it for retry on failure.
    /// Returns whether the adapter accepted the destroy.
    fn destroy<A>(
        &mut self,
        adapter: &mut A,
        index: usize,
        handle: H,
        failures: &mut AdapterFailures,
    ) -> bool
    where
        A: PageAdapter<Handle = H>,
    {
        match adapter.destroy(index, &handle) {
            Ok(()) => true,
            Err(source) => {
                tracing::warn!(index, error = %source, "destroy failed; will retry");
                failures.0.push(PageFailure {
                    index,
                    op: AdapterOp::Destroy,
                    source,
                });
                self.pending_destroy.push((index, handle));
                false
            }
        }
    }
}

/// Where `page`'s content lives now, normalized so that a move to the same
/// index is `Unchanged` and anything past the end is `Removed`.
fn resolve_position<A: PageAdapter>(adapter: &A, page: &Page<A::Handle>, item_count: usize) -> ItemPosition {
    match adapter.position_of(&page.handle) {
        ItemPosition::Moved(to) if to == page.index && to < item_count => ItemPosition::Unchanged,
        ItemPosition::Moved(to) if to >= item_count => {
            tracing::warn!(
                index = page.index,
                to,
                count = item_count,
                "adapter moved page past the end; treating as removed"
            );
            ItemPosition::Removed
        }
        ItemPosition::Unchanged if page.index >= item_count => ItemPosition::Removed,
        other => other,
    }
}

/// Lay out every page of `window` around `anchor`, whose leading edge is at
/// `anchor_offset`, then derive the scroll bounds and rebase so that page 0
/// sits at zero.
///
/// Pages before the anchor are placed by subtracting widths and margins
/// walking down; pages after it by adding them walking up. Unmaterialized
/// indices in between contribute `width_of(index)`. Returns the rebase shift.
pub(crate) fn sweep<H>(
    window: &mut PageWindow<H>,
    anchor: usize,
    anchor_offset: f32,
    margin: f32,
    item_count: usize,
    width_of: impl Fn(usize) -> f32,
) -> f32 {
    let split = window.split_point(anchor);
    let anchor_width = window
        .get(anchor)
        .map_or_else(|| width_of(anchor), Page::width_fraction);
    let pages = window.pages_mut();

    let (before, rest) = pages.split_at_mut(split);
    let mut offset = anchor_offset;
    let mut pos = anchor;
    for page in before.iter_mut().rev() {
        while pos > page.index + 1 {
            pos -= 1;
            offset -= width_of(pos) + margin;
        }
        offset -= page.width_fraction + margin;
        page.offset = offset;
        pos = page.index;
    }

    let mut offset = anchor_offset + anchor_width + margin;
    let mut pos = anchor + 1;
    for page in rest.iter_mut() {
        if page.index == anchor {
            page.offset = anchor_offset;
            continue;
        }
        while pos < page.index {
            offset += width_of(pos) + margin;
            pos += 1;
        }
        page.offset = offset;
        offset += page.width_fraction + margin;
        pos = page.index + 1;
    }

    let min = window
        .get(0)
        .map_or(f32::NEG_INFINITY, Page::offset);
    let max = item_count
        .checked_sub(1)
        .and_then(|last| window.get(last))
        .map_or(f32::INFINITY, |p| (p.offset + p.width_fraction - 1.0).max(min));
    window.set_scroll_bounds(min, max);

    let shift = if min.is_finite() { -min } else { 0.0 };
    if shift != 0.0 {
        window.shift(shift);
        tracing::trace!(shift, "rebased offsets on page 0");
    }
    shift
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

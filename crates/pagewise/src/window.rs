#![forbid(unsafe_code)]

//! The page window: materialized pages kept in index order.
//!
//! Offsets and widths are expressed in units of the container width. A page's
//! `offset` is the position of its leading edge relative to page 0's origin;
//! pages that are not materialized are treated as virtual slots whose width
//! is queried on demand.
//!
//! # Invariants
//!
//! 1. Pages are sorted strictly by index; no index appears twice.
//! 2. Adjacent pages satisfy `next.offset == prev.offset + prev.width + margin`
//!    once the virtualization engine has laid them out, with unmaterialized
//!    indices in between accounted for by their queried widths.
//! 3. When index 0 is materialized its offset is 0.

use std::ops::RangeInclusive;

/// Positions closer than this to the next slot's leading edge belong to it.
const SLOT_EPSILON: f32 = 1e-4;

/// One materialized page.
#[derive(Debug, Clone)]
pub struct Page<H> {
    pub(crate) index: usize,
    pub(crate) handle: H,
    pub(crate) width_fraction: f32,
    pub(crate) offset: f32,
}

impl<H> Page<H> {
    pub(crate) fn new(index: usize, handle: H, width_fraction: f32) -> Self {
        Self {
            index,
            handle,
            width_fraction,
            offset: 0.0,
        }
    }

    /// Adapter index.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Handle returned by the adapter when the page was instantiated.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// Width as a fraction of the container width.
    #[inline]
    #[must_use]
    pub fn width_fraction(&self) -> f32 {
        self.width_fraction
    }

    /// Leading edge in container widths, relative to page 0.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Whether this is the page the pager is anchored on.
    #[inline]
    #[must_use]
    pub fn is_current(&self, current: usize) -> bool {
        self.index == current
    }

    fn end(&self, margin: f32) -> f32 {
        self.offset + self.width_fraction + margin
    }
}

/// A page position resolved against the window, materialized or not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlot {
    /// Adapter index.
    pub index: usize,
    /// Leading edge in container widths.
    pub offset: f32,
    /// Width as a fraction of the container width.
    pub width_fraction: f32,
    /// Whether the page is in the window.
    pub materialized: bool,
}

impl PageSlot {
    fn of<H>(page: &Page<H>) -> Self {
        Self {
            index: page.index,
            offset: page.offset,
            width_fraction: page.width_fraction,
            materialized: true,
        }
    }

    fn virtual_slot(index: usize, offset: f32, width_fraction: f32) -> Self {
        Self {
            index,
            offset,
            width_fraction,
            materialized: false,
        }
    }

    fn end(&self, margin: f32) -> f32 {
        self.offset + self.width_fraction + margin
    }
}

/// Materialized pages sorted by index, with the scroll bounds derived from
/// them.
#[derive(Debug, Clone)]
pub struct PageWindow<H> {
    pages: Vec<Page<H>>,
    min_scroll: f32,
    max_scroll: f32,
}

impl<H> Default for PageWindow<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> PageWindow<H> {
    /// Create an empty window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            min_scroll: f32::NEG_INFINITY,
            max_scroll: f32::INFINITY,
        }
    }

    /// Number of materialized pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no page is materialized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Page<H>> {
        self.pages.iter()
    }

    /// Pages in index order, as a slice.
    #[must_use]
    pub fn pages(&self) -> &[Page<H>] {
        &self.pages
    }

    /// Lowest materialized page.
    #[must_use]
    pub fn first(&self) -> Option<&Page<H>> {
        self.pages.first()
    }

    /// Highest materialized page.
    #[must_use]
    pub fn last(&self) -> Option<&Page<H>> {
        self.pages.last()
    }

    /// Materialized indices in order.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.pages.iter().map(|p| p.index).collect()
    }

    /// Range from the lowest to the highest materialized index.
    #[must_use]
    pub fn index_range(&self) -> Option<RangeInclusive<usize>> {
        Some(self.pages.first()?.index..=self.pages.last()?.index)
    }

    /// Page at `index`, if materialized.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Page<H>> {
        self.position(index).ok().map(|i| &self.pages[i])
    }

    /// Whether `index` is materialized.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.position(index).is_ok()
    }

    /// Scroll range in container widths.
    ///
    /// The lower bound is page 0's offset and the upper bound is where the
    /// last page's trailing edge meets the container's trailing edge. A bound
    /// is infinite while the page defining it is not materialized.
    #[must_use]
    pub fn scroll_bounds(&self) -> (f32, f32) {
        (self.min_scroll, self.max_scroll)
    }

    fn position(&self, index: usize) -> Result<usize, usize> {
        self.pages.binary_search_by_key(&index, |p| p.index)
    }

    /// Position of the first page whose index is not below `index`.
    pub(crate) fn split_point(&self, index: usize) -> usize {
        self.pages.partition_point(|p| p.index < index)
    }

    pub(crate) fn pages_mut(&mut self) -> &mut [Page<H>] {
        &mut self.pages
    }

    pub(crate) fn set_scroll_bounds(&mut self, min: f32, max: f32) {
        self.min_scroll = min;
        self.max_scroll = max;
    }

    /// Insert a page at its sorted position. A page whose index is already
    /// present is handed back.
    pub(crate) fn insert(&mut self, page: Page<H>) -> Result<(), Page<H>> {
        match self.position(page.index) {
            Ok(_) => Err(page),
            Err(at) => {
                self.pages.insert(at, page);
                Ok(())
            }
        }
    }

    /// Remove and return every page outside `range`.
    pub(crate) fn drain_outside(&mut self, range: &RangeInclusive<usize>) -> Vec<Page<H>> {
        let (keep, evicted): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pages)
            .into_iter()
            .partition(|p| range.contains(&p.index));
        self.pages = keep;
        evicted
    }

    /// Remove and return every page.
    pub(crate) fn take_all(&mut self) -> Vec<Page<H>> {
        self.min_scroll = f32::NEG_INFINITY;
        self.max_scroll = f32::INFINITY;
        std::mem::take(&mut self.pages)
    }

    /// Move every offset and both bounds by `delta` container widths.
    pub(crate) fn shift(&mut self, delta: f32) {
        for page in &mut self.pages {
            page.offset += delta;
        }
        self.min_scroll += delta;
        self.max_scroll += delta;
    }

    /// Width of `index`: the stored width when materialized, otherwise
    /// `width_of(index)`.
    fn width_at(&self, index: usize, width_of: &impl Fn(usize) -> f32) -> f32 {
        self.get(index)
            .map_or_else(|| width_of(index), |p| p.width_fraction)
    }

    /// Offset of `index`, extrapolated from the nearest materialized page
    /// when `index` itself is not materialized.
    ///
    /// Returns `None` for an empty window.
    pub fn offset_of(
        &self,
        index: usize,
        margin: f32,
        width_of: impl Fn(usize) -> f32,
    ) -> Option<f32> {
        let split = match self.position(index) {
            Ok(at) => return Some(self.pages[at].offset),
            Err(split) => split,
        };
        let below = split.checked_sub(1).map(|i| &self.pages[i]);
        let above = self.pages.get(split);
        let use_below = match (below, above) {
            (Some(b), Some(a)) => index - b.index <= a.index - index,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => return None,
        };
        if use_below {
            let page = below?;
            let mut offset = page.end(margin);
            for i in page.index + 1..index {
                offset += width_of(i) + margin;
            }
            Some(offset)
        } else {
            let page = above?;
            let mut offset = page.offset;
            for i in (index..page.index).rev() {
                offset -= width_of(i) + margin;
            }
            Some(offset)
        }
    }

    /// The slot under `position` (in container widths).
    ///
    /// Walks the window and fills unmaterialized indices with virtual slots,
    /// extending past either end of the window up to the data set's bounds.
    /// Positions before page 0 resolve to page 0 and positions after the last
    /// page resolve to the last page.
    ///
    /// Returns `None` for an empty window or data set.
    pub fn slot_at(
        &self,
        position: f32,
        margin: f32,
        item_count: usize,
        width_of: impl Fn(usize) -> f32,
    ) -> Option<PageSlot> {
        let first = self.pages.first()?;
        if item_count == 0 {
            return None;
        }

        if position < first.offset - SLOT_EPSILON {
            let mut slot = PageSlot::of(first);
            while slot.index > 0 && position < slot.offset - SLOT_EPSILON {
                let index = slot.index - 1;
                let width = self.width_at(index, &width_of);
                slot = PageSlot::virtual_slot(index, slot.offset - width - margin, width);
            }
            return Some(slot);
        }

        let mut prev: Option<PageSlot> = None;
        for page in &self.pages {
            if let Some(mut gap) = prev {
                while gap.index + 1 < page.index {
                    let index = gap.index + 1;
                    gap = PageSlot::virtual_slot(index, gap.end(margin), width_of(index));
                    if position < gap.end(margin) - SLOT_EPSILON {
                        return Some(gap);
                    }
                }
            }
            let slot = PageSlot::of(page);
            if position < slot.end(margin) - SLOT_EPSILON {
                return Some(slot);
            }
            prev = Some(slot);
        }

        let mut slot = prev?;
        while slot.index + 1 < item_count && position >= slot.end(margin) - SLOT_EPSILON {
            let index = slot.index + 1;
            slot = PageSlot::virtual_slot(index, slot.end(margin), width_of(index));
        }
        Some(slot)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

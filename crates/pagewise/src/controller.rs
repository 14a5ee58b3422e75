#![forbid(unsafe_code)]

//! The paging controller.
//!
//! [`PagingController`] owns the adapter, the page window, and the scroll
//! position, and drives the gesture state machine, the virtualization engine,
//! and the scroll animator from host callbacks.
//!
//! # Host Callbacks
//!
//! | Callback | Effect |
//! |----------|--------|
//! | [`PagingController::set_container_width`] | First layout, then resizes |
//! | [`PagingController::on_pointer_event`] | Drag, catch, release |
//! | [`PagingController::on_frame`] | Advances a settle |
//! | [`PagingController::notify_adapter_changed`] | Revalidates against new data |
//! | [`PagingController::attach`] / [`PagingController::detach`] | Reset transient gesture state |
//!
//! After each callback the host reads [`PagingController::scroll_offset`]
//! and applies it to its visual scroll position.
//!
//! # Current and Selected
//!
//! The *current* index anchors the page window. While dragging or settling it
//! follows the page nearest to the scroll position, and the window is
//! repopulated whenever it moves. The *selected* index is the last index
//! announced through [`PageChangeListener::on_page_selected`]; it only
//! changes on commit: a non-animated jump, the end of a settle, or an
//! adapter change.
//!
//! # Failure Modes
//!
//! A [`PagerError::ConsistencyViolation`] poisons the controller: every later
//! call returns the same error. [`PagerError::Adapter`] is returned after the
//! call has otherwise completed; the controller stays usable.

use std::fmt;
use std::time::Duration;

use pagewise_core::animation::EasingFn;
use pagewise_core::{PointerEvent, PointerEventKind};

use crate::adapter::{PageAdapter, sanitized_width};
use crate::config::{MIN_OFFSCREEN_LIMIT, PagerConfig};
use crate::error::{AdapterFailures, PagerError, Result};
use crate::gesture::{
    EdgeResistance, GestureOutcome, GestureStateMachine, NoParent, ParentCoordinator, TouchState,
};
use crate::listener::{ListenerId, Listeners, PageChangeListener, ScrollState};
use crate::scroller::{DurationHint, ScrollAnimator};
use crate::state::SavedState;
use crate::virtualize::{InstantiateOrder, PageFate, VirtualizationEngine, WindowDelta};
use crate::window::PageWindow;

/// In-page fractions closer than this to zero snap to zero.
const FRACTION_SNAP: f32 = 1e-4;

/// Scroll offsets closer than this many pixels count as equal.
const PIXEL_TOLERANCE: f32 = 0.5;

/// Direction along the page strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward lower indices.
    Backward,
    /// Toward higher indices.
    Forward,
}

/// Virtualized horizontal pager.
pub struct PagingController<A: PageAdapter> {
    adapter: A,
    config: PagerConfig,
    window: PageWindow<A::Handle>,
    engine: VirtualizationEngine<A::Handle>,
    gesture: GestureStateMachine,
    resistance: EdgeResistance,
    animator: ScrollAnimator,
    listeners: Listeners,
    parent: Box<dyn ParentCoordinator>,
    item_count: usize,
    current_index: usize,
    selected_index: Option<usize>,
    scroll_state: ScrollState,
    scroll_x: f32,
    container_width: f32,
    settle_target: Option<usize>,
    poisoned: Option<(usize, usize)>,
    laid_out: bool,
    attached: bool,
    edge_pulled: bool,
}

impl<A: PageAdapter> fmt::Debug for PagingController<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagingController")
            .field("item_count", &self.item_count)
            .field("current_index", &self.current_index)
            .field("selected_index", &self.selected_index)
            .field("scroll_state", &self.scroll_state)
            .field("scroll_x", &self.scroll_x)
            .field("container_width", &self.container_width)
            .field("pages", &self.window.indices())
            .field("poisoned", &self.poisoned.is_some())
            .finish()
    }
}

impl<A: PageAdapter> PagingController<A> {
    /// Create a controller over `adapter`.
    ///
    /// Nothing is materialized until the first
    /// [`set_container_width`](Self::set_container_width).
    #[must_use]
    pub fn new(adapter: A, config: PagerConfig) -> Self {
        let config = config.sanitized();
        let item_count = adapter.count();
        Self {
            gesture: GestureStateMachine::new(&config),
            resistance: EdgeResistance::new(config.max_overscroll_fraction),
            animator: ScrollAnimator::new(config.min_settle_duration, config.max_settle_duration),
            adapter,
            config,
            window: PageWindow::new(),
            engine: VirtualizationEngine::new(),
            listeners: Listeners::new(),
            parent: Box::new(NoParent),
            item_count,
            current_index: 0,
            selected_index: None,
            scroll_state: ScrollState::Idle,
            scroll_x: 0.0,
            container_width: 0.0,
            settle_target: None,
            poisoned: None,
            laid_out: false,
            attached: true,
            edge_pulled: false,
        }
    }

    /// Set the settle easing curve (builder).
    #[must_use]
    pub fn with_easing(mut self, easing: EasingFn) -> Self {
        self.animator = std::mem::take(&mut self.animator).easing(easing);
        self
    }

    /// Set the order in which missing pages are instantiated (builder).
    #[must_use]
    pub fn with_instantiate_order(mut self, order: InstantiateOrder) -> Self {
        self.engine = std::mem::take(&mut self.engine).with_order(order);
        self
    }

    /// Install the coordinator for scrolling ancestors (builder).
    #[must_use]
    pub fn with_parent(mut self, parent: impl ParentCoordinator + 'static) -> Self {
        self.parent = Box::new(parent);
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The adapter.
    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// The adapter, for mutation. Call
    /// [`notify_adapter_changed`](Self::notify_adapter_changed) after changing
    /// its contents.
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Effective configuration.
    #[must_use]
    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    /// Materialized pages.
    #[must_use]
    pub fn pages(&self) -> &PageWindow<A::Handle> {
        &self.window
    }

    /// Item count recorded at the last adapter-change pass.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Index the window is anchored on.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Last index announced to listeners.
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// Current scroll state.
    #[must_use]
    pub fn scroll_state(&self) -> ScrollState {
        self.scroll_state
    }

    /// Touch-tracking state of the gesture state machine.
    #[must_use]
    pub fn touch_state(&self) -> TouchState {
        self.gesture.state()
    }

    /// Raw scroll offset in pixels, to be applied by the host.
    #[must_use]
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_x
    }

    /// Container width in pixels; zero before the first layout.
    #[must_use]
    pub fn container_width(&self) -> f32 {
        self.container_width
    }

    /// Whether a consistency violation stopped the controller.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    /// Register a listener.
    pub fn add_listener(&mut self, listener: impl PageChangeListener + 'static) -> ListenerId {
        self.listeners.add(Box::new(listener))
    }

    /// Unregister a listener. Returns whether it was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Whether the scroll position can move further in `direction`.
    #[must_use]
    pub fn can_scroll(&self, direction: Direction) -> bool {
        if !self.laid_out || self.item_count == 0 {
            return false;
        }
        let (min, max) = self.window.scroll_bounds();
        match direction {
            Direction::Backward => self.scroll_x > min * self.container_width + PIXEL_TOLERANCE,
            Direction::Forward => self.scroll_x < max * self.container_width - PIXEL_TOLERANCE,
        }
    }

    // -----------------------------------------------------------------------
    // Host callbacks
    // -----------------------------------------------------------------------

    /// Report the container width in pixels.
    ///
    /// The first call performs the initial layout and announces the initial
    /// page. Later calls keep the scroll position at the same place relative
    /// to its page and retarget an in-flight settle.
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn set_container_width(&mut self, width: f32) -> Result<()> {
        self.ensure_healthy()?;
        if !(width.is_finite() && width > 0.0) {
            tracing::warn!(width, "ignoring invalid container width");
            return Ok(());
        }
        if !self.laid_out {
            self.container_width = width;
            self.animator.set_container_width(width);
            self.laid_out = true;
            tracing::debug!(width, index = self.current_index, "first layout");
            if self.item_count == 0 {
                return Ok(());
            }
            let index = self.current_index.min(self.item_count - 1);
            let failures = self.jump_to(index, false)?;
            return Self::finish(failures);
        }
        if width == self.container_width {
            return Ok(());
        }
        tracing::debug!(from = self.container_width, to = width, "container resized");
        let failures = self.reflow(|this| {
            this.container_width = width;
            this.animator.set_container_width(width);
        })?;
        Self::finish(failures)
    }

    /// Move to `index`, clamped to the data set.
    ///
    /// Without animation the move is immediate and announced at once; a
    /// repeated call for the page already shown does nothing. With animation
    /// the pager settles toward `index` over the default settle duration,
    /// superseding any settle in flight, and announces it when the settle
    /// ends. Before the first layout the index is only recorded.
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn set_current_index(&mut self, index: usize, animate: bool) -> Result<()> {
        self.ensure_healthy()?;
        if self.item_count == 0 {
            return Ok(());
        }
        let target = index.min(self.item_count - 1);
        if target != index {
            tracing::debug!(requested = index, clamped = target, "index clamped");
        }
        if !self.laid_out {
            self.current_index = target;
            return Ok(());
        }
        let failures = if animate {
            self.end_drag();
            self.settle_to(target, DurationHint::Fixed(self.config.default_settle_duration))?
        } else if self.is_settled_on(target) {
            AdapterFailures::default()
        } else {
            self.jump_to(target, false)?
        };
        Self::finish(failures)
    }

    /// Animate to the next page. Returns whether there was one.
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn page_forward(&mut self) -> Result<bool> {
        let from = self.committed_target();
        if from + 1 >= self.item_count {
            return Ok(false);
        }
        self.set_current_index(from + 1, true)?;
        Ok(true)
    }

    /// Animate to the previous page. Returns whether there was one.
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn page_backward(&mut self) -> Result<bool> {
        let from = self.committed_target();
        if from == 0 || self.item_count == 0 {
            return Ok(false);
        }
        self.set_current_index(from - 1, true)?;
        Ok(true)
    }

    /// Feed one pointer event.
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn on_pointer_event(&mut self, event: &PointerEvent) -> Result<()> {
        self.ensure_healthy()?;
        if !self.attached || !self.laid_out || self.item_count == 0 {
            return Ok(());
        }

        let mut failures = AdapterFailures::default();
        let outcome = if event.kind == PointerEventKind::Down
            && self.scroll_state == ScrollState::Settling
        {
            if self.animator.remaining_distance() > self.config.close_enough {
                self.animator.cancel();
                self.settle_target = None;
                self.scroll_x = self.animator.offset();
                self.parent.request_exclusive();
                self.gesture.catch(event)
            } else {
                self.animator.cancel();
                failures = self.finish_settle()?;
                self.gesture.handle(event, self.parent.as_mut())
            }
        } else {
            self.gesture.handle(event, self.parent.as_mut())
        };

        let more = match outcome {
            GestureOutcome::DragStarted { delta } => {
                if self.animator.is_running() {
                    self.animator.cancel();
                    self.settle_target = None;
                    self.scroll_x = self.animator.offset();
                }
                self.set_scroll_state(ScrollState::Dragging);
                self.perform_drag(delta)?
            }
            GestureOutcome::Drag { delta } => self.perform_drag(delta)?,
            GestureOutcome::Released { velocity, distance } => self.release(velocity, distance)?,
            GestureOutcome::Tap | GestureOutcome::Aborted
                if self.scroll_state == ScrollState::Dragging =>
            {
                tracing::debug!(?outcome, "gesture ended without a release; settling");
                self.release(0.0, 0.0)?
            }
            GestureOutcome::None | GestureOutcome::Tap | GestureOutcome::Aborted => {
                AdapterFailures::default()
            }
        };
        failures.0.extend(more.0);
        Self::finish(failures)
    }

    /// Resolve a finished drag into a settle.
    ///
    /// `velocity` (pixels per second) and `distance` (pixels) are in scroll
    /// space: positive values point toward higher indices. A release faster
    /// than the minimum fling velocity after more than the minimum fling
    /// distance settles on the next page in the velocity's direction.
    /// Otherwise a forward drag commits once it covers the forward commit
    /// fraction of a page and a backward drag once it covers the backward
    /// commit fraction. The target never leaves the materialized window.
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn on_gesture_released(&mut self, velocity: f32, distance: f32) -> Result<()> {
        self.ensure_healthy()?;
        if !self.laid_out || self.item_count == 0 {
            return Ok(());
        }
        self.gesture.reset();
        let failures = self.release(velocity, distance)?;
        Self::finish(failures)
    }

    /// Advance an in-flight settle by `dt`.
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn on_frame(&mut self, dt: Duration) -> Result<()> {
        self.ensure_healthy()?;
        if !self.animator.is_running() {
            return Ok(());
        }
        let frame = self.animator.tick(dt);
        self.scroll_x = frame.offset;
        let mut failures = self.track_scroll()?;
        if frame.finished {
            failures.0.extend(self.finish_settle()?.0);
        }
        Self::finish(failures)
    }

    /// Recompute the page under the scroll position, repopulate if the
    /// nearest page changed, and notify listeners of the position.
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn on_scroll_tick(&mut self) -> Result<()> {
        self.ensure_healthy()?;
        if !self.laid_out {
            return Ok(());
        }
        let failures = self.track_scroll()?;
        Self::finish(failures)
    }

    /// Reconcile with the adapter after its contents changed.
    ///
    /// Pages the adapter reports removed are destroyed and moved pages are
    /// reindexed. At rest the pager jumps to the page now holding the current
    /// content, clamped to the new count; the page is announced when its
    /// index changed, or when the content at the current index was removed.
    /// A drag in progress keeps the content under the pointer in place, and
    /// a settle in progress continues toward its target's new index. A
    /// change that moves nothing leaves the scroll position alone.
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn notify_adapter_changed(&mut self) -> Result<()> {
        self.ensure_healthy()?;
        let count = self.adapter.count();
        let old_count = self.item_count;
        let previous = self.current_index;
        let position = self.page_position();
        let margin = self.margin_fraction();
        let mut revalidation =
            self.engine
                .revalidate(&mut self.adapter, &mut self.window, previous, count, margin);
        self.apply_rebase(revalidation.delta.rebase_shift);
        let mut failures = std::mem::take(&mut revalidation.delta.failures);
        tracing::debug!(
            old_count,
            count,
            current = previous,
            fate = ?revalidation.current,
            state = %self.scroll_state,
            "adapter changed"
        );
        self.item_count = count;

        if count == 0 {
            self.end_drag();
            self.animator.cancel();
            self.settle_target = None;
            failures.0.extend(self.repopulate(0)?.0);
            self.current_index = 0;
            self.selected_index = None;
            self.scroll_x = 0.0;
            self.set_scroll_state(ScrollState::Idle);
            return Self::finish(failures);
        }

        let (next, identity_changed) = match revalidation.current {
            PageFate::Moved(to) => (to, false),
            PageFate::Removed => (previous, true),
            PageFate::Unchanged | PageFate::Missing => (previous, false),
        };
        let next = next.min(count - 1);
        if !self.laid_out {
            self.current_index = next;
            return Self::finish(failures);
        }

        let more = if count == old_count && !revalidation.delta.relaid_out {
            self.repopulate(self.current_index)?
        } else if self.scroll_state == ScrollState::Idle {
            self.jump_to(next, identity_changed)?
        } else {
            self.follow_content(next, position, &revalidation.delta)?
        };
        failures.0.extend(more.0);
        Self::finish(failures)
    }

    /// The host view was attached.
    pub fn attach(&mut self) {
        self.attached = true;
        self.gesture.reset();
    }

    /// The host view was detached. Any drag or settle completes at once and
    /// pointer events are ignored until [`attach`](Self::attach).
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn detach(&mut self) -> Result<()> {
        self.ensure_healthy()?;
        self.attached = false;
        let failures = match self.scroll_state {
            ScrollState::Settling => {
                self.gesture.reset();
                self.animator.cancel();
                self.finish_settle()?
            }
            ScrollState::Dragging => self.jump_to(self.current_index, false)?,
            ScrollState::Idle => {
                self.gesture.reset();
                AdapterFailures::default()
            }
        };
        Self::finish(failures)
    }

    /// Snapshot of the committed position and the adapter's state.
    #[must_use]
    pub fn save_state(&self) -> SavedState {
        SavedState {
            current_index: self.committed_target(),
            adapter_state: self.adapter.save_state(),
        }
    }

    /// Restore a snapshot taken by [`save_state`](Self::save_state).
    ///
    /// Before the first layout the index is recorded and applied by the
    /// layout; afterwards the pager jumps to it.
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn restore_state(&mut self, state: &SavedState) -> Result<()> {
        self.ensure_healthy()?;
        if let Some(blob) = &state.adapter_state {
            self.adapter.restore_state(blob);
        }
        if !self.laid_out {
            self.current_index = state.current_index.min(self.item_count.saturating_sub(1));
            tracing::debug!(index = self.current_index, "restore pending first layout");
            return Ok(());
        }
        self.set_current_index(state.current_index, false)
    }

    /// Change how many pages stay materialized on each side of the current
    /// page. Values below 1 are raised to 1.
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn set_offscreen_limit(&mut self, limit: usize) -> Result<()> {
        self.ensure_healthy()?;
        let limit = if limit < MIN_OFFSCREEN_LIMIT {
            tracing::warn!(
                requested = limit,
                "offscreen limit too small; using {MIN_OFFSCREEN_LIMIT}"
            );
            MIN_OFFSCREEN_LIMIT
        } else {
            limit
        };
        if limit == self.config.offscreen_limit {
            return Ok(());
        }
        self.config.offscreen_limit = limit;
        if !self.laid_out || self.item_count == 0 {
            return Ok(());
        }
        let failures = self.repopulate(self.current_index)?;
        Self::finish(failures)
    }

    /// Change the gap between pages, in pixels. The scroll position keeps
    /// its place relative to its page.
    ///
    /// # Errors
    ///
    /// See the module documentation.
    pub fn set_page_margin(&mut self, margin: f32) -> Result<()> {
        self.ensure_healthy()?;
        let margin = if margin.is_finite() && margin >= 0.0 {
            margin
        } else {
            tracing::warn!(margin, "invalid page margin; using 0");
            0.0
        };
        if margin == self.config.page_margin {
            return Ok(());
        }
        if !self.laid_out {
            self.config.page_margin = margin;
            return Ok(());
        }
        let failures = self.reflow(|this| this.config.page_margin = margin)?;
        Self::finish(failures)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn ensure_healthy(&self) -> Result<()> {
        match self.poisoned {
            Some((expected, found)) => Err(PagerError::ConsistencyViolation { expected, found }),
            None => Ok(()),
        }
    }

    fn finish(failures: AdapterFailures) -> Result<()> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(PagerError::Adapter(failures))
        }
    }

    /// Index the pager is committed to or heading for.
    fn committed_target(&self) -> usize {
        self.settle_target
            .or(self.selected_index)
            .unwrap_or(self.current_index)
    }

    fn margin_fraction(&self) -> f32 {
        if self.container_width > 0.0 {
            self.config.page_margin / self.container_width
        } else {
            0.0
        }
    }

    fn page_width(&self, index: usize) -> f32 {
        self.window
            .get(index)
            .map_or_else(|| sanitized_width(&self.adapter, index), |p| p.width_fraction())
    }

    /// Offset of `index` in container widths, extrapolated when it is not
    /// materialized.
    fn page_offset(&self, index: usize) -> f32 {
        let adapter = &self.adapter;
        self.window
            .offset_of(index, self.margin_fraction(), |i| sanitized_width(adapter, i))
            .unwrap_or(0.0)
    }

    /// Page whose leading edge is at or before the scroll position, and how
    /// far into it the position is.
    fn page_position(&self) -> Option<(usize, f32)> {
        if self.container_width <= 0.0 {
            return None;
        }
        let adapter = &self.adapter;
        let margin = self.margin_fraction();
        let position = self.scroll_x / self.container_width;
        let slot = self
            .window
            .slot_at(position, margin, self.item_count, |i| sanitized_width(adapter, i))?;
        let fraction = (position - slot.offset) / (slot.width_fraction + margin);
        let fraction = if fraction.abs() < FRACTION_SNAP {
            0.0
        } else {
            fraction
        };
        Some((slot.index, fraction))
    }

    fn is_settled_on(&self, index: usize) -> bool {
        self.scroll_state == ScrollState::Idle
            && self.selected_index == Some(index)
            && self.current_index == index
            && self.window.contains(index)
            && (self.scroll_x - self.page_offset(index) * self.container_width).abs()
                < PIXEL_TOLERANCE
    }

    fn set_scroll_state(&mut self, state: ScrollState) {
        if self.scroll_state == state {
            return;
        }
        tracing::trace!(from = %self.scroll_state, to = %state, "scroll state changed");
        self.scroll_state = state;
        self.listeners.scroll_state_changed(state);
    }

    fn poison(&mut self, err: PagerError) -> PagerError {
        if let PagerError::ConsistencyViolation { expected, found } = err {
            self.poisoned = Some((expected, found));
            self.animator.cancel();
            self.gesture.reset();
            self.settle_target = None;
        }
        err
    }

    fn apply_rebase(&mut self, shift: f32) {
        if shift != 0.0 && self.container_width > 0.0 {
            let pixels = shift * self.container_width;
            self.scroll_x += pixels;
            self.animator.translate(pixels);
        }
    }

    fn repopulate(&mut self, anchor: usize) -> Result<AdapterFailures> {
        let margin = self.margin_fraction();
        match self.engine.populate(
            &mut self.adapter,
            &mut self.window,
            anchor,
            self.config.offscreen_limit,
            self.item_count,
            margin,
        ) {
            Ok(delta) => {
                self.apply_rebase(delta.rebase_shift);
                Ok(delta.failures)
            }
            Err(err) => Err(self.poison(err)),
        }
    }

    fn end_drag(&mut self) {
        if self.gesture.state() != TouchState::Idle {
            self.gesture.reset();
        }
        if self.edge_pulled {
            self.edge_pulled = false;
            self.listeners.edge_release();
        }
    }

    /// Move to `index` without animation. Announces the page when it differs
    /// from the selected one, or unconditionally with `force_select`.
    fn jump_to(&mut self, index: usize, force_select: bool) -> Result<AdapterFailures> {
        self.end_drag();
        self.animator.cancel();
        self.settle_target = None;
        self.current_index = index;
        let mut failures = self.repopulate(index)?;
        self.scroll_x = self.page_offset(index) * self.container_width;
        if force_select || self.selected_index != Some(index) {
            self.selected_index = Some(index);
            self.listeners.page_selected(index);
        }
        self.set_scroll_state(ScrollState::Idle);
        failures.0.extend(self.track_scroll()?.0);
        Ok(failures)
    }

    fn settle_to(&mut self, target: usize, hint: DurationHint) -> Result<AdapterFailures> {
        let to = self.page_offset(target) * self.container_width;
        self.settle_target = Some(target);
        self.animator.start_scroll(self.scroll_x, to, hint);
        if !self.animator.is_running() {
            self.scroll_x = to;
            return self.finish_settle();
        }
        tracing::debug!(target, from = self.scroll_x, to, "settling");
        self.set_scroll_state(ScrollState::Settling);
        Ok(AdapterFailures::default())
    }

    fn finish_settle(&mut self) -> Result<AdapterFailures> {
        let target = self.settle_target.take().unwrap_or(self.current_index);
        let failures = if target == self.current_index {
            AdapterFailures::default()
        } else {
            self.current_index = target;
            self.repopulate(target)?
        };
        self.scroll_x = self.page_offset(target) * self.container_width;
        if self.selected_index != Some(target) {
            self.selected_index = Some(target);
            self.listeners.page_selected(target);
        }
        tracing::debug!(index = target, "settled");
        self.set_scroll_state(ScrollState::Idle);
        Ok(failures)
    }

    fn perform_drag(&mut self, delta: f32) -> Result<AdapterFailures> {
        let width = self.container_width;
        let (min, max) = self.window.scroll_bounds();
        let (offset, signal) =
            self.resistance
                .apply(self.scroll_x, delta, min * width, max * width, width);
        self.scroll_x = offset;
        match signal {
            Some(signal) => {
                self.edge_pulled = true;
                self.listeners.edge_pull(signal.edge, signal.pull);
            }
            None if self.edge_pulled => {
                self.edge_pulled = false;
                self.listeners.edge_release();
            }
            None => {}
        }
        self.track_scroll()
    }

    fn resolve_target(&self, velocity: f32, distance: f32) -> usize {
        let Some((page, fraction)) = self.page_position() else {
            return self.current_index;
        };
        let selected = self.selected_index.unwrap_or(self.current_index);
        let fling = distance.abs() > self.config.min_fling_distance
            && velocity.abs() > self.config.min_fling_velocity;
        let target = if fling {
            if velocity > 0.0 { page + 1 } else { page }
        } else if page >= selected {
            if fraction >= self.config.forward_commit_fraction {
                page + 1
            } else {
                page
            }
        } else if 1.0 - fraction >= self.config.backward_commit_fraction {
            page
        } else {
            page + 1
        };
        let target = match self.window.index_range() {
            Some(range) => target.clamp(*range.start(), *range.end()),
            None => target,
        };
        tracing::trace!(page, fraction, fling, target, "release resolved");
        target.min(self.item_count.saturating_sub(1))
    }

    fn release(&mut self, velocity: f32, distance: f32) -> Result<AdapterFailures> {
        if self.edge_pulled {
            self.edge_pulled = false;
            self.listeners.edge_release();
        }
        let target = self.resolve_target(velocity, distance);
        let hint = if velocity != 0.0 && velocity.is_finite() {
            DurationHint::Velocity(velocity)
        } else {
            DurationHint::Distance {
                page_extent: self.container_width * self.page_width(target)
                    + self.config.page_margin,
            }
        };
        tracing::debug!(velocity, distance, target, "gesture released");
        self.settle_to(target, hint)
    }

    /// Keep the scroll position at the same place relative to its page
    /// across a change of width or margin made by `update`.
    fn reflow(&mut self, update: impl FnOnce(&mut Self)) -> Result<AdapterFailures> {
        let position = self.page_position();
        update(self);
        if self.window.is_empty() {
            return Ok(AdapterFailures::default());
        }
        let margin = self.margin_fraction();
        self.engine.relayout(
            &self.adapter,
            &mut self.window,
            self.current_index,
            margin,
            self.item_count,
        );
        let width = self.container_width;
        self.scroll_x = match position {
            Some((index, fraction)) if self.scroll_state != ScrollState::Idle => {
                self.offset_at(index, fraction)
            }
            _ => self.page_offset(self.current_index) * width,
        };
        if let Some(target) = self.settle_target
            && self.animator.is_running()
        {
            let remaining = self.animator.remaining_time();
            let to = self.page_offset(target) * width;
            self.animator.cancel();
            self.animator
                .start_scroll(self.scroll_x, to, DurationHint::Fixed(remaining));
        }
        self.track_scroll()
    }

    /// Pixel offset of the point `fraction` of the way into page `index`.
    fn offset_at(&self, index: usize, fraction: f32) -> f32 {
        let step = self.page_width(index) + self.margin_fraction();
        (self.page_offset(index) + fraction * step) * self.container_width
    }

    /// Carry a drag or settle across a data change: the content under the
    /// scroll position stays put, the selected page follows its content, and
    /// a settle heads for its target's new index.
    fn follow_content(
        &mut self,
        current: usize,
        position: Option<(usize, f32)>,
        delta: &WindowDelta,
    ) -> Result<AdapterFailures> {
        let last = self.item_count - 1;
        // Without a relayout the offsets still hold and so does `scroll_x`.
        if delta.relaid_out
            && let Some((index, fraction)) = position
        {
            let (index, _) = delta.index_after(index);
            self.scroll_x = self.offset_at(index.min(last), fraction);
        }
        if let Some(selected) = self.selected_index {
            let (index, removed) = delta.index_after(selected);
            let index = index.min(last);
            if removed || index != selected {
                self.selected_index = Some(index);
                self.listeners.page_selected(index);
            }
        }
        self.current_index = current;
        let mut failures = self.repopulate(current)?;

        if let Some(target) = self.settle_target {
            let target = delta.index_after(target).0.min(last);
            self.settle_target = Some(target);
            let remaining = self.animator.remaining_time();
            let to = self.page_offset(target) * self.container_width;
            self.animator.cancel();
            self.animator
                .start_scroll(self.scroll_x, to, DurationHint::Fixed(remaining));
            tracing::debug!(target, from = self.scroll_x, to, "settle follows its target");
            if !self.animator.is_running() {
                failures.0.extend(self.finish_settle()?.0);
                return Ok(failures);
            }
        }
        failures.0.extend(self.track_scroll()?.0);
        Ok(failures)
    }

    /// Follow the scroll position with the window anchor and report it.
    fn track_scroll(&mut self) -> Result<AdapterFailures> {
        let Some((index, fraction)) = self.page_position() else {
            return Ok(AdapterFailures::default());
        };
        let nearest = if fraction >= 0.5 {
            (index + 1).min(self.item_count.saturating_sub(1))
        } else {
            index
        };
        let failures = if nearest == self.current_index && self.window.contains(nearest) {
            AdapterFailures::default()
        } else {
            tracing::trace!(from = self.current_index, to = nearest, "anchor moved");
            self.current_index = nearest;
            self.repopulate(nearest)?
        };
        if let Some((index, fraction)) = self.page_position() {
            let pixels = fraction * (self.container_width + self.config.page_margin);
            self.listeners.scrolled(index, fraction, pixels);
        }
        Ok(failures)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ItemPosition;
    use crate::error::AdapterError;
    use crate::listener::Edge;
    use pagewise_core::PointerId;
    use std::cell::RefCell;
    use std::rc::Rc;

    const MS_16: Duration = Duration::from_millis(16);
    const WIDTH: f32 = 1000.0;

    /// Pages identified by content ids; handles are the ids.
    #[derive(Default)]
    struct Pages {
        ids: Vec<u32>,
        fail_instantiate: Option<usize>,
        reported_count: Option<usize>,
    }

    impl Pages {
        fn new(count: u32) -> Self {
            Self {
                ids: (0..count).collect(),
                ..Self::default()
            }
        }
    }

    impl PageAdapter for Pages {
        type Handle = u32;

        fn count(&self) -> usize {
            self.reported_count.unwrap_or(self.ids.len())
        }

        fn instantiate(&mut self, index: usize) -> std::result::Result<u32, AdapterError> {
            if self.fail_instantiate == Some(index) {
                return Err(AdapterError::new("no content"));
            }
            self.ids
                .get(index)
                .copied()
                .ok_or_else(|| AdapterError::new("out of range"))
        }

        fn destroy(&mut self, _: usize, _: &u32) -> std::result::Result<(), AdapterError> {
            Ok(())
        }

        fn position_of(&self, id: &u32) -> ItemPosition {
            match self.ids.iter().position(|i| i == id) {
                Some(at) => ItemPosition::Moved(at),
                None => ItemPosition::Removed,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Selected(usize),
        State(ScrollState),
        Scrolled(usize),
        Pull(Edge),
        Release,
    }

    struct Recorder(Rc<RefCell<Vec<Seen>>>);

    impl PageChangeListener for Recorder {
        fn on_page_selected(&mut self, index: usize) {
            self.0.borrow_mut().push(Seen::Selected(index));
        }

        fn on_scroll_state_changed(&mut self, state: ScrollState) {
            self.0.borrow_mut().push(Seen::State(state));
        }

        fn on_scrolled(&mut self, index: usize, _: f32, _: f32) {
            self.0.borrow_mut().push(Seen::Scrolled(index));
        }

        fn on_edge_pull(&mut self, edge: Edge, _: f32) {
            self.0.borrow_mut().push(Seen::Pull(edge));
        }

        fn on_edge_release(&mut self) {
            self.0.borrow_mut().push(Seen::Release);
        }
    }

    type Log = Rc<RefCell<Vec<Seen>>>;

    fn pager(count: u32) -> (PagingController<Pages>, Log) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pager = PagingController::new(Pages::new(count), PagerConfig::default());
        pager.add_listener(Recorder(Rc::clone(&log)));
        (pager, log)
    }

    fn laid_out(count: u32) -> (PagingController<Pages>, Log) {
        let (mut pager, log) = pager(count);
        pager.set_container_width(WIDTH).expect("layout");
        log.borrow_mut().clear();
        (pager, log)
    }

    fn selected(log: &Log) -> Vec<usize> {
        log.borrow()
            .iter()
            .filter_map(|s| match s {
                Seen::Selected(i) => Some(*i),
                _ => None,
            })
            .collect()
    }

    fn states(log: &Log) -> Vec<ScrollState> {
        log.borrow()
            .iter()
            .filter_map(|s| match s {
                Seen::State(state) => Some(*state),
                _ => None,
            })
            .collect()
    }

    fn at(frame: u32) -> Duration {
        MS_16 * frame
    }

    /// Drag the primary pointer from `from` to `to` over `frames` frames.
    /// With `hold` the pointer rests before lifting so the release carries no
    /// velocity.
    fn drag(pager: &mut PagingController<Pages>, from: f32, to: f32, frames: u32, hold: bool) {
        let id = PointerId::PRIMARY;
        pager
            .on_pointer_event(&PointerEvent::down(id, from, 100.0, at(0)))
            .expect("down");
        let step = (to - from) / frames as f32;
        for frame in 1..=frames {
            let x = from + step * frame as f32;
            pager
                .on_pointer_event(&PointerEvent::moved(id, x, 100.0, at(frame)))
                .expect("move");
        }
        let mut end = frames;
        if hold {
            for _ in 0..8 {
                end += 1;
                pager
                    .on_pointer_event(&PointerEvent::moved(id, to, 100.0, at(end)))
                    .expect("hold");
            }
        }
        pager
            .on_pointer_event(&PointerEvent::up(id, to, 100.0, at(end + 1)))
            .expect("up");
    }

    fn settle(pager: &mut PagingController<Pages>) {
        for _ in 0..200 {
            if pager.scroll_state() == ScrollState::Idle {
                return;
            }
            pager.on_frame(MS_16).expect("frame");
        }
        panic!("settle did not finish");
    }

    fn indices(pager: &PagingController<Pages>) -> Vec<usize> {
        pager.pages().indices()
    }

    /// Scroll offset that shows page `index`.
    fn page_px(pager: &PagingController<Pages>, index: usize) -> f32 {
        pager
            .pages()
            .get(index)
            .map(|p| p.offset() * pager.container_width())
            .expect("materialized")
    }

    #[test]
    fn first_layout_announces_initial_page() {
        let (mut pager, log) = pager(5);
        assert!(indices(&pager).is_empty());
        pager.set_container_width(WIDTH).expect("layout");
        assert_eq!(selected(&log), vec![0]);
        assert_eq!(indices(&pager), vec![0, 1]);
        assert_eq!(pager.scroll_offset(), 0.0);
        assert!(states(&log).is_empty());
    }

    #[test]
    fn index_before_layout_applies_at_layout() {
        let (mut pager, log) = pager(5);
        pager.set_current_index(3, false).expect("record");
        assert!(log.borrow().is_empty());
        pager.set_container_width(WIDTH).expect("layout");
        assert_eq!(selected(&log), vec![3]);
        assert_eq!(indices(&pager), vec![2, 3, 4]);
        assert_eq!(pager.scroll_offset(), page_px(&pager, 3));
    }

    #[test]
    fn out_of_range_index_clamps() {
        let (mut pager, log) = laid_out(5);
        pager.set_current_index(99, false).expect("jump");
        assert_eq!(selected(&log), vec![4]);
        assert_eq!(indices(&pager), vec![3, 4]);
    }

    #[test]
    fn repeated_jump_is_silent() {
        let (mut pager, log) = laid_out(5);
        pager.set_current_index(2, false).expect("jump");
        log.borrow_mut().clear();
        pager.set_current_index(2, false).expect("again");
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn animated_change_announces_once_at_end() {
        let (mut pager, log) = laid_out(5);
        pager.set_current_index(2, true).expect("settle");
        assert_eq!(pager.scroll_state(), ScrollState::Settling);
        assert!(selected(&log).is_empty());
        settle(&mut pager);
        assert_eq!(selected(&log), vec![2]);
        assert_eq!(states(&log), vec![ScrollState::Settling, ScrollState::Idle]);
        assert_eq!(pager.scroll_offset(), 2000.0);
        assert_eq!(indices(&pager), vec![1, 2, 3]);
    }

    #[test]
    fn newer_settle_supersedes_older() {
        let (mut pager, log) = laid_out(8);
        pager.set_current_index(4, true).expect("first");
        for _ in 0..3 {
            pager.on_frame(MS_16).expect("frame");
        }
        pager.set_current_index(6, true).expect("second");
        settle(&mut pager);
        assert_eq!(selected(&log), vec![6]);
        assert_eq!(pager.scroll_offset(), 6000.0);
    }

    #[test]
    fn short_drag_snaps_back() {
        let (mut pager, log) = laid_out(5);
        drag(&mut pager, 600.0, 400.0, 10, true);
        assert_eq!(pager.scroll_state(), ScrollState::Settling);
        settle(&mut pager);
        assert!(selected(&log).is_empty());
        assert_eq!(
            states(&log),
            vec![ScrollState::Dragging, ScrollState::Settling, ScrollState::Idle]
        );
        assert_eq!(pager.scroll_offset(), 0.0);
    }

    #[test]
    fn long_drag_commits_forward() {
        let (mut pager, log) = laid_out(5);
        drag(&mut pager, 800.0, 300.0, 10, true);
        settle(&mut pager);
        assert_eq!(selected(&log), vec![1]);
        assert_eq!(pager.scroll_offset(), 1000.0);
    }

    #[test]
    fn quick_flick_flings_forward() {
        let (mut pager, log) = laid_out(5);
        drag(&mut pager, 600.0, 550.0, 3, false);
        settle(&mut pager);
        assert_eq!(selected(&log), vec![1]);
    }

    #[test]
    fn backward_fling_goes_to_previous() {
        let (mut pager, log) = laid_out(5);
        pager.set_current_index(2, false).expect("jump");
        log.borrow_mut().clear();
        drag(&mut pager, 400.0, 450.0, 3, false);
        settle(&mut pager);
        assert_eq!(selected(&log), vec![1]);
        assert_eq!(pager.scroll_offset(), 1000.0);
    }

    #[test]
    fn backward_drag_needs_more_travel() {
        let (mut pager, log) = laid_out(5);
        pager.set_current_index(2, false).expect("jump");
        log.borrow_mut().clear();

        drag(&mut pager, 200.0, 500.0, 10, true);
        settle(&mut pager);
        assert!(selected(&log).is_empty(), "0.3 of a page stays");

        drag(&mut pager, 100.0, 800.0, 10, true);
        settle(&mut pager);
        assert_eq!(selected(&log), vec![1]);
    }

    #[test]
    fn overscroll_pulls_edge_and_returns() {
        let (mut pager, log) = laid_out(3);
        let id = PointerId::PRIMARY;
        pager
            .on_pointer_event(&PointerEvent::down(id, 100.0, 100.0, at(0)))
            .expect("down");
        pager
            .on_pointer_event(&PointerEvent::moved(id, 300.0, 100.0, at(1)))
            .expect("move");
        assert!(pager.scroll_offset() < 0.0);
        assert!(pager.scroll_offset() > -300.0);
        assert!(log.borrow().contains(&Seen::Pull(Edge::Leading)));
        pager
            .on_pointer_event(&PointerEvent::up(id, 300.0, 100.0, at(10)))
            .expect("up");
        assert!(log.borrow().contains(&Seen::Release));
        settle(&mut pager);
        assert_eq!(pager.scroll_offset(), 0.0);
        assert!(selected(&log).is_empty());
    }

    #[test]
    fn touch_catches_settling_page() {
        let (mut pager, log) = laid_out(5);
        assert!(pager.page_forward().expect("forward"));
        pager.on_frame(MS_16).expect("frame");
        pager.on_frame(MS_16).expect("frame");
        let shown = pager.scroll_offset();
        assert!(shown > 0.0 && shown < 1000.0);
        pager
            .on_pointer_event(&PointerEvent::down(PointerId::PRIMARY, 500.0, 100.0, at(0)))
            .expect("down");
        assert_eq!(pager.scroll_state(), ScrollState::Dragging);
        assert_eq!(pager.touch_state(), TouchState::Dragging);
        assert_eq!(pager.scroll_offset(), shown);
        pager.on_frame(MS_16).expect("frame");
        assert_eq!(pager.scroll_offset(), shown);
        assert!(selected(&log).is_empty());
    }

    #[test]
    fn shrinking_data_clamps_and_announces_once() {
        let (mut pager, log) = laid_out(10);
        pager.set_current_index(7, false).expect("jump");
        log.borrow_mut().clear();
        pager.adapter_mut().ids.truncate(3);
        pager.notify_adapter_changed().expect("revalidate");
        assert_eq!(selected(&log), vec![2]);
        assert_eq!(pager.current_index(), 2);
        assert_eq!(indices(&pager), vec![1, 2]);
        assert_eq!(pager.scroll_offset(), page_px(&pager, 2));
    }

    #[test]
    fn insertion_before_current_follows_content() {
        let (mut pager, log) = laid_out(5);
        pager.set_current_index(2, false).expect("jump");
        log.borrow_mut().clear();
        pager.adapter_mut().ids.insert(0, 100);
        pager.notify_adapter_changed().expect("revalidate");
        assert_eq!(selected(&log), vec![3]);
        assert_eq!(indices(&pager), vec![2, 3, 4]);
        assert_eq!(pager.pages().get(3).map(|p| *p.handle()), Some(2));
        assert_eq!(pager.scroll_offset(), page_px(&pager, 3));
    }

    #[test]
    fn replaced_current_content_is_reannounced() {
        let (mut pager, log) = laid_out(5);
        pager.set_current_index(2, false).expect("jump");
        log.borrow_mut().clear();
        pager.adapter_mut().ids[2] = 200;
        pager.notify_adapter_changed().expect("revalidate");
        assert_eq!(selected(&log), vec![2]);
        assert_eq!(pager.pages().get(2).map(|p| *p.handle()), Some(200));
    }

    #[test]
    fn unchanged_data_is_not_reannounced() {
        let (mut pager, log) = laid_out(5);
        pager.notify_adapter_changed().expect("revalidate");
        assert!(selected(&log).is_empty());
    }

    #[test]
    fn silent_count_change_poisons() {
        let (mut pager, _log) = laid_out(5);
        pager.adapter_mut().reported_count = Some(7);
        let err = pager.set_current_index(3, false).expect_err("violation");
        assert!(matches!(
            err,
            PagerError::ConsistencyViolation {
                expected: 5,
                found: 7
            }
        ));
        assert!(!err.is_recoverable());
        assert!(pager.is_poisoned());
        assert!(pager.on_frame(MS_16).is_err());
        assert!(pager.notify_adapter_changed().is_err());
    }

    #[test]
    fn failed_instantiate_is_recoverable() {
        let (mut pager, log) = pager(5);
        pager.adapter_mut().fail_instantiate = Some(1);
        let err = pager.set_container_width(WIDTH).expect_err("failure");
        match &err {
            PagerError::Adapter(failures) => assert_eq!(failures.indices(), vec![1]),
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.is_recoverable());
        assert_eq!(indices(&pager), vec![0]);
        assert_eq!(selected(&log), vec![0]);

        pager.adapter_mut().fail_instantiate = None;
        pager.set_offscreen_limit(2).expect("retry");
        assert_eq!(indices(&pager), vec![0, 1, 2]);
    }

    #[test]
    fn detach_completes_settle() {
        let (mut pager, log) = laid_out(5);
        pager.set_current_index(3, true).expect("settle");
        pager.on_frame(MS_16).expect("frame");
        pager.detach().expect("detach");
        assert_eq!(pager.scroll_state(), ScrollState::Idle);
        assert_eq!(selected(&log), vec![3]);
        assert_eq!(pager.scroll_offset(), 3000.0);

        drag(&mut pager, 600.0, 100.0, 5, false);
        assert_eq!(pager.scroll_offset(), 3000.0, "detached pager ignores input");
        pager.attach();
        drag(&mut pager, 600.0, 100.0, 5, false);
        assert_ne!(pager.scroll_state(), ScrollState::Idle);
    }

    #[test]
    fn save_state_prefers_settle_target() {
        let (mut pager, _log) = laid_out(5);
        assert!(pager.page_forward().expect("forward"));
        assert_eq!(pager.save_state().current_index, 1);
        assert!(pager.page_forward().expect("forward"));
        assert_eq!(pager.save_state().current_index, 2);
    }

    #[test]
    fn restore_jumps_after_layout() {
        let (mut pager, log) = laid_out(5);
        pager
            .restore_state(&SavedState::new(4))
            .expect("restore");
        assert_eq!(selected(&log), vec![4]);
        assert_eq!(pager.scroll_offset(), 4000.0);
    }

    #[test]
    fn paging_stops_at_ends() {
        let (mut pager, _log) = laid_out(2);
        assert!(!pager.page_backward().expect("backward"));
        assert!(pager.page_forward().expect("forward"));
        assert!(!pager.page_forward().expect("at end"));
    }

    #[test]
    fn can_scroll_reflects_bounds() {
        let (mut pager, _log) = laid_out(3);
        assert!(!pager.can_scroll(Direction::Backward));
        assert!(pager.can_scroll(Direction::Forward));
        pager.set_current_index(2, false).expect("jump");
        assert!(pager.can_scroll(Direction::Backward));
        assert!(!pager.can_scroll(Direction::Forward));
    }

    #[test]
    fn empty_data_set_then_growth() {
        let (mut pager, log) = pager(0);
        pager.set_container_width(WIDTH).expect("layout");
        assert!(indices(&pager).is_empty());
        assert_eq!(pager.selected_index(), None);
        drag(&mut pager, 600.0, 100.0, 5, false);
        assert!(log.borrow().is_empty());

        pager.adapter_mut().ids = vec![10, 11, 12];
        pager.notify_adapter_changed().expect("grow");
        assert_eq!(selected(&log), vec![0]);
        assert_eq!(indices(&pager), vec![0, 1]);

        pager.adapter_mut().ids.clear();
        pager.notify_adapter_changed().expect("empty");
        assert!(indices(&pager).is_empty());
        assert_eq!(pager.selected_index(), None);
    }

    #[test]
    fn resize_keeps_page() {
        let (mut pager, _log) = laid_out(5);
        pager.set_current_index(2, false).expect("jump");
        pager.set_container_width(500.0).expect("resize");
        assert_eq!(pager.scroll_offset(), 1000.0);
        pager.set_page_margin(20.0).expect("margin");
        assert_eq!(pager.scroll_offset(), page_px(&pager, 2));
        let gap = page_px(&pager, 3) - page_px(&pager, 2);
        assert!((gap - 520.0).abs() < 0.01, "gap {gap}");
        assert_eq!(pager.current_index(), 2);
    }

    #[test]
    fn resize_retargets_settle() {
        let (mut pager, log) = laid_out(5);
        pager.set_current_index(2, true).expect("settle");
        pager.on_frame(MS_16).expect("frame");
        pager.set_container_width(500.0).expect("resize");
        assert_eq!(pager.scroll_state(), ScrollState::Settling);
        settle(&mut pager);
        assert_eq!(selected(&log), vec![2]);
        assert_eq!(pager.scroll_offset(), 1000.0);
    }

    #[test]
    fn invalid_width_is_ignored() {
        let (mut pager, log) = pager(3);
        pager.set_container_width(f32::NAN).expect("ignored");
        pager.set_container_width(0.0).expect("ignored");
        assert_eq!(pager.container_width(), 0.0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn scrolled_reports_page_under_position() {
        let (mut pager, log) = laid_out(5);
        pager.set_current_index(1, true).expect("settle");
        settle(&mut pager);
        let scrolled: Vec<usize> = log
            .borrow()
            .iter()
            .filter_map(|s| match s {
                Seen::Scrolled(i) => Some(*i),
                _ => None,
            })
            .collect();
        assert_eq!(scrolled.first(), Some(&0));
        assert_eq!(scrolled.last(), Some(&1));
    }
}

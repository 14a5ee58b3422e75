#![forbid(unsafe_code)]

//! Deterministic host simulator.
//!
//! [`HostSimulator`] plays the host's part: it owns a [`PagingController`],
//! keeps a virtual clock, turns drag descriptions into pointer events one
//! frame apart, and pumps frames until the pager settles. Nothing depends on
//! wall-clock time, so every run of a scenario is identical.
//!
//! # Usage
//!
//! ```ignore
//! use pagewise_harness::HostSimulator;
//!
//! let mut sim = HostSimulator::with_pages(5, 1000.0)?;
//! sim.drag(600.0, 400.0, 10)?;
//! sim.run_until_idle()?;
//! assert!(sim.recording().selected().is_empty());
//! ```

use std::time::Duration;

use pagewise::{PageAdapter, PagerConfig, PagingController, Result, ScrollState};
use pagewise_core::{PointerEvent, PointerId, PointerSample};

use crate::adapter::VecAdapter;
use crate::recorder::Recording;

/// Default frame interval (about 60 Hz).
pub const FRAME: Duration = Duration::from_millis(16);

/// Frames pumped by [`HostSimulator::run_until_idle`] before giving up.
pub const MAX_SETTLE_FRAMES: usize = 1_000;

/// Pointer-rest frames appended by [`HostSimulator::drag_and_hold`]; long
/// enough to age every motion sample out of the velocity horizon.
const HOLD_FRAMES: u32 = 8;

/// Vertical position of simulated pointers.
const POINTER_Y: f32 = 100.0;

/// Host driving a pager on a virtual clock.
#[derive(Debug)]
pub struct HostSimulator<A: PageAdapter> {
    pager: PagingController<A>,
    recording: Recording,
    clock: Duration,
    frame: Duration,
    pointer: PointerId,
}

impl HostSimulator<VecAdapter> {
    /// Simulator over `count` full-width pages, laid out at `width`.
    ///
    /// # Errors
    ///
    /// Propagates errors from the first layout.
    pub fn with_pages(count: usize, width: f32) -> Result<Self> {
        Self::with_config(count, width, PagerConfig::default())
    }

    /// Like [`with_pages`](Self::with_pages) with a custom configuration.
    ///
    /// # Errors
    ///
    /// Propagates errors from the first layout.
    pub fn with_config(count: usize, width: f32, config: PagerConfig) -> Result<Self> {
        let mut sim = Self::new(PagingController::new(VecAdapter::new(count), config));
        sim.lay_out(width)?;
        Ok(sim)
    }
}

impl<A: PageAdapter> HostSimulator<A> {
    /// Wrap `pager`, registering a recording listener on it.
    #[must_use]
    pub fn new(mut pager: PagingController<A>) -> Self {
        let recording = Recording::new();
        pager.add_listener(recording.listener());
        Self {
            pager,
            recording,
            clock: Duration::ZERO,
            frame: FRAME,
            pointer: PointerId::PRIMARY,
        }
    }

    /// Use `frame` as the frame interval (builder).
    #[must_use]
    pub fn with_frame(mut self, frame: Duration) -> Self {
        self.frame = frame;
        self
    }

    /// The pager.
    #[must_use]
    pub fn pager(&self) -> &PagingController<A> {
        &self.pager
    }

    /// The pager, for direct calls.
    pub fn pager_mut(&mut self) -> &mut PagingController<A> {
        &mut self.pager
    }

    /// The adapter.
    #[must_use]
    pub fn adapter(&self) -> &A {
        self.pager.adapter()
    }

    /// The adapter, for edits.
    pub fn adapter_mut(&mut self) -> &mut A {
        self.pager.adapter_mut()
    }

    /// Listener notifications so far.
    #[must_use]
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Raw scroll offset in pixels.
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.pager.scroll_offset()
    }

    /// Materialized indices.
    #[must_use]
    pub fn pages(&self) -> Vec<usize> {
        self.pager.pages().indices()
    }

    /// Scroll offset that shows `index` exactly, if it is materialized.
    #[must_use]
    pub fn offset_of_page(&self, index: usize) -> Option<f32> {
        self.pager
            .pages()
            .get(index)
            .map(|page| page.offset() * self.pager.container_width())
    }

    /// Report a container width.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn lay_out(&mut self, width: f32) -> Result<()> {
        self.pager.set_container_width(width)
    }

    /// Advance the clock by `dt` and tick the pager.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn advance(&mut self, dt: Duration) -> Result<()> {
        self.clock += dt;
        self.pager.on_frame(dt)
    }

    /// Advance by one frame.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn frame(&mut self) -> Result<()> {
        self.advance(self.frame)
    }

    /// Pump frames until the pager is idle. Returns the frames pumped.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn run_until_idle(&mut self) -> Result<usize> {
        let mut frames = 0;
        while self.pager.scroll_state() != ScrollState::Idle && frames < MAX_SETTLE_FRAMES {
            self.frame()?;
            frames += 1;
        }
        if self.pager.scroll_state() != ScrollState::Idle {
            tracing::warn!(frames, state = %self.pager.scroll_state(), "pager did not settle");
        }
        Ok(frames)
    }

    fn send(&mut self, event: PointerEvent) -> Result<()> {
        self.pager.on_pointer_event(&event)
    }

    /// Put the pointer down at `x`.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn press(&mut self, x: f32) -> Result<()> {
        let event = PointerEvent::down(self.pointer, x, POINTER_Y, self.clock);
        self.send(event)
    }

    /// Move the pointer to `x` one frame later.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn move_to(&mut self, x: f32) -> Result<()> {
        self.frame()?;
        let event = PointerEvent::moved(self.pointer, x, POINTER_Y, self.clock);
        self.send(event)
    }

    /// Move the pointer to `(x, y)` one frame later.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn move_to_xy(&mut self, x: f32, y: f32) -> Result<()> {
        self.frame()?;
        let event = PointerEvent::moved(self.pointer, x, y, self.clock);
        self.send(event)
    }

    /// Lift the pointer at `x` one frame later.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn release(&mut self, x: f32) -> Result<()> {
        self.frame()?;
        let event = PointerEvent::up(self.pointer, x, POINTER_Y, self.clock);
        self.send(event)
    }

    /// Host-side cancel of the gesture.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn cancel(&mut self) -> Result<()> {
        let event = PointerEvent::cancel(self.clock);
        self.send(event)
    }

    /// Put a second pointer down at `x` while the primary one is held at
    /// `held_x`.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn press_secondary(&mut self, id: PointerId, x: f32, held_x: f32) -> Result<()> {
        let event = PointerEvent::new(
            pagewise_core::PointerEventKind::SecondaryDown,
            id,
            x,
            POINTER_Y,
            self.clock,
        )
        .with_pointer(PointerSample::new(self.pointer, held_x, POINTER_Y));
        self.send(event)
    }

    /// Press at `from`, move linearly to `to` over `frames` frames, and
    /// lift at `to`.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn drag(&mut self, from: f32, to: f32, frames: u32) -> Result<()> {
        self.drag_path(from, to, frames, 0)
    }

    /// Like [`drag`](Self::drag), but rest at `to` before lifting so the
    /// release carries no velocity.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn drag_and_hold(&mut self, from: f32, to: f32, frames: u32) -> Result<()> {
        self.drag_path(from, to, frames, HOLD_FRAMES)
    }

    /// Press at `from` and move linearly to `to` without lifting.
    ///
    /// # Errors
    ///
    /// Propagates controller errors.
    pub fn drag_without_release(&mut self, from: f32, to: f32, frames: u32) -> Result<()> {
        self.press(from)?;
        let frames = frames.max(1);
        let step = (to - from) / frames as f32;
        for frame in 1..=frames {
            self.move_to(from + step * frame as f32)?;
        }
        Ok(())
    }

    fn drag_path(&mut self, from: f32, to: f32, frames: u32, hold: u32) -> Result<()> {
        self.drag_without_release(from, to, frames)?;
        for _ in 0..hold {
            self.move_to(to)?;
        }
        self.release(to)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

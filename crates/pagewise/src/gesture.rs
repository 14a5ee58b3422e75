#![forbid(unsafe_code)]

//! Pointer gesture interpretation.
//!
//! [`GestureStateMachine`] turns [`PointerEvent`]s into drag deltas and a
//! release decision. All outputs are in scroll space: positive values move
//! toward higher page indices, which is the opposite of pointer motion.
//!
//! # State Machine
//!
//! ```text
//!            down                 |dx| > slop, |dx| > |dy|
//!   Idle ───────────▶ Armed ─────────────────────────────▶ Dragging
//!    ▲                  │ up (tap)                            │
//!    │                  │ |dy| > slop or ancestor claims      │ up / cancel
//!    └──────────────────┴─────────────────────────────────────┘ (release)
//! ```
//!
//! A move without a preceding down arms implicitly. Once a gesture is
//! rejected (orthogonal motion or an ancestor claim) the rest of it is
//! ignored until the next down.

use std::time::Duration;

use pagewise_core::{PointerEvent, PointerEventKind, PointerId, PointerSample, VelocityTracker};

use crate::config::PagerConfig;
use crate::listener::Edge;

/// Touch-tracking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TouchState {
    /// No pointer is tracked.
    #[default]
    Idle,
    /// A pointer is down but has not moved past the slop.
    Armed,
    /// The tracked pointer drives the scroll position.
    Dragging,
}

/// Hook into the containers around the pager.
pub trait ParentCoordinator {
    /// Whether an ancestor takes this gesture, given the displacement since
    /// the pointer went down. Consulted while armed.
    fn ancestor_claims(&mut self, dx: f32, dy: f32) -> bool {
        let _ = (dx, dy);
        false
    }

    /// The pager started dragging; ancestors must stop intercepting.
    fn request_exclusive(&mut self) {}
}

/// Coordinator for a pager without scrolling ancestors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParent;

impl ParentCoordinator for NoParent {}

/// What one pointer event means for the scroll position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// Nothing to do.
    None,
    /// A drag began; apply `delta` pixels.
    DragStarted {
        /// Scroll delta already travelled past the slop.
        delta: f32,
    },
    /// Apply `delta` pixels.
    Drag {
        /// Scroll delta since the previous event.
        delta: f32,
    },
    /// The drag ended.
    Released {
        /// Release velocity in pixels per second.
        velocity: f32,
        /// Total scroll distance of the gesture in pixels.
        distance: f32,
    },
    /// The pointer went up without dragging.
    Tap,
    /// The gesture was given up: orthogonal motion, an ancestor claim, or a
    /// cancel before dragging.
    Aborted,
}

/// Interprets pointer events for a horizontal pager.
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    state: TouchState,
    active: PointerId,
    initial_x: f32,
    initial_y: f32,
    last_x: f32,
    rejected: bool,
    tracker: VelocityTracker,
    touch_slop: f32,
    max_velocity: f32,
}

impl Default for GestureStateMachine {
    fn default() -> Self {
        Self::new(&PagerConfig::default())
    }
}

impl GestureStateMachine {
    /// Create a state machine using the slop, velocity cap, and velocity
    /// horizon of `config`.
    #[must_use]
    pub fn new(config: &PagerConfig) -> Self {
        Self {
            state: TouchState::Idle,
            active: PointerId::PRIMARY,
            initial_x: 0.0,
            initial_y: 0.0,
            last_x: 0.0,
            rejected: false,
            tracker: VelocityTracker::new(config.velocity_horizon),
            touch_slop: config.touch_slop.max(0.0),
            max_velocity: config.max_fling_velocity.abs(),
        }
    }

    /// Current touch state.
    #[must_use]
    pub fn state(&self) -> TouchState {
        self.state
    }

    /// Whether the tracked pointer drives the scroll position.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.state == TouchState::Dragging
    }

    /// Pointer being tracked, if any.
    #[must_use]
    pub fn active_pointer(&self) -> Option<PointerId> {
        (self.state != TouchState::Idle).then_some(self.active)
    }

    /// Forget the current gesture.
    pub fn reset(&mut self) {
        self.state = TouchState::Idle;
        self.rejected = false;
        self.tracker.clear();
    }

    /// Start dragging immediately from a down event, skipping the slop.
    ///
    /// Used when the user touches a page that is still settling.
    pub fn catch(&mut self, event: &PointerEvent) -> GestureOutcome {
        let Some(sample) = Self::changed_or_first(event) else {
            return GestureOutcome::None;
        };
        self.arm(sample, event.timestamp);
        self.state = TouchState::Dragging;
        tracing::trace!(pointer = sample.id.0, "caught settling page");
        GestureOutcome::DragStarted { delta: 0.0 }
    }

    /// Interpret one pointer event.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        parent: &mut dyn ParentCoordinator,
    ) -> GestureOutcome {
        match event.kind {
            PointerEventKind::Down => {
                let Some(sample) = Self::changed_or_first(event) else {
                    return GestureOutcome::None;
                };
                if self.state == TouchState::Dragging {
                    // The up for the previous gesture never arrived.
                    tracing::debug!(pointer = sample.id.0, "down while dragging; continuing drag");
                    self.reanchor(sample, event.timestamp);
                } else {
                    self.arm(sample, event.timestamp);
                }
                GestureOutcome::None
            }
            PointerEventKind::SecondaryDown => self.on_secondary_down(event),
            PointerEventKind::Move => self.on_move(event, parent),
            PointerEventKind::SecondaryUp => self.on_secondary_up(event),
            PointerEventKind::Up => self.on_up(event),
            PointerEventKind::Cancel => self.on_cancel(),
        }
    }

    fn changed_or_first(event: &PointerEvent) -> Option<PointerSample> {
        event.changed().or_else(|| event.pointers.first().copied())
    }

    fn arm(&mut self, sample: PointerSample, at: Duration) {
        self.state = TouchState::Armed;
        self.rejected = false;
        self.active = sample.id;
        self.initial_x = sample.x;
        self.initial_y = sample.y;
        self.last_x = sample.x;
        self.tracker.clear();
        self.tracker.add(at, sample.x);
        tracing::trace!(pointer = sample.id.0, x = sample.x, "armed");
    }

    /// Track `sample` instead of the current pointer without moving the
    /// scroll position.
    fn reanchor(&mut self, sample: PointerSample, at: Duration) {
        self.initial_x += sample.x - self.last_x;
        self.last_x = sample.x;
        self.active = sample.id;
        self.tracker.clear();
        self.tracker.add(at, sample.x);
        tracing::trace!(pointer = sample.id.0, "re-anchored");
    }

    fn reject(&mut self) -> GestureOutcome {
        self.state = TouchState::Idle;
        self.rejected = true;
        self.tracker.clear();
        tracing::trace!("gesture rejected");
        GestureOutcome::Aborted
    }

    fn release(&mut self, x: f32) -> GestureOutcome {
        let pointer_velocity = self.tracker.velocity(self.max_velocity);
        let distance = self.initial_x - x;
        self.reset();
        tracing::trace!(velocity = -pointer_velocity, distance, "released");
        GestureOutcome::Released {
            velocity: -pointer_velocity,
            distance,
        }
    }

    fn on_secondary_down(&mut self, event: &PointerEvent) -> GestureOutcome {
        match self.state {
            TouchState::Idle if !self.rejected => {
                if let Some(sample) = Self::changed_or_first(event) {
                    self.arm(sample, event.timestamp);
                }
            }
            TouchState::Dragging => {
                if let Some(sample) = event.changed() {
                    self.reanchor(sample, event.timestamp);
                }
            }
            TouchState::Idle | TouchState::Armed => {}
        }
        GestureOutcome::None
    }

    fn on_move(&mut self, event: &PointerEvent, parent: &mut dyn ParentCoordinator) -> GestureOutcome {
        if self.state == TouchState::Idle {
            if !self.rejected
                && let Some(sample) = Self::changed_or_first(event)
            {
                self.arm(sample, event.timestamp);
            }
            return GestureOutcome::None;
        }

        let Some(sample) = event.sample(self.active) else {
            return self.on_lost_pointer(event);
        };
        self.tracker.add(event.timestamp, sample.x);

        match self.state {
            TouchState::Armed => {
                let dx = sample.x - self.initial_x;
                let dy = sample.y - self.initial_y;
                if parent.ancestor_claims(dx, dy) {
                    return self.reject();
                }
                if dx.abs() > self.touch_slop && dx.abs() > dy.abs() {
                    self.state = TouchState::Dragging;
                    parent.request_exclusive();
                    let compensated = self.initial_x + self.touch_slop.copysign(dx);
                    self.last_x = sample.x;
                    tracing::trace!(pointer = sample.id.0, dx, "drag started");
                    return GestureOutcome::DragStarted {
                        delta: compensated - sample.x,
                    };
                }
                if dy.abs() > self.touch_slop {
                    return self.reject();
                }
                GestureOutcome::None
            }
            TouchState::Dragging => {
                let delta = self.last_x - sample.x;
                self.last_x = sample.x;
                GestureOutcome::Drag { delta }
            }
            TouchState::Idle => GestureOutcome::None,
        }
    }

    fn on_lost_pointer(&mut self, event: &PointerEvent) -> GestureOutcome {
        if let Some(&other) = event.pointers.first() {
            tracing::debug!(lost = self.active.0, now = other.id.0, "tracked pointer vanished");
            self.reanchor(other, event.timestamp);
            return GestureOutcome::None;
        }
        tracing::debug!(lost = self.active.0, "tracked pointer vanished; releasing");
        match self.state {
            TouchState::Dragging => self.release(self.last_x),
            _ => {
                self.reset();
                GestureOutcome::Aborted
            }
        }
    }

    fn on_secondary_up(&mut self, event: &PointerEvent) -> GestureOutcome {
        if self.state == TouchState::Idle || event.pointer != self.active {
            return GestureOutcome::None;
        }
        match event.pointers.iter().find(|p| p.id != event.pointer) {
            Some(&other) => {
                self.reanchor(other, event.timestamp);
                GestureOutcome::None
            }
            None => self.on_up(event),
        }
    }

    fn on_up(&mut self, event: &PointerEvent) -> GestureOutcome {
        match self.state {
            TouchState::Dragging => {
                let x = event.sample(self.active).map_or(self.last_x, |s| s.x);
                self.tracker.add(event.timestamp, x);
                self.release(x)
            }
            TouchState::Armed => {
                self.reset();
                GestureOutcome::Tap
            }
            TouchState::Idle => {
                self.rejected = false;
                GestureOutcome::None
            }
        }
    }

    fn on_cancel(&mut self) -> GestureOutcome {
        match self.state {
            TouchState::Dragging => self.release(self.last_x),
            TouchState::Armed => {
                self.reset();
                GestureOutcome::Aborted
            }
            TouchState::Idle => {
                self.rejected = false;
                GestureOutcome::None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Edge resistance
// ---------------------------------------------------------------------------

/// Overscroll reported while dragging past an end of the strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSignal {
    /// Which end.
    pub edge: Edge,
    /// Displayed overscroll as a fraction of the container width.
    pub pull: f32,
}

/// Damps drags past the scroll bounds instead of clamping them.
///
/// Overscroll approaches `max_fraction * width` asymptotically, so dragging
/// further keeps moving the page by ever smaller amounts and dragging back
/// retraces the same curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeResistance {
    max_fraction: f32,
}

impl Default for EdgeResistance {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl EdgeResistance {
    /// Resistance whose overscroll approaches `max_fraction` of the width.
    #[must_use]
    pub fn new(max_fraction: f32) -> Self {
        Self {
            max_fraction: if max_fraction.is_finite() {
                max_fraction.max(0.0)
            } else {
                0.0
            },
        }
    }

    /// Apply a drag of `delta` pixels at `current`, bounded by `[min, max]`.
    ///
    /// Returns the new offset and, when it lies past a bound, the edge
    /// signal.
    #[must_use]
    pub fn apply(
        &self,
        current: f32,
        delta: f32,
        min: f32,
        max: f32,
        width: f32,
    ) -> (f32, Option<EdgeSignal>) {
        let limit = self.max_fraction * width;
        if !(limit > 0.0 && limit.is_finite()) {
            return ((current + delta).max(min).min(max), None);
        }

        // Undo the damping so that the drag accumulates in raw space.
        let raw = if current > max {
            max + undamp(current - max, limit)
        } else if current < min {
            min - undamp(min - current, limit)
        } else {
            current
        } + delta;

        if raw > max {
            let shown = max + damp(raw - max, limit);
            let signal = EdgeSignal {
                edge: Edge::Trailing,
                pull: (shown - max) / width,
            };
            (shown, Some(signal))
        } else if raw < min {
            let shown = min - damp(min - raw, limit);
            let signal = EdgeSignal {
                edge: Edge::Leading,
                pull: (min - shown) / width,
            };
            (shown, Some(signal))
        } else {
            (raw, None)
        }
    }
}

fn damp(excess: f32, limit: f32) -> f32 {
    limit * (1.0 - (-excess / limit).exp())
}

fn undamp(shown: f32, limit: f32) -> f32 {
    let ratio = (shown / limit).min(0.999_999);
    -limit * (1.0 - ratio).ln()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

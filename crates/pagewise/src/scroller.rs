#![forbid(unsafe_code)]

//! Settle animation of the raw scroll offset.
//!
//! [`ScrollAnimator`] owns at most one in-flight [`Tween`]. Starting a new
//! scroll while one runs supersedes it from the offset currently shown, and
//! cancelling leaves the offset where the last tick put it.
//!
//! # Duration
//!
//! | Hint | Duration |
//! |------|----------|
//! | [`DurationHint::Velocity`] | `4 * round(1000 * shaped / |v|)` ms, where `shaped` is the travel distance bent by a sine curve over half a container |
//! | [`DurationHint::Distance`] | `(distance / page_extent + 1) * 100` ms |
//! | [`DurationHint::Fixed`] | as given |
//!
//! Every duration is clamped to `[min, max]`.

use std::time::Duration;

use pagewise_core::animation::{Animation, EasingFn, Tween, ease_out_quint};

/// Sine argument scale used to shape fling distances (0.15 pi).
const DISTANCE_INFLUENCE: f32 = 0.3 * std::f32::consts::FRAC_PI_2;

/// How the duration of a settle is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationHint {
    /// Release velocity in pixels per second; faster means shorter.
    Velocity(f32),
    /// Proportional to distance over the width of one page plus margin, in
    /// pixels.
    Distance {
        /// Pixel extent of one page step.
        page_extent: f32,
    },
    /// Exact duration, still subject to the bounds.
    Fixed(Duration),
}

/// Identifies one started scroll. A newer scroll gets a newer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationHandle(u64);

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFrame {
    /// Offset to apply, in pixels.
    pub offset: f32,
    /// Whether the scroll reached its target on this tick.
    pub finished: bool,
}

/// Drives the raw scroll offset toward a target over time.
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    easing: EasingFn,
    min_duration: Duration,
    max_duration: Duration,
    container_width: f32,
    tween: Option<Tween>,
    offset: f32,
    generation: u64,
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self::new(Duration::from_millis(50), Duration::from_millis(600))
    }
}

impl ScrollAnimator {
    /// Create an animator using quintic ease-out with durations clamped to
    /// `[min_duration, max_duration]`.
    #[must_use]
    pub fn new(min_duration: Duration, max_duration: Duration) -> Self {
        Self {
            easing: ease_out_quint,
            min_duration: min_duration.min(max_duration),
            max_duration: max_duration.max(min_duration),
            container_width: 0.0,
            tween: None,
            offset: 0.0,
            generation: 0,
        }
    }

    /// Set the easing curve (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Container width used to shape velocity-driven durations.
    pub fn set_container_width(&mut self, width: f32) {
        self.container_width = if width.is_finite() { width.max(0.0) } else { 0.0 };
    }

    /// Whether a scroll is in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.tween.is_some()
    }

    /// Offset shown by the animator right now.
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.tween.as_ref().map_or(self.offset, Tween::position)
    }

    /// Target of the in-flight scroll.
    #[must_use]
    pub fn target(&self) -> Option<f32> {
        self.tween.as_ref().map(Tween::to)
    }

    /// Distance left to travel, in pixels. Zero when idle.
    #[must_use]
    pub fn remaining_distance(&self) -> f32 {
        self.tween
            .as_ref()
            .map_or(0.0, |t| (t.to() - t.position()).abs())
    }

    /// Time left in the in-flight scroll.
    #[must_use]
    pub fn remaining_time(&self) -> Duration {
        self.tween.as_ref().map_or(Duration::ZERO, Tween::remaining)
    }

    /// Handle of the most recently started scroll.
    #[must_use]
    pub fn current_handle(&self) -> AnimationHandle {
        AnimationHandle(self.generation)
    }

    /// Start scrolling from `from` to `to`.
    ///
    /// When a scroll is already in flight, `from` is ignored and the new
    /// scroll starts at the offset currently shown. A zero-length scroll does
    /// not animate: the animator goes idle at `to`.
    pub fn start_scroll(&mut self, from: f32, to: f32, hint: DurationHint) -> AnimationHandle {
        let from = self.tween.as_ref().map_or(from, Tween::position);
        self.generation += 1;
        let distance = (to - from).abs();
        if distance == 0.0 || !distance.is_finite() {
            self.tween = None;
            self.offset = if to.is_finite() { to } else { from };
            return AnimationHandle(self.generation);
        }
        let duration = self.duration_for(distance, hint);
        tracing::trace!(from, to, ?duration, "scroll started");
        if let Some(tween) = self.tween.as_mut() {
            tween.retarget(to, duration);
        } else {
            self.tween = Some(Tween::new(from, to, duration).easing(self.easing));
        }
        self.offset = from;
        AnimationHandle(self.generation)
    }

    /// Advance the in-flight scroll by `dt`.
    pub fn tick(&mut self, dt: Duration) -> ScrollFrame {
        let Some(tween) = self.tween.as_mut() else {
            return ScrollFrame {
                offset: self.offset,
                finished: true,
            };
        };
        tween.tick(dt);
        self.offset = tween.position();
        let finished = tween.is_complete();
        if finished {
            self.tween = None;
        }
        ScrollFrame {
            offset: self.offset,
            finished,
        }
    }

    /// Stop the in-flight scroll where it is.
    pub fn cancel(&mut self) {
        if let Some(tween) = self.tween.take() {
            self.offset = tween.position();
        }
    }

    /// Shift the current offset and target by `delta` pixels.
    pub fn translate(&mut self, delta: f32) {
        self.offset += delta;
        if let Some(tween) = self.tween.as_mut() {
            tween.translate(delta);
        }
    }

    /// Duration of a scroll covering `distance` pixels.
    #[must_use]
    pub fn duration_for(&self, distance: f32, hint: DurationHint) -> Duration {
        let raw = match hint {
            DurationHint::Fixed(duration) => duration,
            DurationHint::Velocity(velocity) if velocity.abs() > 0.0 && velocity.is_finite() => {
                let width = self.container_width;
                if width > 0.0 {
                    let half = width / 2.0;
                    let ratio = (distance / width).min(1.0);
                    let shaped = half + half * ((ratio - 0.5) * DISTANCE_INFLUENCE).sin();
                    let millis = 4.0 * (1000.0 * (shaped / velocity).abs()).round();
                    Duration::from_millis(millis as u64)
                } else {
                    self.min_duration
                }
            }
            DurationHint::Velocity(_) => self.distance_duration(distance, self.container_width),
            DurationHint::Distance { page_extent } => self.distance_duration(distance, page_extent),
        };
        raw.clamp(self.min_duration, self.max_duration)
    }

    fn distance_duration(&self, distance: f32, page_extent: f32) -> Duration {
        if page_extent > 0.0 && page_extent.is_finite() {
            let pages = distance / page_extent;
            Duration::from_millis(((pages + 1.0) * 100.0) as u64)
        } else {
            self.max_duration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

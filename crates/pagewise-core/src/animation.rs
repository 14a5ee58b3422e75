#![forbid(unsafe_code)]

//! Time-based interpolation primitives.
//!
//! Easing curves map normalized time `t` in [0, 1] to normalized progress in
//! [0, 1]. A [`Tween`] applies an easing curve to move an `f32` value between
//! two endpoints over a [`Duration`], and can be retargeted mid-flight without
//! a discontinuity.
//!
//! Easing curves are plain function pointers so callers can inject them as
//! stateless strategy objects:
//!
//! ```
//! use pagewise_core::animation::{Animation, Tween, ease_out_quint};
//! use std::time::Duration;
//!
//! let mut tween = Tween::new(0.0, 100.0, Duration::from_millis(200)).easing(ease_out_quint);
//! tween.tick(Duration::from_millis(200));
//! assert!(tween.is_complete());
//! assert_eq!(tween.position(), 100.0);
//! ```

use std::time::Duration;

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-out (slower end than quadratic).
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Quintic ease-out: `(t - 1)^5 + 1`.
///
/// Fast departure and a long, soft landing. This is the default curve for
/// page settling.
#[inline]
pub fn ease_out_quint(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    t * t * t * t * t + 1.0
}

/// Sine ease-out: `sin(t * π/2)`.
#[inline]
pub fn ease_out_sine(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    (t * std::f32::consts::FRAC_PI_2).sin()
}

// ---------------------------------------------------------------------------
// Animation trait
// ---------------------------------------------------------------------------

/// A time-based animation advanced by frame ticks.
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Tween
// ---------------------------------------------------------------------------

/// Interpolates an `f32` between `from` and `to` over a duration.
///
/// [`Tween::position`] gives the interpolated value. Elapsed time is tracked as a [`Duration`] so
/// many small ticks accumulate without floating-point drift.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: f32,
    to: f32,
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Tween {
    /// Create a tween from `from` to `to` over `duration`, eased with
    /// [`ease_out`].
    #[must_use]
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: ease_out,
        }
    }

    /// Set the easing function (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Start value.
    #[inline]
    #[must_use]
    pub fn from(&self) -> f32 {
        self.from
    }

    /// End value.
    #[inline]
    #[must_use]
    pub fn to(&self) -> f32 {
        self.to
    }

    /// Total duration.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time left before completion.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }

    /// Raw linear progress (before easing), in [0.0, 1.0].
    #[must_use]
    pub fn raw_progress(&self) -> f32 {
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }

    /// Current interpolated value.
    ///
    /// Exactly `to` once complete, so callers can compare against the target
    /// without tolerance.
    #[must_use]
    pub fn position(&self) -> f32 {
        if self.is_complete() {
            return self.to;
        }
        let t = (self.easing)(self.raw_progress());
        self.from + (self.to - self.from) * t
    }

    /// Restart toward `to` from the current position.
    ///
    /// The curve restarts at the value the tween is showing right now, so the
    /// first sample after a retarget never jumps.
    pub fn retarget(&mut self, to: f32, duration: Duration) {
        let here = self.position();
        *self = Self::new(here, to, duration).easing(self.easing);
    }

    /// Shift both endpoints by `delta` without touching elapsed time.
    pub fn translate(&mut self, delta: f32) {
        self.from += delta;
        self.to += delta;
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);
    const MS_500: Duration = Duration::from_millis(500);
    const SEC_1: Duration = Duration::from_secs(1);

    // ---- Easing tests ----

    #[test]
    fn easing_linear_endpoints() {
        assert!((linear(0.0) - 0.0).abs() < f32::EPSILON);
        assert!((linear(1.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn easing_clamps_input() {
        assert!((linear(-1.0) - 0.0).abs() < f32::EPSILON);
        assert!((linear(2.0) - 1.0).abs() < f32::EPSILON);
        assert!((ease_out(1.5) - 1.0).abs() < f32::EPSILON);
        assert!((ease_out_quint(-3.0) - 0.0).abs() < f32::EPSILON);
        assert!((ease_out_sine(4.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ease_out_faster_start() {
        assert!(ease_out(0.5) > linear(0.5));
    }

    #[test]
    fn ease_in_out_midpoint() {
        assert!((ease_in_out(0.5) - 0.5).abs() < 0.01);
    }

    #[test]
    fn quint_endpoints() {
        assert!((ease_out_quint(0.0) - 0.0).abs() < f32::EPSILON);
        assert!((ease_out_quint(1.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn quint_front_loaded_more_than_cubic() {
        assert!(ease_out_quint(0.3) > ease_out_cubic(0.3));
    }

    #[test]
    fn sine_endpoints() {
        assert!(ease_out_sine(0.0).abs() < 1e-6);
        assert!((ease_out_sine(1.0) - 1.0).abs() < 1e-6);
    }

    // ---- Tween tests ----

    #[test]
    fn tween_starts_at_from() {
        let tween = Tween::new(10.0, 90.0, SEC_1);
        assert!((tween.position() - 10.0).abs() < f32::EPSILON);
        assert!(!tween.is_complete());
    }

    #[test]
    fn tween_ends_exactly_at_to() {
        let mut tween = Tween::new(0.0, 333.3, SEC_1).easing(ease_out_quint);
        tween.tick(SEC_1);
        assert!(tween.is_complete());
        assert_eq!(tween.position(), 333.3);
    }

    #[test]
    fn tween_negative_range() {
        let mut tween = Tween::new(100.0, -50.0, SEC_1).easing(linear);
        tween.tick(MS_500);
        assert!((tween.position() - 25.0).abs() < 0.01);
    }

    #[test]
    fn tween_zero_duration() {
        let mut tween = Tween::new(0.0, 1.0, Duration::ZERO);
        tween.tick(MS_16);
        assert!(tween.is_complete());
    }

    #[test]
    fn tween_retarget_keeps_position() {
        let mut tween = Tween::new(0.0, 100.0, SEC_1).easing(linear);
        tween.tick(MS_500);
        let before = tween.position();
        tween.retarget(300.0, SEC_1);
        assert!((tween.position() - before).abs() < f32::EPSILON);
        assert!((tween.from() - 50.0).abs() < 0.01);
        assert!((tween.to() - 300.0).abs() < f32::EPSILON);
        assert_eq!(tween.remaining(), SEC_1);
    }

    #[test]
    fn tween_translate_moves_both_ends() {
        let mut tween = Tween::new(0.0, 100.0, SEC_1).easing(linear);
        tween.tick(MS_500);
        tween.translate(-40.0);
        assert!((tween.position() - 10.0).abs() < 0.01);
        assert!((tween.to() - 60.0).abs() < f32::EPSILON);
    }
}

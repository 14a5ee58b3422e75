#![forbid(unsafe_code)]

//! Pointer velocity estimation.
//!
//! [`VelocityTracker`] keeps the recent positions of one pointer along one
//! axis and estimates its velocity with a least-squares line fit over the
//! samples inside a sliding time horizon.
//!
//! # Invariants
//!
//! 1. Samples are kept in timestamp order; an out-of-order sample clears the
//!    history before being recorded.
//! 2. Only samples within `horizon` of the newest sample contribute.
//! 3. The estimate is finite and clamped to `±max` pixels per second.

use std::collections::VecDeque;
use std::time::Duration;

/// Default horizon over which samples contribute to the estimate.
pub const DEFAULT_HORIZON: Duration = Duration::from_millis(100);

const MAX_SAMPLES: usize = 20;

#[derive(Debug, Clone, Copy)]
struct Sample {
    at: Duration,
    position: f32,
}

/// Sliding-window velocity estimator for a single axis.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: VecDeque<Sample>,
    horizon: Duration,
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON)
    }
}

impl VelocityTracker {
    /// Create a tracker that considers samples within `horizon`.
    #[must_use]
    pub fn new(horizon: Duration) -> Self {
        Self {
            samples: VecDeque::with_capacity(MAX_SAMPLES),
            horizon: if horizon.is_zero() {
                DEFAULT_HORIZON
            } else {
                horizon
            },
        }
    }

    /// Record the pointer position at time `at`.
    pub fn add(&mut self, at: Duration, position: f32) {
        if !position.is_finite() {
            return;
        }
        if let Some(last) = self.samples.back()
            && at < last.at
        {
            self.samples.clear();
        }
        if self.samples.len() == MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample { at, position });
        while let Some(front) = self.samples.front() {
            if at.saturating_sub(front.at) > self.horizon {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Forget all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of samples currently inside the horizon.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Estimated velocity in pixels per second, clamped to `±max`.
    ///
    /// Returns 0.0 with fewer than two samples or when all samples share a
    /// timestamp.
    #[must_use]
    pub fn velocity(&self, max: f32) -> f32 {
        let n = self.samples.len();
        if n < 2 {
            return 0.0;
        }
        let Some(origin) = self.samples.front().map(|s| s.at) else {
            return 0.0;
        };

        // Least-squares slope of position over time (seconds).
        let n_f = n as f64;
        let (mut sum_t, mut sum_x, mut sum_tt, mut sum_tx) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
        for s in &self.samples {
            let t = (s.at - origin).as_secs_f64();
            let x = f64::from(s.position);
            sum_t += t;
            sum_x += x;
            sum_tt += t * t;
            sum_tx += t * x;
        }
        let denom = n_f * sum_tt - sum_t * sum_t;
        if denom.abs() < 1e-12 {
            return 0.0;
        }
        let slope = (n_f * sum_tx - sum_t * sum_x) / denom;
        let max = f64::from(max.abs());
        if slope.is_finite() {
            slope.clamp(-max, max) as f32
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

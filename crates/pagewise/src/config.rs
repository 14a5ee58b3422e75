#![forbid(unsafe_code)]

//! Pager configuration.
//!
//! All distances are in host pixels and velocities in pixels per second.
//! [`PagerConfig::default`] matches a density of 1.0; use
//! [`PagerConfig::for_density`] to scale the density-independent values for
//! the host display.

use std::time::Duration;

/// Smallest offscreen limit the engine accepts.
pub const MIN_OFFSCREEN_LIMIT: usize = 1;

/// Tunable parameters for paging behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct PagerConfig {
    /// Pages kept materialized on each side of the current page.
    /// Default: 1
    pub offscreen_limit: usize,

    /// Gap between adjacent pages in pixels.
    /// Default: 0
    pub page_margin: f32,

    /// Distance the pointer must travel before a touch becomes a drag.
    /// Default: 8 px
    pub touch_slop: f32,

    /// Release velocity required for a fling.
    /// Default: 400 px/s
    pub min_fling_velocity: f32,

    /// Upper bound applied to measured release velocity.
    /// Default: 8000 px/s
    pub max_fling_velocity: f32,

    /// Drag distance required for a fling.
    /// Default: 25 px
    pub min_fling_distance: f32,

    /// A touch during a settle this close to the final position completes
    /// the settle instead of catching the page.
    /// Default: 2 px
    pub close_enough: f32,

    /// Fraction of a page a forward drag must cover to commit to the next
    /// page on a non-fling release.
    /// Default: 0.4
    pub forward_commit_fraction: f32,

    /// Fraction of a page a backward drag must cover to commit to the
    /// previous page on a non-fling release.
    /// Default: 0.6
    pub backward_commit_fraction: f32,

    /// Longest settle animation.
    /// Default: 600ms
    pub max_settle_duration: Duration,

    /// Shortest settle animation.
    /// Default: 50ms
    pub min_settle_duration: Duration,

    /// Duration of programmatic page changes.
    /// Default: 300ms
    pub default_settle_duration: Duration,

    /// Horizon of the release-velocity estimate.
    /// Default: 100ms
    pub velocity_horizon: Duration,

    /// Asymptotic overscroll past the first or last page, as a fraction of
    /// the container width.
    /// Default: 0.3
    pub max_overscroll_fraction: f32,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            offscreen_limit: 1,
            page_margin: 0.0,
            touch_slop: 8.0,
            min_fling_velocity: 400.0,
            max_fling_velocity: 8000.0,
            min_fling_distance: 25.0,
            close_enough: 2.0,
            forward_commit_fraction: 0.4,
            backward_commit_fraction: 0.6,
            max_settle_duration: Duration::from_millis(600),
            min_settle_duration: Duration::from_millis(50),
            default_settle_duration: Duration::from_millis(300),
            velocity_horizon: Duration::from_millis(100),
            max_overscroll_fraction: 0.3,
        }
    }
}

impl PagerConfig {
    /// Defaults scaled for a display with `density` pixels per
    /// density-independent pixel.
    #[must_use]
    pub fn for_density(density: f32) -> Self {
        let density = if density.is_finite() && density > 0.0 {
            density
        } else {
            1.0
        };
        let base = Self::default();
        Self {
            touch_slop: base.touch_slop * density,
            min_fling_velocity: base.min_fling_velocity * density,
            max_fling_velocity: base.max_fling_velocity * density,
            min_fling_distance: base.min_fling_distance * density,
            close_enough: base.close_enough * density,
            ..base
        }
    }

    /// Set the offscreen limit (values below 1 are raised to 1).
    #[must_use]
    pub fn with_offscreen_limit(mut self, limit: usize) -> Self {
        self.offscreen_limit = limit;
        self
    }

    /// Set the page margin.
    #[must_use]
    pub fn with_page_margin(mut self, margin: f32) -> Self {
        self.page_margin = margin;
        self
    }

    /// Set the touch slop.
    #[must_use]
    pub fn with_touch_slop(mut self, slop: f32) -> Self {
        self.touch_slop = slop;
        self
    }

    /// Set the fling thresholds.
    #[must_use]
    pub fn with_fling_thresholds(mut self, min_velocity: f32, min_distance: f32) -> Self {
        self.min_fling_velocity = min_velocity;
        self.min_fling_distance = min_distance;
        self
    }

    /// Set the forward and backward commit fractions.
    #[must_use]
    pub fn with_commit_fractions(mut self, forward: f32, backward: f32) -> Self {
        self.forward_commit_fraction = forward;
        self.backward_commit_fraction = backward;
        self
    }

    /// Set the settle duration bounds.
    #[must_use]
    pub fn with_settle_bounds(mut self, min: Duration, max: Duration) -> Self {
        self.min_settle_duration = min;
        self.max_settle_duration = max;
        self
    }

    /// Set the programmatic settle duration.
    #[must_use]
    pub fn with_default_settle_duration(mut self, duration: Duration) -> Self {
        self.default_settle_duration = duration;
        self
    }

    /// Copy with out-of-range values replaced by usable ones.
    ///
    /// Logs a warning for every value it changes.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if self.offscreen_limit < MIN_OFFSCREEN_LIMIT {
            tracing::warn!(
                requested = self.offscreen_limit,
                "offscreen limit too small; using {MIN_OFFSCREEN_LIMIT}"
            );
            self.offscreen_limit = MIN_OFFSCREEN_LIMIT;
        }
        if !(self.page_margin.is_finite() && self.page_margin >= 0.0) {
            tracing::warn!(margin = self.page_margin, "invalid page margin; using 0");
            self.page_margin = 0.0;
        }
        for (name, fraction) in [
            ("forward_commit_fraction", &mut self.forward_commit_fraction),
            ("backward_commit_fraction", &mut self.backward_commit_fraction),
        ] {
            if !(fraction.is_finite() && (0.0..=1.0).contains(&*fraction)) {
                tracing::warn!(field = name, value = *fraction, "commit fraction outside [0, 1]; clamping");
                *fraction = if fraction.is_finite() {
                    fraction.clamp(0.0, 1.0)
                } else {
                    0.5
                };
            }
        }
        if self.min_settle_duration > self.max_settle_duration {
            tracing::warn!("min settle duration exceeds max; swapping");
            std::mem::swap(&mut self.min_settle_duration, &mut self.max_settle_duration);
        }
        if !(self.max_overscroll_fraction.is_finite() && self.max_overscroll_fraction > 0.0) {
            self.max_overscroll_fraction = 0.3;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

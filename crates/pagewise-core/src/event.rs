#![forbid(unsafe_code)]

//! Pointer event model.
//!
//! Hosts translate their native touch or mouse stream into [`PointerEvent`]s.
//! Every event names the pointer that changed and carries a snapshot of all
//! pointers that are down at that instant, so the consumer can recover when a
//! tracked pointer vanishes without an up or cancel.
//!
//! Positions are in host pixels; `x` grows to the right and `y` grows down.
//! Timestamps are monotonic offsets from an arbitrary host epoch.

use std::time::Duration;

/// Host-assigned pointer identifier, stable for the lifetime of one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub u32);

impl PointerId {
    /// Identifier conventionally used for the first contact or a mouse.
    pub const PRIMARY: Self = Self(0);
}

/// Position of one active pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Pointer identifier.
    pub id: PointerId,
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels.
    pub y: f32,
}

impl PointerSample {
    /// Create a new sample.
    #[must_use]
    pub const fn new(id: PointerId, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// First pointer went down.
    Down,
    /// An additional pointer went down while others are held.
    SecondaryDown,
    /// One or more pointers moved.
    Move,
    /// A pointer went up while others remain down.
    SecondaryUp,
    /// The last pointer went up.
    Up,
    /// The host aborted the gesture (e.g. the window lost focus).
    Cancel,
}

/// A pointer event.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// The type of event.
    pub kind: PointerEventKind,
    /// Pointer whose state changed.
    pub pointer: PointerId,
    /// Every pointer that is down at this instant, including `pointer` unless
    /// it just went up.
    pub pointers: Vec<PointerSample>,
    /// Monotonic event time.
    pub timestamp: Duration,
}

impl PointerEvent {
    /// Create an event for a single pointer at `(x, y)`.
    ///
    /// For [`PointerEventKind::Up`] and [`PointerEventKind::SecondaryUp`] the
    /// sample still records where the pointer lifted.
    #[must_use]
    pub fn new(kind: PointerEventKind, id: PointerId, x: f32, y: f32, timestamp: Duration) -> Self {
        Self {
            kind,
            pointer: id,
            pointers: vec![PointerSample::new(id, x, y)],
            timestamp,
        }
    }

    /// First pointer down.
    #[must_use]
    pub fn down(id: PointerId, x: f32, y: f32, timestamp: Duration) -> Self {
        Self::new(PointerEventKind::Down, id, x, y, timestamp)
    }

    /// Pointer moved.
    #[must_use]
    pub fn moved(id: PointerId, x: f32, y: f32, timestamp: Duration) -> Self {
        Self::new(PointerEventKind::Move, id, x, y, timestamp)
    }

    /// Last pointer up.
    #[must_use]
    pub fn up(id: PointerId, x: f32, y: f32, timestamp: Duration) -> Self {
        Self::new(PointerEventKind::Up, id, x, y, timestamp)
    }

    /// Gesture cancelled by the host. Carries no pointer positions.
    #[must_use]
    pub fn cancel(timestamp: Duration) -> Self {
        Self {
            kind: PointerEventKind::Cancel,
            pointer: PointerId::PRIMARY,
            pointers: Vec::new(),
            timestamp,
        }
    }

    /// Add another active pointer to the snapshot (builder).
    #[must_use]
    pub fn with_pointer(mut self, sample: PointerSample) -> Self {
        if let Some(existing) = self.pointers.iter_mut().find(|p| p.id == sample.id) {
            *existing = sample;
        } else {
            self.pointers.push(sample);
        }
        self
    }

    /// Position of `id` in this event's snapshot, if present.
    #[must_use]
    pub fn sample(&self, id: PointerId) -> Option<PointerSample> {
        self.pointers.iter().copied().find(|p| p.id == id)
    }

    /// Position of the pointer that changed.
    #[must_use]
    pub fn changed(&self) -> Option<PointerSample> {
        self.sample(self.pointer)
    }

    /// Whether the event ends the whole gesture.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, PointerEventKind::Up | PointerEventKind::Cancel)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const T0: Duration = Duration::ZERO;

    #[test]
    fn single_pointer_constructors() {
        let ev = PointerEvent::down(PointerId(3), 10.0, 20.0, T0);
        assert_eq!(ev.kind, PointerEventKind::Down);
        assert_eq!(ev.changed(), Some(PointerSample::new(PointerId(3), 10.0, 20.0)));
        assert!(!ev.is_terminal());
    }

    #[test]
    fn with_pointer_replaces_same_id() {
        let ev = PointerEvent::moved(PointerId(0), 1.0, 1.0, T0)
            .with_pointer(PointerSample::new(PointerId(1), 5.0, 5.0))
            .with_pointer(PointerSample::new(PointerId(1), 6.0, 7.0));
        assert_eq!(ev.pointers.len(), 2);
        assert_eq!(ev.sample(PointerId(1)).map(|s| s.x), Some(6.0));
    }

    #[test]
    fn cancel_is_terminal_and_empty() {
        let ev = PointerEvent::cancel(Duration::from_millis(5));
        assert!(ev.is_terminal());
        assert!(ev.pointers.is_empty());
        assert_eq!(ev.changed(), None);
    }

    #[test]
    fn up_is_terminal() {
        assert!(PointerEvent::up(PointerId::PRIMARY, 0.0, 0.0, T0).is_terminal());
    }
}

#![forbid(unsafe_code)]

//! Recording listener.
//!
//! [`Recording`] is a shared event log; [`Recording::listener`] hands out
//! listeners that append to it. The log can be dumped as JSONL for
//! debugging failed scenarios.
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"page_selected","index":2}
//! {"event":"scroll_state","state":"settling"}
//! {"event":"scrolled","index":1,"fraction":0.25,"pixels":250.0}
//! {"event":"edge_pull","edge":"leading","pull":0.12}
//! {"event":"edge_release"}
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use pagewise::{Edge, PageChangeListener, ScrollState};
use serde_json::json;

/// One notification received by a listener.
#[derive(Debug, Clone, PartialEq)]
pub enum PagerEvent {
    /// `on_page_selected`.
    Selected(usize),
    /// `on_scroll_state_changed`.
    State(ScrollState),
    /// `on_scrolled`.
    Scrolled {
        /// Page at or before the position.
        index: usize,
        /// Fraction into that page.
        fraction: f32,
        /// Same distance in pixels.
        pixels: f32,
    },
    /// `on_edge_pull`.
    EdgePull {
        /// Which end.
        edge: Edge,
        /// Overscroll fraction.
        pull: f32,
    },
    /// `on_edge_release`.
    EdgeRelease,
}

impl PagerEvent {
    /// JSON form used by [`Recording::to_jsonl`].
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Selected(index) => json!({ "event": "page_selected", "index": index }),
            Self::State(state) => json!({ "event": "scroll_state", "state": state.to_string() }),
            Self::Scrolled {
                index,
                fraction,
                pixels,
            } => json!({
                "event": "scrolled",
                "index": index,
                "fraction": fraction,
                "pixels": pixels,
            }),
            Self::EdgePull { edge, pull } => json!({
                "event": "edge_pull",
                "edge": match edge {
                    Edge::Leading => "leading",
                    Edge::Trailing => "trailing",
                },
                "pull": pull,
            }),
            Self::EdgeRelease => json!({ "event": "edge_release" }),
        }
    }
}

/// Shared log of listener notifications.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    events: Rc<RefCell<Vec<PagerEvent>>>,
}

impl Recording {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener appending to this log.
    #[must_use]
    pub fn listener(&self) -> RecordingListener {
        RecordingListener {
            events: Rc::clone(&self.events),
        }
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<PagerEvent> {
        self.events.borrow().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Indices announced through `on_page_selected`.
    #[must_use]
    pub fn selected(&self) -> Vec<usize> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                PagerEvent::Selected(index) => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Scroll-state transitions.
    #[must_use]
    pub fn states(&self) -> Vec<ScrollState> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                PagerEvent::State(state) => Some(*state),
                _ => None,
            })
            .collect()
    }

    /// `(index, fraction, pixels)` of every `on_scrolled`.
    #[must_use]
    pub fn scrolled(&self) -> Vec<(usize, f32, f32)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                PagerEvent::Scrolled {
                    index,
                    fraction,
                    pixels,
                } => Some((*index, *fraction, *pixels)),
                _ => None,
            })
            .collect()
    }

    /// Number of edge pulls recorded.
    #[must_use]
    pub fn edge_pulls(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, PagerEvent::EdgePull { .. }))
            .count()
    }

    /// One JSON object per line.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for event in self.events.borrow().iter() {
            out.push_str(&event.to_json().to_string());
            out.push('\n');
        }
        out
    }
}

/// Listener half of a [`Recording`].
#[derive(Debug)]
pub struct RecordingListener {
    events: Rc<RefCell<Vec<PagerEvent>>>,
}

impl RecordingListener {
    fn push(&self, event: PagerEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl PageChangeListener for RecordingListener {
    fn on_page_selected(&mut self, index: usize) {
        self.push(PagerEvent::Selected(index));
    }

    fn on_scroll_state_changed(&mut self, state: ScrollState) {
        self.push(PagerEvent::State(state));
    }

    fn on_scrolled(&mut self, index: usize, fraction: f32, pixels: f32) {
        self.push(PagerEvent::Scrolled {
            index,
            fraction,
            pixels,
        });
    }

    fn on_edge_pull(&mut self, edge: Edge, pull: f32) {
        self.push(PagerEvent::EdgePull { edge, pull });
    }

    fn on_edge_release(&mut self) {
        self.push(PagerEvent::EdgeRelease);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#![forbid(unsafe_code)]

//! Page-change notifications.

use std::fmt;

/// Externally observable scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollState {
    /// At rest on a page.
    #[default]
    Idle,
    /// Following the user's pointer.
    Dragging,
    /// Animating toward a page.
    Settling,
}

impl fmt::Display for ScrollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Dragging => f.write_str("dragging"),
            Self::Settling => f.write_str("settling"),
        }
    }
}

/// End of the page strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Before the first page.
    Leading,
    /// After the last page.
    Trailing,
}

/// Receives page-change notifications.
///
/// All methods default to no-ops.
pub trait PageChangeListener {
    /// A new page was committed: after a non-animated jump, at the end of a
    /// settle, or after an adapter change.
    fn on_page_selected(&mut self, index: usize) {
        let _ = index;
    }

    /// The scroll state changed. Never called twice with the same state.
    fn on_scroll_state_changed(&mut self, state: ScrollState) {
        let _ = state;
    }

    /// The scroll position changed. `index` is the page whose leading edge is
    /// at or before the position, `fraction` how far into it the position
    /// is, and `pixels` the same distance in pixels.
    fn on_scrolled(&mut self, index: usize, fraction: f32, pixels: f32) {
        let _ = (index, fraction, pixels);
    }

    /// A drag pulled past an end of the strip. `pull` is the displayed
    /// overscroll as a fraction of the container width.
    fn on_edge_pull(&mut self, edge: Edge, pull: f32) {
        let _ = (edge, pull);
    }

    /// An edge pull ended.
    fn on_edge_release(&mut self) {}
}

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Registered listeners, notified in registration order.
#[derive(Default)]
pub struct Listeners {
    entries: Vec<(ListenerId, Box<dyn PageChangeListener>)>,
    next_id: u64,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn add(&mut self, listener: Box<dyn PageChangeListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Unregister a listener. Returns whether it was registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn each(&mut self, mut f: impl FnMut(&mut dyn PageChangeListener)) {
        for (_, listener) in &mut self.entries {
            f(listener.as_mut());
        }
    }

    pub(crate) fn page_selected(&mut self, index: usize) {
        tracing::debug!(index, "page selected");
        self.each(|l| l.on_page_selected(index));
    }

    pub(crate) fn scroll_state_changed(&mut self, state: ScrollState) {
        self.each(|l| l.on_scroll_state_changed(state));
    }

    pub(crate) fn scrolled(&mut self, index: usize, fraction: f32, pixels: f32) {
        self.each(|l| l.on_scrolled(index, fraction, pixels));
    }

    pub(crate) fn edge_pull(&mut self, edge: Edge, pull: f32) {
        self.each(|l| l.on_edge_pull(edge, pull));
    }

    pub(crate) fn edge_release(&mut self) {
        self.each(|l| l.on_edge_release());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Tagged {
        tag: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl PageChangeListener for Tagged {
        fn on_page_selected(&mut self, index: usize) {
            self.log.borrow_mut().push(format!("{}:{index}", self.tag));
        }
    }

    struct Silent;

    impl PageChangeListener for Silent {}

    #[test]
    fn notified_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();
        for tag in ["a", "b"] {
            listeners.add(Box::new(Tagged {
                tag,
                log: Rc::clone(&log),
            }));
        }
        listeners.page_selected(3);
        assert_eq!(*log.borrow(), vec!["a:3", "b:3"]);
    }

    #[test]
    fn removed_listener_is_silent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();
        let a = listeners.add(Box::new(Tagged {
            tag: "a",
            log: Rc::clone(&log),
        }));
        listeners.add(Box::new(Silent));
        assert!(listeners.remove(a));
        assert!(!listeners.remove(a));
        assert_eq!(listeners.len(), 1);
        listeners.page_selected(1);
        listeners.scrolled(1, 0.5, 500.0);
        listeners.edge_pull(Edge::Leading, 0.1);
        listeners.edge_release();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn state_display() {
        assert_eq!(ScrollState::Settling.to_string(), "settling");
        assert_eq!(ScrollState::default(), ScrollState::Idle);
    }
}

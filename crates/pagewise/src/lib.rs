#![forbid(unsafe_code)]

//! Pagewise
//!
//! A virtualized, horizontally paged scroll engine. Hosts supply pages
//! through a [`PageAdapter`], feed pointer events, frame ticks and layout
//! changes into a [`PagingController`], and apply the scroll offset it
//! computes.
//!
//! # Key Components
//!
//! - [`PageAdapter`] - Host contract for creating and destroying page content
//! - [`PageWindow`] - The materialized pages and their offsets
//! - [`VirtualizationEngine`] - Keeps the window around the current page
//! - [`GestureStateMachine`] - Turns pointer events into drags and releases
//! - [`ScrollAnimator`] - Settle animation of the scroll offset
//! - [`PagingController`] - Ties the above together behind host callbacks
//!
//! # How it fits together
//! Only the controller talks to the adapter's lifecycle hooks, and only
//! through the virtualization engine. Gestures and the animator never touch
//! pages directly: they move the scroll offset, and the controller
//! repopulates the window whenever the page nearest to that offset changes.
//!
//! # Feature Gates
//!
//! - `state-persistence`: JSON encoding of [`SavedState`].

pub mod adapter;
pub mod config;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod listener;
pub mod scroller;
pub mod state;
pub mod virtualize;
pub mod window;

pub use adapter::{ItemPosition, PageAdapter};
pub use config::PagerConfig;
pub use controller::{Direction, PagingController};
pub use error::{AdapterError, AdapterFailures, AdapterOp, PageFailure, PagerError, Result};
pub use gesture::{
    EdgeResistance, EdgeSignal, GestureOutcome, GestureStateMachine, NoParent, ParentCoordinator,
    TouchState,
};
pub use listener::{Edge, ListenerId, PageChangeListener, ScrollState};
pub use scroller::{AnimationHandle, DurationHint, ScrollAnimator, ScrollFrame};
pub use state::SavedState;
#[cfg(feature = "state-persistence")]
pub use state::StateError;
pub use virtualize::{InstantiateOrder, PageFate, VirtualizationEngine, WindowDelta};
pub use window::{Page, PageSlot, PageWindow};

pub use pagewise_core as core;

#![forbid(unsafe_code)]

//! Core: easing curves and tweens, pointer events, and velocity tracking.

pub mod animation;
pub mod event;
pub mod velocity;

pub use event::{PointerEvent, PointerEventKind, PointerId, PointerSample};
pub use velocity::VelocityTracker;

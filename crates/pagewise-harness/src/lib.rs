#![forbid(unsafe_code)]

//! Test harness for the pagewise paging engine.
//!
//! - **Host simulation**: [`HostSimulator`] drives a pager on a virtual
//!   clock with frame-spaced pointer events.
//! - **Fixtures**: [`VecAdapter`] is a list-backed adapter with stable ids,
//!   a lifecycle call log, and failure injection; [`Recording`] captures
//!   listener notifications.
//! - **Logs**: [`init_test_logging`] installs a `RUST_LOG`-filtered
//!   subscriber; [`with_captured_logs`] collects events for assertions.
//!
//! # Quick Start
//!
//! ```ignore
//! use pagewise_harness::HostSimulator;
//!
//! let mut sim = HostSimulator::with_pages(5, 1000.0)?;
//! sim.pager_mut().set_current_index(4, true)?;
//! sim.run_until_idle()?;
//! assert_eq!(sim.recording().selected(), vec![0, 4]);
//! ```

pub mod adapter;
pub mod log_capture;
pub mod recorder;
pub mod simulator;

pub use adapter::{AdapterCall, VecAdapter};
pub use log_capture::{CaptureHandle, CapturedEvent, init_test_logging, with_captured_logs};
pub use recorder::{PagerEvent, Recording, RecordingListener};
pub use simulator::{FRAME, HostSimulator, MAX_SETTLE_FRAMES};

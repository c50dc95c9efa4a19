//! Folio Core Runtime
//!
//! Foundational primitives shared by the reveal animation crates:
//!
//! - **Geometry**: points, sizes and rects in document coordinates
//! - **Frame Clock**: per-refresh-tick callback registration for the host
//! - **Reveal States**: the Hidden/Visible state machine driven by visibility
//! - **Errors**: configuration validation shared by every component
//!
//! # Example
//!
//! ```rust
//! use folio_core::frame::FrameClock;
//!
//! let clock = FrameClock::new();
//! let mut remaining = 3;
//! let _id = clock.request_frames(move |_dt_ms| {
//!     remaining -= 1;
//!     remaining > 0
//! });
//!
//! clock.tick(16.0);
//! clock.tick(16.0);
//! clock.tick(16.0);
//! assert_eq!(clock.pending(), 0);
//! ```

pub mod error;
pub mod events;
pub mod frame;
pub mod geometry;

pub use error::{ConfigError, Result};
pub use events::{event_types, EventType, RevealState, StateTransitions};
pub use frame::{FrameCallbackId, FrameClock};
pub use geometry::{Point, Rect, Size};

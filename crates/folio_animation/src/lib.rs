//! Folio Animation System
//!
//! Easing, stagger groups and timeline playback for viewport reveals.
//!
//! # Features
//!
//! - **Stagger Groups**: ordered items whose entrances are offset by a fixed interval
//! - **Timeline Playback**: frame-clock driven interpolation toward a reveal state
//! - **Interruptible**: replaying a group continues from its interpolated values
//! - **Presets**: fade-up, slide, bar fill and scale entrances

pub mod easing;
pub mod presets;
pub mod properties;
pub mod stagger;
pub mod timeline;

pub use easing::Easing;
pub use presets::{AnimationPreset, RevealPreset};
pub use properties::VisualProperties;
pub use stagger::{StaggerGroup, StaggerGroupBuilder, StaggerItem};
pub use timeline::{AnimationHandle, AnimationTimeline, GroupPlayback, SharedPlayback};

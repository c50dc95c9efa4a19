//! Folio Viewport Reveals
//!
//! Scroll-driven entrance animations for page sections.
//!
//! # Components
//!
//! - **Document**: viewport, scroll offset and region geometry
//! - **VisibilityObserver**: threshold-based visibility of a region
//! - **SectionRevealController**: replays a section's stagger groups as it
//!   enters and leaves the viewport
//! - **ScrollTopAffordance**: floating control that scrolls back to the top
//! - **Splash**: loading screen shown before the page content mounts
//! - **Page**: a configured set of the above sharing one frame clock
//!
//! # Example
//!
//! ```rust
//! use folio_reveal::prelude::*;
//!
//! let clock = FrameClock::new();
//! let timeline = AnimationTimeline::new(clock.clone());
//! let document = Document::new(Size::new(800.0, 600.0));
//! document.set_content_height(2000.0);
//!
//! let region = document.mount_region(Rect::new(0.0, 900.0, 800.0, 400.0));
//! let config = SectionConfig::builder("about", region)
//!     .threshold(0.3)
//!     .group(AnimationPreset::uniform("items", RevealPreset::FadeUp, 3, 200, 600).unwrap())
//!     .build()
//!     .unwrap();
//! let section = SectionRevealController::mount(config, &document, &timeline).unwrap();
//! assert_eq!(section.state(), RevealState::Hidden);
//!
//! document.set_scroll_offset(700.0);
//! assert_eq!(section.state(), RevealState::Visible);
//!
//! for _ in 0..63 {
//!     clock.tick(16.0);
//! }
//! assert!(!section.is_animating());
//! ```

pub mod affordance;
pub mod config;
pub mod controller;
pub mod document;
pub mod observer;
pub mod page;
pub mod splash;

pub use affordance::{ScrollTopAffordance, ScrollTopConfig};
pub use config::{GroupSpec, ItemSpec, PageConfig, PageConfigError, SectionSpec, ViewportSpec};
pub use controller::{RevealTrigger, SectionConfig, SectionConfigBuilder, SectionRevealController};
pub use document::{Document, ListenerId, RegionId, Subscription, VisibilityEvent};
pub use observer::{ViewportThreshold, VisibilityObserver};
pub use page::{GroupSnapshot, Page, PageSnapshot, ScrollTopSnapshot, SectionSnapshot, SplashSnapshot};
pub use splash::{LoaderConfig, Splash, SplashPhase};

/// Prelude for building reveal pages
pub mod prelude {
    pub use crate::affordance::{ScrollTopAffordance, ScrollTopConfig};
    pub use crate::config::PageConfig;
    pub use crate::controller::{RevealTrigger, SectionConfig, SectionRevealController};
    pub use crate::document::{Document, RegionId, VisibilityEvent};
    pub use crate::observer::{ViewportThreshold, VisibilityObserver};
    pub use crate::page::Page;

    pub use folio_animation::{
        AnimationPreset, AnimationTimeline, Easing, RevealPreset, StaggerGroup, VisualProperties,
    };
    pub use folio_core::{ConfigError, FrameClock, Rect, RevealState, Size};
}

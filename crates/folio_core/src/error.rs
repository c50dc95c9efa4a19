//! Configuration error types

use thiserror::Error;

/// Errors raised while constructing a reveal component.
///
/// All of these are developer-time misconfigurations. They are reported
/// synchronously from the constructor and only abort that component.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// An item or tween was given a zero duration
    #[error("animation duration must be positive (item {index})")]
    NonPositiveDuration { index: usize },

    /// Viewport threshold outside [0, 1] or not a number
    #[error("viewport threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f32),

    /// Scroll threshold is negative or not a number
    #[error("scroll threshold {0} must be a non-negative number")]
    InvalidScrollThreshold(f32),

    /// A viewport or section extent that is not a positive number
    #[error("{name} must be a positive size, got {value}")]
    NonPositiveExtent { name: String, value: f32 },

    /// A stagger group with no items
    #[error("stagger group `{0}` has no items")]
    EmptyGroup(String),

    /// Preset name not recognised
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),

    /// Easing name not recognised
    #[error("unknown easing `{0}`")]
    UnknownEasing(String),

    /// A section references a region that is not mounted
    #[error("region for section `{0}` is not mounted")]
    RegionNotMounted(String),

    /// Two sections share the same name
    #[error("duplicate section `{0}`")]
    DuplicateSection(String),
}

/// Result type for component construction
pub type Result<T> = std::result::Result<T, ConfigError>;

//! Reveal presets
//!
//! Pre-built items for the entrance patterns used across page sections.

use crate::easing::Easing;
use crate::properties::VisualProperties;
use crate::stagger::{StaggerGroup, StaggerItem};
use folio_core::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named entrance patterns
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RevealPreset {
    /// Rise 20px while fading in
    FadeUp,
    /// Slide in 50px from the left while fading in
    SlideLeft,
    /// Slide in 50px from the right while fading in
    SlideRight,
    /// Opacity only
    Fade,
    /// Progress bar growing from 0 to its level
    Bar,
    /// Grow from 80% scale while fading in
    ScaleIn,
}

impl FromStr for RevealPreset {
    type Err = ConfigError;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match name {
            "fade-up" => RevealPreset::FadeUp,
            "slide-left" => RevealPreset::SlideLeft,
            "slide-right" => RevealPreset::SlideRight,
            "fade" => RevealPreset::Fade,
            "bar" | "skill-bar" => RevealPreset::Bar,
            "scale-in" => RevealPreset::ScaleIn,
            _ => return Err(ConfigError::UnknownPreset(name.to_string())),
        })
    }
}

impl fmt::Display for RevealPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RevealPreset::FadeUp => "fade-up",
            RevealPreset::SlideLeft => "slide-left",
            RevealPreset::SlideRight => "slide-right",
            RevealPreset::Fade => "fade",
            RevealPreset::Bar => "bar",
            RevealPreset::ScaleIn => "scale-in",
        })
    }
}

impl From<RevealPreset> for String {
    fn from(preset: RevealPreset) -> Self {
        preset.to_string()
    }
}

impl TryFrom<String> for RevealPreset {
    type Error = ConfigError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl RevealPreset {
    /// Item for this preset. `level` is only read by [`RevealPreset::Bar`].
    pub fn item(&self, duration_ms: u32, level: f32) -> StaggerItem {
        match self {
            RevealPreset::FadeUp => AnimationPreset::fade_up(20.0, duration_ms),
            RevealPreset::SlideLeft => AnimationPreset::slide_in_left(50.0, duration_ms),
            RevealPreset::SlideRight => AnimationPreset::slide_in_right(50.0, duration_ms),
            RevealPreset::Fade => AnimationPreset::fade_in(duration_ms),
            RevealPreset::Bar => AnimationPreset::bar(level, duration_ms),
            RevealPreset::ScaleIn => AnimationPreset::scale_in(0.8, duration_ms),
        }
    }
}

/// Pre-built reveal items and groups
pub struct AnimationPreset;

impl AnimationPreset {
    /// Rise by `distance` pixels while fading in
    pub fn fade_up(distance: f32, duration_ms: u32) -> StaggerItem {
        StaggerItem::new(
            VisualProperties::opacity(0.0).with_translate(0.0, distance),
            VisualProperties::REST,
            duration_ms,
        )
    }

    /// Slide in from `distance` pixels to the left while fading in
    pub fn slide_in_left(distance: f32, duration_ms: u32) -> StaggerItem {
        StaggerItem::new(
            VisualProperties::opacity(0.0).with_translate(-distance, 0.0),
            VisualProperties::REST,
            duration_ms,
        )
    }

    /// Slide in from `distance` pixels to the right while fading in
    pub fn slide_in_right(distance: f32, duration_ms: u32) -> StaggerItem {
        Self::slide_in_left(-distance, duration_ms)
    }

    pub fn fade_in(duration_ms: u32) -> StaggerItem {
        StaggerItem::new(
            VisualProperties::opacity(0.0),
            VisualProperties::REST,
            duration_ms,
        )
    }

    /// Progress bar filling from empty to `level` percent
    pub fn bar(level: f32, duration_ms: u32) -> StaggerItem {
        StaggerItem::new(
            VisualProperties::REST.with_width(0.0),
            VisualProperties::REST.with_width(level.clamp(0.0, 100.0)),
            duration_ms,
        )
    }

    /// Grow from `from_scale` while fading in
    pub fn scale_in(from_scale: f32, duration_ms: u32) -> StaggerItem {
        StaggerItem::new(
            VisualProperties::opacity(0.0).with_scale(from_scale),
            VisualProperties::REST,
            duration_ms,
        )
        .with_easing(Easing::EaseOutQuad)
    }

    /// `count` identical items of `preset`
    pub fn uniform(
        name: &str,
        preset: RevealPreset,
        count: usize,
        stagger_ms: u32,
        duration_ms: u32,
    ) -> Result<StaggerGroup> {
        StaggerGroup::builder(name)
            .stagger(stagger_ms)
            .items((0..count).map(|_| preset.item(duration_ms, 100.0)))
            .build()
    }

    /// One bar per level, filling one after another
    pub fn bars(name: &str, levels: &[f32], stagger_ms: u32, duration_ms: u32) -> Result<StaggerGroup> {
        StaggerGroup::builder(name)
            .stagger(stagger_ms)
            .items(levels.iter().map(|&level| Self::bar(level, duration_ms)))
            .build()
    }

    /// Floating control entrance: rise 20px and fade in
    pub fn floating_control(duration_ms: u32) -> Result<StaggerGroup> {
        StaggerGroup::builder("scroll-top")
            .item(Self::fade_up(20.0, duration_ms).with_easing(Easing::EaseOutQuad))
            .build()
    }
}

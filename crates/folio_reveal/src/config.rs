//! Page configuration
//!
//! A page is described in TOML: the viewport, the loading splash, the
//! scroll-to-top control and an ordered list of sections. Each section lists
//! the stagger groups it reveals.
//!
//! ```toml
//! [viewport]
//! width = 1280.0
//! height = 800.0
//!
//! [[sections]]
//! name = "about"
//! height = 900.0
//!
//! [[sections.groups]]
//! name = "content"
//! preset = "fade-up"
//! count = 3
//! ```
//!
//! Groups set `trigger = "mount"` to play once when the page content mounts
//! instead of following the section's visibility.

use crate::affordance::ScrollTopConfig;
use crate::controller::{RevealTrigger, SectionConfig};
use crate::document::RegionId;
use crate::splash::LoaderConfig;
use folio_animation::{Easing, RevealPreset, StaggerGroup, StaggerItem};
use folio_core::{ConfigError, Size};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or saving a page description
#[derive(Error, Debug)]
pub enum PageConfigError {
    #[error("failed to parse page config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize page config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid page config: {0}")]
    Invalid(#[from] ConfigError),
}

fn default_viewport_width() -> f32 {
    1280.0
}

fn default_viewport_height() -> f32 {
    800.0
}

fn default_section_height() -> f32 {
    800.0
}

fn default_threshold() -> f64 {
    0.3
}

fn default_count() -> usize {
    1
}

fn default_stagger_ms() -> u32 {
    200
}

fn default_duration_ms() -> u32 {
    600
}

fn default_level() -> f32 {
    100.0
}

/// Viewport size in pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportSpec {
    #[serde(default = "default_viewport_width")]
    pub width: f32,
    #[serde(default = "default_viewport_height")]
    pub height: f32,
}

impl Default for ViewportSpec {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

impl From<ViewportSpec> for Size {
    fn from(spec: ViewportSpec) -> Self {
        Size::new(spec.width, spec.height)
    }
}

/// One explicitly listed item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub preset: RevealPreset,
    /// Overrides the group duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u32>,
    /// Fill level for bar items (percent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f32>,
    /// Start delay within the group, replacing the stagger slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u32>,
}

impl ItemSpec {
    pub fn new(preset: RevealPreset, duration_ms: u32) -> Self {
        Self {
            preset,
            duration_ms: Some(duration_ms),
            level: None,
            delay_ms: None,
        }
    }

    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}

/// A stagger group within a section.
///
/// Items come from, in order of precedence: the explicit `items` list, one
/// bar per entry of `levels`, or `count` copies of `preset`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "RevealTrigger::is_view")]
    pub trigger: RevealTrigger,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<RevealPreset>,

    #[serde(default = "default_count")]
    pub count: usize,

    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u32,

    #[serde(default = "default_duration_ms")]
    pub duration_ms: u32,

    /// Overrides the preset easing of every item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub levels: Vec<f32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemSpec>,
}

impl GroupSpec {
    /// `count` copies of `preset`
    pub fn uniform(
        name: impl Into<String>,
        preset: RevealPreset,
        count: usize,
        stagger_ms: u32,
        duration_ms: u32,
    ) -> Self {
        Self {
            name: name.into(),
            trigger: RevealTrigger::View,
            preset: Some(preset),
            count,
            stagger_ms,
            duration_ms,
            easing: None,
            levels: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Play once on mount instead of on visibility changes
    pub fn on_mount(mut self) -> Self {
        self.trigger = RevealTrigger::Mount;
        self
    }

    pub fn build(&self) -> Result<StaggerGroup, ConfigError> {
        let items: Vec<StaggerItem> = if !self.items.is_empty() {
            self.items
                .iter()
                .map(|item| {
                    let built = item.preset.item(
                        item.duration_ms.unwrap_or(self.duration_ms),
                        item.level.unwrap_or_else(default_level),
                    );
                    match item.delay_ms {
                        Some(delay_ms) => built.with_delay(delay_ms),
                        None => built,
                    }
                })
                .collect()
        } else if !self.levels.is_empty() {
            let preset = self.preset.unwrap_or(RevealPreset::Bar);
            self.levels
                .iter()
                .map(|&level| preset.item(self.duration_ms, level))
                .collect()
        } else {
            let preset = self
                .preset
                .ok_or_else(|| ConfigError::EmptyGroup(self.name.clone()))?;
            (0..self.count)
                .map(|_| preset.item(self.duration_ms, default_level()))
                .collect()
        };

        let easing = self.easing;
        StaggerGroup::builder(self.name.as_str())
            .stagger(self.stagger_ms)
            .items(items.into_iter().map(|item| match easing {
                Some(easing) => item.with_easing(easing),
                None => item,
            }))
            .build()
    }
}

/// A page section, stacked below the previous one
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,

    #[serde(default = "default_section_height")]
    pub height: f32,

    /// Visible area ratio that reveals the section
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

impl SectionSpec {
    pub fn new(name: impl Into<String>, height: f32) -> Self {
        Self {
            name: name.into(),
            height,
            threshold: default_threshold(),
            groups: Vec::new(),
        }
    }

    pub fn group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    /// Controller configuration for this section mounted at `region`
    pub fn section_config(&self, region: RegionId) -> Result<SectionConfig, ConfigError> {
        let mut builder =
            SectionConfig::builder(self.name.as_str(), region).threshold(self.threshold as f32);
        for group in &self.groups {
            builder = builder.group_with(group.build()?, group.trigger);
        }
        builder.build()
    }
}

fn positive_extent(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveExtent {
            name: name.to_string(),
            value,
        })
    }
}

/// Full page description
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default)]
    pub viewport: ViewportSpec,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub scroll_top: ScrollTopConfig,

    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::portfolio()
    }
}

impl PageConfig {
    /// The portfolio page: hero, about, skills, education and contact
    pub fn portfolio() -> Self {
        // Portrait column, social links, text column, title, summary, call to action
        let hero = SectionSpec::new("hero", 800.0).group(
            GroupSpec {
                items: vec![
                    ItemSpec::new(RevealPreset::SlideLeft, 800),
                    ItemSpec::new(RevealPreset::FadeUp, 500).with_delay(500),
                    ItemSpec::new(RevealPreset::SlideRight, 800),
                    ItemSpec::new(RevealPreset::Fade, 800).with_delay(300),
                    ItemSpec::new(RevealPreset::Fade, 800).with_delay(600),
                    ItemSpec::new(RevealPreset::FadeUp, 500).with_delay(900),
                ],
                ..GroupSpec::uniform("intro", RevealPreset::Fade, 0, 0, 800)
            }
            .on_mount(),
        );

        let about = SectionSpec::new("about", 900.0).group(GroupSpec::uniform(
            "content",
            RevealPreset::FadeUp,
            3,
            200,
            600,
        ));

        let skills = SectionSpec::new("skills", 1100.0)
            .group(GroupSpec::uniform("cards", RevealPreset::FadeUp, 9, 100, 500))
            .group(GroupSpec {
                levels: vec![90.0, 85.0, 80.0, 75.0, 70.0, 85.0, 95.0],
                ..GroupSpec::uniform("levels", RevealPreset::Bar, 0, 200, 1000)
            }
            .on_mount());

        let education = SectionSpec::new("education", 900.0).group(GroupSpec::uniform(
            "timeline",
            RevealPreset::SlideLeft,
            3,
            200,
            600,
        ));

        let contact = SectionSpec::new("contact", 1000.0).group(GroupSpec::uniform(
            "content",
            RevealPreset::FadeUp,
            6,
            200,
            600,
        ));

        Self {
            viewport: ViewportSpec::default(),
            loader: LoaderConfig::default(),
            scroll_top: ScrollTopConfig::default(),
            sections: vec![hero, about, skills, education, contact],
        }
    }

    /// Parse and validate a TOML page description
    pub fn from_toml(source: &str) -> Result<Self, PageConfigError> {
        let config: PageConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, PageConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check everything the page will build, without mounting anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scroll_top.validate()?;
        positive_extent("viewport width", self.viewport.width)?;
        positive_extent("viewport height", self.viewport.height)?;

        let mut names = FxHashSet::default();
        for section in &self.sections {
            if !names.insert(section.name.as_str()) {
                return Err(ConfigError::DuplicateSection(section.name.clone()));
            }
            positive_extent(&format!("height of section `{}`", section.name), section.height)?;
            let threshold = section.threshold as f32;
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::ThresholdOutOfRange(threshold));
            }
            if section.groups.is_empty() {
                return Err(ConfigError::EmptyGroup(section.name.clone()));
            }
            for group in &section.groups {
                group.build()?;
            }
        }
        Ok(())
    }

    /// Total height of the stacked sections
    pub fn content_height(&self) -> f32 {
        self.sections.iter().map(|section| section.height).sum()
    }

    pub fn section(&self, name: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|section| section.name == name)
    }
}

//! Stagger groups
//!
//! A stagger group is an ordered batch of items revealed together. Item `k`
//! of a group starts its entrance `k * stagger_ms` after the group starts,
//! unless the item carries its own start delay.

use crate::easing::Easing;
use crate::properties::VisualProperties;
use folio_core::{ConfigError, Result};
use smallvec::SmallVec;

/// One item of a stagger group
#[derive(Clone, Debug, PartialEq)]
pub struct StaggerItem {
    /// Properties while the group is hidden
    pub hidden: VisualProperties,
    /// Properties once the group is revealed
    pub visible: VisualProperties,
    /// Transition length in milliseconds
    pub duration_ms: u32,
    /// Transition curve
    pub easing: Easing,
    /// Entrance delay (ms), replacing the item's stagger slot
    pub delay_ms: Option<u32>,
}

impl StaggerItem {
    pub fn new(hidden: VisualProperties, visible: VisualProperties, duration_ms: u32) -> Self {
        Self {
            hidden,
            visible,
            duration_ms,
            easing: Easing::EaseOut,
            delay_ms: None,
        }
    }

    /// Builder: set easing
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Builder: start `delay_ms` after the group instead of on the stagger slot
    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}

/// An ordered, validated batch of items
#[derive(Clone, Debug, PartialEq)]
pub struct StaggerGroup {
    name: String,
    items: SmallVec<[StaggerItem; 4]>,
    stagger_ms: u32,
}

impl StaggerGroup {
    pub fn builder(name: impl Into<String>) -> StaggerGroupBuilder {
        StaggerGroupBuilder {
            name: name.into(),
            items: SmallVec::new(),
            stagger_ms: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[StaggerItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Delay between consecutive item starts (ms)
    pub fn stagger_ms(&self) -> u32 {
        self.stagger_ms
    }

    /// Entrance delay for the item at `index`
    pub fn delay_for_index(&self, index: usize) -> u32 {
        self.items
            .get(index)
            .and_then(|item| item.delay_ms)
            .unwrap_or_else(|| self.stagger_ms.saturating_mul(index as u32))
    }

    /// Time from group start until the last item settles when revealing
    pub fn span_ms(&self) -> u32 {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| self.delay_for_index(i) + item.duration_ms)
            .max()
            .unwrap_or(0)
    }
}

/// Builder for [`StaggerGroup`]
pub struct StaggerGroupBuilder {
    name: String,
    items: SmallVec<[StaggerItem; 4]>,
    stagger_ms: u32,
}

impl StaggerGroupBuilder {
    /// Delay between each item's entrance (ms)
    pub fn stagger(mut self, stagger_ms: u32) -> Self {
        self.stagger_ms = stagger_ms;
        self
    }

    /// Append an item
    pub fn item(mut self, item: StaggerItem) -> Self {
        self.items.push(item);
        self
    }

    /// Append several items in order
    pub fn items(mut self, items: impl IntoIterator<Item = StaggerItem>) -> Self {
        self.items.extend(items);
        self
    }

    /// Validate and build the group
    pub fn build(self) -> Result<StaggerGroup> {
        if self.items.is_empty() {
            return Err(ConfigError::EmptyGroup(self.name));
        }
        if let Some(index) = self.items.iter().position(|item| item.duration_ms == 0) {
            return Err(ConfigError::NonPositiveDuration { index });
        }

        Ok(StaggerGroup {
            name: self.name,
            items: self.items,
            stagger_ms: self.stagger_ms,
        })
    }
}

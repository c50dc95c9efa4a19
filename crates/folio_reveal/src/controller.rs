//! Section reveal controller
//!
//! Binds one visibility subscription to a set of stagger groups. The section
//! starts [`RevealState::Hidden`]; each change in visibility moves it through
//! the [`StateTransitions`] machine and replays every group toward the new
//! state. Observations that repeat the current state are ignored.
//!
//! ```text
//! Hidden --(ratio >= t)--> Visible --(ratio < t)--> Hidden
//! ```
//!
//! Groups registered with [`RevealTrigger::Mount`] are the exception: they
//! play toward Visible once when the controller mounts and ignore every later
//! transition.

use crate::document::{Document, RegionId, Subscription, VisibilityEvent};
use crate::observer::{ViewportThreshold, VisibilityObserver};
use folio_animation::{
    AnimationHandle, AnimationTimeline, GroupPlayback, SharedPlayback, StaggerGroup,
    VisualProperties,
};
use folio_core::{ConfigError, Result, RevealState, StateTransitions};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

/// When a group plays
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealTrigger {
    /// Replay on every visibility transition of the section
    #[default]
    View,
    /// Play once toward Visible when the section mounts
    Mount,
}

impl RevealTrigger {
    pub fn is_view(&self) -> bool {
        *self == RevealTrigger::View
    }
}

/// Everything a section needs to reveal its content
#[derive(Clone, Debug)]
pub struct SectionConfig {
    name: String,
    region: RegionId,
    threshold: ViewportThreshold,
    groups: Vec<StaggerGroup>,
    triggers: Vec<RevealTrigger>,
}

impl SectionConfig {
    pub fn builder(name: impl Into<String>, region: RegionId) -> SectionConfigBuilder {
        SectionConfigBuilder {
            name: name.into(),
            region,
            threshold: ViewportThreshold::SECTION.value(),
            groups: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn threshold(&self) -> ViewportThreshold {
        self.threshold
    }

    pub fn groups(&self) -> &[StaggerGroup] {
        &self.groups
    }

    pub fn trigger(&self, index: usize) -> Option<RevealTrigger> {
        self.triggers.get(index).copied()
    }
}

/// Builder for [`SectionConfig`]
#[derive(Debug)]
pub struct SectionConfigBuilder {
    name: String,
    region: RegionId,
    threshold: f32,
    groups: Vec<StaggerGroup>,
    triggers: Vec<RevealTrigger>,
}

impl SectionConfigBuilder {
    /// Visible area ratio required before the section reveals (default 0.3)
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Add a group replayed on every visibility transition
    pub fn group(self, group: StaggerGroup) -> Self {
        self.group_with(group, RevealTrigger::View)
    }

    pub fn group_with(mut self, group: StaggerGroup, trigger: RevealTrigger) -> Self {
        self.groups.push(group);
        self.triggers.push(trigger);
        self
    }

    pub fn groups(self, groups: impl IntoIterator<Item = StaggerGroup>) -> Self {
        groups.into_iter().fold(self, Self::group)
    }

    pub fn build(self) -> Result<SectionConfig> {
        let threshold = ViewportThreshold::new(self.threshold)?;
        if self.groups.is_empty() {
            return Err(ConfigError::EmptyGroup(self.name));
        }
        Ok(SectionConfig {
            name: self.name,
            region: self.region,
            threshold,
            groups: self.groups,
            triggers: self.triggers,
        })
    }
}

struct SectionInner {
    name: String,
    state: RevealState,
    playbacks: SmallVec<[SharedPlayback; 2]>,
    triggers: SmallVec<[RevealTrigger; 2]>,
    /// One slot per group
    handles: SmallVec<[Option<AnimationHandle>; 2]>,
    plays: usize,
    mounted: bool,
    timeline: AnimationTimeline,
}

impl SectionInner {
    fn on_visibility(&mut self, event: VisibilityEvent) {
        match event {
            VisibilityEvent::Intersecting(visible) => {
                let Some(next) = self.state.on_event(RevealState::event_for(visible)) else {
                    return;
                };
                tracing::debug!(section = %self.name, from = %self.state, to = %next, "section transition");
                self.state = next;
                self.plays += 1;

                // play() cancels each group's previous run before starting the
                // next, so the replaced handles have nothing left to release.
                let groups = self.playbacks.iter().zip(&self.triggers);
                for ((playback, trigger), handle) in groups.zip(self.handles.iter_mut()) {
                    if trigger.is_view() {
                        *handle = Some(self.timeline.play(playback, next));
                    }
                }
            }
            VisibilityEvent::Terminated => {
                tracing::debug!(section = %self.name, "region unmounted, cancelling reveal");
                self.handles.iter_mut().for_each(|handle| *handle = None);
                self.mounted = false;
            }
        }
    }
}

/// Drives the reveal of one content section
pub struct SectionRevealController {
    inner: Rc<RefCell<SectionInner>>,
    subscription: Option<Subscription>,
    region: RegionId,
}

impl SectionRevealController {
    /// Attach to `document` and start observing the configured region.
    ///
    /// Mount-triggered groups start here. The first observation is also
    /// delivered during this call, so a section already in view starts its
    /// reveal immediately.
    pub fn mount(
        config: SectionConfig,
        document: &Document,
        timeline: &AnimationTimeline,
    ) -> Result<Self> {
        let SectionConfig {
            name,
            region,
            threshold,
            groups,
            triggers,
        } = config;

        if !document.is_mounted(region) {
            return Err(ConfigError::RegionNotMounted(name));
        }

        let playbacks: SmallVec<[SharedPlayback; 2]> =
            groups.into_iter().map(GroupPlayback::shared).collect();
        let handles = playbacks
            .iter()
            .zip(&triggers)
            .map(|(playback, trigger)| match trigger {
                RevealTrigger::Mount => Some(timeline.play(playback, RevealState::Visible)),
                RevealTrigger::View => None,
            })
            .collect();

        let inner = Rc::new(RefCell::new(SectionInner {
            name,
            state: RevealState::Hidden,
            playbacks,
            triggers: triggers.into_iter().collect(),
            handles,
            plays: 0,
            mounted: true,
            timeline: timeline.clone(),
        }));

        let weak = Rc::downgrade(&inner);
        let subscription = VisibilityObserver::observe(document, region, threshold, move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_visibility(event);
            }
        })?;

        Ok(Self {
            inner,
            subscription: Some(subscription),
            region,
        })
    }

    /// Stop observing and cancel every run in flight. Groups keep the values
    /// they had reached.
    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        let handles = {
            let mut inner = self.inner.borrow_mut();
            inner.mounted = false;
            inner
                .handles
                .iter_mut()
                .filter_map(Option::take)
                .collect::<SmallVec<[AnimationHandle; 2]>>()
        };
        drop(handles);
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn state(&self) -> RevealState {
        self.inner.borrow().state
    }

    /// Class applied to the section content ("hidden" / "visible")
    pub fn class_name(&self) -> &'static str {
        self.state().class_name()
    }

    /// Number of visibility transitions the section went through
    pub fn play_count(&self) -> usize {
        self.inner.borrow().plays
    }

    /// Whether the controller still observes its region
    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().mounted
    }

    /// Whether any group is mid-run
    pub fn is_animating(&self) -> bool {
        self.inner
            .borrow()
            .playbacks
            .iter()
            .any(|playback| playback.borrow().is_running())
    }

    pub fn group_count(&self) -> usize {
        self.inner.borrow().playbacks.len()
    }

    pub fn group_names(&self) -> Vec<String> {
        self.inner
            .borrow()
            .playbacks
            .iter()
            .map(|playback| playback.borrow().group().name().to_string())
            .collect()
    }

    /// Current item properties of group `index`
    pub fn group_properties(&self, index: usize) -> Option<Vec<VisualProperties>> {
        let inner = self.inner.borrow();
        let playback = inner.playbacks.get(index)?;
        let current = playback.borrow().current().to_vec();
        Some(current)
    }

    /// Shared playback of group `index`, for inspecting the latest run
    pub fn playback(&self, index: usize) -> Option<SharedPlayback> {
        self.inner.borrow().playbacks.get(index).cloned()
    }
}

impl Drop for SectionRevealController {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for SectionRevealController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SectionRevealController")
            .field("name", &inner.name)
            .field("state", &inner.state)
            .field("plays", &inner.plays)
            .field("mounted", &inner.mounted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::{AnimationPreset, RevealPreset};
    use folio_core::{FrameClock, Rect, Size};

    fn setup() -> (Document, AnimationTimeline, RegionId) {
        let doc = Document::new(Size::new(800.0, 600.0));
        doc.set_content_height(3000.0);
        let region = doc.mount_region(Rect::new(0.0, 1000.0, 800.0, 400.0));
        (doc, AnimationTimeline::new(FrameClock::new()), region)
    }

    fn about(region: RegionId) -> SectionConfig {
        SectionConfig::builder("about", region)
            .group(AnimationPreset::uniform("items", RevealPreset::FadeUp, 3, 200, 600).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_validation() {
        let (_doc, _timeline, region) = setup();
        let group = AnimationPreset::uniform("items", RevealPreset::Fade, 1, 0, 300).unwrap();

        let err = SectionConfig::builder("about", region)
            .threshold(1.2)
            .group(group)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ThresholdOutOfRange(1.2));

        let err = SectionConfig::builder("about", region).build().unwrap_err();
        assert_eq!(err, ConfigError::EmptyGroup("about".to_string()));
    }

    #[test]
    fn test_starts_hidden_out_of_view() {
        let (doc, timeline, region) = setup();
        let section = SectionRevealController::mount(about(region), &doc, &timeline).unwrap();

        assert_eq!(section.state(), RevealState::Hidden);
        assert_eq!(section.class_name(), "hidden");
        assert_eq!(section.play_count(), 0);
        assert_eq!(timeline.clock().pending(), 0);
    }

    #[test]
    fn test_reveals_on_enter() {
        let (doc, timeline, region) = setup();
        let section = SectionRevealController::mount(about(region), &doc, &timeline).unwrap();

        // 200 of 400px visible
        doc.set_scroll_offset(600.0);
        assert_eq!(section.state(), RevealState::Visible);
        assert_eq!(section.play_count(), 1);
        assert!(section.is_animating());

        for _ in 0..70 {
            timeline.clock().tick(16.0);
        }
        assert!(!section.is_animating());
        let items = section.group_properties(0).unwrap();
        assert!(items.iter().all(|item| *item == VisualProperties::REST));
    }

    #[test]
    fn test_repeated_observation_plays_once() {
        let (doc, timeline, region) = setup();
        let section = SectionRevealController::mount(about(region), &doc, &timeline).unwrap();

        doc.set_scroll_offset(700.0);
        doc.set_scroll_offset(750.0);
        doc.set_scroll_offset(800.0);
        assert_eq!(section.play_count(), 1);

        doc.set_scroll_offset(0.0);
        assert_eq!(section.state(), RevealState::Hidden);
        assert_eq!(section.play_count(), 2);
    }

    #[test]
    fn test_mount_in_view_reveals_immediately() {
        let (doc, timeline, region) = setup();
        doc.set_scroll_offset(900.0);

        let section = SectionRevealController::mount(about(region), &doc, &timeline).unwrap();
        assert_eq!(section.state(), RevealState::Visible);
        assert_eq!(section.play_count(), 1);
    }

    #[test]
    fn test_unmount_cancels_runs() {
        let (doc, timeline, region) = setup();
        let mut section = SectionRevealController::mount(about(region), &doc, &timeline).unwrap();

        doc.set_scroll_offset(900.0);
        timeline.clock().tick(16.0);
        assert_eq!(timeline.clock().pending(), 1);

        section.unmount();
        assert_eq!(timeline.clock().pending(), 0);
        assert_eq!(doc.listener_count(), 0);
        assert!(!section.is_mounted());

        doc.set_scroll_offset(0.0);
        assert_eq!(section.play_count(), 1);
    }

    #[test]
    fn test_region_loss_terminates() {
        let (doc, timeline, region) = setup();
        let section = SectionRevealController::mount(about(region), &doc, &timeline).unwrap();

        doc.set_scroll_offset(900.0);
        assert_eq!(timeline.clock().pending(), 1);

        doc.unmount_region(region);
        assert!(!section.is_mounted());
        assert_eq!(timeline.clock().pending(), 0);
        assert!(!section.is_animating());
    }

    #[test]
    fn test_mount_group_plays_once() {
        let (doc, timeline, region) = setup();
        let config = SectionConfig::builder("skills", region)
            .group(AnimationPreset::uniform("cards", RevealPreset::FadeUp, 2, 100, 500).unwrap())
            .group_with(
                AnimationPreset::bars("levels", &[90.0, 70.0], 200, 1000).unwrap(),
                RevealTrigger::Mount,
            )
            .build()
            .unwrap();
        assert_eq!(config.trigger(1), Some(RevealTrigger::Mount));

        let section = SectionRevealController::mount(config, &doc, &timeline).unwrap();
        assert_eq!(section.state(), RevealState::Hidden);
        assert!(section.playback(1).unwrap().borrow().is_running());
        assert!(!section.playback(0).unwrap().borrow().is_running());

        for _ in 0..80 {
            timeline.clock().tick(16.0);
        }
        for offset in [900.0, 0.0, 900.0, 0.0] {
            doc.set_scroll_offset(offset);
        }
        for _ in 0..80 {
            timeline.clock().tick(16.0);
        }

        assert_eq!(section.play_count(), 4);
        assert_eq!(section.playback(0).unwrap().borrow().runs_started(), 4);
        let levels = section.playback(1).unwrap();
        assert_eq!(levels.borrow().runs_started(), 1);
        let widths: Vec<f32> = section
            .group_properties(1)
            .unwrap()
            .iter()
            .map(|item| item.width)
            .collect();
        assert_eq!(widths, vec![90.0, 70.0]);
    }

    #[test]
    fn test_unmount_cancels_mount_groups() {
        let (doc, timeline, region) = setup();
        let mut section = SectionRevealController::mount(
            SectionConfig::builder("hero", region)
                .group_with(
                    AnimationPreset::uniform("intro", RevealPreset::Fade, 2, 300, 800).unwrap(),
                    RevealTrigger::Mount,
                )
                .build()
                .unwrap(),
            &doc,
            &timeline,
        )
        .unwrap();
        assert_eq!(timeline.clock().pending(), 1);

        section.unmount();
        assert_eq!(timeline.clock().pending(), 0);
    }

    #[test]
    fn test_mount_on_missing_region() {
        let (doc, timeline, region) = setup();
        doc.unmount_region(region);

        let err = SectionRevealController::mount(about(region), &doc, &timeline).unwrap_err();
        assert_eq!(err, ConfigError::RegionNotMounted("about".to_string()));
    }
}

//! Scroll-to-top affordance
//!
//! A floating control offered once the document has scrolled past a pixel
//! threshold. Showing plays the control's enter animation; hiding plays the
//! exit animation and the control stays rendered until the exit finishes.
//! Activating it smooth-scrolls the document back to the top.

use crate::document::{Document, Subscription};
use folio_animation::{
    AnimationHandle, AnimationPreset, AnimationTimeline, Easing, GroupPlayback, SharedPlayback,
    VisualProperties,
};
use folio_core::{ConfigError, FrameCallbackId, Result, RevealState};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

fn default_threshold() -> f32 {
    500.0
}

fn default_transition_ms() -> u32 {
    300
}

fn default_scroll_duration_ms() -> u32 {
    600
}

fn default_scroll_easing() -> Easing {
    Easing::EaseInOut
}

/// Scroll-to-top configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollTopConfig {
    /// Offset (px) the document must exceed before the control shows
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Enter / exit animation duration (ms)
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u32,

    /// Smooth scroll duration (ms). Zero jumps straight to the top.
    #[serde(default = "default_scroll_duration_ms")]
    pub scroll_duration_ms: u32,

    #[serde(default = "default_scroll_easing")]
    pub scroll_easing: Easing,
}

impl Default for ScrollTopConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            transition_ms: default_transition_ms(),
            scroll_duration_ms: default_scroll_duration_ms(),
            scroll_easing: default_scroll_easing(),
        }
    }
}

impl ScrollTopConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidScrollThreshold(self.threshold));
        }
        if self.transition_ms == 0 {
            return Err(ConfigError::NonPositiveDuration { index: 0 });
        }
        Ok(())
    }
}

struct AffordanceInner {
    threshold: f32,
    shown: bool,
    toggles: usize,
    playback: SharedPlayback,
    presence: Option<AnimationHandle>,
    timeline: AnimationTimeline,
}

impl AffordanceInner {
    fn on_scroll(&mut self, offset: f32) {
        let shown = offset > self.threshold;
        if shown == self.shown {
            return;
        }
        self.shown = shown;
        self.toggles += 1;
        tracing::debug!(offset, shown, "scroll-top toggled");
        self.presence = Some(
            self.timeline
                .play(&self.playback, RevealState::from_visible(shown)),
        );
    }
}

/// Floating "back to top" control bound to the document scroll offset
pub struct ScrollTopAffordance {
    inner: Rc<RefCell<AffordanceInner>>,
    config: ScrollTopConfig,
    document: Document,
    subscription: Option<Subscription>,
    tween: Option<FrameCallbackId>,
}

impl ScrollTopAffordance {
    pub fn mount(
        config: ScrollTopConfig,
        document: &Document,
        timeline: &AnimationTimeline,
    ) -> Result<Self> {
        config.validate()?;
        let group = AnimationPreset::floating_control(config.transition_ms)?;

        let inner = Rc::new(RefCell::new(AffordanceInner {
            threshold: config.threshold,
            shown: false,
            toggles: 0,
            playback: GroupPlayback::shared(group),
            presence: None,
            timeline: timeline.clone(),
        }));

        let weak = Rc::downgrade(&inner);
        let id = document.on_scroll(move |offset| {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().on_scroll(offset);
            }
        });

        Ok(Self {
            inner,
            config,
            document: document.clone(),
            subscription: Some(Subscription::new(document.clone(), id)),
            tween: None,
        })
    }

    pub fn config(&self) -> &ScrollTopConfig {
        &self.config
    }

    /// Whether the scroll offset is past the threshold
    pub fn is_shown(&self) -> bool {
        self.inner.borrow().shown
    }

    /// Whether the control is on screen, including while it animates out
    pub fn is_rendered(&self) -> bool {
        let inner = self.inner.borrow();
        let exiting = inner.playback.borrow().is_running();
        inner.shown || exiting
    }

    /// Number of show/hide changes so far
    pub fn toggle_count(&self) -> usize {
        self.inner.borrow().toggles
    }

    /// Current properties of the control
    pub fn properties(&self) -> VisualProperties {
        let inner = self.inner.borrow();
        let playback = inner.playback.borrow();
        playback
            .current()
            .first()
            .copied()
            .unwrap_or(VisualProperties::REST)
    }

    /// Whether a smooth scroll started by [`activate`](Self::activate) is running
    pub fn is_scrolling(&self) -> bool {
        let clock = self.inner.borrow().timeline.clock().clone();
        self.tween.is_some_and(|id| clock.is_pending(id))
    }

    /// Smooth-scroll the document to the top.
    ///
    /// Fire and forget: a second activation restarts the scroll from the
    /// current offset.
    pub fn activate(&mut self) {
        let clock = self.inner.borrow().timeline.clock().clone();
        if let Some(id) = self.tween.take() {
            clock.cancel(id);
        }

        let start = self.document.scroll_offset();
        if start <= 0.0 {
            return;
        }
        if self.config.scroll_duration_ms == 0 {
            self.document.set_scroll_offset(0.0);
            return;
        }

        tracing::debug!(from = start, "scroll to top");
        let document = self.document.clone();
        let duration = self.config.scroll_duration_ms as f32;
        let easing = self.config.scroll_easing;
        let mut elapsed = 0.0_f32;
        self.tween = Some(clock.request_frames(move |dt_ms| {
            elapsed += dt_ms;
            let t = (elapsed / duration).min(1.0);
            document.set_scroll_offset(start * (1.0 - easing.apply(t)));
            t < 1.0
        }));
    }

    /// Detach from the document and stop every animation the control owns
    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(id) = self.tween.take() {
            self.inner.borrow().timeline.clock().cancel(id);
        }
        let presence = self.inner.borrow_mut().presence.take();
        drop(presence);
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }
}

impl Drop for ScrollTopAffordance {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for ScrollTopAffordance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollTopAffordance")
            .field("threshold", &self.config.threshold)
            .field("shown", &self.is_shown())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

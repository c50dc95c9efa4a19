//! Loading splash
//!
//! Covers the page for a fixed time while content loads. The splash scales in
//! when it starts, and when loading ends it scales up and fades out while the
//! page content mounts underneath.

use folio_animation::{
    AnimationHandle, AnimationPreset, AnimationTimeline, GroupPlayback, SharedPlayback,
    StaggerGroup, StaggerItem, VisualProperties,
};
use folio_core::{FrameCallbackId, Result, RevealState};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

fn default_enabled() -> bool {
    true
}

fn default_duration_ms() -> u32 {
    2000
}

fn default_transition_ms() -> u32 {
    500
}

/// Splash timing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How long the page counts as loading (ms)
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u32,

    /// Enter and exit animation duration (ms)
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            duration_ms: default_duration_ms(),
            transition_ms: default_transition_ms(),
        }
    }
}

impl LoaderConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Where the splash is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplashPhase {
    Loading,
    /// Loading ended; the exit animation is running
    Exiting,
    Done,
}

impl fmt::Display for SplashPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SplashPhase::Loading => "loading",
            SplashPhase::Exiting => "exiting",
            SplashPhase::Done => "done",
        })
    }
}

struct SplashInner {
    phase: SplashPhase,
    elapsed_ms: f32,
    duration_ms: f32,
    enter: SharedPlayback,
    exit: SharedPlayback,
    presence: Option<AnimationHandle>,
    timeline: AnimationTimeline,
}

impl SplashInner {
    /// Advance the loading timer. Returns whether the splash still needs frames.
    fn advance(&mut self, dt_ms: f32) -> bool {
        self.elapsed_ms += dt_ms;
        match self.phase {
            SplashPhase::Loading if self.elapsed_ms >= self.duration_ms => {
                tracing::debug!(elapsed_ms = self.elapsed_ms, "loading finished");
                self.phase = SplashPhase::Exiting;
                self.presence = Some(self.timeline.play(&self.exit, RevealState::Hidden));
                true
            }
            SplashPhase::Loading => true,
            SplashPhase::Exiting => {
                if self.exit.borrow().is_settled_at(RevealState::Hidden) {
                    self.phase = SplashPhase::Done;
                    self.presence = None;
                    false
                } else {
                    true
                }
            }
            SplashPhase::Done => false,
        }
    }
}

fn exit_group(transition_ms: u32) -> Result<StaggerGroup> {
    StaggerGroup::builder("splash-exit")
        .item(StaggerItem::new(
            VisualProperties::opacity(0.0).with_scale(1.2),
            VisualProperties::REST,
            transition_ms,
        ))
        .build()
}

/// Loading splash driven by the frame clock
pub struct Splash {
    inner: Rc<RefCell<SplashInner>>,
    timer: Option<FrameCallbackId>,
    timeline: AnimationTimeline,
}

impl Splash {
    /// Show the splash and start the loading timer
    pub fn start(config: &LoaderConfig, timeline: &AnimationTimeline) -> Result<Self> {
        // A disabled splash never plays, so its timing is not checked
        let transition_ms = if config.enabled {
            config.transition_ms
        } else {
            config.transition_ms.max(1)
        };
        let enter = StaggerGroup::builder("splash")
            .item(AnimationPreset::scale_in(0.8, transition_ms))
            .build()?;
        let enter = GroupPlayback::shared(enter);
        let exit = Rc::new(RefCell::new(GroupPlayback::resting(
            exit_group(transition_ms)?,
            RevealState::Visible,
        )));

        let phase = if config.enabled {
            SplashPhase::Loading
        } else {
            SplashPhase::Done
        };
        let presence = config
            .enabled
            .then(|| timeline.play(&enter, RevealState::Visible));

        let inner = Rc::new(RefCell::new(SplashInner {
            phase,
            elapsed_ms: 0.0,
            duration_ms: config.duration_ms as f32,
            enter,
            exit,
            presence,
            timeline: timeline.clone(),
        }));

        let timer = config.enabled.then(|| {
            let weak = Rc::downgrade(&inner);
            timeline.clock().request_frames(move |dt_ms| match weak.upgrade() {
                Some(inner) => inner.borrow_mut().advance(dt_ms),
                None => false,
            })
        });

        Ok(Self {
            inner,
            timer,
            timeline: timeline.clone(),
        })
    }

    pub fn phase(&self) -> SplashPhase {
        self.inner.borrow().phase
    }

    /// Whether the page is still loading
    pub fn is_loading(&self) -> bool {
        self.phase() == SplashPhase::Loading
    }

    pub fn is_done(&self) -> bool {
        self.phase() == SplashPhase::Done
    }

    /// Current splash properties, or `None` once it has left the screen
    pub fn properties(&self) -> Option<VisualProperties> {
        let inner = self.inner.borrow();
        let playback = match inner.phase {
            SplashPhase::Loading => &inner.enter,
            SplashPhase::Exiting => &inner.exit,
            SplashPhase::Done => return None,
        };
        let current = playback.borrow().current().first().copied();
        current
    }

    /// Stop the timer and any splash animation
    pub fn cancel(&mut self) {
        if let Some(id) = self.timer.take() {
            self.timeline.clock().cancel(id);
        }
        let presence = self.inner.borrow_mut().presence.take();
        drop(presence);
    }
}

impl Drop for Splash {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Splash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Splash").field("phase", &self.phase()).finish()
    }
}

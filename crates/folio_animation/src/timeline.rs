//! Timeline playback for stagger groups
//!
//! [`AnimationTimeline::play`] drives a group's items toward the property set
//! of a [`RevealState`]:
//!
//! - **Visible**: item `k` starts `k * stagger` after the run begins, or after
//!   its own delay when it has one
//! - **Hidden**: every item starts immediately; exits are not staggered
//!
//! Every run starts from the values the items currently show, so replaying a
//! group mid-flight never jumps. Items still waiting on their stagger delay
//! hold their current value until their track begins.
//!
//! Runs advance on the shared [`FrameClock`]. The returned [`AnimationHandle`]
//! owns the run's frame callback and releases it when cancelled or dropped.

use crate::easing::Easing;
use crate::properties::VisualProperties;
use crate::stagger::StaggerGroup;
use folio_core::{FrameCallbackId, FrameClock, RevealState};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Interpolation of one item within a run
#[derive(Clone, Debug)]
struct Track {
    from: VisualProperties,
    to: VisualProperties,
    delay_ms: f32,
    duration_ms: f32,
    easing: Easing,
}

impl Track {
    fn sample(&self, elapsed_ms: f32) -> VisualProperties {
        let local = elapsed_ms - self.delay_ms;
        if local <= 0.0 {
            return self.from;
        }
        if local >= self.duration_ms {
            return self.to;
        }
        let eased = self.easing.apply(local / self.duration_ms);
        self.from.lerp(&self.to, eased)
    }

    fn end_ms(&self) -> f32 {
        self.delay_ms + self.duration_ms
    }
}

/// Playback state of one stagger group
#[derive(Debug)]
pub struct GroupPlayback {
    group: StaggerGroup,
    current: SmallVec<[VisualProperties; 4]>,
    target: RevealState,
    tracks: Vec<Track>,
    elapsed_ms: f32,
    running: bool,
    active: Option<FrameCallbackId>,
    runs_started: usize,
}

/// Shared playback, owned by a controller and advanced by the frame clock
pub type SharedPlayback = Rc<RefCell<GroupPlayback>>;

impl GroupPlayback {
    /// A playback resting in the hidden state
    pub fn new(group: StaggerGroup) -> Self {
        Self::resting(group, RevealState::Hidden)
    }

    /// A playback resting at the property set of `state`
    pub fn resting(group: StaggerGroup, state: RevealState) -> Self {
        let current = group
            .items()
            .iter()
            .map(|item| match state {
                RevealState::Visible => item.visible,
                RevealState::Hidden => item.hidden,
            })
            .collect();
        Self {
            group,
            current,
            target: state,
            tracks: Vec::new(),
            elapsed_ms: 0.0,
            running: false,
            active: None,
            runs_started: 0,
        }
    }

    /// Wrap in the shared form used by [`AnimationTimeline::play`]
    pub fn shared(group: StaggerGroup) -> SharedPlayback {
        Rc::new(RefCell::new(Self::new(group)))
    }

    pub fn group(&self) -> &StaggerGroup {
        &self.group
    }

    /// Current interpolated properties, one per item
    pub fn current(&self) -> &[VisualProperties] {
        &self.current
    }

    /// State the latest run is heading toward
    pub fn target(&self) -> RevealState {
        self.target
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time into the current run (ms)
    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Number of runs started over the playback's lifetime
    pub fn runs_started(&self) -> usize {
        self.runs_started
    }

    /// Start offset of each item in the latest run (ms)
    pub fn start_offsets(&self) -> Vec<f32> {
        self.tracks.iter().map(|track| track.delay_ms).collect()
    }

    /// Values each item started the latest run from
    pub fn run_origin(&self) -> Vec<VisualProperties> {
        self.tracks.iter().map(|track| track.from).collect()
    }

    /// Length of the latest run (ms)
    pub fn run_span_ms(&self) -> f32 {
        self.tracks.iter().map(Track::end_ms).fold(0.0, f32::max)
    }

    /// Whether every item rests at the property set of `state`
    pub fn is_settled_at(&self, state: RevealState) -> bool {
        !self.running
            && self
                .group
                .items()
                .iter()
                .zip(&self.current)
                .all(|(item, current)| {
                    let goal = match state {
                        RevealState::Visible => &item.visible,
                        RevealState::Hidden => &item.hidden,
                    };
                    current.max_delta(goal) < 1e-4
                })
    }

    /// Begin a new run toward `target` from the current values
    fn retarget(&mut self, target: RevealState) {
        let staggered = target.is_visible();
        self.tracks = self
            .group
            .items()
            .iter()
            .zip(&self.current)
            .enumerate()
            .map(|(index, (item, current))| Track {
                from: *current,
                to: match target {
                    RevealState::Visible => item.visible,
                    RevealState::Hidden => item.hidden,
                },
                delay_ms: if staggered {
                    self.group.delay_for_index(index) as f32
                } else {
                    0.0
                },
                duration_ms: item.duration_ms as f32,
                easing: item.easing,
            })
            .collect();
        self.target = target;
        self.elapsed_ms = 0.0;
        self.running = true;
        self.runs_started += 1;
    }

    /// Advance the current run. Returns whether it is still in flight.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        if !self.running {
            return false;
        }

        self.elapsed_ms += dt_ms;
        for (current, track) in self.current.iter_mut().zip(&self.tracks) {
            *current = track.sample(self.elapsed_ms);
        }

        if self.elapsed_ms >= self.run_span_ms() {
            self.running = false;
            self.active = None;
            tracing::trace!(group = self.group.name(), target = %self.target, "run settled");
        }
        self.running
    }

    /// Freeze at the current values
    fn halt(&mut self) {
        self.running = false;
        self.active = None;
    }
}

/// Plays stagger groups on a frame clock
#[derive(Clone, Debug)]
pub struct AnimationTimeline {
    clock: FrameClock,
}

impl AnimationTimeline {
    pub fn new(clock: FrameClock) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Animate `playback` toward `target`.
    ///
    /// Any run already in flight for this playback is cancelled first and the
    /// new run starts from its interpolated values.
    pub fn play(&self, playback: &SharedPlayback, target: RevealState) -> AnimationHandle {
        let previous = playback.borrow_mut().active.take();
        if let Some(id) = previous {
            self.clock.cancel(id);
        }

        playback.borrow_mut().retarget(target);

        let weak = Rc::downgrade(playback);
        let id = self.clock.request_frames(move |dt_ms| match weak.upgrade() {
            Some(playback) => playback.borrow_mut().advance(dt_ms),
            None => false,
        });

        let mut state = playback.borrow_mut();
        state.active = Some(id);
        tracing::debug!(
            group = state.group.name(),
            %target,
            interrupted = previous.is_some(),
            "timeline play"
        );

        AnimationHandle {
            clock: self.clock.clone(),
            playback: Rc::downgrade(playback),
            id,
        }
    }
}

/// Ownership of one timeline run.
///
/// Cancelling or dropping the handle releases the run's frame callback and
/// freezes the group at its current values.
#[must_use = "dropping the handle cancels the animation"]
pub struct AnimationHandle {
    clock: FrameClock,
    playback: Weak<RefCell<GroupPlayback>>,
    id: FrameCallbackId,
}

impl AnimationHandle {
    pub fn id(&self) -> FrameCallbackId {
        self.id
    }

    /// Whether the run still has frames pending
    pub fn is_active(&self) -> bool {
        self.clock.is_pending(self.id)
    }

    /// Stop the run now
    pub fn cancel(self) {
        // Drop does the work
    }

    fn release(&mut self) {
        if !self.clock.cancel(self.id) {
            return;
        }
        if let Some(playback) = self.playback.upgrade() {
            if let Ok(mut playback) = playback.try_borrow_mut() {
                if playback.active == Some(self.id) {
                    playback.halt();
                }
            }
        }
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stagger::StaggerItem;

    fn fade_up_group(count: usize, stagger_ms: u32, duration_ms: u32) -> StaggerGroup {
        StaggerGroup::builder("test")
            .stagger(stagger_ms)
            .items((0..count).map(|_| {
                StaggerItem::new(
                    VisualProperties::opacity(0.0).with_translate(0.0, 20.0),
                    VisualProperties::REST,
                    duration_ms,
                )
                .with_easing(Easing::Linear)
            }))
            .build()
            .unwrap()
    }

    fn run(clock: &FrameClock, frames: usize, dt_ms: f32) {
        for _ in 0..frames {
            clock.tick(dt_ms);
        }
    }

    #[test]
    fn test_starts_hidden() {
        let playback = GroupPlayback::new(fade_up_group(2, 100, 300));
        assert!(playback.is_settled_at(RevealState::Hidden));
        assert_eq!(playback.current()[0].opacity, 0.0);
        assert_eq!(playback.current()[1].translate_y, 20.0);
    }

    #[test]
    fn test_visible_run_staggers() {
        let clock = FrameClock::new();
        let timeline = AnimationTimeline::new(clock.clone());
        let playback = GroupPlayback::shared(fade_up_group(3, 200, 600));

        let _handle = timeline.play(&playback, RevealState::Visible);
        assert_eq!(playback.borrow().start_offsets(), vec![0.0, 200.0, 400.0]);

        // 300ms in: item 0 halfway, item 1 a sixth, item 2 untouched
        run(&clock, 3, 100.0);
        let state = playback.borrow();
        assert!((state.current()[0].opacity - 0.5).abs() < 1e-5);
        assert!((state.current()[1].opacity - 1.0 / 6.0).abs() < 1e-5);
        assert_eq!(state.current()[2].opacity, 0.0);
    }

    #[test]
    fn test_visible_run_settles_after_span() {
        let clock = FrameClock::new();
        let timeline = AnimationTimeline::new(clock.clone());
        let playback = GroupPlayback::shared(fade_up_group(3, 200, 600));

        let handle = timeline.play(&playback, RevealState::Visible);
        assert_eq!(playback.borrow().run_span_ms(), 1000.0);

        run(&clock, 9, 100.0);
        assert!(playback.borrow().is_running());
        assert!(handle.is_active());

        clock.tick(100.0);
        assert!(playback.borrow().is_settled_at(RevealState::Visible));
        assert!(!handle.is_active());
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_hidden_run_is_not_staggered() {
        let clock = FrameClock::new();
        let timeline = AnimationTimeline::new(clock.clone());
        let playback = GroupPlayback::shared(fade_up_group(3, 200, 600));

        let _show = timeline.play(&playback, RevealState::Visible);
        run(&clock, 10, 100.0);

        let _hide = timeline.play(&playback, RevealState::Hidden);
        assert_eq!(playback.borrow().start_offsets(), vec![0.0, 0.0, 0.0]);
        assert_eq!(playback.borrow().run_span_ms(), 600.0);

        run(&clock, 6, 100.0);
        assert!(playback.borrow().is_settled_at(RevealState::Hidden));
    }

    #[test]
    fn test_replay_starts_from_interpolated_values() {
        let clock = FrameClock::new();
        let timeline = AnimationTimeline::new(clock.clone());
        let playback = GroupPlayback::shared(fade_up_group(3, 200, 600));

        let _show = timeline.play(&playback, RevealState::Visible);
        run(&clock, 5, 50.0);
        let before: Vec<VisualProperties> = playback.borrow().current().to_vec();

        let _hide = timeline.play(&playback, RevealState::Hidden);
        assert_eq!(playback.borrow().run_origin(), before);
        assert_eq!(playback.borrow().current(), before.as_slice());

        // The old run's callback is gone; only the new one remains
        assert_eq!(clock.pending(), 1);

        clock.tick(1.0);
        let after = playback.borrow();
        for (a, b) in before.iter().zip(after.current()) {
            assert!(a.max_delta(b) < 0.1);
        }
    }

    #[test]
    fn test_dropping_handle_cancels_run() {
        let clock = FrameClock::new();
        let timeline = AnimationTimeline::new(clock.clone());
        let playback = GroupPlayback::shared(fade_up_group(2, 100, 300));

        let handle = timeline.play(&playback, RevealState::Visible);
        clock.tick(150.0);
        let frozen: Vec<VisualProperties> = playback.borrow().current().to_vec();

        drop(handle);
        assert_eq!(clock.pending(), 0);
        assert!(!playback.borrow().is_running());

        clock.tick(150.0);
        assert_eq!(playback.borrow().current(), frozen.as_slice());
    }

    #[test]
    fn test_stale_handle_does_not_cancel_new_run() {
        let clock = FrameClock::new();
        let timeline = AnimationTimeline::new(clock.clone());
        let playback = GroupPlayback::shared(fade_up_group(2, 100, 300));

        let first = timeline.play(&playback, RevealState::Visible);
        let second = timeline.play(&playback, RevealState::Hidden);
        first.cancel();

        assert!(second.is_active());
        assert!(playback.borrow().is_running());
        assert_eq!(playback.borrow().runs_started(), 2);
    }

    #[test]
    fn test_dropped_playback_releases_callback() {
        let clock = FrameClock::new();
        let timeline = AnimationTimeline::new(clock.clone());
        let playback = GroupPlayback::shared(fade_up_group(1, 0, 300));

        let handle = timeline.play(&playback, RevealState::Visible);
        drop(playback);
        clock.tick(16.0);

        assert!(!handle.is_active());
    }
}

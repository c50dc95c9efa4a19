//! Frame clock
//!
//! The host's per-refresh-tick callback facility. Components request frames
//! while they have work to do and return `false` from their callback once
//! settled; the clock then releases the callback.
//!
//! Callbacks may register, cancel, or cancel themselves while a tick is in
//! progress. Callbacks registered during a tick first run on the next tick.

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

new_key_type! {
    /// Identifier for a registered frame callback
    pub struct FrameCallbackId;
}

/// Per-frame callback. Receives the frame delta in milliseconds and returns
/// whether it wants another frame.
pub type FrameCallback = Box<dyn FnMut(f32) -> bool>;

struct ClockInner {
    /// `None` while the callback is running
    callbacks: SlotMap<FrameCallbackId, Option<FrameCallback>>,
    frame_count: u64,
    elapsed_ms: f64,
    last_frame: Option<Instant>,
}

/// Shared handle to the frame clock
#[derive(Clone)]
pub struct FrameClock {
    inner: Rc<RefCell<ClockInner>>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ClockInner {
                callbacks: SlotMap::with_key(),
                frame_count: 0,
                elapsed_ms: 0.0,
                last_frame: None,
            })),
        }
    }

    /// Register a callback to run on every tick until it returns `false`
    pub fn request_frames<F>(&self, callback: F) -> FrameCallbackId
    where
        F: FnMut(f32) -> bool + 'static,
    {
        let id = self
            .inner
            .borrow_mut()
            .callbacks
            .insert(Some(Box::new(callback)));
        tracing::trace!(?id, "frame callback registered");
        id
    }

    /// Cancel a callback. Returns `false` if it had already finished or
    /// been cancelled.
    pub fn cancel(&self, id: FrameCallbackId) -> bool {
        // Drop the callback outside the borrow; its captures may talk to us.
        let removed = self.inner.borrow_mut().callbacks.remove(id);
        let cancelled = removed.is_some();
        if cancelled {
            tracing::trace!(?id, "frame callback cancelled");
        }
        drop(removed);
        cancelled
    }

    /// Whether a callback is still registered
    pub fn is_pending(&self, id: FrameCallbackId) -> bool {
        self.inner.borrow().callbacks.contains_key(id)
    }

    /// Number of registered callbacks
    pub fn pending(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    /// Number of ticks processed
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame_count
    }

    /// Total time advanced through `tick`, in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.inner.borrow().elapsed_ms
    }

    /// Advance all callbacks by `dt_ms` milliseconds. Negative or non-finite
    /// deltas are dropped without counting a frame.
    pub fn tick(&self, dt_ms: f32) {
        if !dt_ms.is_finite() || dt_ms < 0.0 {
            tracing::warn!(dt_ms, "ignoring invalid frame delta");
            return;
        }
        let ids: Vec<FrameCallbackId> = {
            let mut inner = self.inner.borrow_mut();
            inner.frame_count += 1;
            inner.elapsed_ms += dt_ms as f64;
            inner.callbacks.keys().collect()
        };

        for id in ids {
            let taken = self
                .inner
                .borrow_mut()
                .callbacks
                .get_mut(id)
                .and_then(Option::take);
            let Some(mut callback) = taken else {
                continue;
            };

            let wants_more = callback(dt_ms);

            let mut inner = self.inner.borrow_mut();
            if !wants_more {
                inner.callbacks.remove(id);
            } else if let Some(slot) = inner.callbacks.get_mut(id) {
                *slot = Some(callback);
            }
            // A missing slot means the callback cancelled itself; it is
            // dropped after the borrow is released.
        }
    }

    /// Advance using wall-clock time since the previous call
    pub fn tick_now(&self) {
        let now = Instant::now();
        let dt_ms = {
            let mut inner = self.inner.borrow_mut();
            let dt = inner
                .last_frame
                .map(|last| (now - last).as_secs_f32() * 1000.0)
                .unwrap_or(0.0);
            inner.last_frame = Some(now);
            dt
        };
        self.tick(dt_ms);
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FrameClock")
            .field("pending", &inner.callbacks.len())
            .field("frame_count", &inner.frame_count)
            .finish()
    }
}

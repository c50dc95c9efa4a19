//! Document layout host
//!
//! Holds the geometry the reveal components observe: the viewport size, the
//! document scroll offset and the bounds of every mounted region. Listeners
//! are notified after each scroll, resize or geometry change.
//!
//! Listeners may subscribe, unsubscribe or change the document from inside
//! a notification. Listeners added during a dispatch are not notified by it.

use folio_core::{event_types, Rect, Size};
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::Rc;

new_key_type! {
    /// Identifier for a mounted region
    pub struct RegionId;
    /// Identifier for a document listener
    pub struct ListenerId;
}

/// Signal delivered to visibility listeners
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityEvent {
    /// Whether the region meets its threshold after the latest change
    Intersecting(bool),
    /// The region was unmounted; no further events follow
    Terminated,
}

type VisibilitySink = Box<dyn FnMut(VisibilityEvent)>;
type ScrollSink = Box<dyn FnMut(f32)>;

enum Sink {
    Visibility {
        region: RegionId,
        threshold: f32,
        /// `None` while the sink is running
        callback: Option<VisibilitySink>,
    },
    Scroll {
        callback: Option<ScrollSink>,
    },
}

enum Delivery {
    Visibility(VisibilitySink, bool),
    Scroll(ScrollSink, f32),
}

struct DocumentInner {
    viewport: Size,
    scroll_offset: f32,
    content_height: f32,
    regions: SlotMap<RegionId, Rect>,
    listeners: SlotMap<ListenerId, Sink>,
    /// Running listeners whose region was unmounted under them
    terminating: Vec<ListenerId>,
}

impl DocumentInner {
    fn viewport_rect(&self) -> Rect {
        Rect::new(0.0, self.scroll_offset, self.viewport.width, self.viewport.height)
    }

    fn max_scroll_offset(&self) -> f32 {
        let extent = self
            .regions
            .values()
            .map(Rect::bottom)
            .fold(self.content_height, f32::max);
        (extent - self.viewport.height).max(0.0)
    }

    fn ratio(&self, region: RegionId) -> Option<f32> {
        let bounds = self.regions.get(region)?;
        Some(bounds.intersection_ratio(&self.viewport_rect()))
    }
}

/// Shared handle to the document
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Document {
    pub fn new(viewport: Size) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DocumentInner {
                viewport,
                scroll_offset: 0.0,
                content_height: 0.0,
                regions: SlotMap::with_key(),
                listeners: SlotMap::with_key(),
                terminating: Vec::new(),
            })),
        }
    }

    pub fn viewport(&self) -> Size {
        self.inner.borrow().viewport
    }

    /// The visible part of the document
    pub fn viewport_rect(&self) -> Rect {
        self.inner.borrow().viewport_rect()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.inner.borrow().scroll_offset
    }

    /// Furthest the document can scroll
    pub fn max_scroll_offset(&self) -> f32 {
        self.inner.borrow().max_scroll_offset()
    }

    /// Minimum document height, independent of mounted regions
    pub fn set_content_height(&self, height: f32) {
        self.inner.borrow_mut().content_height = height.max(0.0);
    }

    pub fn mount_region(&self, bounds: Rect) -> RegionId {
        let id = self.inner.borrow_mut().regions.insert(bounds);
        tracing::trace!(event = event_types::MOUNT, ?id, ?bounds, "region mounted");
        id
    }

    pub fn is_mounted(&self, region: RegionId) -> bool {
        self.inner.borrow().regions.contains_key(region)
    }

    pub fn region_bounds(&self, region: RegionId) -> Option<Rect> {
        self.inner.borrow().regions.get(region).copied()
    }

    pub fn region_count(&self) -> usize {
        self.inner.borrow().regions.len()
    }

    /// Fraction of the region currently inside the viewport
    pub fn intersection_ratio(&self, region: RegionId) -> Option<f32> {
        self.inner.borrow().ratio(region)
    }

    /// Move a region. Returns `false` if it is not mounted.
    pub fn set_region_bounds(&self, region: RegionId, bounds: Rect) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            match inner.regions.get_mut(region) {
                Some(slot) => *slot = bounds,
                None => return false,
            };
        }
        self.dispatch(|sink| matches!(sink, Sink::Visibility { region: r, .. } if *r == region));
        true
    }

    /// Unmount a region and terminate every visibility listener on it
    pub fn unmount_region(&self, region: RegionId) -> bool {
        let terminated: Vec<VisibilitySink> = {
            let mut inner = self.inner.borrow_mut();
            if inner.regions.remove(region).is_none() {
                return false;
            }
            let ids: Vec<ListenerId> = inner
                .listeners
                .iter()
                .filter(|(_, sink)| matches!(sink, Sink::Visibility { region: r, .. } if *r == region))
                .map(|(id, _)| id)
                .collect();
            let mut sinks = Vec::with_capacity(ids.len());
            for id in ids {
                match inner.listeners.remove(id) {
                    Some(Sink::Visibility {
                        callback: Some(callback),
                        ..
                    }) => sinks.push(callback),
                    // Terminated once it returns
                    Some(Sink::Visibility { callback: None, .. }) => inner.terminating.push(id),
                    _ => {}
                }
            }
            sinks
        };

        tracing::trace!(
            event = event_types::UNMOUNT,
            ?region,
            listeners = terminated.len(),
            "region unmounted"
        );
        for mut callback in terminated {
            callback(VisibilityEvent::Terminated);
        }
        true
    }

    /// Scroll the document, clamped to its scrollable range. Non-finite
    /// offsets are ignored.
    pub fn set_scroll_offset(&self, offset: f32) {
        if !offset.is_finite() {
            tracing::warn!(offset, "ignoring non-finite scroll offset");
            return;
        }
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let clamped = offset.clamp(0.0, inner.max_scroll_offset());
            let changed = clamped != inner.scroll_offset;
            inner.scroll_offset = clamped;
            changed
        };
        if changed {
            tracing::trace!(event = event_types::SCROLL, offset, "document scrolled");
            self.dispatch(|_| true);
        }
    }

    /// Resize the viewport. Sizes that are negative or not finite are ignored.
    pub fn resize(&self, viewport: Size) {
        let valid = |extent: f32| extent.is_finite() && extent >= 0.0;
        if !valid(viewport.width) || !valid(viewport.height) {
            tracing::warn!(?viewport, "ignoring invalid viewport size");
            return;
        }
        {
            let mut inner = self.inner.borrow_mut();
            inner.viewport = viewport;
            let max = inner.max_scroll_offset();
            inner.scroll_offset = inner.scroll_offset.min(max);
        }
        tracing::trace!(event = event_types::RESIZE, ?viewport, "viewport resized");
        self.dispatch(|sink| matches!(sink, Sink::Visibility { .. }));
        // A shrinking document can pull the offset back
        self.dispatch(|sink| matches!(sink, Sink::Scroll { .. }));
    }

    /// Listen for visibility of `region` at `threshold`.
    ///
    /// The listener is notified immediately with the current value. Returns
    /// `None` if the region is not mounted.
    pub fn observe_visibility<F>(
        &self,
        region: RegionId,
        threshold: f32,
        callback: F,
    ) -> Option<ListenerId>
    where
        F: FnMut(VisibilityEvent) + 'static,
    {
        let id = {
            let mut inner = self.inner.borrow_mut();
            if !inner.regions.contains_key(region) {
                return None;
            }
            inner.listeners.insert(Sink::Visibility {
                region,
                threshold,
                callback: Some(Box::new(callback)),
            })
        };
        self.notify(id);
        Some(id)
    }

    /// Listen for scroll offset changes. Notified immediately with the
    /// current offset.
    pub fn on_scroll<F>(&self, callback: F) -> ListenerId
    where
        F: FnMut(f32) + 'static,
    {
        let id = self.inner.borrow_mut().listeners.insert(Sink::Scroll {
            callback: Some(Box::new(callback)),
        });
        self.notify(id);
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.inner.borrow_mut().listeners.remove(id);
        removed.is_some()
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.inner.borrow().listeners.contains_key(id)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn dispatch(&self, filter: impl Fn(&Sink) -> bool) {
        let ids: Vec<ListenerId> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|(_, sink)| filter(sink))
            .map(|(id, _)| id)
            .collect();

        for id in ids {
            self.notify(id);
        }
    }

    /// Run one listener with the borrow released, then put it back
    fn notify(&self, id: ListenerId) {
        let delivery = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let scroll_offset = inner.scroll_offset;
            let ratio = match inner.listeners.get(id) {
                Some(Sink::Visibility { region, .. }) => inner.ratio(*region),
                _ => None,
            };
            let delivery = match inner.listeners.get_mut(id) {
                Some(Sink::Visibility {
                    threshold,
                    callback,
                    ..
                }) => match (callback.take(), ratio) {
                    (Some(cb), Some(ratio)) => Some(Delivery::Visibility(cb, ratio >= *threshold)),
                    (cb, _) => {
                        *callback = cb;
                        None
                    }
                },
                Some(Sink::Scroll { callback }) => callback
                    .take()
                    .map(|cb| Delivery::Scroll(cb, scroll_offset)),
                None => None,
            };
            delivery
        };

        match delivery {
            Some(Delivery::Visibility(mut callback, visible)) => {
                callback(VisibilityEvent::Intersecting(visible));
                self.restore(id, Delivery::Visibility(callback, visible));
            }
            Some(Delivery::Scroll(mut callback, offset)) => {
                callback(offset);
                self.restore(id, Delivery::Scroll(callback, offset));
            }
            None => {}
        }
    }

    fn restore(&self, id: ListenerId, delivery: Delivery) {
        // Listeners removed while they ran are dropped after the borrow ends
        let (leftover, terminated) = {
            let mut inner = self.inner.borrow_mut();
            let leftover = match (inner.listeners.get_mut(id), delivery) {
                (Some(Sink::Visibility { callback, .. }), Delivery::Visibility(cb, _)) => {
                    *callback = Some(cb);
                    None
                }
                (Some(Sink::Scroll { callback }), Delivery::Scroll(cb, _)) => {
                    *callback = Some(cb);
                    None
                }
                (_, delivery) => Some(delivery),
            };
            let terminated = match inner.terminating.iter().position(|pending| *pending == id) {
                Some(index) => {
                    inner.terminating.swap_remove(index);
                    true
                }
                None => false,
            };
            (leftover, terminated)
        };

        if let (Some(Delivery::Visibility(mut callback, _)), true) = (leftover, terminated) {
            callback(VisibilityEvent::Terminated);
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Document")
            .field("viewport", &inner.viewport)
            .field("scroll_offset", &inner.scroll_offset)
            .field("regions", &inner.regions.len())
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

/// Explicit ownership of a document listener.
///
/// Unsubscribes when dropped.
#[must_use = "dropping the subscription unsubscribes"]
pub struct Subscription {
    document: Document,
    id: ListenerId,
}

impl Subscription {
    pub(crate) fn new(document: Document, id: ListenerId) -> Self {
        Self { document, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still attached
    pub fn is_active(&self) -> bool {
        self.document.has_listener(self.id)
    }

    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.document.remove_listener(self.id) {
            tracing::trace!(id = ?self.id, "listener removed");
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn document() -> Document {
        let doc = Document::new(Size::new(1000.0, 800.0));
        doc.set_content_height(4000.0);
        doc
    }

    #[test]
    fn test_scroll_is_clamped() {
        let doc = document();
        doc.set_scroll_offset(-50.0);
        assert_eq!(doc.scroll_offset(), 0.0);
        doc.set_scroll_offset(10_000.0);
        assert_eq!(doc.scroll_offset(), 3200.0);
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        let doc = document();
        let region = doc.mount_region(Rect::new(0.0, 3000.0, 1000.0, 500.0));
        doc.set_scroll_offset(400.0);

        let calls = Rc::new(RefCell::new(0));
        let calls_clone = calls.clone();
        let _id = doc.on_scroll(move |_| *calls_clone.borrow_mut() += 1);

        for offset in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            doc.set_scroll_offset(offset);
        }
        doc.resize(Size::new(f32::NAN, 800.0));
        doc.resize(Size::new(1000.0, -1.0));

        assert_eq!(doc.scroll_offset(), 400.0);
        assert_eq!(doc.viewport(), Size::new(1000.0, 800.0));
        assert_eq!(doc.intersection_ratio(region), Some(0.0));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_visibility_emits_immediately_and_on_scroll() {
        let doc = document();
        let region = doc.mount_region(Rect::new(0.0, 1000.0, 1000.0, 500.0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        doc.observe_visibility(region, 0.3, move |event| seen_clone.borrow_mut().push(event))
            .unwrap();
        doc.set_scroll_offset(400.0); // 200 of 500 visible = 0.4
        doc.set_scroll_offset(300.0); // 100 of 500 visible = 0.2

        assert_eq!(
            *seen.borrow(),
            vec![
                VisibilityEvent::Intersecting(false),
                VisibilityEvent::Intersecting(true),
                VisibilityEvent::Intersecting(false),
            ]
        );
    }

    #[test]
    fn test_observe_unmounted_region() {
        let doc = document();
        let region = doc.mount_region(Rect::new(0.0, 0.0, 10.0, 10.0));
        doc.unmount_region(region);
        assert!(doc.observe_visibility(region, 0.5, |_| {}).is_none());
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_unmount_terminates_stream() {
        let doc = document();
        let region = doc.mount_region(Rect::new(0.0, 0.0, 1000.0, 400.0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        doc.observe_visibility(region, 0.3, move |event| seen_clone.borrow_mut().push(event))
            .unwrap();
        assert!(doc.unmount_region(region));
        doc.set_scroll_offset(100.0);

        assert_eq!(
            *seen.borrow(),
            vec![VisibilityEvent::Intersecting(true), VisibilityEvent::Terminated]
        );
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_unmount_from_own_listener_terminates() {
        let doc = document();
        let region = doc.mount_region(Rect::new(0.0, 1000.0, 1000.0, 500.0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let doc_clone = doc.clone();

        doc.observe_visibility(region, 0.3, move |event| {
            seen_clone.borrow_mut().push(event);
            if event == VisibilityEvent::Intersecting(true) {
                doc_clone.unmount_region(region);
            }
        })
        .unwrap();
        doc.set_scroll_offset(1000.0);

        assert_eq!(
            *seen.borrow(),
            vec![
                VisibilityEvent::Intersecting(false),
                VisibilityEvent::Intersecting(true),
                VisibilityEvent::Terminated,
            ]
        );
        assert_eq!(doc.listener_count(), 0);
        doc.set_scroll_offset(0.0);
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_scroll_listener() {
        let doc = document();
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let offsets_clone = offsets.clone();

        let id = doc.on_scroll(move |offset| offsets_clone.borrow_mut().push(offset));
        doc.set_scroll_offset(120.0);
        doc.set_scroll_offset(120.0); // unchanged, no event
        let subscription = Subscription::new(doc.clone(), id);
        subscription.unsubscribe();
        doc.set_scroll_offset(10.0);

        assert_eq!(*offsets.borrow(), vec![0.0, 120.0]);
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let doc = document();
        let own_id: Rc<RefCell<Option<ListenerId>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(RefCell::new(0));

        let doc_clone = doc.clone();
        let own_clone = own_id.clone();
        let calls_clone = calls.clone();
        let id = doc.on_scroll(move |_| {
            *calls_clone.borrow_mut() += 1;
            if let Some(id) = *own_clone.borrow() {
                doc_clone.remove_listener(id);
            }
        });
        *own_id.borrow_mut() = Some(id);

        doc.set_scroll_offset(50.0);
        doc.set_scroll_offset(60.0);
        assert_eq!(*calls.borrow(), 2);
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_region_move_notifies() {
        let doc = document();
        let region = doc.mount_region(Rect::new(0.0, 2000.0, 1000.0, 400.0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        doc.observe_visibility(region, 0.5, move |event| seen_clone.borrow_mut().push(event))
            .unwrap();
        doc.set_region_bounds(region, Rect::new(0.0, 100.0, 1000.0, 400.0));

        assert_eq!(
            *seen.borrow(),
            vec![
                VisibilityEvent::Intersecting(false),
                VisibilityEvent::Intersecting(true)
            ]
        );
    }

    #[test]
    fn test_resize_changes_visibility() {
        let doc = document();
        let region = doc.mount_region(Rect::new(0.0, 900.0, 1000.0, 200.0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        doc.observe_visibility(region, 0.5, move |event| seen_clone.borrow_mut().push(event))
            .unwrap();
        doc.resize(Size::new(1000.0, 1200.0));

        assert_eq!(
            seen.borrow().last(),
            Some(&VisibilityEvent::Intersecting(true))
        );
    }
}

//! Visibility observer
//!
//! Reports whether a region intersects the viewport by at least a threshold.
//! The value is a pure function of the current intersection ratio: there is
//! no hysteresis and no debounce, so leaving and re-entering reports again.

use crate::document::{Document, RegionId, Subscription, VisibilityEvent};
use folio_core::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Minimum intersecting-area ratio, in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct ViewportThreshold(f32);

impl ViewportThreshold {
    /// Threshold used by every page section
    pub const SECTION: ViewportThreshold = ViewportThreshold(0.3);

    pub fn new(value: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::ThresholdOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Whether `ratio` counts as visible
    pub fn is_met(&self, ratio: f32) -> bool {
        ratio >= self.0
    }
}

impl Default for ViewportThreshold {
    fn default() -> Self {
        Self::SECTION
    }
}

impl TryFrom<f32> for ViewportThreshold {
    type Error = ConfigError;

    fn try_from(value: f32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ViewportThreshold> for f32 {
    fn from(threshold: ViewportThreshold) -> Self {
        threshold.0
    }
}

/// Attaches visibility listeners to document regions
pub struct VisibilityObserver;

impl VisibilityObserver {
    /// Observe `region` against `threshold`.
    ///
    /// Exactly one listener is attached per call. `sink` receives the current
    /// value immediately, then a value after every scroll, resize or bounds
    /// change, and finally [`VisibilityEvent::Terminated`] if the region is
    /// unmounted.
    pub fn observe<F>(
        document: &Document,
        region: RegionId,
        threshold: ViewportThreshold,
        sink: F,
    ) -> Result<Subscription>
    where
        F: FnMut(VisibilityEvent) + 'static,
    {
        let id = document
            .observe_visibility(region, threshold.value(), sink)
            .ok_or_else(|| ConfigError::RegionNotMounted(format!("{region:?}")))?;
        Ok(Subscription::new(document.clone(), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Rect, Size};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_threshold_range() {
        assert!(ViewportThreshold::new(0.0).is_ok());
        assert!(ViewportThreshold::new(1.0).is_ok());
        assert_eq!(
            ViewportThreshold::new(1.5),
            Err(ConfigError::ThresholdOutOfRange(1.5))
        );
        assert!(ViewportThreshold::new(-0.1).is_err());
        assert!(ViewportThreshold::new(f32::NAN).is_err());
    }

    #[test]
    fn test_visible_iff_ratio_meets_threshold() {
        // Region 1000px tall starting at the top of a 1000px viewport; each
        // scroll step of 100px removes a tenth of it from view.
        for threshold_step in 0..=10 {
            let threshold = ViewportThreshold::new(threshold_step as f32 / 10.0).unwrap();

            let doc = Document::new(Size::new(800.0, 1000.0));
            doc.set_content_height(5000.0);
            let region = doc.mount_region(Rect::new(0.0, 0.0, 800.0, 1000.0));

            let seen = Rc::new(RefCell::new(Vec::new()));
            let seen_clone = seen.clone();
            let _sub = VisibilityObserver::observe(&doc, region, threshold, move |event| {
                if let VisibilityEvent::Intersecting(visible) = event {
                    seen_clone.borrow_mut().push(visible);
                }
            })
            .unwrap();

            for step in 1..=12 {
                doc.set_scroll_offset(step as f32 * 100.0);
            }

            let seen = seen.borrow();
            assert_eq!(seen.len(), 13);
            for (step, visible) in seen.iter().enumerate() {
                let offset = step as f32 * 100.0;
                let ratio = doc_ratio(offset);
                assert_eq!(
                    *visible,
                    threshold.is_met(ratio),
                    "threshold {} at offset {offset}",
                    threshold.value()
                );
            }
        }
    }

    fn doc_ratio(offset: f32) -> f32 {
        Rect::new(0.0, 0.0, 800.0, 1000.0)
            .intersection_ratio(&Rect::new(0.0, offset, 800.0, 1000.0))
    }

    #[test]
    fn test_drop_subscription_detaches() {
        let doc = Document::new(Size::new(800.0, 600.0));
        let region = doc.mount_region(Rect::new(0.0, 0.0, 800.0, 300.0));

        let sub = VisibilityObserver::observe(&doc, region, ViewportThreshold::SECTION, |_| {})
            .unwrap();
        assert!(sub.is_active());
        assert_eq!(doc.listener_count(), 1);

        drop(sub);
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_observe_unmounted_region() {
        let doc = Document::new(Size::new(800.0, 600.0));
        let region = doc.mount_region(Rect::new(0.0, 0.0, 800.0, 300.0));
        doc.unmount_region(region);

        let result = VisibilityObserver::observe(&doc, region, ViewportThreshold::SECTION, |_| {});
        assert!(matches!(result, Err(ConfigError::RegionNotMounted(_))));
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_one_listener_per_observe() {
        let doc = Document::new(Size::new(800.0, 600.0));
        let region = doc.mount_region(Rect::new(0.0, 0.0, 800.0, 300.0));

        let _a = VisibilityObserver::observe(&doc, region, ViewportThreshold::SECTION, |_| {});
        let _b = VisibilityObserver::observe(&doc, region, ViewportThreshold::SECTION, |_| {});
        assert_eq!(doc.listener_count(), 2);
    }
}

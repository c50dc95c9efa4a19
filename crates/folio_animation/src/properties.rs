//! Animatable visual properties
//!
//! The set of properties a reveal can drive on an item. Every field always
//! has a value; the defaults describe an item at rest (opaque, untransformed,
//! full width).

use serde::{Deserialize, Serialize};

/// Visual properties of one animated item
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualProperties {
    /// Opacity (0.0 to 1.0)
    pub opacity: f32,
    /// Translation X in pixels
    #[serde(alias = "x")]
    pub translate_x: f32,
    /// Translation Y in pixels
    #[serde(alias = "y")]
    pub translate_y: f32,
    /// Uniform scale factor
    pub scale: f32,
    /// Width as a percentage of the item's track (progress bars)
    pub width: f32,
}

impl Default for VisualProperties {
    fn default() -> Self {
        Self::REST
    }
}

impl VisualProperties {
    /// An item at rest
    pub const REST: VisualProperties = VisualProperties {
        opacity: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
        width: 100.0,
    };

    /// Rest properties with only opacity changed
    pub fn opacity(value: f32) -> Self {
        Self {
            opacity: value,
            ..Self::REST
        }
    }

    /// Builder: set opacity
    pub fn with_opacity(mut self, value: f32) -> Self {
        self.opacity = value;
        self
    }

    /// Builder: set translation
    pub fn with_translate(mut self, x: f32, y: f32) -> Self {
        self.translate_x = x;
        self.translate_y = y;
        self
    }

    /// Builder: set uniform scale
    pub fn with_scale(mut self, value: f32) -> Self {
        self.scale = value;
        self
    }

    /// Builder: set width percentage
    pub fn with_width(mut self, percent: f32) -> Self {
        self.width = percent;
        self
    }

    /// Interpolate between two property sets
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            opacity: lerp(self.opacity, other.opacity, t),
            translate_x: lerp(self.translate_x, other.translate_x, t),
            translate_y: lerp(self.translate_y, other.translate_y, t),
            scale: lerp(self.scale, other.scale, t),
            width: lerp(self.width, other.width, t),
        }
    }

    /// Largest per-field difference, used to detect discontinuities
    pub fn max_delta(&self, other: &Self) -> f32 {
        [
            self.opacity - other.opacity,
            self.translate_x - other.translate_x,
            self.translate_y - other.translate_y,
            self.scale - other.scale,
            self.width - other.width,
        ]
        .into_iter()
        .fold(0.0, |acc, d| acc.max(d.abs()))
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_midpoint() {
        let hidden = VisualProperties::opacity(0.0).with_translate(0.0, 20.0);
        let visible = VisualProperties::REST;

        let mid = hidden.lerp(&visible, 0.5);
        assert_eq!(mid.opacity, 0.5);
        assert_eq!(mid.translate_y, 10.0);
        assert_eq!(mid.scale, 1.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = VisualProperties::REST.with_width(0.0);
        let b = VisualProperties::REST.with_width(90.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn test_max_delta() {
        let a = VisualProperties::REST;
        let b = VisualProperties::REST.with_translate(-50.0, 0.0).with_opacity(0.0);
        assert_eq!(a.max_delta(&b), 50.0);
        assert_eq!(a.max_delta(&a), 0.0);
    }
}

//! Easing curves for item transitions
//!
//! Curves are named in configuration files with CSS-style kebab-case names
//! (`ease-out`, `ease-in-out-cubic`, `cubic-bezier(0.4, 0, 0.2, 1)`).

use folio_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Map linear progress in `[0, 1]` onto the curve
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => in_out(t, 3, 4.0),
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t).powi(2),
            Easing::EaseInOutQuad => in_out(t, 2, 2.0),
            Easing::EaseInQuart => t.powi(4),
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => in_out(t, 4, 8.0),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
        }
    }
}

/// Symmetric in-out polynomial of the given power
fn in_out(t: f32, power: i32, scale: f32) -> f32 {
    if t < 0.5 {
        scale * t.powi(power)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(power) / 2.0
    }
}

impl FromStr for Easing {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = name.trim();
        if let Some(args) = name
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let points: Vec<f32> = args
                .split(',')
                .map(|p| p.trim().parse::<f32>())
                .collect::<Result<_, _>>()
                .map_err(|_| ConfigError::UnknownEasing(name.to_string()))?;
            return match points.as_slice() {
                [x1, y1, x2, y2] => Ok(Easing::CubicBezier(*x1, *y1, *x2, *y2)),
                _ => Err(ConfigError::UnknownEasing(name.to_string())),
            };
        }

        Ok(match name {
            "linear" => Easing::Linear,
            "ease-in" | "ease-in-cubic" => Easing::EaseIn,
            "ease-out" | "ease-out-cubic" => Easing::EaseOut,
            "ease-in-out" | "ease-in-out-cubic" => Easing::EaseInOut,
            "ease-in-quad" => Easing::EaseInQuad,
            "ease-out-quad" => Easing::EaseOutQuad,
            "ease-in-out-quad" => Easing::EaseInOutQuad,
            "ease-in-quart" => Easing::EaseInQuart,
            "ease-out-quart" => Easing::EaseOutQuart,
            "ease-in-out-quart" => Easing::EaseInOutQuart,
            _ => return Err(ConfigError::UnknownEasing(name.to_string())),
        })
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
            Easing::EaseInQuad => "ease-in-quad",
            Easing::EaseOutQuad => "ease-out-quad",
            Easing::EaseInOutQuad => "ease-in-out-quad",
            Easing::EaseInQuart => "ease-in-quart",
            Easing::EaseOutQuart => "ease-out-quart",
            Easing::EaseInOutQuart => "ease-in-out-quart",
            Easing::CubicBezier(x1, y1, x2, y2) => {
                return write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})");
            }
        };
        f.write_str(name)
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}

impl TryFrom<String> for Easing {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

const SOLVE_EPSILON: f64 = 1e-7;

/// Unit cubic bezier through (0,0) and (1,1), kept as polynomial
/// coefficients for each axis. Solved in f64 so high refresh rates sample
/// it smoothly.
struct UnitBezier {
    x: [f64; 3],
    y: [f64; 3],
}

impl UnitBezier {
    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: Self::coefficients(x1 as f64, x2 as f64),
            y: Self::coefficients(y1 as f64, y2 as f64),
        }
    }

    /// `[a, b, c]` of `a*s^3 + b*s^2 + c*s` for control values `p1`, `p2`
    fn coefficients(p1: f64, p2: f64) -> [f64; 3] {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        [1.0 - c - b, b, c]
    }

    fn eval([a, b, c]: [f64; 3], s: f64) -> f64 {
        ((a * s + b) * s + c) * s
    }

    fn x_slope(&self, s: f64) -> f64 {
        let [a, b, c] = self.x;
        (3.0 * a * s + 2.0 * b) * s + c
    }

    /// Curve parameter at which the x axis reaches `x`
    fn parameter_for(&self, x: f64) -> f64 {
        let mut s = x;
        for _ in 0..8 {
            let error = Self::eval(self.x, s) - x;
            if error.abs() < SOLVE_EPSILON {
                return s;
            }
            let slope = self.x_slope(s);
            if slope.abs() < SOLVE_EPSILON {
                break;
            }
            s -= error / slope;
        }

        // Newton stalled on a flat stretch: halve the bracket instead
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let mut s = x;
        while hi - lo > SOLVE_EPSILON {
            if Self::eval(self.x, s) < x {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) / 2.0;
        }
        s
    }

    fn ease(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        Self::eval(self.y, self.parameter_for(t as f64)) as f32
    }
}

fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    UnitBezier::new(x1, y1, x2, y2).ease(t)
}

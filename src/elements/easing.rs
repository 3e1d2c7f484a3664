// Copyright (c) 2024 Mike Tsao

//! Named easing functions. Each maps progress in [0.0, 1.0] to a curve
//! value. All of them except [Easing::AntiLinear] send 0 to 0 and 1 to 1;
//! Back and Elastic overshoot in between.

use core::f64::consts::PI;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    /// `1 - t`. Plays a shape backward without touching the timeline.
    AntiLinear,
    /// `t * t * (2 - t)`. Close to linear, with a soft landing.
    AlmostIdentity,
    EaseInQuadratic,
    EaseOutQuadratic,
    EaseInOutQuadratic,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuartic,
    EaseOutQuartic,
    EaseInOutQuartic,
    EaseInQuintic,
    EaseOutQuintic,
    EaseInOutQuintic,
    EaseInSinusoidal,
    EaseOutSinusoidal,
    EaseInOutSinusoidal,
    EaseInExponential,
    EaseOutExponential,
    EaseInOutExponential,
    EaseInCircular,
    EaseOutCircular,
    EaseInOutCircular,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInElastic,
    EaseOutElastic,
    EaseInOutElastic,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
    /// CSS-style cubic bezier through (0, 0), (x1, y1), (x2, y2), (1, 1).
    CubicBezier(f64, f64, f64, f64),
}
impl Easing {
    const BACK: f64 = 1.70158;

    /// Applies the easing function to progress `t`. The caller clamps.
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::AntiLinear => 1.0 - t,
            Easing::AlmostIdentity => t * t * (2.0 - t),
            Easing::EaseInQuadratic => t * t,
            Easing::EaseOutQuadratic => 1.0 - (1.0 - t).powi(2),
            Easing::EaseInOutQuadratic => in_out(t, |t| t * t),
            Easing::EaseInCubic => t.powi(3),
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => in_out(t, |t| t.powi(3)),
            Easing::EaseInQuartic => t.powi(4),
            Easing::EaseOutQuartic => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuartic => in_out(t, |t| t.powi(4)),
            Easing::EaseInQuintic => t.powi(5),
            Easing::EaseOutQuintic => 1.0 - (1.0 - t).powi(5),
            Easing::EaseInOutQuintic => in_out(t, |t| t.powi(5)),
            Easing::EaseInSinusoidal => 1.0 - (t * PI / 2.0).cos(),
            Easing::EaseOutSinusoidal => (t * PI / 2.0).sin(),
            Easing::EaseInOutSinusoidal => -((PI * t).cos() - 1.0) / 2.0,
            Easing::EaseInExponential => expo_in(t),
            Easing::EaseOutExponential => 1.0 - expo_in(1.0 - t),
            Easing::EaseInOutExponential => in_out(t, expo_in),
            Easing::EaseInCircular => circ_in(t),
            Easing::EaseOutCircular => 1.0 - circ_in(1.0 - t),
            Easing::EaseInOutCircular => in_out(t, circ_in),
            Easing::EaseInBack => back_in(t, Self::BACK),
            Easing::EaseOutBack => 1.0 - back_in(1.0 - t, Self::BACK),
            Easing::EaseInOutBack => in_out(t, |t| back_in(t, Self::BACK * 1.525)),
            Easing::EaseInElastic => elastic_in(t),
            Easing::EaseOutElastic => 1.0 - elastic_in(1.0 - t),
            Easing::EaseInOutElastic => in_out(t, elastic_in),
            Easing::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            Easing::EaseOutBounce => bounce_out(t),
            Easing::EaseInOutBounce => in_out(t, |t| 1.0 - bounce_out(1.0 - t)),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
        }
    }
}

/// Builds a symmetric in-out curve from an ease-in curve: the first half
/// eases in over [0, 0.5], and the second half mirrors it.
fn in_out(t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    if t < 0.5 {
        ease_in(t * 2.0) / 2.0
    } else {
        1.0 - ease_in((1.0 - t) * 2.0) / 2.0
    }
}

fn expo_in(t: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else {
        2.0f64.powf(10.0 * t - 10.0)
    }
}

fn circ_in(t: f64) -> f64 {
    1.0 - (1.0 - t * t).max(0.0).sqrt()
}

fn back_in(t: f64, overshoot: f64) -> f64 {
    (overshoot + 1.0) * t.powi(3) - overshoot * t * t
}

fn elastic_in(t: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        -(2.0f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * (2.0 * PI / 3.0)).sin()
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Solves bezier_x(p) == t for p with Newton-Raphson, falling back to
/// bisection where the slope flattens, then returns bezier_y(p).
fn cubic_bezier(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let mut p = t;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - t;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2);
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    p = t;
    for _ in 0..32 {
        let x = bezier_sample(p, x1, x2);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }
    bezier_sample(p, y1, y2)
}

#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

// Copyright (c) 2024 Mike Tsao

use super::{Curve, Easing};
use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// The shape of a tween: either a named [Easing] or a hand-authored [Curve].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tween {
    #[allow(missing_docs)]
    Easing(Easing),
    #[allow(missing_docs)]
    Curve(Curve),
}
impl Default for Tween {
    fn default() -> Self {
        Self::Easing(Easing::default())
    }
}
impl From<Easing> for Tween {
    fn from(value: Easing) -> Self {
        Self::Easing(value)
    }
}
impl From<Curve> for Tween {
    fn from(value: Curve) -> Self {
        Self::Curve(value)
    }
}
impl Tween {
    /// Raw shape at progress `t`, before remapping.
    pub fn shape(&self, t: f64) -> f64 {
        match self {
            Tween::Easing(easing) => easing.apply(t),
            Tween::Curve(curve) => curve.evaluate(t),
        }
    }
}

/// A [Tween] plus the output range it's remapped onto. This is the pure
/// function `evaluate(t) -> c` that every timed action samples.
#[derive(Clone, Debug, PartialEq, Builder, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(rename_all = "kebab-case")]
pub struct TweenSpec {
    #[builder(setter(into))]
    tween: Tween,

    /// Output when the shape is 0.
    #[derivative(Default(value = "0.0"))]
    remap_zero: f64,

    /// Output when the shape is 1.
    #[derivative(Default(value = "1.0"))]
    remap_one: f64,
}
impl From<Easing> for TweenSpec {
    fn from(value: Easing) -> Self {
        Self::new_with(value)
    }
}
impl From<Curve> for TweenSpec {
    fn from(value: Curve) -> Self {
        Self::new_with(value)
    }
}
#[allow(missing_docs)]
impl TweenSpec {
    pub fn new_with(tween: impl Into<Tween>) -> Self {
        Self {
            tween: tween.into(),
            ..Default::default()
        }
    }

    /// The same spec remapped onto [zero, one].
    pub fn remapped(self, zero: f64, one: f64) -> Self {
        Self {
            remap_zero: zero,
            remap_one: one,
            ..self
        }
    }

    pub fn tween(&self) -> &Tween {
        &self.tween
    }

    pub fn remap_zero(&self) -> f64 {
        self.remap_zero
    }

    pub fn remap_one(&self) -> f64 {
        self.remap_one
    }

    /// Samples the tween. `t` is clamped to [0.0, 1.0] first; the result is
    /// not clamped, so overshooting easings stay overshooting.
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let shaped = self.tween.shape(t);
        self.remap_zero + (self.remap_one - self.remap_zero) * shaped
    }
}

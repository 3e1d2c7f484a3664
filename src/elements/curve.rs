// Copyright (c) 2024 Mike Tsao

use super::Easing;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// One keyframe of a [Curve]. The `shape` easing controls how the curve
/// travels from this key to the next one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CurveKey {
    /// Position in [0.0, 1.0].
    pub time: f64,
    #[allow(missing_docs)]
    pub value: f64,
    /// Easing toward the next key.
    #[serde(default)]
    pub shape: Easing,
}
impl CurveKey {
    /// A key with linear travel toward the next key.
    pub const fn new(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            shape: Easing::Linear,
        }
    }

    /// The same key with a different shape.
    pub const fn with_shape(self, shape: Easing) -> Self {
        Self { shape, ..self }
    }
}
impl From<(f64, f64)> for CurveKey {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// A hand-authored curve over [0.0, 1.0]. Before the first key it holds the
/// first key's value, after the last key it holds the last key's value. A
/// curve without keys is the identity, which is the same as
/// [Easing::Linear].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case", try_from = "UncheckedCurve")]
#[builder(build_fn(private, name = "build_from_builder"))]
pub struct Curve {
    /// Keys, ordered by time.
    #[builder(default, setter(custom))]
    keys: Vec<CurveKey>,
}
impl CurveBuilder {
    /// Appends a key.
    pub fn key(&mut self, key: impl Into<CurveKey>) -> &mut Self {
        self.keys.get_or_insert_with(Vec::default).push(key.into());
        self
    }

    /// Builds the item.
    pub fn build(&self) -> Result<Curve, CurveBuilderError> {
        let c = self.build_from_builder()?;
        Self::verify_key_ordering(&c)?;
        Ok(c)
    }

    fn verify_key_ordering(c: &Curve) -> Result<(), CurveBuilderError> {
        Curve::check_key_ordering(&c.keys).map_err(CurveBuilderError::ValidationError)
    }
}

// What a serialized curve looks like before its keys are checked.
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct UncheckedCurve {
    keys: Vec<CurveKey>,
}
impl TryFrom<UncheckedCurve> for Curve {
    type Error = String;

    fn try_from(value: UncheckedCurve) -> Result<Self, Self::Error> {
        Self::check_key_ordering(&value.keys)?;
        Ok(Self { keys: value.keys })
    }
}

impl Curve {
    /// Rises from 0 to 1.
    pub fn linear() -> Self {
        Self {
            keys: vec![CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)],
        }
    }

    /// Rises from 0 to 1 at the midpoint, then falls back to 0. Good for
    /// pulses and flashes that should end where they started.
    pub fn bell() -> Self {
        Self {
            keys: vec![
                CurveKey::new(0.0, 0.0).with_shape(Easing::EaseOutQuadratic),
                CurveKey::new(0.5, 1.0).with_shape(Easing::EaseInQuadratic),
                CurveKey::new(1.0, 0.0),
            ],
        }
    }

    /// A smooth S from 0 to 1.
    pub fn ease_in_out() -> Self {
        Self {
            keys: vec![
                CurveKey::new(0.0, 0.0).with_shape(Easing::EaseInOutCubic),
                CurveKey::new(1.0, 1.0),
            ],
        }
    }

    /// Keys must be in ascending time order. Consecutive keys with the same
    /// time are OK and produce a jump.
    fn check_key_ordering(keys: &[CurveKey]) -> Result<(), String> {
        let mut last_time = f64::NEG_INFINITY;
        for key in keys.iter() {
            if !key.time.is_finite() || key.time < last_time {
                return Err(format!("Key at time {} is out of order", key.time));
            }
            last_time = key.time;
        }
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Samples the curve at progress `t`.
    pub fn evaluate(&self, t: f64) -> f64 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return t;
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }
        self.keys
            .windows(2)
            .find(|pair| t >= pair[0].time && t < pair[1].time)
            .map_or(last.value, |pair| {
                let (from, to) = (&pair[0], &pair[1]);
                let percent = (t - from.time) / (to.time - from.time);
                from.value + (to.value - from.value) * from.shape.apply(percent)
            })
    }
}

// Copyright (c) 2024 Mike Tsao

use core::{
    fmt::Display,
    ops::{Mul, RangeInclusive},
};
use serde::{Deserialize, Serialize};

/// [RangedF64] keeps a value inside the given range. It clamps at creation,
/// when set explicitly, and when converting from an f64. Math on the inner
/// value is unchecked, so prefer the f64 you get out of it for arithmetic.
///
/// Clamping is silent.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RangedF64<const LOWER: i8, const UPPER: i8>(pub f64);
#[allow(missing_docs)]
impl<const LOWER: i8, const UPPER: i8> RangedF64<LOWER, UPPER> {
    /// The highest valid value.
    pub const MAX: f64 = UPPER as f64;
    /// The lowest valid value.
    pub const MIN: f64 = LOWER as f64;

    pub fn new(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }
    pub const fn maximum() -> Self {
        Self(Self::MAX)
    }
    pub const fn minimum() -> Self {
        Self(Self::MIN)
    }
    pub fn set(&mut self, value: f64) {
        self.0 = value.clamp(Self::MIN, Self::MAX);
    }
    pub fn get(&self) -> f64 {
        self.0.clamp(Self::MIN, Self::MAX)
    }
}
impl<const LOWER: i8, const UPPER: i8> Display for RangedF64<LOWER, UPPER> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{}", self.0))
    }
}
impl<const LOWER: i8, const UPPER: i8> From<RangedF64<LOWER, UPPER>> for f64 {
    fn from(value: RangedF64<LOWER, UPPER>) -> Self {
        value.get()
    }
}
impl<const LOWER: i8, const UPPER: i8> From<f64> for RangedF64<LOWER, UPPER> {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// A [Normal] is a RangedF64 whose range is [0.0, 1.0]. Probabilities and
/// spring damping ratios are Normals.
pub type Normal = RangedF64<0, 1>;
#[allow(missing_docs)]
impl Normal {
    pub const fn range() -> RangeInclusive<f64> {
        0.0..=1.0
    }
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    /// Whether this value is the top of the range, meaning "always" when
    /// used as a probability.
    pub fn is_certain(&self) -> bool {
        self.get() >= Self::MAX
    }
}
impl Default for Normal {
    // Full strength, so a default-constructed chance always passes.
    fn default() -> Self {
        Self(1.0)
    }
}
impl Mul<Normal> for f64 {
    type Output = Self;

    fn mul(self, rhs: Normal) -> Self::Output {
        self * rhs.get()
    }
}

// Copyright (c) 2024 Mike Tsao

//! The kinds of values a feedback can drive.

use core::ops::{Add, Mul, Sub};
use derive_more::{Add, Display, Sub};
use serde::{Deserialize, Serialize};

/// A three-component vector, used for positions, scales, rotations, and
/// anything else that has an x, y, and z.
pub type Vector = nalgebra::Vector3<f64>;

/// A linear RGBA color. Components are nominally in [0.0, 1.0] but aren't
/// clamped, so that overshooting easings can push past the ends.
#[derive(Add, Clone, Copy, Debug, Default, Display, PartialEq, Sub, Serialize, Deserialize)]
#[display(fmt = "rgba({}, {}, {}, {})", r, g, b, a)]
#[serde(rename_all = "kebab-case")]
pub struct Color {
    #[allow(missing_docs)]
    pub r: f64,
    #[allow(missing_docs)]
    pub g: f64,
    #[allow(missing_docs)]
    pub b: f64,
    #[allow(missing_docs)]
    pub a: f64,
}
#[allow(missing_docs)]
impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// The same color with a different alpha.
    pub const fn with_alpha(self, a: f64) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}
impl Mul<f64> for Color {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.r * rhs, self.g * rhs, self.b * rhs, self.a * rhs)
    }
}

/// Which components of a [Vector] a feedback is allowed to write. Masked-off
/// components keep whatever value they had.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AxisMask {
    #[allow(missing_docs)]
    pub x: bool,
    #[allow(missing_docs)]
    pub y: bool,
    #[allow(missing_docs)]
    pub z: bool,
}
impl Default for AxisMask {
    fn default() -> Self {
        Self::ALL
    }
}
#[allow(missing_docs)]
impl AxisMask {
    pub const ALL: AxisMask = AxisMask {
        x: true,
        y: true,
        z: true,
    };
    pub const X: AxisMask = AxisMask {
        x: true,
        y: false,
        z: false,
    };
    pub const Y: AxisMask = AxisMask {
        x: false,
        y: true,
        z: false,
    };
    pub const XY: AxisMask = AxisMask {
        x: true,
        y: true,
        z: false,
    };

    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }
}

/// Something a tween can interpolate. The arithmetic bounds are what
/// [Tweenable::lerp()] and the additive value modes need.
pub trait Tweenable:
    Copy + core::fmt::Debug + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self>
{
    /// The additive identity.
    fn zero() -> Self;

    /// Linear interpolation. `t` is not clamped.
    fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }

    /// Replaces the components that `axes` excludes with those of `fallback`.
    /// Scalar values have no axes and return `self` untouched.
    fn with_axes(self, fallback: Self, axes: AxisMask) -> Self {
        let _ = (fallback, axes);
        self
    }
}
impl Tweenable for f64 {
    fn zero() -> Self {
        0.0
    }
}
impl Tweenable for Vector {
    fn zero() -> Self {
        Vector::zeros()
    }

    fn with_axes(self, fallback: Self, axes: AxisMask) -> Self {
        Vector::new(
            if axes.x { self.x } else { fallback.x },
            if axes.y { self.y } else { fallback.y },
            if axes.z { self.z } else { fallback.z },
        )
    }
}
impl Tweenable for Color {
    fn zero() -> Self {
        Color::TRANSPARENT
    }
}

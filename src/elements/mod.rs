// Copyright (c) 2024 Mike Tsao

//! Pure building blocks that map normalized progress to a curve value.
//! Nothing here keeps time; see [cores](crate::cores) for that.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{Curve, CurveBuilder, CurveKey, Easing, Tween, TweenSpec, TweenSpecBuilder};
}

pub use {
    curve::{Curve, CurveBuilder, CurveBuilderError, CurveKey},
    easing::Easing,
    tween::{Tween, TweenSpec, TweenSpecBuilder, TweenSpecBuilderError},
};

mod curve;
mod easing;
mod tween;

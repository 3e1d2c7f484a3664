// Copyright (c) 2024 Mike Tsao

//! Ready-made feedback players built on Jolt: hit-stop, camera bump, flash,
//! squash-and-stretch, and a looping pulse, plus an [IntensityAmplifier]
//! that reshapes any player's intensity.

/// Recommended imports for easy onboarding.
pub mod prelude {
    pub use super::{IntensityAmplifier, Presets};
}

pub use amplifier::IntensityAmplifier;
pub use presets::Presets;

mod amplifier;
mod presets;

// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::{EngineSettings, Rng};
}

pub use {rng::Rng, settings::EngineSettings};

mod rng;
mod settings;

// Copyright (c) 2024 Mike Tsao

//! Sequencing feedbacks, and driving sequences from the host's frame loop.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        FeedbackEffect, FeedbackPlayer, KindRegistry, PlayerEvent, PlayerSettings,
        PlayerSettingsBuilder, PlayerSignal, Scheduler, ShakeEvent, ShakePhase, Signal,
    };
}

pub use {
    events::{
        FeedbackEffect, PlayerEvent, PlayerSignal, ShakeEvent, ShakePhase, Signal, SignalChannel,
        TimeScaleRequest,
    },
    player::{FeedbackPlayer, PlayerSettings, PlayerSettingsBuilder, PlayerSettingsBuilderError},
    registry::KindRegistry,
    scheduler::Scheduler,
};

mod events;
mod player;
mod registry;
mod scheduler;

// Copyright (c) 2024 Mike Tsao

//! A [Feedback] is one reaction to a game event: a tween, a spring, a time
//! scale change, a shake broadcast, or a marker that steers the sequence it
//! sits in.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        DirectionCondition, Feedback, FeedbackKind, FeedbackKindTag, FeedbackSettings,
        FeedbackSettingsBuilder, HoldingPauseMarker, LoopMarker, PauseMarker, PlayDirection,
        ShakeBroadcast, SpringAction, SpringMotion, Target, TimeScaleChange, Timing,
        TimingBuilder,
    };
}

pub use {
    feedback::Feedback,
    kinds::{
        FeedbackKind, FeedbackKindTag, HoldingPauseMarker, LoopMarker, PauseMarker,
        ShakeBroadcast, SpringAction, SpringMotion, Target, TimeScaleAction, TimeScaleChange,
    },
    settings::{
        DirectionCondition, FeedbackSettings, FeedbackSettingsBuilder, FeedbackSettingsBuilderError,
        PlayDirection, Timing, TimingBuilder, TimingBuilderError,
    },
};

mod feedback;
mod kinds;
mod settings;

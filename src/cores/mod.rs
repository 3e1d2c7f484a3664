// Copyright (c) 2024 Mike Tsao

//! The time-driven engines behind feedbacks, without the settings, timing,
//! and bookkeeping that a [Feedback](crate::feedbacks::Feedback) adds.
//! Cores exist separately so that each one's math can be exercised on its
//! own.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        ActionState, ActionStep, SpringAxis, SpringCore, TimedActionCore, TimedActionCoreBuilder,
        TweenMode, ValueTweenCore,
    };
}

pub use {
    interpolator::{TweenMode, ValueTweenCore},
    spring::{spring_step, SpringAxis, SpringAxisBuilder, SpringCore, REST_THRESHOLD},
    timed::{ActionState, ActionStep, TimedActionCore, TimedActionCoreBuilder},
};

mod interpolator;
mod spring;
mod timed;

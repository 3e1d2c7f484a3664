// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        AxisMask, Color, Direction, FeedbackError, FnProperty, FrameDelta, IsUid, Normal,
        PlayerUid, PlayerUidFactory, Property, PropertyBinding, Seconds, TimescaleMode, Tweenable,
        Uid, UidFactory, Vector,
    };
}

pub use {
    binding::{FnProperty, Property, PropertyBinding},
    error::FeedbackError,
    ranges::{Normal, RangedF64},
    time::{Direction, FrameDelta, Seconds, TimescaleMode},
    uid::{IsUid, PlayerUid, PlayerUidFactory, Uid, UidFactory},
    values::{AxisMask, Color, Tweenable, Vector},
};

mod binding;
mod error;
mod ranges;
mod time;
mod uid;
mod values;

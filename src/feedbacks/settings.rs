// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Which player directions a feedback agrees to play in.
#[derive(
    Clone, Copy, Debug, Default, Display, EnumIter, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DirectionCondition {
    #[allow(missing_docs)]
    #[default]
    Always,
    #[allow(missing_docs)]
    OnlyWhenForward,
    #[allow(missing_docs)]
    OnlyWhenBackward,
}
impl DirectionCondition {
    /// Whether a player moving in `direction` passes this condition.
    pub fn allows(&self, direction: Direction) -> bool {
        match self {
            DirectionCondition::Always => true,
            DirectionCondition::OnlyWhenForward => direction == Direction::Forward,
            DirectionCondition::OnlyWhenBackward => direction == Direction::Backward,
        }
    }
}

/// How a feedback picks the direction of its own timeline.
#[derive(
    Clone, Copy, Debug, Default, Display, EnumIter, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PlayDirection {
    /// Same as the player.
    #[default]
    FollowPlayer,
    /// Opposite of the player.
    OppositePlayer,
    #[allow(missing_docs)]
    AlwaysForward,
    #[allow(missing_docs)]
    AlwaysBackward,
}
impl PlayDirection {
    /// Resolves against the player's current direction.
    pub fn resolve(&self, player: Direction) -> Direction {
        match self {
            PlayDirection::FollowPlayer => player,
            PlayDirection::OppositePlayer => player.reversed(),
            PlayDirection::AlwaysForward => Direction::Forward,
            PlayDirection::AlwaysBackward => Direction::Backward,
        }
    }
}

/// When and how often a feedback runs once it's played.
#[derive(Clone, Debug, Default, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default)]
#[serde(rename_all = "kebab-case", default)]
pub struct Timing {
    /// Whether delays, cooldowns, and the feedback's own timeline follow the
    /// global time scale.
    pub timescale_mode: TimescaleMode,
    /// Wait this long after a play before the first run.
    pub initial_delay: Seconds,
    /// Ignore plays that come sooner than this after the last accepted one.
    pub cooldown: Seconds,
    /// Extra runs after the first.
    pub number_of_repeats: u32,
    /// Keep repeating until stopped.
    pub repeat_forever: bool,
    /// Wait this long between runs.
    pub delay_between_repeats: Seconds,
    #[allow(missing_docs)]
    pub direction_condition: DirectionCondition,
    #[allow(missing_docs)]
    pub play_direction: PlayDirection,
}

/// The settings every feedback shares, whatever its kind.
#[derive(Clone, Debug, PartialEq, Builder, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(rename_all = "kebab-case", default)]
pub struct FeedbackSettings {
    /// Shows up in log messages.
    #[builder(setter(into))]
    pub label: String,

    /// Inactive feedbacks ignore plays.
    #[derivative(Default(value = "true"))]
    pub active: bool,

    /// Probability that a play is accepted.
    pub chance: Normal,

    #[allow(missing_docs)]
    pub timing: Timing,

    /// Plays with an intensity outside this inclusive range are ignored.
    pub intensity_interval: Option<(f64, f64)>,

    /// Whether a play that arrives mid-run restarts the run. Otherwise it's
    /// ignored.
    pub allow_additive_plays: bool,

    /// Whether stopping also restores the target's initial value.
    pub reset_on_stop: bool,

    /// Whether play intensity scales the output. When false, every play
    /// runs at full intensity.
    #[derivative(Default(value = "true"))]
    pub use_intensity: bool,
}

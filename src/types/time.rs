// Copyright (c) 2024 Mike Tsao

//! Wall-clock time, play direction, and the per-frame tick signal.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use synonym::Synonym;

/// Represents the [seconds](https://en.wikipedia.org/wiki/Second) unit of time.
#[derive(Synonym, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Seconds(pub f64);
impl Seconds {
    /// Zero seconds.
    pub const fn zero() -> Seconds {
        Seconds(0.0)
    }

    /// Infinite seconds. Used for durations that never end on their own,
    /// such as a feedback that repeats forever.
    pub const fn infinite() -> Seconds {
        Seconds(f64::INFINITY)
    }

    /// Whether this span is empty. Negative spans count as empty.
    pub fn is_empty(&self) -> bool {
        self.0 <= 0.0
    }

    /// Whether this is the [Seconds::infinite()] sentinel.
    pub fn is_infinite(&self) -> bool {
        self.0.is_infinite()
    }

    /// Returns this span reduced by `rhs`.
    pub fn minus(self, rhs: Seconds) -> Seconds {
        Seconds(self.0 - rhs.0)
    }

    /// Returns this span extended by `rhs`.
    pub fn plus(self, rhs: Seconds) -> Seconds {
        Seconds(self.0 + rhs.0)
    }
}
impl From<f32> for Seconds {
    fn from(value: f32) -> Self {
        Self(value as f64)
    }
}
impl From<Seconds> for f32 {
    fn from(value: Seconds) -> Self {
        value.0 as f32
    }
}

/// Which way time flows for a timed action or a sequence.
#[derive(
    Clone, Copy, Debug, Default, Display, EnumIter, Eq, Hash, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// From start to end.
    #[default]
    Forward,
    /// From end to start.
    Backward,
}
impl Direction {
    /// The other direction.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    #[allow(missing_docs)]
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Forward)
    }
}

/// Whether something follows the host's time scale (slow motion, hit-stop)
/// or ignores it.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimescaleMode {
    /// Uses [FrameDelta::scaled].
    #[default]
    Scaled,
    /// Uses [FrameDelta::unscaled].
    Unscaled,
}

/// The time that passed since the previous tick, in both flavors. The host
/// (or [Scheduler](crate::orchestration::Scheduler)) produces one of these
/// per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameDelta {
    /// Delta after the current time scale was applied.
    pub scaled: Seconds,
    /// Wall-clock delta.
    pub unscaled: Seconds,
}
impl FrameDelta {
    /// Builds a delta from wall-clock time and the current time scale.
    pub fn new(unscaled: Seconds, time_scale: f64) -> Self {
        Self {
            scaled: Seconds(unscaled.0 * time_scale),
            unscaled,
        }
    }

    /// A delta whose scaled and unscaled parts are the same.
    pub fn uniform(delta: Seconds) -> Self {
        Self {
            scaled: delta,
            unscaled: delta,
        }
    }

    /// Picks the part that the given [TimescaleMode] cares about.
    pub fn for_mode(&self, mode: TimescaleMode) -> Seconds {
        match mode {
            TimescaleMode::Scaled => self.scaled,
            TimescaleMode::Unscaled => self.unscaled,
        }
    }
}

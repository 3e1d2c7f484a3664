// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use derivative::Derivative;
use derive_builder::Builder;
use kahan::KahanSum;
use log::debug;
use serde::{Deserialize, Serialize};

/// Where a [TimedActionCore] is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ActionState {
    /// Not started, finished, or stopped.
    #[default]
    Idle,
    /// Advancing with each tick.
    Playing,
    /// Holding its position until resumed.
    Paused,
}

/// The outcome of starting or advancing a [TimedActionCore]. Callers apply
/// the carried curve value to whatever they drive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActionStep {
    /// Nothing to apply.
    Idle,
    /// Still in flight. Apply this curve value.
    Running(f64),
    /// Just reached the end. Apply this curve value; no more will follow.
    Finished(f64),
}
impl ActionStep {
    /// The curve value to apply, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            ActionStep::Idle => None,
            ActionStep::Running(c) | ActionStep::Finished(c) => Some(*c),
        }
    }

    #[allow(missing_docs)]
    pub fn is_finished(&self) -> bool {
        matches!(self, ActionStep::Finished(_))
    }
}

/// Advances an elapsed-time counter from 0 to `duration` (or the reverse)
/// and samples a [TweenSpec] along the way. This is the clock inside every
/// tween-driven feedback.
///
/// The play direction is latched when play starts, so flipping
/// [TimedActionCore::set_direction()] mid-flight affects only the next play.
#[derive(Clone, Debug, Builder, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(rename_all = "kebab-case")]
pub struct TimedActionCore {
    /// How long one run lasts. Zero means apply the end value at once.
    #[derivative(Default(value = "Seconds(1.0)"))]
    duration: Seconds,

    /// Which end to start from.
    direction: Direction,

    /// Which part of each [FrameDelta] to consume.
    timescale_mode: TimescaleMode,

    /// The curve sampled along the way.
    #[builder(setter(into))]
    tween: TweenSpec,

    #[serde(skip)]
    #[builder(setter(skip))]
    e: TimedActionCoreEphemerals,
}
#[derive(Clone, Debug, Default)]
pub struct TimedActionCoreEphemerals {
    state: ActionState,
    elapsed: KahanSum<f64>,
    direction: Direction,
}
#[allow(missing_docs)]
impl TimedActionCore {
    // Absorbs the rounding left over after summing many frame deltas.
    const END_EPSILON: f64 = 1e-9;

    pub fn new_with(duration: Seconds, tween: impl Into<TweenSpec>) -> Self {
        Self {
            duration,
            tween: tween.into(),
            ..Default::default()
        }
    }

    pub fn duration(&self) -> Seconds {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Seconds) {
        self.duration = duration;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn timescale_mode(&self) -> TimescaleMode {
        self.timescale_mode
    }

    pub fn set_timescale_mode(&mut self, timescale_mode: TimescaleMode) {
        self.timescale_mode = timescale_mode;
    }

    pub fn tween(&self) -> &TweenSpec {
        &self.tween
    }

    pub fn set_tween(&mut self, tween: impl Into<TweenSpec>) {
        self.tween = tween.into();
    }

    pub fn state(&self) -> ActionState {
        self.e.state
    }

    /// Playing or paused.
    pub fn is_playing(&self) -> bool {
        self.e.state != ActionState::Idle
    }

    pub fn is_paused(&self) -> bool {
        self.e.state == ActionState::Paused
    }

    /// Time elapsed within the current run, counted from the start of the
    /// curve regardless of direction.
    pub fn elapsed(&self) -> Seconds {
        Seconds(self.e.elapsed.sum())
    }

    /// Elapsed time as a fraction of the duration.
    pub fn progress(&self) -> f64 {
        if self.duration.is_empty() {
            self.terminal_progress()
        } else {
            (self.e.elapsed.sum() / self.duration.0).clamp(0.0, 1.0)
        }
    }

    /// The curve value at the current position.
    pub fn sample(&self) -> f64 {
        self.tween.evaluate(self.progress())
    }

    /// Starts a run in the configured direction.
    pub fn play(&mut self) -> ActionStep {
        self.play_in(self.direction)
    }

    /// Starts a run in the given direction. A run that's already in flight
    /// restarts.
    pub fn play_in(&mut self, direction: Direction) -> ActionStep {
        self.e.direction = direction;
        if self.duration.is_empty() {
            if self.duration.0 < 0.0 {
                debug!("{}", FeedbackError::InvalidDuration(self.duration.0));
            }
            return self.finish();
        }
        let start = match direction {
            Direction::Forward => 0.0,
            Direction::Backward => self.duration.0,
        };
        self.e.elapsed = KahanSum::new_with_value(start);
        self.e.state = ActionState::Playing;
        ActionStep::Running(self.sample())
    }

    /// Advances by one frame.
    pub fn tick(&mut self, delta: &FrameDelta) -> ActionStep {
        if self.e.state != ActionState::Playing {
            return ActionStep::Idle;
        }
        let dt = delta.for_mode(self.timescale_mode).0;
        match self.e.direction {
            Direction::Forward => self.e.elapsed += dt,
            Direction::Backward => self.e.elapsed += -dt,
        }
        let elapsed = self.e.elapsed.sum();
        let reached_end = match self.e.direction {
            Direction::Forward => elapsed >= self.duration.0 - Self::END_EPSILON,
            Direction::Backward => elapsed <= Self::END_EPSILON,
        };
        if reached_end {
            self.finish()
        } else {
            ActionStep::Running(self.sample())
        }
    }

    /// Freezes at the current position. Returns whether anything changed.
    pub fn pause(&mut self) -> bool {
        if self.e.state == ActionState::Playing {
            self.e.state = ActionState::Paused;
            true
        } else {
            false
        }
    }

    /// Picks up where [TimedActionCore::pause()] left off.
    pub fn resume(&mut self) -> bool {
        if self.e.state == ActionState::Paused {
            self.e.state = ActionState::Playing;
            true
        } else {
            false
        }
    }

    /// Cancels the run without touching the elapsed time. Idempotent.
    pub fn stop(&mut self) {
        self.e.state = ActionState::Idle;
    }

    /// Jumps straight to the end of a run in progress.
    pub fn skip_to_end(&mut self) -> ActionStep {
        if self.is_playing() {
            self.finish()
        } else {
            ActionStep::Idle
        }
    }

    fn terminal_progress(&self) -> f64 {
        match self.e.direction {
            Direction::Forward => 1.0,
            Direction::Backward => 0.0,
        }
    }

    fn finish(&mut self) -> ActionStep {
        self.e.elapsed =
            KahanSum::new_with_value(self.terminal_progress() * self.duration.0.max(0.0));
        self.e.state = ActionState::Idle;
        ActionStep::Finished(self.tween.evaluate(self.terminal_progress()))
    }
}

// Copyright (c) 2024 Mike Tsao

use super::{ActionStep, TimedActionCore};
use crate::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// How a curve value `c` (already scaled by intensity) turns into the value
/// written to the target.
#[derive(
    Clone, Copy, Debug, Default, Display, EnumIter, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TweenMode {
    /// `lerp(from, to, c)`.
    #[default]
    Absolute,
    /// `initial + lerp(from, to, c)`, where `initial` is the target's value
    /// when play started.
    Relative,
    /// Adds `to * c` on top of whatever else writes the target, without
    /// owning it. Each frame removes the previous frame's contribution.
    Additive,
    /// `lerp(initial, to, c)`.
    ToDestination,
}

/// Drives a [Property] of type `V` with a [TimedActionCore]. The binding
/// lives with the caller and is passed in on each call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(
    rename_all = "kebab-case",
    bound(serialize = "V: Serialize", deserialize = "V: Deserialize<'de>")
)]
pub struct ValueTweenCore<V: Tweenable> {
    action: TimedActionCore,
    mode: TweenMode,
    from: V,
    to: V,
    #[serde(default)]
    axes: AxisMask,

    #[serde(skip)]
    e: ValueTweenCoreEphemerals<V>,
}
#[derive(Clone, Debug)]
pub struct ValueTweenCoreEphemerals<V> {
    initial: Option<V>,
    contribution: V,
    intensity: f64,
}
impl<V: Tweenable> Default for ValueTweenCoreEphemerals<V> {
    fn default() -> Self {
        Self {
            initial: None,
            contribution: V::zero(),
            intensity: 1.0,
        }
    }
}
#[allow(missing_docs)]
impl<V: Tweenable> ValueTweenCore<V> {
    pub fn new_with(action: TimedActionCore, mode: TweenMode, from: V, to: V) -> Self {
        Self {
            action,
            mode,
            from,
            to,
            axes: AxisMask::default(),
            e: Default::default(),
        }
    }

    /// The same core restricted to the given axes.
    pub fn with_axes(mut self, axes: AxisMask) -> Self {
        self.axes = axes;
        self
    }

    pub fn action(&self) -> &TimedActionCore {
        &self.action
    }

    pub fn action_mut(&mut self) -> &mut TimedActionCore {
        &mut self.action
    }

    pub fn mode(&self) -> TweenMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TweenMode) {
        self.mode = mode;
    }

    pub fn from_value(&self) -> V {
        self.from
    }

    pub fn to_value(&self) -> V {
        self.to
    }

    pub fn set_endpoints(&mut self, from: V, to: V) {
        self.from = from;
        self.to = to;
    }

    pub fn axes(&self) -> AxisMask {
        self.axes
    }

    /// The target's value as captured at initialization or the last play.
    pub fn initial(&self) -> Option<V> {
        self.e.initial
    }

    pub fn is_playing(&self) -> bool {
        self.action.is_playing()
    }

    /// Records the target's current value as the one to restore to.
    pub fn initialize(&mut self, binding: &PropertyBinding<V>) -> Result<(), FeedbackError> {
        self.e.initial = Some(binding.get()?);
        Ok(())
    }

    /// Starts a run, capturing the target's current value first.
    pub fn play(
        &mut self,
        binding: &mut PropertyBinding<V>,
        intensity: f64,
        direction: Direction,
    ) -> Result<(), FeedbackError> {
        self.e.initial = Some(binding.get()?);
        self.e.contribution = V::zero();
        self.e.intensity = intensity;
        let step = self.action.play_in(direction);
        self.apply(binding, step)
    }

    /// Advances one frame and writes the target. Time keeps passing even
    /// when the write fails.
    pub fn tick(
        &mut self,
        binding: &mut PropertyBinding<V>,
        delta: &FrameDelta,
    ) -> Result<(), FeedbackError> {
        let step = self.action.tick(delta);
        self.apply(binding, step)
    }

    pub fn pause(&mut self) -> bool {
        self.action.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.action.resume()
    }

    /// Cancels the run. With `reset`, also puts the target back to its
    /// initial value.
    pub fn stop(
        &mut self,
        binding: &mut PropertyBinding<V>,
        reset: bool,
    ) -> Result<(), FeedbackError> {
        self.action.stop();
        if reset {
            self.restore_initial_values(binding)
        } else {
            Ok(())
        }
    }

    /// Writes the end value of the run in progress and stops.
    pub fn skip_to_end(&mut self, binding: &mut PropertyBinding<V>) -> Result<(), FeedbackError> {
        let step = self.action.skip_to_end();
        self.apply(binding, step)
    }

    pub fn restore_initial_values(
        &mut self,
        binding: &mut PropertyBinding<V>,
    ) -> Result<(), FeedbackError> {
        if let Some(initial) = self.e.initial {
            self.e.contribution = V::zero();
            binding.set(initial)
        } else {
            Ok(())
        }
    }

    /// The value a curve value `c` maps to, given the target's value at
    /// play time and its value right now.
    fn value_for(&self, c: f64, initial: V, current: V) -> V {
        let k = c * self.e.intensity;
        match self.mode {
            TweenMode::Absolute => self.from.lerp(self.to, k),
            TweenMode::Relative => initial + self.from.lerp(self.to, k),
            TweenMode::ToDestination => initial.lerp(self.to, k),
            TweenMode::Additive => current + (self.to * k - self.e.contribution),
        }
    }

    fn apply(
        &mut self,
        binding: &mut PropertyBinding<V>,
        step: ActionStep,
    ) -> Result<(), FeedbackError> {
        let (Some(c), Some(initial)) = (step.value(), self.e.initial) else {
            return Ok(());
        };
        let value = if self.mode == TweenMode::Additive {
            let current = binding.get()?;
            let value = self.value_for(c, initial, current);
            self.e.contribution = self.to * (c * self.e.intensity);
            value.with_axes(current, self.axes)
        } else {
            self.value_for(c, initial, initial)
                .with_axes(initial, self.axes)
        };
        binding.set(value)
    }
}

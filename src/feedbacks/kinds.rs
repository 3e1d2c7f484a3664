// Copyright (c) 2024 Mike Tsao

//! The closed set of feedback kinds, and the payload each one carries.

use crate::{
    orchestration::{FeedbackEffect, ShakeEvent, ShakePhase, TimeScaleRequest},
    prelude::*,
    util::Rng,
};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};
use strum_macros::{Display, EnumCount, EnumIter, IntoStaticStr};

/// Names each [FeedbackKind] without its payload. The
/// [KindRegistry](crate::orchestration::KindRegistry) enables and disables
/// kinds by tag.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumCount,
    EnumIter,
    Eq,
    Hash,
    IntoStaticStr,
    PartialEq,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[allow(missing_docs)]
pub enum FeedbackKindTag {
    Float,
    Vector,
    Color,
    Spring,
    TimeScale,
    Broadcast,
    Pause,
    HoldingPause,
    LoopStart,
    Looper,
}

/// What a spring feedback does to its spring when played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpringAction {
    /// Heads for this target. Intensity scales how far along the way from
    /// the current target it goes.
    MoveTo(Vector),
    /// Shifts the target by this offset, scaled by intensity.
    MoveToAdditive(Vector),
    /// Heads for a random target drawn per axis from the range.
    MoveToRandom {
        #[allow(missing_docs)]
        min: Vector,
        #[allow(missing_docs)]
        max: Vector,
    },
    /// Adds this velocity, scaled by intensity.
    Bump(Vector),
    /// Adds a random velocity drawn per axis from the range.
    BumpRandom {
        #[allow(missing_docs)]
        min: Vector,
        #[allow(missing_docs)]
        max: Vector,
    },
    /// Heads back to the value captured when the spring was first played.
    #[default]
    RestoreInitial,
}

/// A spring-driven motion on a [Vector] target.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpringMotion {
    spring: SpringCore,
    action: SpringAction,

    #[serde(skip)]
    e: SpringMotionEphemerals,
}
#[derive(Clone, Debug, Default)]
pub struct SpringMotionEphemerals {
    initial: Option<Vector>,
}
#[allow(missing_docs)]
impl SpringMotion {
    pub fn new_with(spring: SpringCore, action: SpringAction) -> Self {
        Self {
            spring,
            action,
            e: Default::default(),
        }
    }

    pub fn spring(&self) -> &SpringCore {
        &self.spring
    }

    pub fn action(&self) -> SpringAction {
        self.action
    }

    pub fn set_action(&mut self, action: SpringAction) {
        self.action = action;
    }

    pub fn is_running(&self) -> bool {
        !self.spring.is_at_rest()
    }

    fn initialize(&mut self, binding: &PropertyBinding<Vector>) -> Result<(), FeedbackError> {
        let value = binding.get()?;
        self.e.initial = Some(value);
        self.spring.teleport(value);
        Ok(())
    }

    fn play(
        &mut self,
        binding: &mut PropertyBinding<Vector>,
        intensity: f64,
        rng: &mut Rng,
    ) -> Result<(), FeedbackError> {
        let current = binding.get()?;
        let initial = *self.e.initial.get_or_insert(current);
        if self.spring.is_at_rest() {
            // Someone else may have moved the target while we were idle.
            self.spring.teleport(current);
        }
        match self.action {
            SpringAction::MoveTo(target) => {
                self.spring
                    .move_to(self.spring.target().lerp(target, intensity));
            }
            SpringAction::MoveToAdditive(offset) => {
                self.spring.move_to_additive(offset * intensity)
            }
            SpringAction::MoveToRandom { min, max } => {
                let target = rng.rand_vector(min, max);
                self.spring
                    .move_to(self.spring.target().lerp(target, intensity));
            }
            SpringAction::Bump(impulse) => self.spring.bump(impulse * intensity),
            SpringAction::BumpRandom { min, max } => {
                let impulse = rng.rand_vector(min, max);
                self.spring.bump(impulse * intensity);
            }
            SpringAction::RestoreInitial => self.spring.move_to(initial),
        }
        Ok(())
    }

    fn tick(
        &mut self,
        binding: &mut PropertyBinding<Vector>,
        dt: Seconds,
    ) -> Result<(), FeedbackError> {
        if self.spring.is_at_rest() {
            return Ok(());
        }
        self.spring.step(dt.0);
        binding.set(self.spring.current())
    }

    fn stop(
        &mut self,
        binding: &mut PropertyBinding<Vector>,
        reset: bool,
    ) -> Result<(), FeedbackError> {
        self.spring.halt();
        if reset {
            self.restore_initial_values(binding)
        } else {
            Ok(())
        }
    }

    fn skip_to_end(&mut self, binding: &mut PropertyBinding<Vector>) -> Result<(), FeedbackError> {
        if self.spring.is_at_rest() {
            return Ok(());
        }
        self.spring.settle();
        binding.set(self.spring.current())
    }

    fn restore_initial_values(
        &mut self,
        binding: &mut PropertyBinding<Vector>,
    ) -> Result<(), FeedbackError> {
        if let Some(initial) = self.e.initial {
            self.spring.teleport(initial);
            binding.set(initial)
        } else {
            Ok(())
        }
    }
}

/// Whether a [TimeScaleChange] sets or clears the override.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeScaleAction {
    #[default]
    Change,
    Reset,
}

/// Asks the host to slow down, speed up, or freeze time. Stays "running"
/// for as long as the override lasts, counted in unscaled time.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct TimeScaleChange {
    action: TimeScaleAction,
    #[derivative(Default(value = "0.5"))]
    time_scale: f64,
    /// Empty means the override lasts until something resets it.
    #[derivative(Default(value = "Seconds(1.0)"))]
    duration: Seconds,
    lerp_speed: Option<f64>,

    #[serde(skip)]
    e: TimeScaleChangeEphemerals,
}
#[derive(Clone, Debug, Default)]
pub struct TimeScaleChangeEphemerals {
    remaining: TimedRemainder,
    // Set while an open-ended override from this change may still be in
    // effect.
    is_holding: bool,
}
#[allow(missing_docs)]
impl TimeScaleChange {
    pub fn new_with(time_scale: f64, duration: Seconds) -> Self {
        Self {
            time_scale,
            duration,
            ..Default::default()
        }
    }

    pub fn reset() -> Self {
        Self {
            action: TimeScaleAction::Reset,
            duration: Seconds::zero(),
            ..Default::default()
        }
    }

    /// The same change, but easing toward the new scale.
    pub fn with_lerp_speed(mut self, lerp_speed: f64) -> Self {
        self.lerp_speed = Some(lerp_speed);
        self
    }

    pub fn action(&self) -> TimeScaleAction {
        self.action
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn duration(&self) -> Seconds {
        match self.action {
            TimeScaleAction::Change => self.duration,
            TimeScaleAction::Reset => Seconds::zero(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.e.remaining.is_running()
    }

    /// Whether this change set an open-ended override that nothing has
    /// released yet.
    pub fn is_holding(&self) -> bool {
        self.e.is_holding
    }

    fn start(&mut self, effects: &mut Vec<FeedbackEffect>) {
        match self.action {
            TimeScaleAction::Change => {
                effects.push(FeedbackEffect::TimeScale(TimeScaleRequest {
                    scale: self.time_scale,
                    duration: (!self.duration.is_empty()).then_some(self.duration),
                    lerp_speed: self.lerp_speed,
                }));
                self.e.remaining.start(self.duration);
                self.e.is_holding = self.duration.is_empty();
            }
            TimeScaleAction::Reset => effects.push(FeedbackEffect::ResetTimeScale),
        }
    }

    /// Ends a timed override early. An open-ended one is handed back to the
    /// scheduler, which ends it only if it is still the override in effect.
    fn stop(&mut self, effects: &mut Vec<FeedbackEffect>) {
        if self.e.remaining.is_running() {
            effects.push(FeedbackEffect::ResetTimeScale);
        } else if self.e.is_holding {
            effects.push(FeedbackEffect::ReleaseTimeScale);
        }
        self.e.remaining.clear();
        self.e.is_holding = false;
    }

    fn skip_to_end(&mut self, effects: &mut Vec<FeedbackEffect>) {
        if self.e.remaining.is_running() {
            effects.push(FeedbackEffect::ResetTimeScale);
        }
        self.e.remaining.clear();
    }
}

/// Broadcasts a shake on a channel. Listeners do the shaking.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct ShakeBroadcast {
    channel: u32,
    #[derivative(Default(value = "Seconds(0.5)"))]
    duration: Seconds,
    #[derivative(Default(value = "1.0"))]
    amplitude: f64,

    #[serde(skip)]
    e: TimedRemainder,
}
#[allow(missing_docs)]
impl ShakeBroadcast {
    pub fn new_with(channel: u32, duration: Seconds, amplitude: f64) -> Self {
        Self {
            channel,
            duration,
            amplitude,
            e: Default::default(),
        }
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    pub fn duration(&self) -> Seconds {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.e.is_running()
    }

    fn event(&self, position: Vector, intensity: f64, phase: ShakePhase) -> FeedbackEffect {
        FeedbackEffect::Shake(ShakeEvent {
            channel: self.channel,
            position,
            intensity: self.amplitude * intensity,
            duration: self.duration,
            phase,
        })
    }

    fn start(&mut self, position: Vector, intensity: f64, effects: &mut Vec<FeedbackEffect>) {
        effects.push(self.event(position, intensity, ShakePhase::Start));
        self.e.start(self.duration);
    }

    fn stop(&mut self, position: Vector, intensity: f64, effects: &mut Vec<FeedbackEffect>) {
        if self.e.is_running() {
            effects.push(self.event(position, intensity, ShakePhase::Stop));
        }
        self.e.clear();
    }
}

/// Counts down the rest of a fixed-length run.
#[derive(Clone, Debug, Default)]
pub struct TimedRemainder(Seconds);
impl TimedRemainder {
    fn start(&mut self, duration: Seconds) {
        self.0 = if duration.is_empty() {
            Seconds::zero()
        } else {
            duration
        };
    }

    fn tick(&mut self, dt: Seconds) {
        self.0 = self.0.minus(dt);
    }

    fn clear(&mut self) {
        self.0 = Seconds::zero();
    }

    fn is_running(&self) -> bool {
        !self.0.is_empty()
    }
}

/// Stops the sequence head for a while. With `script_driven`, it waits for
/// [FeedbackPlayer::resume()](crate::orchestration::FeedbackPlayer::resume)
/// instead, optionally giving up after `auto_resume_after`.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct PauseMarker {
    #[derivative(Default(value = "Seconds(1.0)"))]
    duration: Seconds,
    script_driven: bool,
    auto_resume_after: Option<Seconds>,
}
#[allow(missing_docs)]
impl PauseMarker {
    pub fn new_with(duration: Seconds) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    pub fn script_driven(auto_resume_after: Option<Seconds>) -> Self {
        Self {
            script_driven: true,
            auto_resume_after,
            ..Default::default()
        }
    }

    pub fn duration(&self) -> Seconds {
        self.duration
    }

    pub fn is_script_driven(&self) -> bool {
        self.script_driven
    }

    pub fn auto_resume_after(&self) -> Option<Seconds> {
        self.auto_resume_after
    }
}

/// Stops the sequence head until everything before it has finished, and at
/// least `duration` has passed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HoldingPauseMarker {
    duration: Seconds,
}
#[allow(missing_docs)]
impl HoldingPauseMarker {
    pub fn new_with(duration: Seconds) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Seconds {
        self.duration
    }
}

/// Sends the sequence head back to the nearest preceding loop start (or the
/// beginning), `number_of_loops` times or forever.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoopMarker {
    #[derivative(Default(value = "1"))]
    number_of_loops: u32,
    infinite: bool,
    pause_before_loop: Seconds,
}
#[allow(missing_docs)]
impl LoopMarker {
    pub fn new_with(number_of_loops: u32) -> Self {
        Self {
            number_of_loops,
            ..Default::default()
        }
    }

    pub fn infinite() -> Self {
        Self {
            infinite: true,
            ..Default::default()
        }
    }

    /// The same marker, waiting before each jump.
    pub fn with_pause(mut self, pause_before_loop: Seconds) -> Self {
        self.pause_before_loop = pause_before_loop;
        self
    }

    pub fn number_of_loops(&self) -> u32 {
        self.number_of_loops
    }

    pub fn is_infinite(&self) -> bool {
        self.infinite
    }

    pub fn pause_before_loop(&self) -> Seconds {
        self.pause_before_loop
    }
}

/// Every kind of feedback, each with its payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackKind {
    /// Tweens a float property.
    Float(ValueTweenCore<f64>),
    /// Tweens a vector property (position, scale, rotation).
    Vector(ValueTweenCore<Vector>),
    /// Tweens a color property.
    Color(ValueTweenCore<Color>),
    /// Drives a vector property with a spring.
    Spring(SpringMotion),
    /// Changes the global time scale.
    TimeScale(TimeScaleChange),
    /// Broadcasts a shake event.
    Broadcast(ShakeBroadcast),
    /// Sequence marker: wait.
    Pause(PauseMarker),
    /// Sequence marker: wait for earlier feedbacks.
    HoldingPause(HoldingPauseMarker),
    /// Sequence marker: where loops jump back to.
    LoopStart,
    /// Sequence marker: jump back.
    Looper(LoopMarker),
}

/// Per-run inputs that kinds need beyond their own payload.
pub(crate) struct RunContext<'a> {
    pub(crate) position: Vector,
    pub(crate) intensity: f64,
    pub(crate) direction: Direction,
    pub(crate) rng: &'a mut Rng,
    pub(crate) effects: &'a mut Vec<FeedbackEffect>,
}

#[allow(missing_docs)]
impl FeedbackKind {
    pub fn tag(&self) -> FeedbackKindTag {
        match self {
            FeedbackKind::Float(_) => FeedbackKindTag::Float,
            FeedbackKind::Vector(_) => FeedbackKindTag::Vector,
            FeedbackKind::Color(_) => FeedbackKindTag::Color,
            FeedbackKind::Spring(_) => FeedbackKindTag::Spring,
            FeedbackKind::TimeScale(_) => FeedbackKindTag::TimeScale,
            FeedbackKind::Broadcast(_) => FeedbackKindTag::Broadcast,
            FeedbackKind::Pause(_) => FeedbackKindTag::Pause,
            FeedbackKind::HoldingPause(_) => FeedbackKindTag::HoldingPause,
            FeedbackKind::LoopStart => FeedbackKindTag::LoopStart,
            FeedbackKind::Looper(_) => FeedbackKindTag::Looper,
        }
    }

    /// Markers steer the sequence instead of doing anything themselves.
    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            FeedbackKind::Pause(_)
                | FeedbackKind::HoldingPause(_)
                | FeedbackKind::LoopStart
                | FeedbackKind::Looper(_)
        )
    }

    /// The kind of [Target] this kind drives, if any.
    pub fn target_kind(&self) -> Option<&'static str> {
        match self {
            FeedbackKind::Float(_) => Some(Target::FLOAT),
            FeedbackKind::Vector(_) | FeedbackKind::Spring(_) => Some(Target::VECTOR),
            FeedbackKind::Color(_) => Some(Target::COLOR),
            _ => None,
        }
    }

    /// How long one run lasts. Springs settle on their own schedule and
    /// report zero.
    pub fn duration(&self) -> Seconds {
        let d = match self {
            FeedbackKind::Float(core) => core.action().duration(),
            FeedbackKind::Vector(core) => core.action().duration(),
            FeedbackKind::Color(core) => core.action().duration(),
            FeedbackKind::Spring(_) => Seconds::zero(),
            FeedbackKind::TimeScale(change) => change.duration(),
            FeedbackKind::Broadcast(broadcast) => broadcast.duration(),
            FeedbackKind::Pause(pause) => {
                if pause.is_script_driven() {
                    pause.auto_resume_after().unwrap_or_default()
                } else {
                    pause.duration()
                }
            }
            FeedbackKind::HoldingPause(hold) => hold.duration(),
            FeedbackKind::LoopStart => Seconds::zero(),
            FeedbackKind::Looper(looper) => looper.pause_before_loop(),
        };
        if d.is_empty() {
            Seconds::zero()
        } else {
            d
        }
    }

    pub fn is_running(&self) -> bool {
        match self {
            FeedbackKind::Float(core) => core.is_playing(),
            FeedbackKind::Vector(core) => core.is_playing(),
            FeedbackKind::Color(core) => core.is_playing(),
            FeedbackKind::Spring(motion) => motion.is_running(),
            FeedbackKind::TimeScale(change) => change.is_running(),
            FeedbackKind::Broadcast(broadcast) => broadcast.is_running(),
            _ => false,
        }
    }

    pub(crate) fn initialize(&mut self, target: &Target) -> Result<(), FeedbackError> {
        match (self, target) {
            (FeedbackKind::Float(core), Target::Float(b)) => core.initialize(b),
            (FeedbackKind::Vector(core), Target::Vector(b)) => core.initialize(b),
            (FeedbackKind::Color(core), Target::Color(b)) => core.initialize(b),
            (FeedbackKind::Spring(motion), Target::Vector(b)) => motion.initialize(b),
            _ => Ok(()),
        }
    }

    pub(crate) fn start(
        &mut self,
        target: &mut Target,
        ctx: &mut RunContext,
    ) -> Result<(), FeedbackError> {
        match (self, target) {
            (FeedbackKind::Float(core), Target::Float(b)) => {
                core.play(b, ctx.intensity, ctx.direction)
            }
            (FeedbackKind::Vector(core), Target::Vector(b)) => {
                core.play(b, ctx.intensity, ctx.direction)
            }
            (FeedbackKind::Color(core), Target::Color(b)) => {
                core.play(b, ctx.intensity, ctx.direction)
            }
            (FeedbackKind::Spring(motion), Target::Vector(b)) => {
                motion.play(b, ctx.intensity, ctx.rng)
            }
            (
                FeedbackKind::Float(_)
                | FeedbackKind::Vector(_)
                | FeedbackKind::Color(_)
                | FeedbackKind::Spring(_),
                _,
            ) => Err(FeedbackError::MissingTarget),
            (FeedbackKind::TimeScale(change), _) => {
                change.start(ctx.effects);
                Ok(())
            }
            (FeedbackKind::Broadcast(broadcast), _) => {
                broadcast.start(ctx.position, ctx.intensity, ctx.effects);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Advances one frame. Tweens and springs consume the part of `delta`
    /// that `mode` selects; time-scale changes always count unscaled time.
    pub(crate) fn tick(
        &mut self,
        target: &mut Target,
        delta: &FrameDelta,
        mode: TimescaleMode,
    ) -> Result<(), FeedbackError> {
        let local = FrameDelta::uniform(delta.for_mode(mode));
        match (self, target) {
            (FeedbackKind::Float(core), Target::Float(b)) => core.tick(b, &local),
            (FeedbackKind::Vector(core), Target::Vector(b)) => core.tick(b, &local),
            (FeedbackKind::Color(core), Target::Color(b)) => core.tick(b, &local),
            (FeedbackKind::Spring(motion), Target::Vector(b)) => motion.tick(b, local.scaled),
            (FeedbackKind::TimeScale(change), _) => {
                change.e.remaining.tick(delta.unscaled);
                Ok(())
            }
            (FeedbackKind::Broadcast(broadcast), _) => {
                broadcast.e.tick(local.scaled);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn stop(
        &mut self,
        target: &mut Target,
        reset: bool,
        ctx: &mut RunContext,
    ) -> Result<(), FeedbackError> {
        match (self, target) {
            (FeedbackKind::Float(core), Target::Float(b)) => core.stop(b, reset),
            (FeedbackKind::Vector(core), Target::Vector(b)) => core.stop(b, reset),
            (FeedbackKind::Color(core), Target::Color(b)) => core.stop(b, reset),
            (FeedbackKind::Spring(motion), Target::Vector(b)) => motion.stop(b, reset),
            (FeedbackKind::TimeScale(change), _) => {
                change.stop(ctx.effects);
                Ok(())
            }
            (FeedbackKind::Broadcast(broadcast), _) => {
                broadcast.stop(ctx.position, ctx.intensity, ctx.effects);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn skip_to_end(
        &mut self,
        target: &mut Target,
        ctx: &mut RunContext,
    ) -> Result<(), FeedbackError> {
        match (self, target) {
            (FeedbackKind::Float(core), Target::Float(b)) => core.skip_to_end(b),
            (FeedbackKind::Vector(core), Target::Vector(b)) => core.skip_to_end(b),
            (FeedbackKind::Color(core), Target::Color(b)) => core.skip_to_end(b),
            (FeedbackKind::Spring(motion), Target::Vector(b)) => motion.skip_to_end(b),
            (FeedbackKind::TimeScale(change), _) => {
                change.skip_to_end(ctx.effects);
                Ok(())
            }
            (FeedbackKind::Broadcast(broadcast), _) => {
                broadcast.e.clear();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn restore_initial_values(
        &mut self,
        target: &mut Target,
        ctx: &mut RunContext,
    ) -> Result<(), FeedbackError> {
        match (self, target) {
            (FeedbackKind::Float(core), Target::Float(b)) => core.restore_initial_values(b),
            (FeedbackKind::Vector(core), Target::Vector(b)) => core.restore_initial_values(b),
            (FeedbackKind::Color(core), Target::Color(b)) => core.restore_initial_values(b),
            (FeedbackKind::Spring(motion), Target::Vector(b)) => motion.restore_initial_values(b),
            (FeedbackKind::TimeScale(_), _) => {
                ctx.effects.push(FeedbackEffect::ResetTimeScale);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Whether a finished run left something behind that a stop should
    /// still undo.
    pub fn is_holding(&self) -> bool {
        matches!(self, FeedbackKind::TimeScale(change) if change.is_holding())
    }
}

/// The host property a feedback writes, tagged by value type.
#[derive(Debug, Default)]
pub enum Target {
    /// Nothing bound.
    #[default]
    None,
    #[allow(missing_docs)]
    Float(PropertyBinding<f64>),
    #[allow(missing_docs)]
    Vector(PropertyBinding<Vector>),
    #[allow(missing_docs)]
    Color(PropertyBinding<Color>),
}
#[allow(missing_docs)]
impl Target {
    pub const FLOAT: &'static str = "float";
    pub const VECTOR: &'static str = "vector";
    pub const COLOR: &'static str = "color";

    /// What kind of value this target holds.
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Target::None => None,
            Target::Float(_) => Some(Self::FLOAT),
            Target::Vector(_) => Some(Self::VECTOR),
            Target::Color(_) => Some(Self::COLOR),
        }
    }
}

macro_rules! impl_target_from {
    ($variant:ident, $value:ty) => {
        impl From<PropertyBinding<$value>> for Target {
            fn from(binding: PropertyBinding<$value>) -> Self {
                Target::$variant(binding)
            }
        }
        impl From<Rc<RefCell<$value>>> for Target {
            fn from(value: Rc<RefCell<$value>>) -> Self {
                Target::$variant(PropertyBinding::from(value))
            }
        }
        impl From<Weak<RefCell<$value>>> for Target {
            fn from(value: Weak<RefCell<$value>>) -> Self {
                Target::$variant(PropertyBinding::from(value))
            }
        }
    };
}
impl_target_from!(Float, f64);
impl_target_from!(Vector, Vector);
impl_target_from!(Color, Color);

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn tags_match_kinds() {
        assert_eq!(FeedbackKindTag::COUNT, 10);
        assert_eq!(FeedbackKind::LoopStart.tag(), FeedbackKindTag::LoopStart);
        assert_eq!(
            FeedbackKind::TimeScale(TimeScaleChange::default()).tag(),
            FeedbackKindTag::TimeScale
        );
        assert_eq!(FeedbackKindTag::HoldingPause.to_string(), "holding-pause");
        let names: Vec<&'static str> = FeedbackKindTag::iter().map(|t| t.into()).collect();
        assert!(names.contains(&"time-scale"));
    }

    #[test]
    fn markers_are_markers() {
        assert!(FeedbackKind::LoopStart.is_marker());
        assert!(FeedbackKind::Looper(LoopMarker::default()).is_marker());
        assert!(!FeedbackKind::Broadcast(ShakeBroadcast::default()).is_marker());
    }

    #[test]
    fn time_scale_change_emits_and_counts_unscaled_time() {
        let mut kind = FeedbackKind::TimeScale(TimeScaleChange::new_with(0.0, Seconds(0.1)));
        let mut target = Target::None;
        let mut rng = Rng::new_with_seed(1);
        let mut effects = Vec::default();
        let mut ctx = RunContext {
            position: Vector::zeros(),
            intensity: 1.0,
            direction: Direction::Forward,
            rng: &mut rng,
            effects: &mut effects,
        };
        assert!(kind.start(&mut target, &mut ctx).is_ok());
        assert!(kind.is_running());

        // Scaled time is frozen, but the change still expires.
        assert!(kind
            .tick(&mut target, &FrameDelta::new(Seconds(0.1), 0.0), TimescaleMode::Scaled)
            .is_ok());
        assert!(!kind.is_running());
        assert_eq!(
            effects,
            vec![FeedbackEffect::TimeScale(TimeScaleRequest {
                scale: 0.0,
                duration: Some(Seconds(0.1)),
                lerp_speed: None,
            })]
        );
    }

    #[test]
    fn open_ended_time_scale_change_holds_until_stopped() {
        let mut kind = FeedbackKind::TimeScale(TimeScaleChange::new_with(0.0, Seconds::zero()));
        let mut target = Target::None;
        let mut rng = Rng::new_with_seed(1);
        let mut effects = Vec::default();
        let mut ctx = RunContext {
            position: Vector::zeros(),
            intensity: 1.0,
            direction: Direction::Forward,
            rng: &mut rng,
            effects: &mut effects,
        };
        assert!(kind.start(&mut target, &mut ctx).is_ok());
        assert!(!kind.is_running());
        assert!(kind.is_holding());
        assert!(kind.skip_to_end(&mut target, &mut ctx).is_ok());
        assert!(kind.is_holding(), "skipping leaves the override alone");
        assert!(kind.stop(&mut target, false, &mut ctx).is_ok());
        assert!(!kind.is_holding());
        assert!(kind.stop(&mut target, false, &mut ctx).is_ok());
        assert_eq!(
            effects,
            vec![
                FeedbackEffect::TimeScale(TimeScaleRequest {
                    scale: 0.0,
                    duration: None,
                    lerp_speed: None,
                }),
                FeedbackEffect::ReleaseTimeScale,
            ]
        );
    }

    #[test]
    fn tween_kind_without_target_reports_missing() {
        let mut kind = FeedbackKind::Float(ValueTweenCore::new_with(
            TimedActionCore::default(),
            TweenMode::Absolute,
            0.0,
            1.0,
        ));
        let mut rng = Rng::new_with_seed(1);
        let mut effects = Vec::default();
        let mut ctx = RunContext {
            position: Vector::zeros(),
            intensity: 1.0,
            direction: Direction::Forward,
            rng: &mut rng,
            effects: &mut effects,
        };
        assert_eq!(
            kind.start(&mut Target::None, &mut ctx),
            Err(FeedbackError::MissingTarget)
        );
        assert_eq!(kind.target_kind(), Some(Target::FLOAT));
    }

    #[test]
    fn spring_motion_bump_returns_home() {
        let host = Rc::new(RefCell::new(Vector::new(1.0, 2.0, 3.0)));
        let mut target = Target::from(Rc::clone(&host));
        let mut kind = FeedbackKind::Spring(SpringMotion::new_with(
            SpringCore::default(),
            SpringAction::Bump(Vector::new(0.0, 10.0, 0.0)),
        ));
        let mut rng = Rng::new_with_seed(1);
        let mut effects = Vec::default();
        let mut ctx = RunContext {
            position: Vector::zeros(),
            intensity: 1.0,
            direction: Direction::Forward,
            rng: &mut rng,
            effects: &mut effects,
        };
        assert!(kind.start(&mut target, &mut ctx).is_ok());
        assert!(kind.is_running());
        assert!(kind
            .tick(&mut target, &FrameDelta::uniform(Seconds(1.0 / 60.0)), TimescaleMode::Scaled)
            .is_ok());
        assert_ne!(*host.borrow(), Vector::new(1.0, 2.0, 3.0), "the bump moves the target");

        for _ in 0..10_000 {
            if !kind.is_running() {
                break;
            }
            assert!(kind
                .tick(&mut target, &FrameDelta::uniform(Seconds(1.0 / 60.0)), TimescaleMode::Scaled)
                .is_ok());
        }
        assert!(!kind.is_running());
        assert_eq!(*host.borrow(), Vector::new(1.0, 2.0, 3.0), "and it settles back");
    }
}

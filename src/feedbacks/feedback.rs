// Copyright (c) 2024 Mike Tsao

use super::{kinds::RunContext, FeedbackKind, FeedbackKindTag, FeedbackSettings, Target};
use crate::{orchestration::FeedbackEffect, prelude::*, util::Rng};
use derivative::Derivative;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

/// Where a feedback is between plays.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Phase {
    #[default]
    Idle,
    /// Waiting out the initial delay.
    Delaying(Seconds),
    /// The kind is running.
    Running,
    /// Waiting to start the next repeat.
    BetweenRepeats(Seconds),
}

/// One unit of game feel: a [FeedbackKind] plus the settings that decide
/// whether, when, and how often it runs.
///
/// A feedback doesn't keep time on its own. Something calls
/// [Plays::tick()] once per frame; usually that's the owning
/// [FeedbackPlayer](crate::orchestration::FeedbackPlayer).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Feedback {
    #[serde(default)]
    settings: FeedbackSettings,
    kind: FeedbackKind,

    #[serde(skip)]
    e: FeedbackEphemerals,
}
#[derive(Debug, Derivative)]
#[derivative(Default)]
pub struct FeedbackEphemerals {
    uid: Uid,
    target: Target,
    phase: Phase,
    is_paused: bool,
    // None means forever.
    #[derivative(Default(value = "Some(0)"))]
    repeats_left: Option<u32>,
    clock: Seconds,
    last_play: Option<Seconds>,
    #[derivative(Default(value = "Vector::zeros()"))]
    position: Vector,
    #[derivative(Default(value = "1.0"))]
    intensity: f64,
    player_direction: Direction,
    direction: Direction,
    effects: Vec<FeedbackEffect>,
    rng: Rng,
    has_warned: bool,
}
impl From<FeedbackKind> for Feedback {
    fn from(kind: FeedbackKind) -> Self {
        Self::new_with(kind)
    }
}
#[allow(missing_docs)]
impl Feedback {
    pub fn new_with(kind: FeedbackKind) -> Self {
        Self::new_with_settings(FeedbackSettings::default(), kind)
    }

    pub fn new_with_settings(settings: FeedbackSettings, kind: FeedbackKind) -> Self {
        Self {
            settings,
            kind,
            e: Default::default(),
        }
    }

    /// Binds the target and returns the feedback, for building in one
    /// expression.
    pub fn bound(mut self, target: impl Into<Target>) -> Result<Self, FeedbackError> {
        self.bind(target)?;
        Ok(self)
    }

    /// Connects the feedback to the host property it drives, and captures
    /// that property's current value as the one to restore to.
    pub fn bind(&mut self, target: impl Into<Target>) -> Result<(), FeedbackError> {
        let target = target.into();
        match (self.kind.target_kind(), target.kind()) {
            (Some(expected), Some(actual)) if expected != actual => {
                return Err(self.mismatch(actual));
            }
            (None, Some(actual)) => return Err(self.mismatch(actual)),
            _ => {}
        }
        if let Err(e) = self.kind.initialize(&target) {
            debug!("{}: can't capture initial value yet: {e}", self.name());
        }
        self.e.target = target;
        Ok(())
    }

    fn mismatch(&self, actual: &'static str) -> FeedbackError {
        FeedbackError::TargetKindMismatch {
            kind: self.tag().into(),
            target: actual,
        }
    }

    /// Drops the target. Later runs still keep time but write nothing.
    pub fn unbind(&mut self) {
        self.e.target = Target::None;
    }

    pub fn uid(&self) -> Uid {
        self.e.uid
    }

    pub fn set_uid(&mut self, uid: Uid) {
        self.e.uid = uid;
    }

    pub fn settings(&self) -> &FeedbackSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut FeedbackSettings {
        &mut self.settings
    }

    pub fn kind(&self) -> &FeedbackKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut FeedbackKind {
        &mut self.kind
    }

    /// Whether a stop would still undo something this feedback left in
    /// effect after finishing.
    pub fn is_holding(&self) -> bool {
        self.kind.is_holding()
    }

    pub fn tag(&self) -> FeedbackKindTag {
        self.kind.tag()
    }

    pub fn is_marker(&self) -> bool {
        self.kind.is_marker()
    }

    pub fn is_paused(&self) -> bool {
        self.e.is_paused
    }

    /// The label, or the kind name if there's no label.
    pub fn name(&self) -> &str {
        if self.settings.label.is_empty() {
            let tag: &'static str = self.tag().into();
            tag
        } else {
            &self.settings.label
        }
    }

    /// Tells the feedback which way its player is going. Direction
    /// conditions and [PlayDirection](super::PlayDirection) consult it.
    pub fn set_player_direction(&mut self, direction: Direction) {
        self.e.player_direction = direction;
    }

    /// Replaces the generator behind chance rolls and random spring
    /// targets, for reproducible runs.
    pub fn set_rng(&mut self, rng: Rng) {
        self.e.rng = rng;
    }

    /// Side effects queued since the last call.
    pub fn take_effects(&mut self) -> Vec<FeedbackEffect> {
        std::mem::take(&mut self.e.effects)
    }

    /// How long one run lasts.
    pub fn duration(&self) -> Seconds {
        self.kind.duration()
    }

    /// How long a play lasts from start to finish, including the initial
    /// delay, repeats, and the gaps between them.
    pub fn total_duration(&self) -> Seconds {
        let timing = &self.settings.timing;
        if timing.repeat_forever {
            return Seconds::infinite();
        }
        let repeats = timing.number_of_repeats as f64;
        Seconds(
            timing.initial_delay.0.max(0.0)
                + (repeats + 1.0) * self.duration().0
                + repeats * timing.delay_between_repeats.0.max(0.0),
        )
    }

    fn accepts_play(&mut self, intensity: f64) -> bool {
        let settings = &self.settings;
        if !settings.active {
            trace!("{}: inactive, ignoring play", self.name());
            return false;
        }
        if !settings
            .timing
            .direction_condition
            .allows(self.e.player_direction)
        {
            return false;
        }
        if let Some((min, max)) = settings.intensity_interval {
            if intensity < min || intensity > max {
                return false;
            }
        }
        if !settings.timing.cooldown.is_empty() {
            if let Some(last_play) = self.e.last_play {
                if self.e.clock.0 - last_play.0 < settings.timing.cooldown.0 {
                    trace!("{}: cooling down, ignoring play", self.name());
                    return false;
                }
            }
        }
        self.e.rng.roll(settings.chance)
    }

    fn with_kind<R>(
        &mut self,
        f: impl FnOnce(&mut FeedbackKind, &mut Target, &mut RunContext) -> R,
    ) -> R {
        let mut ctx = RunContext {
            position: self.e.position,
            intensity: self.e.intensity,
            direction: self.e.direction,
            rng: &mut self.e.rng,
            effects: &mut self.e.effects,
        };
        f(&mut self.kind, &mut self.e.target, &mut ctx)
    }

    // Warns at most once per play.
    fn report(&mut self, result: Result<(), FeedbackError>) {
        if let Err(e) = result {
            if !self.e.has_warned {
                warn!("{}: {e}", self.name());
                self.e.has_warned = true;
            }
        }
    }

    fn start_run(&mut self) {
        self.e.phase = Phase::Running;
        let result = self.with_kind(|kind, target, ctx| kind.start(target, ctx));
        self.report(result);
        if !self.kind.is_running() {
            self.finish_run();
        }
    }

    // Instant runs that repeat wait at least until the next tick, so a
    // zero-length repeat-forever feedback can't spin.
    fn finish_run(&mut self) {
        let delay = self.settings.timing.delay_between_repeats;
        self.e.phase = match self.e.repeats_left {
            None => Phase::BetweenRepeats(delay),
            Some(0) => Phase::Idle,
            Some(n) => {
                self.e.repeats_left = Some(n - 1);
                Phase::BetweenRepeats(delay)
            }
        };
    }
}
impl Plays for Feedback {
    fn play(&mut self, position: Vector, intensity: f64) {
        if !self.accepts_play(intensity) {
            return;
        }
        if self.is_playing() {
            if !self.settings.allow_additive_plays {
                debug!("{}: {}", self.name(), FeedbackError::ConcurrentPlayConflict);
                return;
            }
            let result = self.with_kind(|kind, target, ctx| kind.stop(target, false, ctx));
            self.report(result);
        }

        let timing = &self.settings.timing;
        self.e.last_play = Some(self.e.clock);
        self.e.position = position;
        self.e.intensity = if self.settings.use_intensity {
            intensity
        } else {
            1.0
        };
        self.e.direction = timing.play_direction.resolve(self.e.player_direction);
        self.e.repeats_left = if timing.repeat_forever {
            None
        } else {
            Some(timing.number_of_repeats)
        };
        self.e.is_paused = false;
        self.e.has_warned = false;

        if timing.initial_delay.is_empty() {
            self.start_run();
        } else {
            self.e.phase = Phase::Delaying(timing.initial_delay);
        }
    }

    fn stop(&mut self, position: Vector, intensity: f64) {
        let was_playing = self.is_playing();
        self.e.phase = Phase::Idle;
        self.e.is_paused = false;
        if !was_playing && !self.kind.is_holding() {
            return;
        }
        self.e.position = position;
        if self.settings.use_intensity {
            self.e.intensity = intensity;
        }
        let reset = self.settings.reset_on_stop;
        let result = self.with_kind(|kind, target, ctx| kind.stop(target, reset, ctx));
        self.report(result);
    }

    fn pause(&mut self) {
        if self.is_playing() {
            self.e.is_paused = true;
        }
    }

    fn resume(&mut self) {
        self.e.is_paused = false;
    }

    fn restore_initial_values(&mut self) {
        let result = self.with_kind(|kind, target, ctx| kind.restore_initial_values(target, ctx));
        self.report(result);
    }

    fn skip_to_end(&mut self) {
        if !self.is_playing() {
            return;
        }
        if self.e.phase != Phase::Running {
            self.start_run();
        }
        let result = self.with_kind(|kind, target, ctx| kind.skip_to_end(target, ctx));
        self.report(result);
        self.e.phase = Phase::Idle;
        self.e.is_paused = false;
    }

    fn tick(&mut self, delta: &FrameDelta) {
        let mode = self.settings.timing.timescale_mode;
        let dt = delta.for_mode(mode);
        self.e.clock = self.e.clock.plus(dt);
        if self.e.is_paused {
            return;
        }
        match self.e.phase {
            Phase::Idle => {}
            Phase::Delaying(remaining) => {
                let remaining = remaining.minus(dt);
                if remaining.is_empty() {
                    self.start_run();
                } else {
                    self.e.phase = Phase::Delaying(remaining);
                }
            }
            Phase::BetweenRepeats(remaining) => {
                let remaining = remaining.minus(dt);
                if remaining.is_empty() {
                    self.start_run();
                } else {
                    self.e.phase = Phase::BetweenRepeats(remaining);
                }
            }
            Phase::Running => {
                let result = self.with_kind(|kind, target, _| kind.tick(target, delta, mode));
                self.report(result);
                if !self.kind.is_running() {
                    self.finish_run();
                }
            }
        }
    }

    fn is_playing(&self) -> bool {
        self.e.phase != Phase::Idle
    }
}

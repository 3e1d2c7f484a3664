// Copyright (c) 2024 Mike Tsao

use super::{FeedbackEffect, KindRegistry, PlayerEvent, PlayerSignal};
use crate::{
    feedbacks::{Feedback, FeedbackKind},
    prelude::*,
    util::Rng,
};
use anyhow::Result;
use derivative::Derivative;
use derive_builder::Builder;
use log::{debug, trace};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Settings that apply to a whole [FeedbackPlayer].
#[derive(Clone, Debug, PartialEq, Builder, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(rename_all = "kebab-case", default)]
pub struct PlayerSettings {
    /// Forward plays the list top to bottom, Backward bottom to top.
    pub direction: Direction,
    /// Which clock the player's own delay and cooldown follow.
    pub timescale_mode: TimescaleMode,
    /// Wait this long after a play before starting the sequence.
    pub initial_delay: Seconds,
    /// Multiplies the intensity of every play.
    #[derivative(Default(value = "1.0"))]
    pub intensity: f64,
    /// Ignore plays that come sooner than this after the last accepted one.
    pub cooldown: Seconds,
    /// Whether a play while the sequence is running restarts it. Otherwise
    /// the play is ignored.
    #[derivative(Default(value = "true"))]
    pub can_play_while_playing: bool,
    /// Flip direction each time the sequence completes, so the next play
    /// runs the other way.
    pub auto_change_direction_on_end: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Phase {
    #[default]
    Idle,
    Delaying(Seconds),
    Running,
}

/// Why the sequence head isn't moving.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Hold {
    #[default]
    None,
    /// A pause marker. `None` waits for [Plays::resume()].
    Pause(Option<Seconds>),
    /// A holding pause at this cursor position.
    Holding { remaining: Seconds, at: usize },
    /// A looper waiting before its jump.
    LoopWait(Seconds),
}

// What the head should do with the feedback under it.
enum Step {
    Pause(Option<Seconds>),
    Holding(Seconds),
    LoopStart,
    Loop {
        infinite: bool,
        loops: u32,
        pause: Seconds,
    },
    Play,
}
impl From<&FeedbackKind> for Step {
    fn from(kind: &FeedbackKind) -> Self {
        match kind {
            FeedbackKind::Pause(pause) => Step::Pause(if pause.is_script_driven() {
                pause.auto_resume_after()
            } else {
                Some(pause.duration())
            }),
            FeedbackKind::HoldingPause(hold) => Step::Holding(hold.duration()),
            FeedbackKind::LoopStart => Step::LoopStart,
            FeedbackKind::Looper(looper) => Step::Loop {
                infinite: looper.is_infinite(),
                loops: looper.number_of_loops(),
                pause: looper.pause_before_loop(),
            },
            _ => Step::Play,
        }
    }
}

/// Plays an ordered list of [Feedback]s as one sequence.
///
/// Playing starts every feedback in the list in the same frame, except where
/// markers say otherwise: a pause marker makes the rest of the list wait, a
/// holding pause waits for everything before it to finish, and a looper
/// sends the head back to the nearest loop start before it.
///
/// The player queues [PlayerSignal]s as it goes. Call
/// [FeedbackPlayer::take_signals()] to collect them, or let a
/// [Scheduler](super::Scheduler) do it.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeedbackPlayer {
    #[serde(default)]
    settings: PlayerSettings,
    #[serde(default)]
    feedbacks: Vec<Feedback>,

    #[serde(skip)]
    e: FeedbackPlayerEphemerals,
}
#[derive(Debug, Derivative)]
#[derivative(Default)]
pub struct FeedbackPlayerEphemerals {
    uid: PlayerUid,
    uid_factory: UidFactory<Uid>,
    phase: Phase,
    hold: Hold,
    is_paused: bool,
    // None until something changes it from the configured direction.
    direction: Option<Direction>,
    // Indexes into `feedbacks`, in play order.
    order: Vec<usize>,
    cursor: usize,
    // Keyed by the looper's index in `feedbacks`.
    loops_left: FxHashMap<usize, u32>,
    clock: Seconds,
    last_play: Option<Seconds>,
    #[derivative(Default(value = "Vector::zeros()"))]
    position: Vector,
    #[derivative(Default(value = "1.0"))]
    intensity: f64,
    registry: KindRegistry,
    signals: Vec<PlayerSignal>,
}
#[allow(missing_docs)]
impl FeedbackPlayer {
    pub fn new_with(settings: PlayerSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Loads a player from JSON. Feedbacks come back unbound; bind them
    /// with [FeedbackPlayer::feedback_by_label_mut()] or
    /// [FeedbackPlayer::feedback_mut()].
    pub fn from_json(json: &str) -> Result<Self> {
        let mut player: Self = serde_json::from_str(json)?;
        player.assign_uids();
        Ok(player)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn assign_uids(&mut self) {
        for feedback in self.feedbacks.iter_mut() {
            feedback.set_uid(self.e.uid_factory.mint_next());
        }
    }

    pub fn uid(&self) -> PlayerUid {
        self.e.uid
    }

    pub fn set_uid(&mut self, uid: PlayerUid) {
        self.e.uid = uid;
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut PlayerSettings {
        &mut self.settings
    }

    /// Shares a [KindRegistry], usually the one owned by the scheduler.
    pub fn set_registry(&mut self, registry: KindRegistry) {
        self.e.registry = registry;
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.e.registry
    }

    /// Appends a feedback to the end of the list and returns its uid.
    pub fn add_feedback(&mut self, mut feedback: Feedback) -> Uid {
        let uid = self.e.uid_factory.mint_next();
        feedback.set_uid(uid);
        self.feedbacks.push(feedback);
        uid
    }

    /// Builder-style [FeedbackPlayer::add_feedback()].
    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.add_feedback(feedback);
        self
    }

    pub fn remove_feedback(&mut self, uid: Uid) -> Option<Feedback> {
        let index = self.feedbacks.iter().position(|f| f.uid() == uid)?;
        if self.is_playing() {
            self.stop_default();
        }
        Some(self.feedbacks.remove(index))
    }

    pub fn feedbacks(&self) -> &[Feedback] {
        &self.feedbacks
    }

    pub fn feedback(&self, uid: Uid) -> Option<&Feedback> {
        self.feedbacks.iter().find(|f| f.uid() == uid)
    }

    pub fn feedback_mut(&mut self, uid: Uid) -> Option<&mut Feedback> {
        self.feedbacks.iter_mut().find(|f| f.uid() == uid)
    }

    pub fn feedback_by_label_mut(&mut self, label: &str) -> Option<&mut Feedback> {
        self.feedbacks
            .iter_mut()
            .find(|f| f.settings().label == label)
    }

    /// Reseeds every feedback's generator from `seed`, for reproducible
    /// chance rolls and random spring targets.
    pub fn set_rng_seed(&mut self, seed: u128) {
        for (i, feedback) in self.feedbacks.iter_mut().enumerate() {
            feedback.set_rng(Rng::new_with_seed(seed.wrapping_add(i as u128)));
        }
    }

    pub fn direction(&self) -> Direction {
        self.e.direction.unwrap_or(self.settings.direction)
    }

    /// Takes effect at the next play.
    pub fn set_direction(&mut self, direction: Direction) {
        self.e.direction = Some(direction);
    }

    pub fn is_paused(&self) -> bool {
        self.e.is_paused
    }

    /// Whether the head is stopped at a script-driven pause, waiting for
    /// [Plays::resume()].
    pub fn is_waiting_for_resume(&self) -> bool {
        self.e.hold == Hold::Pause(None)
    }

    /// Everything queued since the last call, in order.
    pub fn take_signals(&mut self) -> Vec<PlayerSignal> {
        std::mem::take(&mut self.e.signals)
    }

    /// How long a play lasts if nothing is skipped or stopped and every
    /// feedback passes its chance roll. Infinite if anything loops or
    /// repeats forever. Script-driven pauses count only their automatic
    /// resume time.
    pub fn total_duration(&self) -> Seconds {
        let mut head = 0.0;
        let mut end: f64 = 0.0;
        let mut loop_start = 0.0;
        let mut segment_end: f64 = 0.0;
        for index in self.play_order() {
            let feedback = &self.feedbacks[index];
            match Step::from(feedback.kind()) {
                Step::Pause(duration) => head += duration.unwrap_or_default().0.max(0.0),
                Step::Holding(duration) => {
                    head = (head + duration.0.max(0.0)).max(end);
                }
                Step::LoopStart => {
                    loop_start = head;
                    segment_end = head;
                }
                Step::Loop {
                    infinite,
                    loops,
                    pause,
                } => {
                    if infinite {
                        return Seconds::infinite();
                    }
                    let segment = head - loop_start + pause.0.max(0.0);
                    end = end.max(segment_end + loops as f64 * segment);
                    head += loops as f64 * segment;
                }
                Step::Play => {
                    let total = feedback.total_duration();
                    if total.is_infinite() {
                        return total;
                    }
                    end = end.max(head + total.0);
                    segment_end = segment_end.max(head + total.0);
                }
            }
        }
        Seconds(self.settings.initial_delay.0.max(0.0) + end.max(head))
    }

    fn play_order(&self) -> Vec<usize> {
        let indexes = 0..self.feedbacks.len();
        match self.direction() {
            Direction::Forward => indexes.collect(),
            Direction::Backward => indexes.rev().collect(),
        }
    }

    fn push_event(&mut self, event: PlayerEvent) {
        trace!("player {}: {event}", self.e.uid);
        self.e.signals.push(PlayerSignal::Event(event));
    }

    fn collect_effects(&mut self) {
        for feedback in self.feedbacks.iter_mut() {
            self.e.signals.extend(
                feedback
                    .take_effects()
                    .into_iter()
                    .map(PlayerSignal::Effect),
            );
        }
    }

    fn any_playing_before(&self, cursor: usize) -> bool {
        self.e.order[..cursor.min(self.e.order.len())]
            .iter()
            .any(|&i| self.feedbacks[i].is_playing())
    }

    /// Moves the head as far as it can go this frame.
    fn advance(&mut self) {
        while self.e.hold == Hold::None && self.e.cursor < self.e.order.len() {
            let index = self.e.order[self.e.cursor];
            match Step::from(self.feedbacks[index].kind()) {
                Step::Pause(duration) => {
                    self.e.cursor += 1;
                    match duration {
                        Some(d) if d.is_empty() => {}
                        _ => self.e.hold = Hold::Pause(duration),
                    }
                }
                Step::Holding(duration) => {
                    let at = self.e.cursor;
                    self.e.cursor += 1;
                    if !duration.is_empty() || self.any_playing_before(at) {
                        self.e.hold = Hold::Holding {
                            remaining: duration,
                            at,
                        };
                    }
                }
                Step::LoopStart => self.e.cursor += 1,
                Step::Loop {
                    infinite,
                    loops,
                    pause,
                } => {
                    let should_jump = infinite || {
                        let left = self.e.loops_left.entry(index).or_insert(loops);
                        if *left > 0 {
                            *left -= 1;
                            true
                        } else {
                            // Re-arms if an outer loop brings the head back.
                            self.e.loops_left.remove(&index);
                            false
                        }
                    };
                    if !should_jump {
                        self.e.cursor += 1;
                    } else if pause.is_empty() {
                        // One jump per frame, so a loop of instant
                        // feedbacks can't spin forever inside one tick.
                        self.jump_back();
                        return;
                    } else {
                        self.e.hold = Hold::LoopWait(pause);
                    }
                }
                Step::Play => {
                    let feedback = &mut self.feedbacks[index];
                    if self.e.registry.is_authorized(feedback.tag()) {
                        feedback.play(self.e.position, self.e.intensity);
                    } else {
                        trace!("{}: kind disabled, skipping", feedback.name());
                    }
                    self.e.cursor += 1;
                }
            }
        }
    }

    /// Sends the head from the looper under it to the nearest loop start
    /// before it, or to the start of the sequence.
    fn jump_back(&mut self) {
        let destination = self.e.order[..self.e.cursor]
            .iter()
            .rposition(|&i| matches!(self.feedbacks[i].kind(), FeedbackKind::LoopStart))
            .unwrap_or(0);
        debug!(
            "player {}: looping from {} back to {destination}",
            self.e.uid, self.e.cursor
        );
        self.e.cursor = destination;
        self.push_event(PlayerEvent::Loop);
    }

    fn tick_hold(&mut self, dt: Seconds) {
        self.e.hold = match self.e.hold {
            Hold::None | Hold::Pause(None) => self.e.hold,
            Hold::Pause(Some(remaining)) => {
                let remaining = remaining.minus(dt);
                if remaining.is_empty() {
                    Hold::None
                } else {
                    Hold::Pause(Some(remaining))
                }
            }
            Hold::Holding { remaining, at } => {
                let remaining = if remaining.is_empty() {
                    Seconds::zero()
                } else {
                    remaining.minus(dt)
                };
                if remaining.is_empty() && !self.any_playing_before(at) {
                    Hold::None
                } else {
                    Hold::Holding { remaining, at }
                }
            }
            Hold::LoopWait(remaining) => {
                let remaining = remaining.minus(dt);
                if remaining.is_empty() {
                    self.e.hold = Hold::None;
                    self.jump_back();
                    Hold::None
                } else {
                    Hold::LoopWait(remaining)
                }
            }
        };
    }

    fn check_completion(&mut self) {
        if self.e.phase != Phase::Running
            || self.e.hold != Hold::None
            || self.e.cursor < self.e.order.len()
            || self.feedbacks.iter().any(|f| f.is_playing())
        {
            return;
        }
        self.e.phase = Phase::Idle;
        self.e.loops_left.clear();
        self.push_event(PlayerEvent::Complete);
        if self.settings.auto_change_direction_on_end {
            self.set_direction(self.direction().reversed());
            self.push_event(PlayerEvent::ChangeDirection);
        }
    }

    fn start_sequence(&mut self) {
        self.e.phase = Phase::Running;
        self.advance();
    }

    fn accepts_play(&self) -> bool {
        if !self.settings.cooldown.is_empty() {
            if let Some(last_play) = self.e.last_play {
                if self.e.clock.0 - last_play.0 < self.settings.cooldown.0 {
                    trace!("player {}: cooling down, ignoring play", self.e.uid);
                    return false;
                }
            }
        }
        if self.is_playing() && !self.settings.can_play_while_playing {
            debug!(
                "player {}: {}",
                self.e.uid,
                FeedbackError::ConcurrentPlayConflict
            );
            return false;
        }
        true
    }
}
impl Plays for FeedbackPlayer {
    fn play(&mut self, position: Vector, intensity: f64) {
        if !self.accepts_play() {
            return;
        }
        if self.is_playing() {
            for feedback in self.feedbacks.iter_mut() {
                feedback.stop(position, intensity);
            }
        }

        let direction = self.direction();
        for feedback in self.feedbacks.iter_mut() {
            feedback.set_player_direction(direction);
        }
        self.e.last_play = Some(self.e.clock);
        self.e.position = position;
        self.e.intensity = intensity * self.settings.intensity;
        self.e.is_paused = false;
        self.e.hold = Hold::None;
        self.e.loops_left.clear();
        self.e.order = self.play_order();
        self.e.cursor = 0;
        self.push_event(PlayerEvent::Play);

        if self.settings.initial_delay.is_empty() {
            self.start_sequence();
            self.check_completion();
        } else {
            self.e.phase = Phase::Delaying(self.settings.initial_delay);
        }
        self.collect_effects();
    }

    fn stop(&mut self, position: Vector, intensity: f64) {
        if !self.is_playing() {
            // A finished sequence can still own an open-ended time scale.
            for feedback in self.feedbacks.iter_mut().filter(|f| f.is_holding()) {
                feedback.stop(position, intensity);
            }
            self.collect_effects();
            return;
        }
        let intensity = intensity * self.settings.intensity;
        for feedback in self.feedbacks.iter_mut() {
            feedback.stop(position, intensity);
        }
        self.e.phase = Phase::Idle;
        self.e.hold = Hold::None;
        self.e.is_paused = false;
        self.e.loops_left.clear();
        self.push_event(PlayerEvent::Stop);
        self.collect_effects();
    }

    fn pause(&mut self) {
        if !self.is_playing() || self.e.is_paused {
            return;
        }
        self.e.is_paused = true;
        for feedback in self.feedbacks.iter_mut() {
            feedback.pause();
        }
        self.push_event(PlayerEvent::Pause);
    }

    /// Continues after [Plays::pause()], and also releases the head from a
    /// pause marker.
    fn resume(&mut self) {
        if self.e.is_paused {
            self.e.is_paused = false;
            for feedback in self.feedbacks.iter_mut() {
                feedback.resume();
            }
        } else if matches!(self.e.hold, Hold::Pause(_)) {
            self.e.hold = Hold::None;
            self.advance();
            self.check_completion();
            self.collect_effects();
        } else {
            return;
        }
        self.push_event(PlayerEvent::Resume);
    }

    fn restore_initial_values(&mut self) {
        for feedback in self.feedbacks.iter_mut().rev() {
            feedback.restore_initial_values();
        }
        self.push_event(PlayerEvent::RestoreInitialValues);
        self.collect_effects();
    }

    fn skip_to_end(&mut self) {
        if !self.is_playing() {
            return;
        }
        let unplayed: Vec<usize> = self
            .e
            .order
            .iter()
            .skip(self.e.cursor)
            .copied()
            .collect();
        for index in unplayed {
            let feedback = &mut self.feedbacks[index];
            if !feedback.is_marker() && self.e.registry.is_authorized(feedback.tag()) {
                feedback.play(self.e.position, self.e.intensity);
            }
        }
        for feedback in self.feedbacks.iter_mut() {
            feedback.skip_to_end();
        }
        self.e.phase = Phase::Running;
        self.e.hold = Hold::None;
        self.e.is_paused = false;
        self.e.cursor = self.e.order.len();
        self.push_event(PlayerEvent::SkipToEnd);
        self.check_completion();
        self.collect_effects();
    }

    fn tick(&mut self, delta: &FrameDelta) {
        let dt = delta.for_mode(self.settings.timescale_mode);
        self.e.clock = self.e.clock.plus(dt);
        if self.e.is_paused {
            return;
        }
        // Idle feedbacks still need ticks to keep their cooldown clocks.
        for feedback in self.feedbacks.iter_mut() {
            feedback.tick(delta);
        }
        match self.e.phase {
            Phase::Idle => {}
            Phase::Delaying(remaining) => {
                let remaining = remaining.minus(dt);
                if remaining.is_empty() {
                    self.start_sequence();
                } else {
                    self.e.phase = Phase::Delaying(remaining);
                }
            }
            Phase::Running => {
                self.tick_hold(dt);
                self.advance();
            }
        }
        self.check_completion();
        self.collect_effects();
    }

    fn is_playing(&self) -> bool {
        self.e.phase != Phase::Idle
    }
}

impl FeedbackPlayer {
    /// Effects queued by feedbacks, without lifecycle events. Handy when
    /// driving a player by hand.
    pub fn take_effects(&mut self) -> Vec<FeedbackEffect> {
        let (effects, events): (Vec<_>, Vec<_>) = self
            .take_signals()
            .into_iter()
            .partition(|s| matches!(s, PlayerSignal::Effect(_)));
        self.e.signals = events;
        effects
            .into_iter()
            .filter_map(|s| match s {
                PlayerSignal::Effect(effect) => Some(effect),
                PlayerSignal::Event(_) => None,
            })
            .collect()
    }
}

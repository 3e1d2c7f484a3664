// Copyright (c) 2024 Mike Tsao

use super::{
    FeedbackEffect, FeedbackPlayer, KindRegistry, PlayerSignal, Signal, SignalChannel,
    TimeScaleRequest,
};
use crate::{feedbacks::FeedbackKindTag, prelude::*};
use crossbeam::channel::{Receiver, TrySendError};
use delegate::delegate;
use derivative::Derivative;
use log::{debug, warn};
use rustc_hash::FxHashMap;

/// The global time scale and any override in effect.
#[derive(Debug, Derivative)]
#[derivative(Default)]
struct TimeScaleState {
    #[derivative(Default(value = "1.0"))]
    base: f64,
    #[derivative(Default(value = "1.0"))]
    current: f64,
    #[derivative(Default(value = "1.0"))]
    target: f64,
    // Unscaled time left on the override. None lasts until reset.
    remaining: Option<Seconds>,
    lerp_speed: Option<f64>,
    // The player whose request is in effect.
    owner: Option<PlayerUid>,
}
impl TimeScaleState {
    fn new_with(base: f64) -> Self {
        let base = base.max(0.0);
        Self {
            base,
            current: base,
            target: base,
            ..Default::default()
        }
    }

    fn request(&mut self, owner: PlayerUid, request: TimeScaleRequest) {
        self.owner = Some(owner);
        self.target = request.scale.max(0.0);
        self.remaining = request.duration;
        self.lerp_speed = request.lerp_speed;
        if self.lerp_speed.is_none() {
            self.current = self.target;
        }
    }

    fn reset(&mut self) {
        self.owner = None;
        self.target = self.base;
        self.remaining = None;
        if self.lerp_speed.is_none() {
            self.current = self.base;
        }
    }

    fn release(&mut self, owner: PlayerUid) {
        if self.owner == Some(owner) && self.remaining.is_none() {
            self.reset();
        }
    }

    fn advance(&mut self, dt: Seconds) {
        if let Some(remaining) = self.remaining {
            let remaining = remaining.minus(dt);
            if remaining.is_empty() {
                self.reset();
            } else {
                self.remaining = Some(remaining);
            }
        }
        if let Some(speed) = self.lerp_speed {
            let step = speed.abs() * dt.0;
            let gap = self.target - self.current;
            if gap.abs() <= step {
                self.current = self.target;
            } else {
                self.current += step.copysign(gap);
            }
        }
    }
}

/// Owns a set of [FeedbackPlayer]s and drives them from the host's frame
/// loop.
///
/// Each [Scheduler::tick()] advances every registered player, in
/// registration order, by one frame. The scheduler also owns the global time
/// scale: it turns the host's unscaled frame time into a [FrameDelta], and
/// it carries out time-scale requests from feedbacks. Everything the outside
/// world might care about goes out as a [Signal] on a channel the host reads
/// whenever it likes.
#[derive(Debug)]
pub struct Scheduler {
    uid_factory: PlayerUidFactory,
    uids: Vec<PlayerUid>,
    players: FxHashMap<PlayerUid, FeedbackPlayer>,
    registry: KindRegistry,
    time_scale: TimeScaleState,
    published_time_scale: f64,
    max_delta: Option<Seconds>,
    channel: SignalChannel,
    has_overflowed: bool,
}
impl Default for Scheduler {
    fn default() -> Self {
        Self::new_with(1.0, None)
    }
}
#[allow(missing_docs)]
impl Scheduler {
    /// A scheduler whose base time scale is `time_scale`. If `max_delta` is
    /// set, longer frames (a hitch, a breakpoint) are clamped to it.
    pub fn new_with(time_scale: f64, max_delta: Option<Seconds>) -> Self {
        let time_scale = TimeScaleState::new_with(time_scale);
        Self {
            uid_factory: Default::default(),
            uids: Default::default(),
            players: Default::default(),
            registry: Default::default(),
            published_time_scale: time_scale.current,
            time_scale,
            max_delta,
            channel: Default::default(),
            has_overflowed: false,
        }
    }

    /// Keeps at most `capacity` undrained signals. When the host falls
    /// behind, the oldest signals are dropped first.
    pub fn with_signal_capacity(mut self, capacity: usize) -> Self {
        self.channel = SignalChannel::new_with(capacity);
        self
    }

    /// Takes ownership of the player and starts ticking it. The player
    /// shares this scheduler's [KindRegistry].
    pub fn register(&mut self, mut player: FeedbackPlayer) -> PlayerUid {
        let uid = self.uid_factory.mint_next();
        player.set_uid(uid);
        player.set_registry(self.registry.clone());
        self.uids.push(uid);
        self.players.insert(uid, player);
        uid
    }

    /// Stops ticking the player and hands it back.
    pub fn unregister(&mut self, uid: PlayerUid) -> Option<FeedbackPlayer> {
        self.uids.retain(|u| *u != uid);
        let mut player = self.players.remove(&uid)?;
        player.set_registry(KindRegistry::default());
        Some(player)
    }

    pub fn player_uids(&self) -> &[PlayerUid] {
        &self.uids
    }

    pub fn player(&self, uid: PlayerUid) -> Option<&FeedbackPlayer> {
        self.players.get(&uid)
    }

    /// Direct access to a player. Signals it queues go out on the next tick
    /// or [Scheduler::drive()].
    pub fn player_mut(&mut self, uid: PlayerUid) -> Option<&mut FeedbackPlayer> {
        self.players.get_mut(&uid)
    }

    /// Runs `f` against the player and publishes whatever it queued. Returns
    /// `None` if there's no such player.
    ///
    /// ```
    /// use jolt::prelude::*;
    ///
    /// let mut scheduler = Scheduler::default();
    /// let uid = scheduler.register(FeedbackPlayer::default());
    /// assert!(scheduler.drive(uid, |p| p.play_default()).is_some());
    /// ```
    pub fn drive<R>(
        &mut self,
        uid: PlayerUid,
        f: impl FnOnce(&mut FeedbackPlayer) -> R,
    ) -> Option<R> {
        let player = self.players.get_mut(&uid)?;
        let result = f(player);
        let signals = player.take_signals();
        self.dispatch(uid, signals);
        self.publish_time_scale();
        Some(result)
    }

    /// Stops every player.
    pub fn stop_all(&mut self) {
        for uid in self.uids.clone() {
            self.drive(uid, |p| p.stop_default());
        }
    }

    /// Advances everything by one frame that took `unscaled` of real time.
    pub fn tick(&mut self, unscaled: Seconds) {
        let unscaled = Seconds(unscaled.0.max(0.0));
        let unscaled = match self.max_delta {
            Some(max_delta) if unscaled.0 > max_delta.0 => {
                debug!("clamping a {}s frame to {}s", unscaled.0, max_delta.0);
                max_delta
            }
            _ => unscaled,
        };
        let delta = FrameDelta::new(unscaled, self.time_scale.current);
        self.time_scale.advance(unscaled);
        self.tick_players(&delta);
    }

    /// Advances everything by a frame the host has already scaled. Time-scale
    /// overrides still expire, counted in `delta.unscaled`, but `delta`
    /// itself is used as given.
    pub fn tick_with(&mut self, delta: &FrameDelta) {
        self.time_scale.advance(delta.unscaled);
        self.tick_players(delta);
    }

    fn tick_players(&mut self, delta: &FrameDelta) {
        for uid in self.uids.clone() {
            if let Some(player) = self.players.get_mut(&uid) {
                player.tick(delta);
                let signals = player.take_signals();
                self.dispatch(uid, signals);
            }
        }
        self.publish_time_scale();
    }

    /// The time scale that the next [Scheduler::tick()] will use.
    pub fn time_scale(&self) -> f64 {
        self.time_scale.current
    }

    /// The time scale to return to when overrides end.
    pub fn base_time_scale(&self) -> f64 {
        self.time_scale.base
    }

    pub fn set_base_time_scale(&mut self, time_scale: f64) {
        self.time_scale = TimeScaleState::new_with(time_scale);
        self.publish_time_scale();
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    delegate! {
        to self.registry {
            /// Lets feedbacks of this kind play again in every player.
            pub fn enable(&self, tag: FeedbackKindTag);
            /// Keeps feedbacks of this kind from playing in every player.
            pub fn disable(&self, tag: FeedbackKindTag);
            pub fn is_authorized(&self, tag: FeedbackKindTag) -> bool;
        }
    }

    /// A receiver for everything the scheduler publishes. Clones see the
    /// same stream, so each signal goes to exactly one of them.
    pub fn receiver(&self) -> Receiver<Signal> {
        self.channel.receiver.clone()
    }

    /// Everything published since the last drain, for hosts that poll. Hosts
    /// that never read signals lose the oldest ones once
    /// [Scheduler::with_signal_capacity()] is exceeded.
    pub fn drain_signals(&self) -> Vec<Signal> {
        self.channel.receiver.try_iter().collect()
    }

    fn dispatch(&mut self, uid: PlayerUid, signals: Vec<PlayerSignal>) {
        for signal in signals {
            match signal {
                PlayerSignal::Event(event) => self.publish(Signal::Player(uid, event)),
                PlayerSignal::Effect(effect) => self.apply(uid, effect),
            }
        }
    }

    fn apply(&mut self, uid: PlayerUid, effect: FeedbackEffect) {
        match effect {
            FeedbackEffect::TimeScale(request) => self.time_scale.request(uid, request),
            FeedbackEffect::ResetTimeScale => self.time_scale.reset(),
            FeedbackEffect::ReleaseTimeScale => self.time_scale.release(uid),
            FeedbackEffect::Shake(event) => self.publish(Signal::Shake(event)),
        }
    }

    fn publish_time_scale(&mut self) {
        if self.time_scale.current != self.published_time_scale {
            self.published_time_scale = self.time_scale.current;
            self.publish(Signal::TimeScale(self.published_time_scale));
        }
    }

    fn publish(&mut self, signal: Signal) {
        // We hold a receiver, so this can't disconnect.
        let Err(TrySendError::Full(signal)) = self.channel.sender.try_send(signal) else {
            return;
        };
        if !self.has_overflowed {
            warn!("signal queue is full; dropping the oldest undrained signals");
            self.has_overflowed = true;
        }
        let _ = self.channel.receiver.try_recv();
        if let Err(e) = self.channel.sender.try_send(signal) {
            debug!("dropped signal: {e:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feedbacks::{
            Feedback, FeedbackKind, FeedbackSettingsBuilder, ShakeBroadcast, TimeScaleChange,
            TimingBuilder,
        },
        orchestration::{PlayerEvent, ShakeEvent, ShakePhase},
    };
    use float_cmp::approx_eq;
    use std::{cell::RefCell, rc::Rc};

    const FRAME: Seconds = Seconds(0.1);

    fn tween(seconds: f64, to: f64) -> FeedbackKind {
        FeedbackKind::Float(ValueTweenCore::new_with(
            TimedActionCore::new_with(Seconds(seconds), Easing::Linear),
            TweenMode::Absolute,
            0.0,
            to,
        ))
    }

    fn player_with(
        host: &Rc<RefCell<f64>>,
        kind: FeedbackKind,
        mode: TimescaleMode,
    ) -> FeedbackPlayer {
        let settings = FeedbackSettingsBuilder::default()
            .timing(TimingBuilder::default().timescale_mode(mode).build().unwrap())
            .build()
            .unwrap();
        FeedbackPlayer::default().with_feedback(
            Feedback::new_with_settings(settings, kind)
                .bound(Rc::clone(host))
                .unwrap(),
        )
    }

    #[test]
    fn publishes_player_events() {
        let host = Rc::new(RefCell::new(0.0));
        let mut s = Scheduler::default();
        let uid = s.register(player_with(&host, tween(0.2, 1.0), TimescaleMode::Scaled));
        let receiver = s.receiver();
        s.drive(uid, |p| p.play_default());
        s.tick(FRAME);
        s.tick(FRAME);
        assert_eq!(*host.borrow(), 1.0);
        let signals: Vec<Signal> = receiver.try_iter().collect();
        assert_eq!(
            signals,
            vec![
                Signal::Player(uid, PlayerEvent::Play),
                Signal::Player(uid, PlayerEvent::Complete)
            ]
        );
    }

    #[test]
    fn ticks_players_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::default()));
        let mut s = Scheduler::default();
        let mut uids = Vec::default();
        for name in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            let feedback = Feedback::new_with(tween(0.1, 1.0))
                .bound(PropertyBinding::new(FnProperty::new(
                    || Some(0.0),
                    move |v: f64| {
                        if v == 1.0 {
                            log.borrow_mut().push(name);
                        }
                        true
                    },
                )))
                .unwrap();
            uids.push(s.register(FeedbackPlayer::default().with_feedback(feedback)));
        }
        for uid in uids.iter().rev() {
            s.drive(*uid, |p| p.play_default());
        }
        s.tick(FRAME);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(s.player_uids(), uids.as_slice());
    }

    #[test]
    fn time_scale_freezes_scaled_feedbacks_only() {
        let scaled = Rc::new(RefCell::new(0.0));
        let unscaled = Rc::new(RefCell::new(0.0));
        let mut s = Scheduler::default();
        let freeze = s.register(FeedbackPlayer::default().with_feedback(Feedback::new_with(
            FeedbackKind::TimeScale(TimeScaleChange::new_with(0.0, Seconds(0.3))),
        )));
        let a = s.register(player_with(&scaled, tween(1.0, 10.0), TimescaleMode::Scaled));
        let b = s.register(player_with(&unscaled, tween(1.0, 10.0), TimescaleMode::Unscaled));

        s.drive(freeze, |p| p.play_default());
        assert_eq!(s.time_scale(), 0.0);
        s.drive(a, |p| p.play_default());
        s.drive(b, |p| p.play_default());
        s.tick(FRAME);
        s.tick(FRAME);
        assert_eq!(*scaled.borrow(), 0.0, "scaled time is frozen");
        assert!(approx_eq!(f64, *unscaled.borrow(), 2.0));
        s.tick(FRAME);
        assert_eq!(s.time_scale(), 1.0, "override expired after 0.3s");
        s.tick(FRAME);
        assert!(approx_eq!(f64, *scaled.borrow(), 1.0));

        let scales: Vec<f64> = s
            .drain_signals()
            .into_iter()
            .filter_map(|signal| match signal {
                Signal::TimeScale(scale) => Some(scale),
                _ => None,
            })
            .collect();
        assert_eq!(scales, vec![0.0, 1.0]);
    }

    #[test]
    fn time_scale_lerps_toward_target() {
        let mut s = Scheduler::default();
        let uid = s.register(FeedbackPlayer::default().with_feedback(Feedback::new_with(
            FeedbackKind::TimeScale(
                TimeScaleChange::new_with(0.0, Seconds::zero()).with_lerp_speed(2.0),
            ),
        )));
        s.drive(uid, |p| p.play_default());
        assert_eq!(s.time_scale(), 1.0, "lerping starts from the current scale");
        s.tick(FRAME);
        assert!(approx_eq!(f64, s.time_scale(), 0.8));
        for _ in 0..10 {
            s.tick(FRAME);
        }
        assert_eq!(s.time_scale(), 0.0);
        s.drive(uid, |p| p.restore_initial_values());
        for _ in 0..10 {
            s.tick(FRAME);
        }
        assert_eq!(s.time_scale(), 1.0, "restoring resets the time scale");
    }

    #[test]
    fn stopping_an_open_ended_freeze_ends_it_only_if_it_still_owns_it() {
        let freeze_forever = || {
            FeedbackPlayer::default().with_feedback(Feedback::new_with(FeedbackKind::TimeScale(
                TimeScaleChange::new_with(0.0, Seconds::zero()),
            )))
        };
        let mut s = Scheduler::default();
        let first = s.register(freeze_forever());
        let second = s.register(FeedbackPlayer::default().with_feedback(Feedback::new_with(
            FeedbackKind::TimeScale(TimeScaleChange::new_with(0.5, Seconds::zero())),
        )));

        s.drive(first, |p| p.play_default());
        s.tick(FRAME);
        assert!(!s.player(first).unwrap().is_playing());
        s.drive(first, |p| p.stop_default());
        for _ in 0..5 {
            s.tick(FRAME);
        }
        assert_eq!(s.time_scale(), 1.0);

        s.drive(first, |p| p.play_default());
        s.drive(second, |p| p.play_default());
        s.drive(first, |p| p.stop_default());
        assert_eq!(s.time_scale(), 0.5, "the second override is still in effect");
        s.drive(first, |p| p.stop_default());
        s.drive(second, |p| p.stop_default());
        assert_eq!(s.time_scale(), 1.0);
        s.drive(second, |p| p.stop_default());
        assert_eq!(s.time_scale(), 1.0, "a second stop releases nothing");
    }

    #[test]
    fn undrained_signals_keep_only_the_newest() {
        let host = Rc::new(RefCell::new(0.0));
        let mut s = Scheduler::default().with_signal_capacity(3);
        let uid = s.register(player_with(&host, tween(1.0, 1.0), TimescaleMode::Scaled));
        for _ in 0..5 {
            s.drive(uid, |p| p.play_default());
            s.drive(uid, |p| p.stop_default());
        }
        assert_eq!(
            s.drain_signals(),
            vec![
                Signal::Player(uid, PlayerEvent::Stop),
                Signal::Player(uid, PlayerEvent::Play),
                Signal::Player(uid, PlayerEvent::Stop),
            ]
        );
        assert!(s.drain_signals().is_empty());
    }

    #[test]
    fn disabling_a_kind_reaches_every_player() {
        let host = Rc::new(RefCell::new(0.0));
        let mut s = Scheduler::default();
        let uid = s.register(player_with(&host, tween(0.0, 1.0), TimescaleMode::Scaled));
        s.disable(crate::feedbacks::FeedbackKindTag::Float);
        assert!(!s.is_authorized(crate::feedbacks::FeedbackKindTag::Float));
        s.drive(uid, |p| p.play_default());
        assert_eq!(*host.borrow(), 0.0);
        s.enable(crate::feedbacks::FeedbackKindTag::Float);
        s.drive(uid, |p| p.play_default());
        assert_eq!(*host.borrow(), 1.0);
    }

    #[test]
    fn shakes_are_forwarded() {
        let mut s = Scheduler::default();
        let uid = s.register(FeedbackPlayer::default().with_feedback(Feedback::new_with(
            FeedbackKind::Broadcast(ShakeBroadcast::new_with(3, Seconds(0.2), 2.0)),
        )));
        s.drive(uid, |p| p.play(Vector::new(1.0, 2.0, 3.0), 0.5));
        let shakes: Vec<_> = s
            .drain_signals()
            .into_iter()
            .filter_map(|signal| match signal {
                Signal::Shake(event) => Some(event),
                _ => None,
            })
            .collect();
        assert_eq!(shakes.len(), 1);
        assert_eq!(shakes[0].channel, 3);
        assert_eq!(shakes[0].intensity, 1.0);
        assert_eq!(shakes[0].position, Vector::new(1.0, 2.0, 3.0));
        assert_eq!(shakes[0].phase, ShakePhase::Start);

        s.stop_all();
        assert!(matches!(
            s.drain_signals().as_slice(),
            [
                Signal::Player(_, PlayerEvent::Stop),
                Signal::Shake(ShakeEvent {
                    phase: ShakePhase::Stop,
                    ..
                })
            ]
        ));
    }

    #[test]
    fn long_frames_are_clamped() {
        let host = Rc::new(RefCell::new(0.0));
        let mut s = Scheduler::new_with(1.0, Some(Seconds(0.25)));
        let uid = s.register(player_with(&host, tween(1.0, 1.0), TimescaleMode::Scaled));
        s.drive(uid, |p| p.play_default());
        s.tick(Seconds(5.0));
        assert!(approx_eq!(f64, *host.borrow(), 0.25));
    }

    #[test]
    fn unregister_hands_player_back() {
        let mut s = Scheduler::default();
        let uid = s.register(FeedbackPlayer::default());
        assert!(s.player(uid).is_some());
        let player = s.unregister(uid);
        assert!(player.is_some());
        assert!(s.player(uid).is_none());
        assert!(s.player_uids().is_empty());
        assert!(s.drive(uid, |p| p.play_default()).is_none());
    }
}

// Copyright (c) 2024 Mike Tsao

//! What feedbacks and players tell the outside world.

use crate::prelude::*;
use crossbeam::channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Asks the host to change its global time scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimeScaleRequest {
    /// The new time scale. 0.0 freezes scaled time.
    pub scale: f64,
    /// How long the override lasts, in unscaled time. `None` means until
    /// reset.
    pub duration: Option<Seconds>,
    /// If set, approach `scale` at this many units per unscaled second
    /// instead of jumping to it.
    pub lerp_speed: Option<f64>,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShakePhase {
    Start,
    Stop,
}

/// A broadcast to whatever listens on a shake channel (camera shakers,
/// rumble). The engine only forwards these; listeners implement the shake.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShakeEvent {
    /// Listeners filter on this.
    pub channel: u32,
    /// Where the feedback was played.
    pub position: Vector,
    /// Amplitude times play intensity.
    pub intensity: f64,
    #[allow(missing_docs)]
    pub duration: Seconds,
    #[allow(missing_docs)]
    pub phase: ShakePhase,
}

/// A side effect that a feedback can't apply by itself. The owning
/// [FeedbackPlayer](super::FeedbackPlayer) queues these and the
/// [Scheduler](super::Scheduler) carries them out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FeedbackEffect {
    #[allow(missing_docs)]
    TimeScale(TimeScaleRequest),
    /// Return to the base time scale.
    ResetTimeScale,
    /// The feedback that set an open-ended override was stopped. Ends the
    /// override only if it is still the one in effect.
    ReleaseTimeScale,
    #[allow(missing_docs)]
    Shake(ShakeEvent),
}

/// Lifecycle notifications from a [FeedbackPlayer](super::FeedbackPlayer).
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerEvent {
    Play,
    Pause,
    Resume,
    Stop,
    /// The sequence reached its end and everything finished.
    Complete,
    /// A looper sent the head back.
    Loop,
    RestoreInitialValues,
    SkipToEnd,
    /// The player flipped its direction after completing.
    ChangeDirection,
}

/// Everything a player queues up during a call, in order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerSignal {
    #[allow(missing_docs)]
    Event(PlayerEvent),
    #[allow(missing_docs)]
    Effect(FeedbackEffect),
}

/// What the [Scheduler](super::Scheduler) publishes on its channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Signal {
    /// A lifecycle event from the given player.
    Player(PlayerUid, PlayerEvent),
    #[allow(missing_docs)]
    Shake(ShakeEvent),
    /// The effective time scale changed to this value.
    TimeScale(f64),
}

/// Both halves of a bounded [crossbeam::channel], created together so that
/// a single `Default` call can produce them.
#[derive(Debug)]
pub struct SignalChannel {
    #[allow(missing_docs)]
    pub sender: Sender<Signal>,
    #[allow(missing_docs)]
    pub receiver: Receiver<Signal>,
}
impl Default for SignalChannel {
    fn default() -> Self {
        Self::new_with(Self::DEFAULT_CAPACITY)
    }
}
impl SignalChannel {
    /// How many undrained signals the default channel holds.
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// A channel holding at most `capacity` signals (at least one).
    pub fn new_with(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam::channel::bounded(capacity.max(1));
        Self { sender, receiver }
    }
}

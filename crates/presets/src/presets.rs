// Copyright (c) 2024 Mike Tsao

use jolt::prelude::*;

/// Builds ready-made [FeedbackPlayer]s for the effects that nearly every game
/// reaches for first. Each one is an ordinary player, so callers can tweak
/// settings or add feedbacks before registering it.
pub struct Presets {}
impl Presets {
    /// Freezes scaled time for `duration` of real time, the way fighting
    /// games sell a heavy hit.
    pub fn hit_stop(duration: Seconds) -> FeedbackPlayer {
        let settings = FeedbackSettings {
            label: "hit-stop".into(),
            ..Default::default()
        };
        FeedbackPlayer::default().with_feedback(Feedback::new_with_settings(
            settings,
            FeedbackKind::TimeScale(TimeScaleChange::new_with(0.0, duration)),
        ))
    }

    /// Knocks a camera (or anything with a position) by `impulse` and lets a
    /// spring bring it back.
    pub fn camera_bump(
        position: impl Into<Target>,
        impulse: Vector,
    ) -> Result<FeedbackPlayer, FeedbackError> {
        let spring = SpringCore::uniform(Normal::new(0.4), 6.0);
        let feedback = Feedback::new_with(FeedbackKind::Spring(SpringMotion::new_with(
            spring,
            SpringAction::Bump(impulse),
        )))
        .bound(position)?;
        Ok(FeedbackPlayer::default().with_feedback(feedback))
    }

    /// Washes a color toward `color` and back over `duration`.
    pub fn flash(
        tint: impl Into<Target>,
        color: Color,
        duration: Seconds,
    ) -> Result<FeedbackPlayer, FeedbackError> {
        let feedback = Feedback::new_with(FeedbackKind::Color(ValueTweenCore::new_with(
            TimedActionCore::new_with(duration, Curve::bell()),
            TweenMode::ToDestination,
            Color::TRANSPARENT,
            color,
        )))
        .bound(tint)?;
        Ok(FeedbackPlayer::default().with_feedback(feedback))
    }

    /// Squashes a scale vertically while stretching it horizontally, then
    /// returns to the original scale. `amount` is the peak change per axis.
    pub fn squash_and_stretch(
        scale: impl Into<Target>,
        amount: f64,
        duration: Seconds,
    ) -> Result<FeedbackPlayer, FeedbackError> {
        let feedback = Feedback::new_with(FeedbackKind::Vector(ValueTweenCore::new_with(
            TimedActionCore::new_with(duration, Curve::bell()),
            TweenMode::Relative,
            Vector::zeros(),
            Vector::new(amount, -amount, amount),
        )))
        .bound(scale)?;
        Ok(FeedbackPlayer::default().with_feedback(feedback))
    }

    /// Pulses a float up by `amplitude` and back, once per `period`. With
    /// `loops` of `None`, it pulses until stopped.
    pub fn looping_pulse(
        value: impl Into<Target>,
        amplitude: f64,
        period: Seconds,
        loops: Option<u32>,
    ) -> Result<FeedbackPlayer, FeedbackError> {
        let pulse = Feedback::new_with(FeedbackKind::Float(ValueTweenCore::new_with(
            TimedActionCore::new_with(period, Curve::bell()),
            TweenMode::Relative,
            0.0,
            amplitude,
        )))
        .bound(value)?;
        let looper = match loops {
            Some(loops) => LoopMarker::new_with(loops),
            None => LoopMarker::infinite(),
        };
        Ok(FeedbackPlayer::default()
            .with_feedback(Feedback::new_with(FeedbackKind::LoopStart))
            .with_feedback(pulse)
            .with_feedback(Feedback::new_with(FeedbackKind::HoldingPause(
                HoldingPauseMarker::default(),
            )))
            .with_feedback(Feedback::new_with(FeedbackKind::Looper(looper))))
    }
}

// Copyright (c) 2024 Mike Tsao

use delegate::delegate;
use derivative::Derivative;
use jolt::prelude::*;
use serde::{Deserialize, Serialize};

/// Wraps a [FeedbackPlayer] and reshapes the intensity of every play and
/// stop: multiply, then clamp. Use it to tame a preset that's too strong
/// for a particular scene, or to make sure small hits still register.
#[derive(Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
pub struct IntensityAmplifier {
    #[derivative(Default(value = "1.0"))]
    multiplier: f64,
    #[derivative(Default(value = "0.0"))]
    min: f64,
    #[derivative(Default(value = "f64::MAX"))]
    max: f64,
    player: FeedbackPlayer,
}
#[allow(missing_docs)]
impl IntensityAmplifier {
    pub fn new_with(player: FeedbackPlayer, multiplier: f64) -> Self {
        Self {
            multiplier,
            player,
            ..Default::default()
        }
    }

    /// The same amplifier, with intensities clamped to `[min, max]` after
    /// multiplying.
    pub fn clamped(mut self, min: f64, max: f64) -> Self {
        self.min = min.min(max);
        self.max = max.max(min);
        self
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn set_multiplier(&mut self, multiplier: f64) {
        self.multiplier = multiplier;
    }

    /// The intensity the wrapped player sees for a requested `intensity`.
    pub fn amplify(&self, intensity: f64) -> f64 {
        (intensity * self.multiplier).clamp(self.min, self.max)
    }

    pub fn player(&self) -> &FeedbackPlayer {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut FeedbackPlayer {
        &mut self.player
    }

    pub fn into_player(self) -> FeedbackPlayer {
        self.player
    }
}
impl Plays for IntensityAmplifier {
    fn play(&mut self, position: Vector, intensity: f64) {
        let intensity = self.amplify(intensity);
        self.player.play(position, intensity);
    }

    fn stop(&mut self, position: Vector, intensity: f64) {
        let intensity = self.amplify(intensity);
        self.player.stop(position, intensity);
    }

    delegate! {
        to self.player {
            fn pause(&mut self);
            fn resume(&mut self);
            fn restore_initial_values(&mut self);
            fn skip_to_end(&mut self);
            fn tick(&mut self, delta: &FrameDelta);
            fn is_playing(&self) -> bool;
        }
    }
}

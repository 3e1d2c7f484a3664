// Copyright (c) 2024 Mike Tsao

//! The traits that define how the parts of the system are driven.

use crate::prelude::*;

/// Quick import of all important traits.
pub mod prelude {
    pub use super::{HasSettings, Plays};
}

/// Something that can be played, stopped, and advanced frame by frame.
/// [Feedback](crate::feedbacks::Feedback) and
/// [FeedbackPlayer](crate::orchestration::FeedbackPlayer) both implement it,
/// so a host can drive either one the same way.
///
/// All methods are safe to call in any state. Calls that don't apply (for
/// example, pausing something that isn't playing) do nothing.
pub trait Plays {
    /// Starts playing at `position` with the given intensity multiplier.
    fn play(&mut self, position: Vector, intensity: f64);

    /// Stops. Calling it again changes nothing.
    fn stop(&mut self, position: Vector, intensity: f64);

    /// Freezes in place.
    fn pause(&mut self);

    /// Continues after [Plays::pause()].
    fn resume(&mut self);

    /// Puts every driven target back to the value it had before playing.
    fn restore_initial_values(&mut self);

    /// Jumps to the end, applying final values.
    fn skip_to_end(&mut self);

    /// Advances by one frame.
    fn tick(&mut self, delta: &FrameDelta);

    /// Whether anything is still in progress, including waiting out a delay
    /// or being paused.
    fn is_playing(&self) -> bool;

    /// Plays at the origin with full intensity.
    fn play_default(&mut self) {
        self.play(Vector::zeros(), 1.0)
    }

    /// Stops, using the origin and full intensity for any stop events.
    fn stop_default(&mut self) {
        self.stop(Vector::zeros(), 1.0)
    }
}

/// Configuration that the host saves and loads. Implementing [HasSettings]
/// lets the host tell whether anything changed since the last save.
pub trait HasSettings {
    /// Whether the current state of this struct has been saved.
    fn has_been_saved(&self) -> bool;
    /// Call this whenever the struct changes.
    fn needs_save(&mut self);
    /// Call this after a load or a save.
    fn mark_clean(&mut self);
}

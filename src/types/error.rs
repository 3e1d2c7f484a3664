// Copyright (c) 2024 Mike Tsao

use thiserror::Error;

/// Everything that can go wrong while configuring or running a feedback.
/// None of these stop the host; runtime occurrences are logged and the
/// offending step is skipped.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FeedbackError {
    /// The feedback has no bound target, or the target no longer exists.
    #[error("feedback target is unbound or no longer exists")]
    MissingTarget,

    /// A timed action was asked to run for a non-positive duration. It
    /// applies its end value at once instead.
    #[error("duration {0}s is not positive; applying the end value at once")]
    InvalidDuration(f64),

    /// A non-additive feedback was played while already playing.
    #[error("feedback is already playing and doesn't allow additive plays")]
    ConcurrentPlayConflict,

    /// The bound target holds a different kind of value than the feedback
    /// drives.
    #[error("a {kind} feedback can't drive a {target} target")]
    TargetKindMismatch {
        /// The feedback kind.
        kind: &'static str,
        /// What the target holds.
        target: &'static str,
    },
}

// Copyright (c) 2024 Mike Tsao

#![warn(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Jolt makes games feel responsive: tweens, springs, time-scale dips, and
//! shake broadcasts, sequenced and driven by the host's frame loop.
//!
//! There are several ways to use Jolt, depending on the level of control you
//! need.
//!
//! * *Easiest*: Build [FeedbackPlayer]s out of [Feedback]s, register them
//! with a [Scheduler], call [Scheduler::tick()] once per frame, and read
//! [Signal](orchestration::Signal)s from [Scheduler::receiver()].
//! * *For more control over time*: Skip the scheduler and call
//! [Plays::tick()](traits::Plays::tick()) on players or single feedbacks
//! with a [FrameDelta](types::FrameDelta) you build yourself.
//! * *Maximum control, fewest batteries included*: Use the bare [cores] and
//! [elements] to shape values and run springs yourself.
//!
//! ```
//! use jolt::prelude::*;
//! use std::{cell::RefCell, rc::Rc};
//!
//! let alpha = Rc::new(RefCell::new(0.0));
//! let fade_in = Feedback::new_with(FeedbackKind::Float(ValueTweenCore::new_with(
//!     TimedActionCore::new_with(Seconds(0.5), Easing::EaseOutQuadratic),
//!     TweenMode::Absolute,
//!     0.0,
//!     1.0,
//! )))
//! .bound(Rc::clone(&alpha))
//! .unwrap();
//!
//! let mut scheduler = Scheduler::default();
//! let uid = scheduler.register(FeedbackPlayer::default().with_feedback(fade_in));
//! scheduler.drive(uid, |player| player.play_default());
//! for _ in 0..30 {
//!     scheduler.tick(Seconds(1.0 / 60.0));
//! }
//! assert_eq!(*alpha.borrow(), 1.0);
//! ```

/// A collection of imports that are useful to users of this crate. `use
/// jolt::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        cores::prelude::*, elements::prelude::*, feedbacks::prelude::*,
        orchestration::prelude::*, traits::prelude::*, types::prelude::*, util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use {
    feedbacks::Feedback,
    orchestration::{FeedbackPlayer, Scheduler},
};

pub mod cores;
pub mod elements;
pub mod feedbacks;
pub mod orchestration;
pub mod traits;
pub mod types;
pub mod util;

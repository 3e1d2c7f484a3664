// Copyright (c) 2024 Mike Tsao

use crate::feedbacks::FeedbackKindTag;
use rustc_hash::FxHashSet;
use std::{cell::RefCell, rc::Rc};

/// Which kinds of feedback are allowed to play. Clones share state, so the
/// [Scheduler](super::Scheduler) can hand one to every player it registers
/// and switch a kind off everywhere at once.
#[derive(Clone, Debug, Default)]
pub struct KindRegistry(Rc<RefCell<FxHashSet<FeedbackKindTag>>>);
impl KindRegistry {
    /// A registry with the given kinds already disabled.
    pub fn new_with(disabled: impl IntoIterator<Item = FeedbackKindTag>) -> Self {
        Self(Rc::new(RefCell::new(disabled.into_iter().collect())))
    }

    #[allow(missing_docs)]
    pub fn enable(&self, tag: FeedbackKindTag) {
        self.0.borrow_mut().remove(&tag);
    }

    #[allow(missing_docs)]
    pub fn disable(&self, tag: FeedbackKindTag) {
        self.0.borrow_mut().insert(tag);
    }

    /// Whether feedbacks of this kind may play.
    pub fn is_authorized(&self, tag: FeedbackKindTag) -> bool {
        !self.0.borrow().contains(&tag)
    }

    /// The disabled kinds, in no particular order.
    pub fn disabled(&self) -> Vec<FeedbackKindTag> {
        self.0.borrow().iter().copied().collect()
    }
}

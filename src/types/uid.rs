// Copyright (c) 2024 Mike Tsao

//! Unique identifiers for feedbacks and players, and factories that help
//! ensure they are in fact unique.

use core::sync::atomic::Ordering;
use core::{hash::Hash, marker::PhantomData, sync::atomic::AtomicUsize};
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// Identifies a [Feedback](crate::feedbacks::Feedback) within its player.
#[derive(Synonym, Serialize, Deserialize, Eq, PartialEq)]
// Synonym's PartialEq isn't structural, which matters for matching on consts.
#[synonym(skip(PartialEq))]
#[serde(rename_all = "kebab-case")]
pub struct Uid(pub usize);
impl IsUid for Uid {}

/// Identifies a [FeedbackPlayer](crate::orchestration::FeedbackPlayer)
/// registered with a [Scheduler](crate::orchestration::Scheduler).
#[derive(Synonym, Serialize, Deserialize, Eq, PartialEq)]
#[synonym(skip(PartialEq))]
#[serde(rename_all = "kebab-case")]
pub struct PlayerUid(pub usize);
impl IsUid for PlayerUid {}

/// Anything a [UidFactory] can mint.
pub trait IsUid: Eq + Hash + Clone + From<usize> {}

/// Generates unique uids. Uids aren't persisted, so a player loaded from
/// JSON mints fresh ones for its feedbacks.
#[derive(Debug)]
pub struct UidFactory<U: IsUid> {
    next_uid_value: AtomicUsize,
    _phantom: PhantomData<U>,
}
impl<U: IsUid> Default for UidFactory<U> {
    // Zero is left unused so that a default-constructed uid never collides
    // with a minted one.
    fn default() -> Self {
        Self::new(1)
    }
}
impl<U: IsUid> UidFactory<U> {
    /// Creates a new [UidFactory] starting with the given value.
    pub fn new(first_uid: usize) -> Self {
        Self {
            next_uid_value: AtomicUsize::new(first_uid),
            _phantom: Default::default(),
        }
    }

    /// Generates the next unique uid.
    pub fn mint_next(&self) -> U {
        let uid_value = self.next_uid_value.fetch_add(1, Ordering::Relaxed);
        U::from(uid_value)
    }
}

/// A [UidFactory] for [PlayerUid]s.
pub type PlayerUidFactory = UidFactory<PlayerUid>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_factory_mints_unique_uids() {
        let f = UidFactory::<Uid>::default();

        let uid_1 = f.mint_next();
        let uid_2 = f.mint_next();
        assert_ne!(uid_1, uid_2, "Minted Uids should not repeat");
        assert_ne!(uid_1, Uid::default(), "Minted Uids should skip zero");

        let mut ids: rustc_hash::FxHashSet<Uid> = Default::default();
        for _ in 0..64 {
            let uid = f.mint_next();
            assert!(
                !ids.contains(&uid),
                "minted uids should be unique across many calls"
            );
            ids.insert(uid);
        }
    }

    #[test]
    fn factories_count_independently() {
        let players = PlayerUidFactory::default();
        let feedbacks = UidFactory::<Uid>::new(10);
        assert_eq!(players.mint_next(), PlayerUid(1));
        assert_eq!(feedbacks.mint_next(), Uid(10));
        assert_eq!(players.mint_next(), PlayerUid(2));
    }
}

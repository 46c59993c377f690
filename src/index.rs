//! Stage index: one guarded set of item IDs per stage.
//!
//! Each stage has its own reader/writer lock, so operations on different
//! stages never contend. Only the move processor (and startup seeding) writes;
//! request handlers only read.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

use crate::model::{ItemId, Stage};

/// Concurrency-safe membership sets, one per [`Stage`].
#[derive(Debug, Default)]
pub struct StageIndex {
    sets: [RwLock<HashSet<ItemId>>; 3],
}

impl StageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Is `id` currently a member of `stage`?
    pub fn contains(&self, stage: Stage, id: ItemId) -> bool {
        self.read(stage).contains(&id)
    }

    /// Any current member of `stage`, or `None` if the stage is empty.
    ///
    /// No fairness: this returns whichever ID the set yields first.
    pub fn pick_any(&self, stage: Stage) -> Option<ItemId> {
        self.read(stage).iter().next().copied()
    }

    /// Number of items in `stage`.
    pub fn len(&self, stage: Stage) -> usize {
        self.read(stage).len()
    }

    pub fn is_empty(&self, stage: Stage) -> bool {
        self.read(stage).is_empty()
    }

    /// Sorted snapshot of the members of `stage`.
    pub fn members(&self, stage: Stage) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.read(stage).iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Populate `stage` at startup. IDs already present in another stage are
    /// skipped so no ID ever ends up in two sets. Returns the number added.
    pub fn seed(&self, stage: Stage, ids: impl IntoIterator<Item = ItemId>) -> usize {
        let mut added = 0;
        for id in ids {
            if let Some(other) = self.stage_of(id).filter(|s| *s != stage) {
                warn!(%id, %stage, existing = %other, "item already indexed in another stage, skipping");
                continue;
            }
            if self.add(stage, id) {
                added += 1;
            }
        }
        added
    }

    /// The stage currently holding `id`, if any.
    pub fn stage_of(&self, id: ItemId) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| self.contains(*stage, id))
    }

    /// Insert into `stage`. Returns false if already present.
    pub(crate) fn add(&self, stage: Stage, id: ItemId) -> bool {
        self.write(stage).insert(id)
    }

    /// Remove from `stage`. Returns false if it was not a member.
    pub(crate) fn remove(&self, stage: Stage, id: ItemId) -> bool {
        self.write(stage).remove(&id)
    }

    // A set of IDs has no invariant a panicking holder could leave half-applied,
    // so a poisoned lock is still safe to use.
    fn read(&self, stage: Stage) -> RwLockReadGuard<'_, HashSet<ItemId>> {
        self.sets[stage.index()]
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, stage: Stage) -> RwLockWriteGuard<'_, HashSet<ItemId>> {
        self.sets[stage.index()]
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> ItemId {
        ItemId::new(n).unwrap()
    }

    #[test]
    fn pick_any_on_empty_stage_is_none() {
        let index = StageIndex::new();
        assert_eq!(index.pick_any(Stage::Review), None);
        assert!(index.is_empty(Stage::Review));
    }

    #[test]
    fn pick_any_returns_a_current_member() {
        let index = StageIndex::new();
        index.seed(Stage::Review, [id(1), id(2)]);
        let picked = index.pick_any(Stage::Review).unwrap();
        assert!(index.contains(Stage::Review, picked));

        index.remove(Stage::Review, id(1));
        index.remove(Stage::Review, id(2));
        assert_eq!(index.pick_any(Stage::Review), None);
    }

    #[test]
    fn seed_skips_ids_owned_by_another_stage() {
        let index = StageIndex::new();
        assert_eq!(index.seed(Stage::Review, [id(5), id(6)]), 2);
        assert_eq!(index.seed(Stage::Accept, [id(6), id(7)]), 1);

        assert_eq!(index.stage_of(id(6)), Some(Stage::Review));
        assert!(!index.contains(Stage::Accept, id(6)));
        assert_eq!(index.members(Stage::Accept), vec![id(7)]);
    }

    #[test]
    fn remove_reports_membership() {
        let index = StageIndex::new();
        index.seed(Stage::Review, [id(9)]);
        assert!(index.remove(Stage::Review, id(9)));
        assert!(!index.remove(Stage::Review, id(9)));
    }
}

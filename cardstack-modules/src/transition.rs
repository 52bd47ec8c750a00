use cardstack_storage::{MediaLibrary, StoreResult};
use cardstack_types::MediaId;
use std::collections::{BTreeMap, BTreeSet};
use std::iter;

/// One reference-count change handed to [`MediaLibrary::reference_medias`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct MediaTransition {
    pub added: Vec<MediaId>,
    pub removed: Vec<MediaId>,
}

impl MediaTransition {
    /// Set difference in both directions. Ids present on both sides are untouched.
    pub fn between(before: &BTreeSet<MediaId>, after: &BTreeSet<MediaId>) -> Self {
        Self {
            added: after.difference(before).copied().collect(),
            removed: before.difference(after).copied().collect(),
        }
    }

    /// Combined change when one group of modules replaces another.
    ///
    /// Each module holds one reference per distinct id it embeds, so the
    /// per-id counts of both groups are compared and only the difference is
    /// issued. Ids embedded equally often on both sides are untouched.
    pub fn replace(
        before: impl IntoIterator<Item = BTreeSet<MediaId>>,
        after: impl IntoIterator<Item = BTreeSet<MediaId>>,
    ) -> Self {
        let before = tally(before);
        let after = tally(after);
        let ids: BTreeSet<MediaId> = before.keys().chain(after.keys()).copied().collect();

        let mut transition = Self::default();
        for id in ids {
            let old = before.get(&id).copied().unwrap_or(0);
            let new = after.get(&id).copied().unwrap_or(0);
            if new > old {
                transition.added.extend(iter::repeat_n(id, new - old));
            } else {
                transition.removed.extend(iter::repeat_n(id, old - new));
            }
        }
        transition
    }

    /// One reference per module per embedded id.
    pub fn acquire(per_module: impl IntoIterator<Item = BTreeSet<MediaId>>) -> Self {
        Self {
            added: per_module.into_iter().flatten().collect(),
            removed: Vec::new(),
        }
    }

    /// One release per module per embedded id.
    pub fn release(per_module: impl IntoIterator<Item = BTreeSet<MediaId>>) -> Self {
        Self {
            added: Vec::new(),
            removed: per_module.into_iter().flatten().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Issues the transition, skipping the call entirely when there is nothing to change.
    pub fn apply(&self, media: &dyn MediaLibrary) -> StoreResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        media.reference_medias(&self.added, &self.removed)
    }
}

/// Number of modules embedding each id.
fn tally(per_module: impl IntoIterator<Item = BTreeSet<MediaId>>) -> BTreeMap<MediaId, usize> {
    let mut counts = BTreeMap::new();
    for id in per_module.into_iter().flatten() {
        *counts.entry(id).or_default() += 1;
    }
    counts
}

//! Cycle cursors: the last-activated candidate per trigger key.
//!
//! A cursor entry is created on the first activation for a key, rewritten on
//! every later one, and pruned whenever a registry refresh drops its key or
//! its remembered candidate. A cursor must never reference a candidate
//! outside the current registry; pruning enforces that, and the selection in
//! [`crate::policy::classify`] treats any leftover staleness as a fresh key.

use std::collections::HashMap;

use mac_activate::AppId;
use mac_keypos::KeyPos;

/// Per-key memory of the last activated candidate.
#[derive(Debug, Default)]
pub(crate) struct CycleState {
    cursors: HashMap<KeyPos, AppId>,
}

impl CycleState {
    /// Cursor for `key`, if one has been recorded and survived pruning.
    pub(crate) fn get(&self, key: KeyPos) -> Option<&AppId> {
        self.cursors.get(&key)
    }

    /// Record `id` as the last activated candidate for `key`.
    pub(crate) fn set(&mut self, key: KeyPos, id: AppId) {
        self.cursors.insert(key, id);
    }

    /// Drop every cursor whose key vanished from the registry or whose
    /// candidate is no longer in that key's list.
    pub(crate) fn prune(&mut self, registry: &HashMap<KeyPos, Vec<AppId>>) {
        self.cursors
            .retain(|key, cur| registry.get(key).is_some_and(|list| list.contains(cur)));
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.cursors.len()
    }
}

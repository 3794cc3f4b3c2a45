//! Ordered checkpoint storage

use indexmap::IndexMap;
use waymark_platform::TargetId;

use crate::checkpoint::{Checkpoint, CheckpointId};

/// Live checkpoints in registration order
///
/// Several checkpoints may watch the same target; each is independent.
#[derive(Default)]
pub struct Registry {
    entries: IndexMap<CheckpointId, Checkpoint>,
    next_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh id without storing anything yet
    pub(crate) fn allocate_id(&mut self) -> CheckpointId {
        self.next_id += 1;
        CheckpointId(self.next_id)
    }

    pub(crate) fn insert(&mut self, checkpoint: Checkpoint) {
        self.entries.insert(checkpoint.id, checkpoint);
    }

    /// Remove one checkpoint, keeping the order of the rest
    pub(crate) fn remove(&mut self, id: CheckpointId) -> Option<Checkpoint> {
        self.entries.shift_remove(&id)
    }

    /// Remove every checkpoint watching `target`, returning how many went
    pub(crate) fn remove_target(&mut self, target: TargetId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, point| point.target != target);
        before - self.entries.len()
    }

    pub fn get(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: CheckpointId) -> Option<&mut Checkpoint> {
        self.entries.get_mut(&id)
    }

    /// Snapshot of the current ids, safe to iterate while mutating
    pub(crate) fn ids(&self) -> Vec<CheckpointId> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Checkpoint> {
        self.entries.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use slotmap::SlotMap;

    use super::*;
    use crate::offset::Offset;
    use crate::trigger::Alignment;

    fn checkpoint(registry: &mut Registry, target: TargetId) -> CheckpointId {
        let id = registry.allocate_id();
        registry.insert(Checkpoint {
            id,
            target,
            alignment: Alignment::Top,
            offset: Offset::default(),
            threshold: 0.0,
            has_crossed: false,
            fire_once: false,
            handler: Rc::new(|_| Ok(())),
        });
        id
    }

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut targets: SlotMap<TargetId, ()> = SlotMap::with_key();
        let (a, b) = (targets.insert(()), targets.insert(()));
        let mut registry = Registry::new();
        let first = checkpoint(&mut registry, a);
        let second = checkpoint(&mut registry, b);
        let third = checkpoint(&mut registry, a);

        assert!(registry.remove(second).is_some());
        assert_eq!(registry.ids(), vec![first, third]);
    }

    #[test]
    fn test_remove_target_drops_duplicates() {
        let mut targets: SlotMap<TargetId, ()> = SlotMap::with_key();
        let (a, b) = (targets.insert(()), targets.insert(()));
        let mut registry = Registry::new();
        checkpoint(&mut registry, a);
        let kept = checkpoint(&mut registry, b);
        checkpoint(&mut registry, a);

        assert_eq!(registry.remove_target(a), 2);
        assert_eq!(registry.ids(), vec![kept]);
        assert_eq!(registry.remove_target(a), 0);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut registry = Registry::new();
        let a = registry.allocate_id();
        let b = registry.allocate_id();
        assert_ne!(a, b);
        registry.clear();
        assert_ne!(registry.allocate_id(), b);
    }
}

//! Ordered, identity-keyed set of selected nodes

use crate::domain::arena::NodeId;

/// Selected nodes in insertion order.
///
/// Membership is by [`NodeId`], never by value, so two nodes carrying the same
/// value in different positions are distinct members. Order only matters when
/// the set is encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedSet {
    ids: Vec<NodeId>,
}

impl SelectedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(id: NodeId) -> Self {
        Self { ids: vec![id] }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    /// Append `id` unless already present. Returns whether it was added.
    pub fn insert(&mut self, id: NodeId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id` if present. Returns whether it was removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        match self.ids.iter().position(|&x| x == id) {
            Some(pos) => {
                self.ids.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.ids.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.ids
    }

    /// Same members regardless of order.
    pub fn same_members(&self, other: &SelectedSet) -> bool {
        self.len() == other.len() && self.iter().all(|id| other.contains(id))
    }
}

impl FromIterator<NodeId> for SelectedSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        let mut set = SelectedSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generational_arena::Arena;

    fn ids(n: usize) -> Vec<NodeId> {
        let mut arena = Arena::new();
        (0..n).map(|i| arena.insert(i)).collect()
    }

    #[test]
    fn given_duplicate_ids_when_collecting_then_keeps_first_occurrence() {
        let ids = ids(2);
        let set: SelectedSet = vec![ids[1], ids[0], ids[1]].into_iter().collect();
        assert_eq!(set.as_slice(), &[ids[1], ids[0]]);
    }

    #[test]
    fn given_set_when_removing_then_preserves_order_of_rest() {
        let ids = ids(3);
        let mut set: SelectedSet = ids.iter().copied().collect();
        assert!(set.remove(ids[1]));
        assert!(!set.remove(ids[1]));
        assert_eq!(set.as_slice(), &[ids[0], ids[2]]);
    }

    #[test]
    fn given_reordered_sets_when_comparing_members_then_equal() {
        let ids = ids(2);
        let a: SelectedSet = vec![ids[0], ids[1]].into_iter().collect();
        let b: SelectedSet = vec![ids[1], ids[0]].into_iter().collect();
        assert!(a.same_members(&b));
        assert_ne!(a, b);
    }
}

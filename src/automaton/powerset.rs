//! Interning of state subsets for the subset construction.

use rustc_hash::FxHashMap;

use super::{StateId, Weight};

/// Interns sorted subsets of source states as dense ids.
///
/// Singletons are looked up by value, which avoids hashing a `Vec` for the
/// common case of a transition that is already deterministic.
#[derive(Debug, Default)]
pub struct PowersetArena {
    map: FxHashMap<Vec<StateId>, StateId>,
    single_map: FxHashMap<StateId, StateId>,
    /// Member states of each interned subset.
    pub sets: Vec<Vec<StateId>>,
    /// Final weight of each subset: the best final weight of its members.
    pub final_weights: Vec<Option<Weight>>,
}

impl PowersetArena {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a sorted, deduplicated subset.
    ///
    /// Returns the subset's id and whether it was newly created.
    pub fn intern(&mut self, sorted_set: Vec<StateId>, final_weight: Option<Weight>) -> (StateId, bool) {
        if let [single] = sorted_set[..] {
            if let Some(&id) = self.single_map.get(&single) {
                return (id, false);
            }
            let id = self.push(sorted_set, final_weight);
            self.single_map.insert(single, id);
            return (id, true);
        }

        if let Some(&id) = self.map.get(&sorted_set) {
            return (id, false);
        }
        let id = self.push(sorted_set.clone(), final_weight);
        self.map.insert(sorted_set, id);
        (id, true)
    }

    /// Id of an already interned subset.
    pub fn lookup(&self, sorted_set: &[StateId]) -> Option<StateId> {
        if let [single] = sorted_set {
            return self.single_map.get(single).copied();
        }
        self.map.get(sorted_set).copied()
    }

    /// Number of interned subsets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// True if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    fn push(&mut self, set: Vec<StateId>, final_weight: Option<Weight>) -> StateId {
        let id = self.sets.len() as StateId;
        self.sets.push(set);
        self.final_weights.push(final_weight);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_reuses_ids() {
        let mut arena = PowersetArena::new();

        let (id0, new0) = arena.intern(vec![1, 2, 3], None);
        let (id1, new1) = arena.intern(vec![4], Some(Weight::ONE));
        let (id2, new2) = arena.intern(vec![1, 2, 3], None);

        assert_eq!((id0, new0), (0, true));
        assert_eq!((id1, new1), (1, true));
        assert_eq!((id2, new2), (0, false));
        assert_eq!(arena.final_weights[id1 as usize], Some(Weight::ONE));
        assert_eq!(arena.lookup(&[4]), Some(1));
        assert_eq!(arena.lookup(&[9]), None);
        assert_eq!(arena.len(), 2);
    }
}

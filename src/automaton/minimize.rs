//! Partition-refinement minimization of deterministic automata.
//!
//! Implements the Valmari-Lehtinen variant of Hopcroft's algorithm, which
//! works directly on partial transition functions: no sink state is added,
//! and the running time is `O(m log n)` for `m` transitions and `n` states.
//! Two refinable partitions are maintained, one of states (blocks) and one of
//! transitions (cords). Cords start grouped by label; each cord splits blocks
//! by the states that have such a transition, and each new block splits cords
//! by whether the transition enters it.
//!
//! Transitions are compared as `(input, output, weight)` triples, matching
//! [`determinize`](super::optimize::determinize).

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::optimize::{encode, EncodedLabel};
use super::{Automaton, StateId, Transition};

/// A refinable partition of `0..n`.
struct Partition {
    sets: usize,
    elements: Vec<usize>,
    location: Vec<usize>,
    set_of: Vec<usize>,
    first: Vec<usize>,
    past: Vec<usize>,
    marked: Vec<usize>,
    touched: Vec<usize>,
}

impl Partition {
    /// One set holding every element (none if `n == 0`).
    fn new(n: usize) -> Self {
        let mut past = vec![0; n];
        if n > 0 {
            past[0] = n;
        }
        Partition {
            sets: usize::from(n > 0),
            elements: (0..n).collect(),
            location: (0..n).collect(),
            set_of: vec![0; n],
            first: vec![0; n],
            past,
            marked: vec![0; n],
            touched: Vec::new(),
        }
    }

    /// Partition whose sets are the runs of equal keys in `order`.
    fn from_runs<K: PartialEq>(order: Vec<usize>, key: impl Fn(usize) -> K) -> Self {
        let n = order.len();
        let mut p = Partition::new(n);
        if n == 0 {
            return p;
        }
        p.sets = 0;
        let mut run_key = key(order[0]);
        p.first[0] = 0;
        for (i, &e) in order.iter().enumerate() {
            let k = key(e);
            if k != run_key {
                p.past[p.sets] = i;
                p.sets += 1;
                p.first[p.sets] = i;
                run_key = k;
            }
            p.elements[i] = e;
            p.location[e] = i;
            p.set_of[e] = p.sets;
        }
        p.past[p.sets] = n;
        p.sets += 1;
        p
    }

    fn mark(&mut self, e: usize) {
        let s = self.set_of[e];
        let i = self.location[e];
        let j = self.first[s] + self.marked[s];
        self.elements[i] = self.elements[j];
        self.location[self.elements[i]] = i;
        self.elements[j] = e;
        self.location[e] = j;
        if self.marked[s] == 0 {
            self.touched.push(s);
        }
        self.marked[s] += 1;
    }

    /// Split every touched set into its marked and unmarked parts. The
    /// smaller part becomes the new set.
    fn split(&mut self) {
        while let Some(s) = self.touched.pop() {
            let j = self.first[s] + self.marked[s];
            if j == self.past[s] {
                self.marked[s] = 0;
                continue;
            }
            let z = self.sets;
            if self.marked[s] <= self.past[s] - j {
                self.first[z] = self.first[s];
                self.past[z] = j;
                self.first[s] = j;
            } else {
                self.past[z] = self.past[s];
                self.first[z] = j;
                self.past[s] = j;
            }
            for i in self.first[z]..self.past[z] {
                self.set_of[self.elements[i]] = z;
            }
            self.marked[s] = 0;
            self.marked[z] = 0;
            self.sets += 1;
        }
    }

    fn members(&self, set: usize) -> &[usize] {
        &self.elements[self.first[set]..self.past[set]]
    }
}

/// Merge equivalent states of a deterministic, accessible automaton.
///
/// States are equivalent when they have the same final weight and the same
/// future over encoded labels. The quotient is numbered breadth-first from
/// the start state; each block keeps the transition order of its first
/// member.
pub fn minimize(fst: &Automaton) -> Automaton {
    let n = fst.num_states();
    let Some(start) = fst.start() else {
        return fst.clone();
    };
    if n <= 1 {
        return fst.clone();
    }

    // Flatten transitions and give each encoded label a dense id.
    let mut tails: Vec<usize> = Vec::new();
    let mut heads: Vec<usize> = Vec::new();
    let mut label_ids: Vec<u32> = Vec::new();
    let mut labels: FxHashMap<EncodedLabel, u32> = FxHashMap::default();
    for s in fst.states() {
        for t in fst.transitions(s) {
            let next = labels.len() as u32;
            let id = *labels.entry(encode(t)).or_insert(next);
            tails.push(s as usize);
            heads.push(t.target as usize);
            label_ids.push(id);
        }
    }
    let m = tails.len();

    // Initial blocks: one per distinct final weight, plus non-final states.
    let mut blocks = Partition::new(n);
    let mut final_classes: Vec<(u32, Vec<usize>)> = Vec::new();
    for s in fst.states() {
        if let Some(w) = fst.final_weight(s) {
            match final_classes.iter_mut().find(|(k, _)| *k == w.key()) {
                Some((_, members)) => members.push(s as usize),
                None => final_classes.push((w.key(), vec![s as usize])),
            }
        }
    }
    for (_, members) in &final_classes {
        for &s in members {
            blocks.mark(s);
        }
        blocks.split();
    }

    // Incoming transitions of each state.
    let mut incoming_start = vec![0usize; n + 1];
    for &h in &heads {
        incoming_start[h + 1] += 1;
    }
    for i in 0..n {
        incoming_start[i + 1] += incoming_start[i];
    }
    let mut incoming = vec![0usize; m];
    let mut fill = incoming_start.clone();
    for (t, &h) in heads.iter().enumerate() {
        incoming[fill[h]] = t;
        fill[h] += 1;
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by_key(|&t| label_ids[t]);
    let mut cords = Partition::from_runs(order, |t| label_ids[t]);

    let mut b = 1;
    let mut c = 0;
    while c < cords.sets {
        let cord: Vec<usize> = cords.members(c).to_vec();
        for t in cord {
            blocks.mark(tails[t]);
        }
        blocks.split();
        c += 1;

        while b < blocks.sets {
            let block: Vec<usize> = blocks.members(b).to_vec();
            for s in block {
                for &t in &incoming[incoming_start[s]..incoming_start[s + 1]] {
                    cords.mark(t);
                }
            }
            cords.split();
            b += 1;
        }
    }

    quotient(fst, start, &blocks)
}

/// Build the quotient automaton, numbering blocks breadth-first.
fn quotient(fst: &Automaton, start: StateId, blocks: &Partition) -> Automaton {
    let mut result = Automaton::new(fst.alphabet().clone());
    let mut renumber: Vec<Option<StateId>> = vec![None; blocks.sets];
    let mut queue: VecDeque<usize> = VecDeque::new();

    let start_block = blocks.set_of[start as usize];
    renumber[start_block] = Some(result.add_state());
    result.set_start(0);
    queue.push_back(start_block);

    while let Some(block) = queue.pop_front() {
        let Some(source) = renumber[block] else {
            continue;
        };
        let representative = blocks.elements[blocks.first[block]] as StateId;
        if let Some(w) = fst.final_weight(representative) {
            result.set_final(source, w);
        }
        for t in fst.transitions(representative) {
            let target_block = blocks.set_of[t.target as usize];
            let target = match renumber[target_block] {
                Some(id) => id,
                None => {
                    let id = result.add_state();
                    renumber[target_block] = Some(id);
                    queue.push_back(target_block);
                    id
                }
            };
            result.add_transition(source, Transition { target, ..*t });
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::ops::testing::accepts;
    use super::super::optimize::{connect, determinize, rm_epsilon};
    use super::super::ops::{closure, concat, union};
    use super::super::Weight;
    use super::*;
    use crate::alphabet::{Alphabet, Label};

    fn sigma() -> Arc<Alphabet> {
        Alphabet::builder("abc").symbols(["a", "b", "c"]).build().unwrap()
    }

    fn labels(s: &Arc<Alphabet>, text: &str) -> Vec<Label> {
        s.tokenize(text).unwrap()
    }

    fn prepared(fst: &Automaton) -> Automaton {
        determinize(&connect(&rm_epsilon(fst)))
    }

    #[test]
    fn test_merges_equivalent_suffixes() {
        let s = sigma();
        // ab | cb: the two `b` tails are equivalent
        let ab = Automaton::linear(s.clone(), &labels(&s, "ab"));
        let cb = Automaton::linear(s.clone(), &labels(&s, "cb"));
        let det = prepared(&union(&ab, &cb).unwrap());
        let min = minimize(&det);

        assert!(min.num_states() < det.num_states());
        assert_eq!(min.num_states(), 3);
        assert!(accepts(&min, &labels(&s, "ab")));
        assert!(accepts(&min, &labels(&s, "cb")));
        assert!(!accepts(&min, &labels(&s, "ac")));
    }

    #[test]
    fn test_star_collapses_to_one_state() {
        let s = sigma();
        let a = Automaton::linear(s.clone(), &labels(&s, "a"));
        let aa = concat(&a, &a).unwrap();
        let star = closure(&union(&a, &aa).unwrap());
        let min = minimize(&prepared(&star));

        assert_eq!(min.num_states(), 1);
        assert!(min.is_final(0));
        assert!(accepts(&min, &labels(&s, "aaaa")));
    }

    #[test]
    fn test_distinct_final_weights_stay_apart() {
        let s = sigma();
        let a = s.label("a").unwrap();
        let mut fst = Automaton::new(s);
        let q0 = fst.add_state();
        let q1 = fst.add_state();
        let q2 = fst.add_state();
        fst.set_start(q0);
        fst.add_transition(q0, Transition::new(a, a, q1));
        fst.add_transition(q1, Transition::new(a, a, q2));
        fst.set_final(q1, Weight(1.0));
        fst.set_final(q2, Weight::ONE);

        let min = minimize(&fst);
        assert_eq!(min.num_states(), 3);
    }

    #[test]
    fn test_partial_transitions_distinguish_states() {
        let s = sigma();
        let a = s.label("a").unwrap();
        let b = s.label("b").unwrap();
        let mut fst = Automaton::new(s);
        let q0 = fst.add_state();
        let q1 = fst.add_state();
        let q2 = fst.add_state();
        fst.set_start(q0);
        fst.set_final(q0, Weight::ONE);
        fst.set_final(q1, Weight::ONE);
        fst.set_final(q2, Weight::ONE);
        fst.add_transition(q0, Transition::new(a, a, q1));
        fst.add_transition(q1, Transition::new(b, b, q2));

        // a? b? shaped: every state accepts but their futures differ
        let min = minimize(&fst);
        assert_eq!(min.num_states(), 3);
    }
}

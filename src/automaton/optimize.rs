//! Size reduction passes run after every compilation and composition step.
//!
//! The full pipeline is [`optimize`]:
//!
//! 1. [`rm_epsilon`] - drop `ε:ε` transitions, folding them into their
//!    successors
//! 2. [`connect`] - keep states that are both accessible and co-accessible
//! 3. [`determinize`] - subset construction over `(input, output, weight)`
//!    triples treated as single labels
//! 4. [`minimize`](super::minimize::minimize) - merge equivalent states
//!
//! Treating each triple as one label keeps determinization applicable to
//! transducers: the result accepts exactly the same set of labeled paths, and
//! for any path that was duplicated the cheaper weight survives.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

use super::minimize::minimize;
use super::powerset::PowersetArena;
use super::{Automaton, StateId, Transition, Weight};
use crate::alphabet::Label;
use crate::error::{CompileError, CompileResult};

/// Remove every `ε:ε` transition.
///
/// Each state receives copies of the non-epsilon transitions of the states
/// in its epsilon closure, with the closure distance folded into the weight.
/// Closures are explored breadth-first, so transition order stays stable.
pub fn rm_epsilon(fst: &Automaton) -> Automaton {
    let mut result = Automaton::new(fst.alphabet().clone());
    for _ in fst.states() {
        result.add_state();
    }
    if let Some(start) = fst.start() {
        result.set_start(start);
    }

    for s in fst.states() {
        let closure = epsilon_closure(fst, s);

        let mut final_weight: Option<Weight> = None;
        for &(q, distance) in &closure {
            if let Some(w) = fst.final_weight(q) {
                let w = distance.times(w);
                final_weight = Some(final_weight.map_or(w, |f| f.plus(w)));
            }
            for t in fst.transitions(q).iter().filter(|t| !t.is_epsilon()) {
                result.add_transition(
                    s,
                    Transition {
                        weight: distance.times(t.weight),
                        ..*t
                    },
                );
            }
        }
        if let Some(w) = final_weight {
            result.set_final(s, w);
        }
    }

    result
}

/// States reachable from `source` through `ε:ε` transitions, with their
/// shortest distance, in discovery order. `source` itself comes first.
fn epsilon_closure(fst: &Automaton, source: StateId) -> SmallVec<[(StateId, Weight); 4]> {
    let mut closure: SmallVec<[(StateId, Weight); 4]> = SmallVec::new();
    let mut position: FxHashMap<StateId, usize> = FxHashMap::default();
    let mut queue: VecDeque<StateId> = VecDeque::new();

    closure.push((source, Weight::ONE));
    position.insert(source, 0);
    queue.push_back(source);

    while let Some(q) = queue.pop_front() {
        let here = closure[position[&q]].1;
        for t in fst.transitions(q).iter().filter(|t| t.is_epsilon()) {
            let candidate = here.times(t.weight);
            match position.get(&t.target) {
                Some(&i) => {
                    if candidate.0 < (closure[i].1).0 {
                        closure[i].1 = candidate;
                        queue.push_back(t.target);
                    }
                }
                None => {
                    position.insert(t.target, closure.len());
                    closure.push((t.target, candidate));
                    queue.push_back(t.target);
                }
            }
        }
    }

    closure
}

/// Keep only states on some path from the start to a final state.
///
/// Surviving states keep their relative order and their transitions keep
/// their order. If no final state is reachable the result has no start state.
pub fn connect(fst: &Automaton) -> Automaton {
    let n = fst.num_states();
    let Some(start) = fst.start() else {
        return Automaton::new(fst.alphabet().clone());
    };

    let mut accessible = vec![false; n];
    let mut queue: VecDeque<StateId> = VecDeque::new();
    accessible[start as usize] = true;
    queue.push_back(start);
    while let Some(s) = queue.pop_front() {
        for t in fst.transitions(s) {
            if !accessible[t.target as usize] {
                accessible[t.target as usize] = true;
                queue.push_back(t.target);
            }
        }
    }

    let mut reverse: Vec<SmallVec<[StateId; 2]>> = vec![SmallVec::new(); n];
    for s in fst.states().filter(|&s| accessible[s as usize]) {
        for t in fst.transitions(s) {
            reverse[t.target as usize].push(s);
        }
    }

    let mut coaccessible = vec![false; n];
    for s in fst.states() {
        if accessible[s as usize] && fst.is_final(s) {
            coaccessible[s as usize] = true;
            queue.push_back(s);
        }
    }
    while let Some(s) = queue.pop_front() {
        for &p in &reverse[s as usize] {
            if !coaccessible[p as usize] {
                coaccessible[p as usize] = true;
                queue.push_back(p);
            }
        }
    }

    let mut result = Automaton::new(fst.alphabet().clone());
    if !coaccessible[start as usize] {
        return result;
    }

    let mut renumber: Vec<Option<StateId>> = vec![None; n];
    for s in fst.states() {
        if coaccessible[s as usize] {
            renumber[s as usize] = Some(result.add_state());
        }
    }
    for s in fst.states() {
        let Some(new_s) = renumber[s as usize] else {
            continue;
        };
        if let Some(w) = fst.final_weight(s) {
            result.set_final(new_s, w);
        }
        for t in fst.transitions(s) {
            if let Some(target) = renumber[t.target as usize] {
                result.add_transition(new_s, Transition { target, ..*t });
            }
        }
    }
    result.set_start(renumber[start as usize].unwrap_or_default());

    result
}

/// Key under which a transition is treated as a single symbol.
pub(crate) type EncodedLabel = (Label, Label, u32);

#[inline]
pub(crate) fn encode(t: &Transition) -> EncodedLabel {
    (t.input, t.output, t.weight.key())
}

/// Subset construction over encoded labels.
///
/// The input must be free of `ε:ε` transitions. Every other transition,
/// including `a:ε` and `ε:b`, is an ordinary symbol here. Subsets are
/// explored breadth-first and their transitions are emitted in order of first
/// appearance among the member states, so the result is reproducible.
pub fn determinize(fst: &Automaton) -> Automaton {
    let mut result = Automaton::new(fst.alphabet().clone());
    let Some(start) = fst.start() else {
        return result;
    };

    let mut arena = PowersetArena::new();
    let mut queue: VecDeque<StateId> = VecDeque::new();

    let (start_id, _) = arena.intern(vec![start], fst.final_weight(start));
    result.add_state();
    result.set_start(start_id);
    queue.push_back(start_id);

    while let Some(id) = queue.pop_front() {
        if let Some(w) = arena.final_weights[id as usize] {
            result.set_final(id, w);
        }

        let mut groups: Vec<(EncodedLabel, Transition, Vec<StateId>)> = Vec::new();
        let mut by_label: FxHashMap<EncodedLabel, usize> = FxHashMap::default();
        for &q in &arena.sets[id as usize] {
            for t in fst.transitions(q) {
                let key = encode(t);
                match by_label.get(&key) {
                    Some(&g) => groups[g].2.push(t.target),
                    None => {
                        by_label.insert(key, groups.len());
                        groups.push((key, *t, vec![t.target]));
                    }
                }
            }
        }

        for (_, t, mut targets) in groups {
            targets.sort_unstable();
            targets.dedup();
            let final_weight = targets
                .iter()
                .filter_map(|&q| fst.final_weight(q))
                .reduce(Weight::plus);
            let (target, created) = arena.intern(targets, final_weight);
            if created {
                result.add_state();
                queue.push_back(target);
            }
            result.add_transition(id, Transition { target, ..t });
        }
    }

    result
}

/// Run the full optimization pipeline on `fst`.
///
/// `what` names the automaton in the [`CompileError::EmptyLanguage`] raised
/// when no accepting path survives.
pub fn optimize(fst: &Automaton, what: &str) -> CompileResult<Automaton> {
    let before = (fst.num_states(), fst.num_transitions());

    let trimmed = connect(&rm_epsilon(fst));
    if trimmed.is_empty() {
        return Err(CompileError::EmptyLanguage {
            what: what.to_string(),
        });
    }

    let mut optimized = connect(&minimize(&determinize(&trimmed)));
    if optimized.is_empty() {
        return Err(CompileError::EmptyLanguage {
            what: what.to_string(),
        });
    }
    optimized.share_alphabet(fst.alphabet());

    trace!(
        what,
        states_before = before.0,
        transitions_before = before.1,
        states = optimized.num_states(),
        transitions = optimized.num_transitions(),
        "optimized automaton"
    );

    Ok(optimized)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::ops::testing::{accepts, outputs};
    use super::super::ops::{closure, concat, union};
    use super::*;
    use crate::alphabet::{Alphabet, EPSILON};

    fn sigma() -> Arc<Alphabet> {
        Alphabet::builder("abc").symbols(["a", "b", "c"]).build().unwrap()
    }

    fn labels(s: &Arc<Alphabet>, text: &str) -> Vec<Label> {
        s.tokenize(text).unwrap()
    }

    #[test]
    fn test_rm_epsilon_preserves_language() {
        let s = sigma();
        let a = Automaton::linear(s.clone(), &labels(&s, "a"));
        let b = Automaton::linear(s.clone(), &labels(&s, "b"));
        let fst = concat(&closure(&a), &b).unwrap();
        let no_eps = rm_epsilon(&fst);

        for state in no_eps.states() {
            assert!(no_eps.transitions(state).iter().all(|t| !t.is_epsilon()));
        }
        assert!(accepts(&no_eps, &labels(&s, "aab")));
        assert!(accepts(&no_eps, &labels(&s, "b")));
        assert!(!accepts(&no_eps, &labels(&s, "aa")));
    }

    #[test]
    fn test_connect_drops_dead_states() {
        let s = sigma();
        let a = s.label("a").unwrap();
        let mut fst = Automaton::new(s);
        let q0 = fst.add_state();
        let q1 = fst.add_state();
        let dead = fst.add_state();
        let _unreachable = fst.add_state();
        fst.set_start(q0);
        fst.set_final(q1, Weight::ONE);
        fst.add_transition(q0, Transition::new(a, a, q1));
        fst.add_transition(q0, Transition::new(a, a, dead));

        let trimmed = connect(&fst);
        assert_eq!(trimmed.num_states(), 2);
        assert_eq!(trimmed.num_transitions(), 1);
    }

    #[test]
    fn test_connect_without_final_is_empty() {
        let s = sigma();
        let mut fst = Automaton::new(s);
        let q0 = fst.add_state();
        fst.set_start(q0);
        assert!(connect(&fst).is_empty());
    }

    #[test]
    fn test_determinize_merges_common_prefixes() {
        let s = sigma();
        let ab = Automaton::linear(s.clone(), &labels(&s, "ab"));
        let ac = Automaton::linear(s.clone(), &labels(&s, "ac"));
        let fst = connect(&rm_epsilon(&union(&ab, &ac).unwrap()));
        let det = determinize(&fst);

        let start = det.start().unwrap();
        assert_eq!(det.transitions(start).len(), 1);
        assert!(accepts(&det, &labels(&s, "ab")));
        assert!(accepts(&det, &labels(&s, "ac")));
    }

    #[test]
    fn test_optimize_keeps_transducer_relation() {
        let s = sigma();
        let a_to_bc = Automaton::cross(s.clone(), &labels(&s, "a"), &labels(&s, "bc"));
        let c_to_eps = Automaton::cross(s.clone(), &labels(&s, "c"), &[]);
        let star = closure(&union(&a_to_bc, &c_to_eps).unwrap());
        let optimized = optimize(&star, "star").unwrap();

        let out = outputs(&optimized, &labels(&s, "aca"), 4);
        assert_eq!(out.into_iter().collect::<Vec<_>>(), vec![labels(&s, "bcbc")]);
        assert!(optimized
            .states()
            .all(|q| optimized.transitions(q).iter().all(|t| t.input != EPSILON || t.output != EPSILON)));
    }

    #[test]
    fn test_optimize_reports_empty_language() {
        let s = sigma();
        let a = Automaton::linear(s.clone(), &labels(&s, "a"));
        let b = Automaton::linear(s.clone(), &labels(&s, "b"));
        let never = crate::automaton::compose(&a, &b).unwrap();

        let err = optimize(&never, "a-then-b").unwrap_err();
        assert_eq!(
            err,
            CompileError::EmptyLanguage {
                what: "a-then-b".to_string()
            }
        );
    }
}

//! Best-path selection for a single input.
//!
//! Resolution composes the linear acceptor of the input with a compiled
//! cascade, trims the result (the *lattice*) and extracts one path from it.
//!
//! # Canonical path
//!
//! The chosen path minimizes total weight. Ties are broken by a best-first
//! search keyed by `(accumulated weight, discovery order)` in which
//! transitions are expanded in their stored order. For the unweighted rule
//! tables in this crate that is a breadth-first search in insertion order,
//! so repeated calls always return the same output.
//!
//! Resolution only reads the cascade and allocates call-local scratch, so
//! any number of threads may resolve against one cascade concurrently.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use crate::alphabet::{Label, EPSILON};
use crate::automaton::ops::compose_unchecked;
use crate::automaton::{connect, Automaton, StateId, Weight};
use crate::cascade::CompiledCascade;
use crate::error::{ResolveError, ResolveResult};

/// Output labels of the best path for `input`, epsilons removed.
///
/// # Errors
///
/// - [`ResolveError::InvalidSymbol`] if `input` contains text that is not a
///   symbol of the cascade's alphabet
/// - [`ResolveError::NoValidTransduction`] if no path accepts `input`
pub fn resolve(cascade: &CompiledCascade, input: &str) -> ResolveResult<Vec<Label>> {
    let alphabet = cascade.alphabet();
    let labels = alphabet
        .tokenize(input)
        .map_err(|e| ResolveError::InvalidSymbol {
            symbol: e.symbol,
            offset: e.offset,
        })?;

    let word = Automaton::linear(alphabet.clone(), &labels);
    let lattice = connect(&compose_unchecked(&word, cascade.automaton()));
    trace!(
        cascade = cascade.name(),
        input,
        states = lattice.num_states(),
        transitions = lattice.num_transitions(),
        "resolution lattice"
    );

    best_path(&lattice).ok_or_else(|| ResolveError::NoValidTransduction {
        input: input.to_string(),
    })
}

/// [`resolve`], rendered with the alphabet's canonical spellings.
pub fn resolve_str(cascade: &CompiledCascade, input: &str) -> ResolveResult<String> {
    let labels = resolve(cascade, input)?;
    Ok(cascade.alphabet().render(&labels))
}

/// Heap entry. `BinaryHeap` is a max-heap, so the ordering is reversed.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: f32,
    seq: u64,
    state: StateId,
    /// `None` for the start state; otherwise the predecessor and the index
    /// of the transition taken.
    via: Option<(StateId, usize)>,
    accept: bool,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Output labels of the canonical best path of `fst`, or `None` if it
/// accepts nothing. Weights must be non-negative.
pub(crate) fn best_path(fst: &Automaton) -> Option<Vec<Label>> {
    let start = fst.start()?;
    let n = fst.num_states();

    let mut settled = vec![false; n];
    let mut parent: Vec<Option<(StateId, usize)>> = vec![None; n];
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    heap.push(Candidate {
        cost: Weight::ONE.0,
        seq,
        state: start,
        via: None,
        accept: false,
    });

    while let Some(candidate) = heap.pop() {
        let state = candidate.state;

        if candidate.accept {
            return Some(trace_back(fst, &parent, state));
        }
        if settled[state as usize] {
            continue;
        }
        settled[state as usize] = true;
        parent[state as usize] = candidate.via;

        let here = Weight(candidate.cost);
        if let Some(w) = fst.final_weight(state) {
            seq += 1;
            heap.push(Candidate {
                cost: here.times(w).0,
                seq,
                state,
                via: None,
                accept: true,
            });
        }
        for (i, t) in fst.transitions(state).iter().enumerate() {
            if settled[t.target as usize] {
                continue;
            }
            seq += 1;
            heap.push(Candidate {
                cost: here.times(t.weight).0,
                seq,
                state: t.target,
                via: Some((state, i)),
                accept: false,
            });
        }
    }

    None
}

fn trace_back(fst: &Automaton, parent: &[Option<(StateId, usize)>], last: StateId) -> Vec<Label> {
    let mut output = Vec::new();
    let mut state = last;
    while let Some((previous, index)) = parent[state as usize] {
        let label = fst.transitions(previous)[index].output;
        if label != EPSILON {
            output.push(label);
        }
        state = previous;
    }
    output.reverse();
    output
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::alphabet::Alphabet;
    use crate::automaton::Transition;
    use crate::cascade::Cascade;
    use crate::pattern::Pattern;
    use crate::rewrite::{Rule, SubstitutionMap};

    fn sigma() -> Arc<Alphabet> {
        Alphabet::builder("abc").symbols(["a", "b", "c"]).build().unwrap()
    }

    #[test]
    fn test_best_path_prefers_lower_weight() {
        let s = sigma();
        let a = s.label("a").unwrap();
        let b = s.label("b").unwrap();
        let mut fst = Automaton::new(s);
        let q0 = fst.add_state();
        let q1 = fst.add_state();
        fst.set_start(q0);
        fst.set_final(q1, Weight::ONE);
        fst.add_transition(
            q0,
            Transition {
                input: a,
                output: a,
                weight: Weight(2.0),
                target: q1,
            },
        );
        fst.add_transition(
            q0,
            Transition {
                input: a,
                output: b,
                weight: Weight(1.0),
                target: q1,
            },
        );

        assert_eq!(best_path(&fst), Some(vec![b]));
    }

    #[test]
    fn test_ties_follow_insertion_order() {
        let s = sigma();
        let a = s.label("a").unwrap();
        let b = s.label("b").unwrap();
        let c = s.label("c").unwrap();
        let mut fst = Automaton::new(s);
        let q0 = fst.add_state();
        let q1 = fst.add_state();
        let q2 = fst.add_state();
        fst.set_start(q0);
        fst.set_final(q1, Weight::ONE);
        fst.set_final(q2, Weight::ONE);
        fst.add_transition(q0, Transition::new(a, c, q1));
        fst.add_transition(q0, Transition::new(a, b, q2));

        assert_eq!(best_path(&fst), Some(vec![c]));
    }

    #[test]
    fn test_optional_rule_resolves_deterministically() {
        let s = sigma();
        let cascade = Cascade::new("optional", s)
            .rule(Rule::new("maybe", SubstitutionMap::cross("a", "b")).optional())
            .compile()
            .unwrap();

        let first = cascade.resolve_str("aca").unwrap();
        for _ in 0..10 {
            assert_eq!(cascade.resolve_str("aca").unwrap(), first);
        }
    }

    #[test]
    fn test_errors() {
        let s = sigma();
        let cascade = Cascade::new("only-a", s)
            .filter(Pattern::literal("a").star())
            .compile()
            .unwrap();

        assert_eq!(
            cascade.resolve("aza"),
            Err(ResolveError::InvalidSymbol {
                symbol: "z".to_string(),
                offset: 1
            })
        );
        assert_eq!(
            cascade.resolve("ab"),
            Err(ResolveError::NoValidTransduction {
                input: "ab".to_string()
            })
        );
        assert_eq!(cascade.resolve_str("aaa").unwrap(), "aaa");
    }
}

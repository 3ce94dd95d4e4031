//! Rational operations on [`Automaton`]s.
//!
//! Every operation is pure: inputs are borrowed, a fresh automaton is
//! returned, and nothing is optimized implicitly. Callers decide when to run
//! [`optimize`](super::optimize::optimize).
//!
//! Binary operations require both operands to share a compatible alphabet and
//! fail with [`CompileError::AlphabetMismatch`] otherwise.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::{Automaton, StateId, Transition, Weight};
use crate::alphabet::{Alphabet, Label, EPSILON};
use crate::error::CompileResult;

/// Language (or relation) union.
pub fn union(a: &Automaton, b: &Automaton) -> CompileResult<Automaton> {
    Alphabet::ensure_compatible(a.alphabet(), b.alphabet())?;

    let mut result = Automaton::new(a.alphabet().clone());
    let start = result.add_state();
    result.set_start(start);

    for operand in [a, b] {
        let offset = result.append(operand);
        if let Some(s) = operand.start() {
            result.add_transition(start, Transition::new(EPSILON, EPSILON, s + offset));
        }
    }

    Ok(result)
}

/// Union of any number of automata; the empty list yields the empty
/// language.
pub fn union_all<'a, I>(alphabet: &std::sync::Arc<Alphabet>, operands: I) -> CompileResult<Automaton>
where
    I: IntoIterator<Item = &'a Automaton>,
{
    let mut result = Automaton::new(alphabet.clone());
    let start = result.add_state();
    result.set_start(start);

    for operand in operands {
        Alphabet::ensure_compatible(alphabet, operand.alphabet())?;
        let offset = result.append(operand);
        if let Some(s) = operand.start() {
            result.add_transition(start, Transition::new(EPSILON, EPSILON, s + offset));
        }
    }

    Ok(result)
}

/// Concatenation: strings of `a` followed by strings of `b`.
pub fn concat(a: &Automaton, b: &Automaton) -> CompileResult<Automaton> {
    Alphabet::ensure_compatible(a.alphabet(), b.alphabet())?;

    let (Some(a_start), Some(b_start)) = (a.start(), b.start()) else {
        return Ok(Automaton::new(a.alphabet().clone()));
    };

    let mut result = Automaton::new(a.alphabet().clone());
    result.append(a);
    let offset = result.append(b);
    result.set_start(a_start);

    for s in a.states() {
        if let Some(w) = a.final_weight(s) {
            result.clear_final(s);
            result.add_transition(
                s,
                Transition {
                    input: EPSILON,
                    output: EPSILON,
                    weight: w,
                    target: b_start + offset,
                },
            );
        }
    }

    Ok(result)
}

/// Kleene star: zero or more repetitions of `a`.
pub fn closure(a: &Automaton) -> Automaton {
    let mut result = Automaton::new(a.alphabet().clone());
    let start = result.add_state();
    result.set_start(start);
    result.set_final(start, Weight::ONE);

    let Some(a_start) = a.start() else {
        return result;
    };

    let offset = result.append(a);
    let inner_start = a_start + offset;
    result.add_transition(start, Transition::new(EPSILON, EPSILON, inner_start));

    for s in a.states() {
        if let Some(w) = a.final_weight(s) {
            result.add_transition(
                s + offset,
                Transition {
                    input: EPSILON,
                    output: EPSILON,
                    weight: w,
                    target: inner_start,
                },
            );
        }
    }

    result
}

/// Per-state index of a transducer's transitions by input label.
struct InputIndex {
    by_state: Vec<FxHashMap<Label, SmallVec<[u32; 2]>>>,
}

impl InputIndex {
    fn new(fst: &Automaton) -> Self {
        let by_state = fst
            .states()
            .map(|s| {
                let mut map: FxHashMap<Label, SmallVec<[u32; 2]>> = FxHashMap::default();
                for (i, t) in fst.transitions(s).iter().enumerate() {
                    map.entry(t.input).or_default().push(i as u32);
                }
                map
            })
            .collect();
        InputIndex { by_state }
    }

    #[inline]
    fn lookup(&self, state: StateId, label: Label) -> &[u32] {
        self.by_state[state as usize]
            .get(&label)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// Composition filter state: which side last moved alone on epsilon.
type Filter = u8;
const BOTH: Filter = 0;
const LEFT_ALONE: Filter = 1;
const RIGHT_ALONE: Filter = 2;

/// Relational composition: feed the output of `a` into the input of `b`.
///
/// Epsilons are handled with the three-state sequencing filter, so each
/// interleaving of `a`'s output-epsilons with `b`'s input-epsilons appears on
/// exactly one path. Only states reachable from the start pair are built;
/// the result is not trimmed.
pub fn compose(a: &Automaton, b: &Automaton) -> CompileResult<Automaton> {
    Alphabet::ensure_compatible(a.alphabet(), b.alphabet())?;
    Ok(compose_unchecked(a, b))
}

/// [`compose`] for operands already known to share an alphabet.
pub(crate) fn compose_unchecked(a: &Automaton, b: &Automaton) -> Automaton {
    let mut result = Automaton::new(a.alphabet().clone());
    let (Some(a_start), Some(b_start)) = (a.start(), b.start()) else {
        return result;
    };

    let index = InputIndex::new(b);
    let mut ids: FxHashMap<(StateId, StateId, Filter), StateId> = FxHashMap::default();
    let mut queue: VecDeque<(StateId, StateId, Filter)> = VecDeque::new();

    let mut intern = |key: (StateId, StateId, Filter),
                      result: &mut Automaton,
                      queue: &mut VecDeque<(StateId, StateId, Filter)>|
     -> StateId {
        *ids.entry(key).or_insert_with(|| {
            queue.push_back(key);
            result.add_state()
        })
    };

    let start = intern((a_start, b_start, BOTH), &mut result, &mut queue);
    result.set_start(start);

    while let Some(key @ (q1, q2, filter)) = queue.pop_front() {
        let source = intern(key, &mut result, &mut queue);

        if let (Some(w1), Some(w2)) = (a.final_weight(q1), b.final_weight(q2)) {
            result.set_final(source, w1.times(w2));
        }

        let b_eps = index.lookup(q2, EPSILON);

        for t1 in a.transitions(q1) {
            if t1.output == EPSILON {
                if filter != RIGHT_ALONE {
                    let target = intern((t1.target, q2, LEFT_ALONE), &mut result, &mut queue);
                    result.add_transition(
                        source,
                        Transition {
                            input: t1.input,
                            output: EPSILON,
                            weight: t1.weight,
                            target,
                        },
                    );
                }
                if filter == BOTH {
                    for &i in b_eps {
                        let t2 = &b.transitions(q2)[i as usize];
                        let target = intern((t1.target, t2.target, BOTH), &mut result, &mut queue);
                        result.add_transition(
                            source,
                            Transition {
                                input: t1.input,
                                output: t2.output,
                                weight: t1.weight.times(t2.weight),
                                target,
                            },
                        );
                    }
                }
            } else {
                for &i in index.lookup(q2, t1.output) {
                    let t2 = &b.transitions(q2)[i as usize];
                    let target = intern((t1.target, t2.target, BOTH), &mut result, &mut queue);
                    result.add_transition(
                        source,
                        Transition {
                            input: t1.input,
                            output: t2.output,
                            weight: t1.weight.times(t2.weight),
                            target,
                        },
                    );
                }
            }
        }

        if filter != LEFT_ALONE {
            for &i in b_eps {
                let t2 = &b.transitions(q2)[i as usize];
                let target = intern((q1, t2.target, RIGHT_ALONE), &mut result, &mut queue);
                result.add_transition(
                    source,
                    Transition {
                        input: EPSILON,
                        output: t2.output,
                        weight: t2.weight,
                        target,
                    },
                );
            }
        }
    }

    result
}

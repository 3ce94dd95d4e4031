//! Deterministic context trackers used by the rule compiler.

use rustc_hash::FxHashMap;

use crate::alphabet::Label;
use crate::automaton::{optimize, Automaton, StateId};
use crate::error::CompileResult;

/// A minimal DFA flattened into per-state lookup tables.
///
/// Built from an optimized acceptor, so each state has at most one
/// transition per label.
#[derive(Debug, Clone)]
pub(super) struct ContextDfa {
    start: StateId,
    transitions: Vec<FxHashMap<Label, StateId>>,
    finals: Vec<bool>,
}

impl ContextDfa {
    /// Optimize `acceptor` and index it.
    pub(super) fn compile(acceptor: &Automaton, what: &str) -> CompileResult<Self> {
        let dfa = optimize(acceptor, what)?;

        let transitions = dfa
            .states()
            .map(|s| {
                dfa.transitions(s)
                    .iter()
                    .map(|t| (t.input, t.target))
                    .collect::<FxHashMap<_, _>>()
            })
            .collect();
        let finals = dfa.states().map(|s| dfa.is_final(s)).collect();

        Ok(ContextDfa {
            start: dfa.start().unwrap_or_default(),
            transitions,
            finals,
        })
    }

    #[inline]
    pub(super) fn start(&self) -> StateId {
        self.start
    }

    #[inline]
    pub(super) fn step(&self, state: StateId, label: Label) -> Option<StateId> {
        self.transitions[state as usize].get(&label).copied()
    }

    #[inline]
    pub(super) fn is_final(&self, state: StateId) -> bool {
        self.finals[state as usize]
    }

    /// Number of states.
    pub(super) fn len(&self) -> usize {
        self.finals.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::alphabet::Alphabet;
    use crate::pattern::Pattern;

    #[test]
    fn test_tracks_suffix_pattern() {
        let s: Arc<Alphabet> = Alphabet::builder("ab").symbols(["a", "b"]).build().unwrap();
        let a = s.label("a").unwrap();
        let b = s.label("b").unwrap();
        // anything, then "ab"
        let acceptor = Pattern::any_star()
            .then(Pattern::literal("ab"))
            .build(&s)
            .unwrap();
        let dfa = ContextDfa::compile(&acceptor, "ends-with-ab").unwrap();

        let mut q = dfa.start();
        for (label, expect_final) in [(b, false), (a, false), (b, true), (b, false), (a, false), (b, true)] {
            q = dfa.step(q, label).unwrap();
            assert_eq!(dfa.is_final(q), expect_final);
        }
        assert_eq!(dfa.len(), 3);
    }
}

//! Weighted finite-state transducers.
//!
//! An [`Automaton`] is a mutable arc list per state, in the style of a vector
//! FST: states are dense `u32` ids, each state owns its outgoing
//! [`Transition`]s in insertion order, and final states carry a
//! [`Weight`]. Acceptors are transducers whose transitions have equal input
//! and output labels.
//!
//! Insertion order is part of the contract: every algorithm in this module
//! visits transitions in the order they were added, and the resolver relies
//! on that to pick the same path on every call.
//!
//! # Submodules
//!
//! - [`ops`] - union, concatenation, closure and composition
//! - [`optimize`] - epsilon removal, trimming, determinization
//! - [`minimize`] - partition-refinement minimization
//! - [`powerset`] - interning of state subsets for determinization

pub mod minimize;
pub mod ops;
pub mod optimize;
pub mod powerset;

pub use ops::{closure, compose, concat, union};
pub use optimize::{connect, determinize, optimize, rm_epsilon};

use std::fmt;
use std::sync::Arc;

use crate::alphabet::{Alphabet, Label, EPSILON};

/// Dense state identifier.
pub type StateId = u32;

/// Tropical weight: `times` is addition, `plus` is minimum.
///
/// All rule tables in this crate are unweighted, so every transition carries
/// [`Weight::ONE`]; the resolver still minimizes total weight so weighted
/// tables behave as expected.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Weight(pub f32);

impl Weight {
    /// Multiplicative identity (cost 0).
    pub const ONE: Weight = Weight(0.0);

    /// Additive identity (infinite cost).
    pub const ZERO: Weight = Weight(f32::INFINITY);

    /// Extend a path.
    #[inline]
    pub fn times(self, other: Weight) -> Weight {
        Weight(self.0 + other.0)
    }

    /// Choose between two paths.
    #[inline]
    pub fn plus(self, other: Weight) -> Weight {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }

    /// Bit pattern used as a hash key; `-0.0` is folded into `0.0`.
    #[inline]
    pub fn key(self) -> u32 {
        if self.0 == 0.0 {
            0
        } else {
            self.0.to_bits()
        }
    }
}

/// A labeled, weighted arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Input label, or [`EPSILON`].
    pub input: Label,
    /// Output label, or [`EPSILON`].
    pub output: Label,
    /// Arc weight.
    pub weight: Weight,
    /// Destination state.
    pub target: StateId,
}

impl Transition {
    /// Unweighted arc.
    #[inline]
    pub fn new(input: Label, output: Label, target: StateId) -> Self {
        Transition {
            input,
            output,
            weight: Weight::ONE,
            target,
        }
    }

    /// True if both sides are epsilon.
    #[inline]
    pub fn is_epsilon(&self) -> bool {
        self.input == EPSILON && self.output == EPSILON
    }
}

#[derive(Debug, Clone, Default)]
struct State {
    transitions: Vec<Transition>,
    final_weight: Option<Weight>,
}

/// A weighted finite-state transducer over one shared [`Alphabet`].
#[derive(Debug, Clone)]
pub struct Automaton {
    alphabet: Arc<Alphabet>,
    states: Vec<State>,
    start: Option<StateId>,
}

impl Automaton {
    /// An automaton with no states; it accepts nothing.
    pub fn new(alphabet: Arc<Alphabet>) -> Self {
        Automaton {
            alphabet,
            states: Vec::new(),
            start: None,
        }
    }

    /// Accepts exactly the empty string.
    pub fn epsilon(alphabet: Arc<Alphabet>) -> Self {
        let mut a = Automaton::new(alphabet);
        let s = a.add_state();
        a.set_start(s);
        a.set_final(s, Weight::ONE);
        a
    }

    /// Identity acceptor for one label sequence.
    pub fn linear(alphabet: Arc<Alphabet>, labels: &[Label]) -> Self {
        Automaton::cross(alphabet, labels, labels)
    }

    /// Maps exactly `input` to exactly `output`, one path, with the shorter
    /// side padded by epsilons at its end.
    pub fn cross(alphabet: Arc<Alphabet>, input: &[Label], output: &[Label]) -> Self {
        let mut a = Automaton::new(alphabet);
        let mut current = a.add_state();
        a.set_start(current);
        for i in 0..input.len().max(output.len()) {
            let next = a.add_state();
            let x = input.get(i).copied().unwrap_or(EPSILON);
            let y = output.get(i).copied().unwrap_or(EPSILON);
            a.add_transition(current, Transition::new(x, y, next));
            current = next;
        }
        a.set_final(current, Weight::ONE);
        a
    }

    /// Accepts any single ordinary symbol (the wildcard).
    pub fn any_symbol(alphabet: Arc<Alphabet>) -> Self {
        let labels: Vec<Label> = alphabet.labels().collect();
        Automaton::symbol_set(alphabet, &labels)
    }

    /// Accepts any one of `labels` as a single-symbol string.
    pub fn symbol_set(alphabet: Arc<Alphabet>, labels: &[Label]) -> Self {
        let mut a = Automaton::new(alphabet);
        let s = a.add_state();
        let f = a.add_state();
        a.set_start(s);
        a.set_final(f, Weight::ONE);
        let mut seen = rustc_hash::FxHashSet::default();
        for &l in labels {
            if seen.insert(l) {
                a.add_transition(s, Transition::new(l, l, f));
            }
        }
        a
    }

    /// The alphabet shared by both tapes.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Add a non-final state without transitions.
    pub fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        (self.states.len() - 1) as StateId
    }

    /// Set the start state.
    pub fn set_start(&mut self, state: StateId) {
        self.start = Some(state);
    }

    /// The start state, if any.
    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    /// Mark `state` as accepting with `weight`.
    pub fn set_final(&mut self, state: StateId, weight: Weight) {
        self.states[state as usize].final_weight = Some(weight);
    }

    /// Make `state` non-accepting.
    pub fn clear_final(&mut self, state: StateId) {
        self.states[state as usize].final_weight = None;
    }

    /// Final weight of `state`, `None` if it does not accept.
    #[inline]
    pub fn final_weight(&self, state: StateId) -> Option<Weight> {
        self.states[state as usize].final_weight
    }

    /// True if `state` accepts.
    #[inline]
    pub fn is_final(&self, state: StateId) -> bool {
        self.states[state as usize].final_weight.is_some()
    }

    /// Append a transition leaving `source`.
    pub fn add_transition(&mut self, source: StateId, transition: Transition) {
        self.states[source as usize].transitions.push(transition);
    }

    /// Outgoing transitions of `state` in insertion order.
    #[inline]
    pub fn transitions(&self, state: StateId) -> &[Transition] {
        &self.states[state as usize].transitions
    }

    /// Number of states.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Total number of transitions.
    pub fn num_transitions(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    /// Iterator over all state ids.
    pub fn states(&self) -> impl Iterator<Item = StateId> {
        0..self.states.len() as StateId
    }

    /// True when there is no start state; such an automaton accepts nothing.
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    /// True if every transition has equal input and output labels.
    pub fn is_acceptor(&self) -> bool {
        self.states
            .iter()
            .flat_map(|s| s.transitions.iter())
            .all(|t| t.input == t.output)
    }

    /// Copy every state of `other` into `self`, returning the offset that
    /// maps `other`'s ids into `self`. The start state is not changed.
    pub(crate) fn append(&mut self, other: &Automaton) -> StateId {
        let offset = self.states.len() as StateId;
        for state in &other.states {
            self.states.push(State {
                transitions: state
                    .transitions
                    .iter()
                    .map(|t| Transition {
                        target: t.target + offset,
                        ..*t
                    })
                    .collect(),
                final_weight: state.final_weight,
            });
        }
        offset
    }

    /// Replace the alphabet handle with an equal one, so later compatibility
    /// checks take the pointer-equality fast path.
    pub(crate) fn share_alphabet(&mut self, alphabet: &Arc<Alphabet>) {
        if Alphabet::compatible(&self.alphabet, alphabet) {
            self.alphabet = Arc::clone(alphabet);
        }
    }
}

impl fmt::Display for Automaton {
    /// Text dump: one arc per line (`src dst in:out weight`), then final
    /// states, using symbol spellings.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = |l: Label| self.alphabet.symbol(l).unwrap_or("ε");
        if let Some(start) = self.start {
            writeln!(f, "start {}", start)?;
        }
        for s in self.states() {
            for t in self.transitions(s) {
                writeln!(
                    f,
                    "{} {} {}:{} {}",
                    s,
                    t.target,
                    label(t.input),
                    label(t.output),
                    t.weight.0
                )?;
            }
        }
        for s in self.states() {
            if let Some(w) = self.final_weight(s) {
                writeln!(f, "{} {}", s, w.0)?;
            }
        }
        Ok(())
    }
}

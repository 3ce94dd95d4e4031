//! Compilation of a [`Rule`] into a transducer.
//!
//! The transducer copies its input one symbol at a time and carries, in each
//! of its states, everything needed to decide whether a rewrite may or must
//! start at the current position. Nothing is consumed twice: contexts are
//! tracked by auxiliary marker state instead of by reading ahead.
//!
//! # State
//!
//! | Component | Tracks | Advances on |
//! |-----------|--------|-------------|
//! | phase     | scanning, or `step` symbols into entry `k` | - |
//! | left      | DFA of `(Σ ∪ [BOS])* λ` | output symbols |
//! | negative  | pending checks that must never complete | input symbols |
//! | positive  | pending right contexts that must complete | input symbols |
//!
//! A *negative* check is started whenever the left context holds but the
//! path copies the next symbol instead of rewriting (DFA of `dom ρ`), and
//! whenever an entry finishes while a longer entry shares its prefix (DFA of
//! the longer suffixes followed by `ρ`). Completing either check proves that
//! an obligatory or longer rewrite was skipped, and the path dies.
//!
//! A *positive* check is started after each rewrite (DFA of `ρ (Σ ∪
//! [EOS])*`). A missing transition kills the path; reaching a final state
//! discharges the check.
//!
//! At the end of the input every pending check is fed `[EOS]`: a state is
//! final only if no negative check completes and every positive one does.
//!
//! Optional rules start no negative checks, so declined and rewritten paths
//! both survive.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::{debug, warn};

use super::context::ContextDfa;
use super::{RewriteMode, Rule};
use crate::alphabet::{Alphabet, Label, BOS, EOS, EPSILON};
use crate::automaton::ops::union_all;
use crate::automaton::{closure, concat, optimize, Automaton, StateId, Transition, Weight};
use crate::error::{CompileError, CompileResult};
use crate::pattern::tokenize_literal;

/// Id of the decline check in [`RuleMachine::checks`]; entry `k` uses
/// `k + 1` for its longer-match check.
const DECLINE_CHECK: u16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Phase {
    Scan,
    Match { entry: u16, step: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Config {
    phase: Phase,
    left: Option<StateId>,
    negative: SmallVec<[(u16, StateId); 4]>,
    positive: SmallVec<[StateId; 4]>,
}

/// One outgoing arc of a configuration.
struct Step {
    input: Label,
    output: Label,
    next: Config,
    rewrites: bool,
}

struct Entry {
    input: Vec<Label>,
    output: Vec<Label>,
}

impl Entry {
    fn steps(&self) -> usize {
        self.input.len().max(self.output.len())
    }
}

struct RuleMachine {
    entries: Vec<Entry>,
    left: ContextDfa,
    right: ContextDfa,
    checks: Vec<Option<ContextDfa>>,
    labels: Vec<Label>,
}

type Obligations = (SmallVec<[(u16, StateId); 4]>, SmallVec<[StateId; 4]>);

impl RuleMachine {
    fn initial(&self) -> Config {
        Config {
            phase: Phase::Scan,
            left: self.left.step(self.left.start(), BOS),
            negative: SmallVec::new(),
            positive: SmallVec::new(),
        }
    }

    fn left_holds(&self, config: &Config) -> bool {
        config.left.is_some_and(|q| self.left.is_final(q))
    }

    /// Feed one input symbol to every pending check. `None` if a negative
    /// check completes or a positive one fails.
    fn advance(
        &self,
        negative: &[(u16, StateId)],
        positive: &[StateId],
        label: Label,
    ) -> Option<Obligations> {
        let mut next_negative: SmallVec<[(u16, StateId); 4]> = SmallVec::new();
        for &(check, q) in negative {
            let Some(dfa) = &self.checks[check as usize] else {
                continue;
            };
            if let Some(next) = dfa.step(q, label) {
                if dfa.is_final(next) {
                    return None;
                }
                next_negative.push((check, next));
            }
        }

        let mut next_positive: SmallVec<[StateId; 4]> = SmallVec::new();
        for &q in positive {
            let next = self.right.step(q, label)?;
            if !self.right.is_final(next) {
                next_positive.push(next);
            }
        }

        next_negative.sort_unstable();
        next_negative.dedup();
        next_positive.sort_unstable();
        next_positive.dedup();
        Some((next_negative, next_positive))
    }

    fn is_final(&self, config: &Config) -> bool {
        if config.phase != Phase::Scan {
            return false;
        }
        let Some((_, remaining)) = self.advance(&config.negative, &config.positive, EOS) else {
            return false;
        };
        remaining.is_empty()
    }

    /// Outgoing arcs of `config`: the copy arcs first, in label order, then
    /// one arc per entry in declaration order.
    fn successors(&self, config: &Config) -> Vec<Step> {
        match config.phase {
            Phase::Match { entry, step } => self
                .match_step(config, entry as usize, step as usize)
                .into_iter()
                .collect(),
            Phase::Scan => {
                let holds = self.left_holds(config);
                let mut negative = config.negative.clone();
                if holds {
                    if let Some(decline) = &self.checks[DECLINE_CHECK as usize] {
                        negative.push((DECLINE_CHECK, decline.start()));
                    }
                }

                let mut arcs = Vec::with_capacity(self.labels.len() + self.entries.len());
                for &label in &self.labels {
                    if let Some((negative, positive)) = self.advance(&negative, &config.positive, label) {
                        let left = config.left.and_then(|q| self.left.step(q, label));
                        arcs.push(Step {
                            input: label,
                            output: label,
                            next: Config {
                                phase: Phase::Scan,
                                left,
                                negative,
                                positive,
                            },
                            rewrites: false,
                        });
                    }
                }

                if holds {
                    for k in 0..self.entries.len() {
                        arcs.extend(self.match_step(config, k, 0));
                    }
                }
                arcs
            }
        }
    }

    /// Take step `step` of entry `k` from `config`.
    fn match_step(&self, config: &Config, k: usize, step: usize) -> Option<Step> {
        let entry = &self.entries[k];
        let consumed = entry.input.get(step).copied().unwrap_or(EPSILON);
        let emitted = entry.output.get(step).copied().unwrap_or(EPSILON);

        let (mut negative, mut positive) = if consumed == EPSILON {
            (config.negative.clone(), config.positive.clone())
        } else {
            self.advance(&config.negative, &config.positive, consumed)?
        };
        let left = if emitted == EPSILON {
            config.left
        } else {
            config.left.and_then(|q| self.left.step(q, emitted))
        };

        let phase = if step + 1 < entry.steps() {
            Phase::Match {
                entry: k as u16,
                step: (step + 1) as u16,
            }
        } else {
            let start = self.right.start();
            if !self.right.is_final(start) {
                positive.push(start);
                positive.sort_unstable();
                positive.dedup();
            }
            if let Some(longer) = &self.checks[k + 1] {
                negative.push(((k + 1) as u16, longer.start()));
                negative.sort_unstable();
                negative.dedup();
            }
            Phase::Scan
        };

        Some(Step {
            input: consumed,
            output: emitted,
            next: Config {
                phase,
                left,
                negative,
                positive,
            },
            rewrites: true,
        })
    }
}

/// Acceptor for one of the label sequences.
fn sequences(alphabet: &Arc<Alphabet>, seqs: &[&[Label]]) -> CompileResult<Automaton> {
    let linear: Vec<Automaton> = seqs
        .iter()
        .map(|s| Automaton::linear(alphabet.clone(), s))
        .collect();
    union_all(alphabet, &linear)
}

/// `(Σ ∪ extra)*`
fn sigma_star_with(alphabet: &Arc<Alphabet>, extra: Label) -> Automaton {
    let mut labels: Vec<Label> = alphabet.labels().collect();
    labels.push(extra);
    closure(&Automaton::symbol_set(alphabet.clone(), &labels))
}

fn tokenize_entries(rule: &Rule, alphabet: &Arc<Alphabet>) -> CompileResult<Vec<Entry>> {
    let mut seen: FxHashSet<Vec<Label>> = FxHashSet::default();
    let mut entries = Vec::with_capacity(rule.map.len());

    for (input, output) in rule.map.entries() {
        let input_labels = tokenize_literal(alphabet, input)?;
        if input_labels.is_empty() {
            return Err(CompileError::ConflictingSubstitution {
                rule: rule.name.clone(),
                input: input.clone(),
                reason: "is empty",
            });
        }
        if !seen.insert(input_labels.clone()) {
            return Err(CompileError::ConflictingSubstitution {
                rule: rule.name.clone(),
                input: input.clone(),
                reason: "appears more than once",
            });
        }
        entries.push(Entry {
            input: input_labels,
            output: tokenize_literal(alphabet, output)?,
        });
    }

    Ok(entries)
}

/// Compile `rule` into a transducer over `alphabet`.
///
/// The result is defined on every string of `Σ*`; in obligatory mode it is
/// a function. The transducer is optimized before it is returned.
///
/// # Errors
///
/// - [`CompileError::ConflictingSubstitution`] for an empty or repeated
///   input sequence, or an empty map
/// - [`CompileError::AlphabetMismatch`] if any text in the rule is not
///   spelled by `alphabet`
/// - [`CompileError::EmptyLanguage`] if a context pattern matches nothing
pub fn compile_rule(rule: &Rule, alphabet: &Arc<Alphabet>) -> CompileResult<Automaton> {
    if rule.map.is_empty() {
        return Err(CompileError::ConflictingSubstitution {
            rule: rule.name.clone(),
            input: String::new(),
            reason: "has no entries",
        });
    }
    let entries = tokenize_entries(rule, alphabet)?;
    let obligatory = rule.mode == RewriteMode::Obligatory;

    let lambda = rule.left.build(alphabet)?;
    let rho = rule.right.build(alphabet)?;

    let left = ContextDfa::compile(
        &concat(&sigma_star_with(alphabet, BOS), &lambda)?,
        &format!("{} left context", rule.name),
    )?;
    let right = ContextDfa::compile(
        &concat(&rho, &sigma_star_with(alphabet, EOS))?,
        &format!("{} right context", rule.name),
    )?;

    let mut checks: Vec<Option<ContextDfa>> = Vec::with_capacity(entries.len() + 1);
    if obligatory {
        let inputs: Vec<&[Label]> = entries.iter().map(|e| e.input.as_slice()).collect();
        let dom_rho = concat(&sequences(alphabet, &inputs)?, &rho)?;
        checks.push(Some(ContextDfa::compile(
            &dom_rho,
            &format!("{} decline check", rule.name),
        )?));
    } else {
        checks.push(None);
    }
    for entry in &entries {
        let suffixes: Vec<&[Label]> = entries
            .iter()
            .filter(|other| other.input.len() > entry.input.len() && other.input.starts_with(&entry.input))
            .map(|other| &other.input[entry.input.len()..])
            .collect();
        if !obligatory || suffixes.is_empty() {
            checks.push(None);
            continue;
        }
        let longer = concat(&sequences(alphabet, &suffixes)?, &rho)?;
        checks.push(Some(ContextDfa::compile(
            &longer,
            &format!("{} longer-match check", rule.name),
        )?));
    }

    let machine = RuleMachine {
        entries,
        left,
        right,
        checks,
        labels: alphabet.labels().collect(),
    };

    let mut fst = Automaton::new(alphabet.clone());
    let mut ids: FxHashMap<Config, StateId> = FxHashMap::default();
    let mut queue: VecDeque<(Config, StateId)> = VecDeque::new();
    let mut fired = false;

    let initial = machine.initial();
    let start = fst.add_state();
    fst.set_start(start);
    ids.insert(initial.clone(), start);
    queue.push_back((initial, start));

    while let Some((config, source)) = queue.pop_front() {
        if machine.is_final(&config) {
            fst.set_final(source, Weight::ONE);
        }

        for step in machine.successors(&config) {
            fired |= step.rewrites;
            let Step {
                input, output, next, ..
            } = step;
            let target = match ids.get(&next) {
                Some(&id) => id,
                None => {
                    let id = fst.add_state();
                    ids.insert(next.clone(), id);
                    queue.push_back((next, id));
                    id
                }
            };
            fst.add_transition(source, Transition::new(input, output, target));
        }
    }

    if !fired {
        warn!(rule = %rule.name, "rewrite rule can never fire");
    }

    let compiled = optimize(&fst, &rule.name)?;
    debug!(
        rule = %rule.name,
        entries = machine.entries.len(),
        left_states = machine.left.len(),
        right_states = machine.right.len(),
        raw_states = fst.num_states(),
        states = compiled.num_states(),
        transitions = compiled.num_transitions(),
        "compiled rewrite rule"
    );

    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::ops::testing::outputs;
    use crate::pattern::Pattern;
    use crate::rewrite::SubstitutionMap;

    fn sigma() -> Arc<Alphabet> {
        Alphabet::builder("abc").symbols(["a", "b", "c"]).build().unwrap()
    }

    /// Apply `rule` to `word` and return every output.
    fn apply(rule: &Rule, word: &str) -> Vec<String> {
        let s = sigma();
        let fst = rule.compile(&s).unwrap();
        let input = s.tokenize(word).unwrap();
        outputs(&fst, &input, 8)
            .into_iter()
            .map(|o| s.render(&o))
            .collect()
    }

    #[test]
    fn test_unconditional_rewrite_everywhere() {
        let rule = Rule::new("a-to-b", SubstitutionMap::cross("a", "b"));
        assert_eq!(apply(&rule, "abaca"), vec!["bbbcb"]);
        assert_eq!(apply(&rule, ""), vec![""]);
    }

    #[test]
    fn test_left_context() {
        let rule = Rule::new("a-after-c", SubstitutionMap::cross("a", "b")).left_context("c");
        assert_eq!(apply(&rule, "acaa"), vec!["acba"]);
    }

    #[test]
    fn test_left_context_sees_own_output() {
        // a → c / c __ : the rewritten c licenses the next rewrite
        let rule = Rule::new("spread", SubstitutionMap::cross("a", "c")).left_context("c");
        assert_eq!(apply(&rule, "caaa"), vec!["cccc"]);
    }

    #[test]
    fn test_right_context_on_input() {
        let rule = Rule::new("a-before-a", SubstitutionMap::cross("a", "b")).right_context("a");
        assert_eq!(apply(&rule, "aaa"), vec!["bba"]);
    }

    #[test]
    fn test_anchors() {
        let initial = Rule::new("initial", SubstitutionMap::cross("a", "c")).left_context(Pattern::bos());
        assert_eq!(apply(&initial, "aaa"), vec!["caa"]);

        let fin = Rule::new("final", SubstitutionMap::cross("a", "c")).right_context(Pattern::eos());
        assert_eq!(apply(&fin, "aaa"), vec!["aac"]);
    }

    #[test]
    fn test_longest_match_wins() {
        let map = SubstitutionMap::new().with("a", "c").with("ab", "b");
        let rule = Rule::new("longest", map);
        assert_eq!(apply(&rule, "aba"), vec!["bc"]);
    }

    #[test]
    fn test_longest_match_respects_right_context() {
        // the longer entry is only available when its right context holds
        let map = SubstitutionMap::new().with("a", "c").with("ab", "b");
        let rule = Rule::new("longest-eos", map).right_context(Pattern::eos());
        assert_eq!(apply(&rule, "aba"), vec!["abc"]);
        assert_eq!(apply(&rule, "ab"), vec!["b"]);
    }

    #[test]
    fn test_non_overlapping() {
        let rule = Rule::new("aa", SubstitutionMap::cross("aa", "b"));
        assert_eq!(apply(&rule, "aaa"), vec!["ba"]);
        assert_eq!(apply(&rule, "aaaa"), vec!["bb"]);
    }

    #[test]
    fn test_deletion_and_insertion() {
        let delete = Rule::new("delete", SubstitutionMap::cross("b", ""));
        assert_eq!(apply(&delete, "abcb"), vec!["ac"]);

        let expand = Rule::new("expand", SubstitutionMap::cross("b", "ccc"));
        assert_eq!(apply(&expand, "ab"), vec!["accc"]);
    }

    #[test]
    fn test_optional_keeps_both() {
        let rule = Rule::new("maybe", SubstitutionMap::cross("a", "b")).optional();
        let mut out = apply(&rule, "aa");
        out.sort();
        assert_eq!(out, vec!["aa", "ab", "ba", "bb"]);
    }

    #[test]
    fn test_conflicting_substitution() {
        let s = sigma();
        let dup = Rule::new("dup", SubstitutionMap::new().with("a", "b").with("a", "c"));
        assert!(matches!(
            dup.compile(&s),
            Err(CompileError::ConflictingSubstitution { reason: "appears more than once", .. })
        ));

        let empty_input = Rule::new("empty", SubstitutionMap::cross("", "b"));
        assert!(matches!(
            empty_input.compile(&s),
            Err(CompileError::ConflictingSubstitution { reason: "is empty", .. })
        ));

        let no_entries = Rule::new("none", SubstitutionMap::new());
        assert!(matches!(
            no_entries.compile(&s),
            Err(CompileError::ConflictingSubstitution { .. })
        ));
    }

    #[test]
    fn test_unknown_symbol_in_rule() {
        let s = sigma();
        let rule = Rule::new("bad", SubstitutionMap::cross("a", "z"));
        assert!(matches!(rule.compile(&s), Err(CompileError::AlphabetMismatch { .. })));
    }

    #[test]
    fn test_rule_that_never_fires_is_identity() {
        let rule = Rule::new("never", SubstitutionMap::cross("a", "b")).left_context(Pattern::eos());
        assert_eq!(apply(&rule, "abc"), vec!["abc"]);
    }
}

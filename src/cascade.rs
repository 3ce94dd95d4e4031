//! Ordered composition of rewrite rules into one transducer.
//!
//! A [`Cascade`] is an explicit list of stages over one shared alphabet.
//! [`Cascade::compile`] folds the list left to right, composing each stage
//! into the accumulated transducer and optimizing after every step. The
//! result, a [`CompiledCascade`], is immutable and can be shared between
//! threads.
//!
//! Order matters: composition is associative but not commutative. A symbol
//! produced by stage `i` is what stage `i + 1` reads and what its contexts
//! see.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kazakh_fst::alphabet::Alphabet;
//! use kazakh_fst::cascade::Cascade;
//! use kazakh_fst::pattern::Pattern;
//! use kazakh_fst::rewrite::{Rule, SubstitutionMap};
//!
//! let alphabet = Alphabet::builder("demo").symbols(["a", "b", "c", "x"]).build()?;
//! let cascade = Cascade::new("demo", alphabet)
//!     .filter(Pattern::one_of(["a", "b", "c"]).star()) // input side
//!     .rule(Rule::new("initial-a", SubstitutionMap::cross("a", "b")).left_context(Pattern::bos()))
//!     .rule(Rule::new("final-b", SubstitutionMap::cross("b", "x")).right_context(Pattern::eos()))
//!     .filter(Pattern::one_of(["b", "c", "x"]).star()) // output side
//!     .compile()?;
//!
//! assert_eq!(cascade.resolve_str("acb")?, "bcx");
//! assert!(cascade.resolve_str("xa").is_err());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{debug, trace};

use crate::alphabet::{Alphabet, Label};
use crate::automaton::ops::compose_unchecked;
use crate::automaton::{optimize, Automaton};
use crate::error::{CompileResult, ResolveResult};
use crate::pattern::Pattern;
use crate::resolver;
use crate::rewrite::Rule;

/// One step of a cascade.
#[derive(Debug, Clone)]
pub enum Stage {
    /// A rewrite rule, compiled when the cascade is compiled.
    Rule(Rule),
    /// An acceptor: strings outside the pattern have no path past this
    /// point.
    Filter(Pattern),
    /// A transducer compiled elsewhere.
    Automaton(Automaton),
}

impl Stage {
    /// Name used in logs and errors.
    pub fn name(&self) -> String {
        match self {
            Stage::Rule(rule) => rule.name.clone(),
            Stage::Filter(pattern) => format!("filter {}", pattern),
            Stage::Automaton(_) => "precompiled automaton".to_string(),
        }
    }

    fn compile(&self, alphabet: &Arc<Alphabet>) -> CompileResult<Automaton> {
        match self {
            Stage::Rule(rule) => rule.compile(alphabet),
            Stage::Filter(pattern) => pattern.compile(alphabet),
            Stage::Automaton(fst) => Ok(fst.clone()),
        }
    }
}

/// An ordered, uncompiled list of stages.
#[derive(Debug, Clone)]
pub struct Cascade {
    name: String,
    alphabet: Arc<Alphabet>,
    stages: Vec<Stage>,
}

impl Cascade {
    /// Empty cascade. Compiled as is, it is the identity on `Σ*`.
    pub fn new(name: impl Into<String>, alphabet: Arc<Alphabet>) -> Self {
        Cascade {
            name: name.into(),
            alphabet,
            stages: Vec::new(),
        }
    }

    /// Append a stage.
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append a rewrite rule.
    pub fn rule(self, rule: Rule) -> Self {
        self.stage(Stage::Rule(rule))
    }

    /// Append several rewrite rules in order.
    pub fn rules<I: IntoIterator<Item = Rule>>(mut self, rules: I) -> Self {
        self.stages.extend(rules.into_iter().map(Stage::Rule));
        self
    }

    /// Append a filter.
    pub fn filter(self, pattern: Pattern) -> Self {
        self.stage(Stage::Filter(pattern))
    }

    /// Append a precompiled transducer.
    pub fn automaton(self, fst: Automaton) -> Self {
        self.stage(Stage::Automaton(fst))
    }

    /// Cascade name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared alphabet.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        &self.alphabet
    }

    /// Stages in application order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Compose every stage, in order, into one optimized transducer.
    ///
    /// Precompiled stages are checked against the cascade's alphabet before
    /// anything is composed.
    ///
    /// # Errors
    ///
    /// - `AlphabetMismatch` if a precompiled stage uses another alphabet, or
    ///   rule text is not spelled by the alphabet
    /// - `ConflictingSubstitution` from rule compilation
    /// - `EmptyLanguage` if some prefix of the cascade accepts nothing
    pub fn compile(&self) -> CompileResult<CompiledCascade> {
        for stage in &self.stages {
            if let Stage::Automaton(fst) = stage {
                Alphabet::ensure_compatible(&self.alphabet, fst.alphabet())?;
            }
        }

        let identity = Pattern::any_star().compile(&self.alphabet)?;
        let mut current = identity;

        for (i, stage) in self.stages.iter().enumerate() {
            let name = stage.name();
            let compiled = stage.compile(&self.alphabet)?;
            trace!(
                cascade = %self.name,
                stage = i,
                name = %name,
                states = compiled.num_states(),
                "composing stage"
            );

            let composed = compose_unchecked(&current, &compiled);
            current = optimize(&composed, &format!("{} after {}", self.name, name))?;

            debug!(
                cascade = %self.name,
                stage = i,
                name = %name,
                states = current.num_states(),
                transitions = current.num_transitions(),
                "cascade step"
            );
        }

        Ok(CompiledCascade {
            name: self.name.clone(),
            stages: self.stages.len(),
            fst: current,
        })
    }
}

/// A cascade folded into one immutable transducer.
///
/// `CompiledCascade` is `Send + Sync`; share it through an [`Arc`] and call
/// [`resolve`](Self::resolve) from any number of threads.
#[derive(Debug, Clone)]
pub struct CompiledCascade {
    name: String,
    stages: usize,
    fst: Automaton,
}

impl CompiledCascade {
    /// Cascade name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of stages that were composed.
    pub fn num_stages(&self) -> usize {
        self.stages
    }

    /// The composed transducer.
    pub fn automaton(&self) -> &Automaton {
        &self.fst
    }

    /// Shared alphabet.
    pub fn alphabet(&self) -> &Arc<Alphabet> {
        self.fst.alphabet()
    }

    /// Best output labels for `input`. See [`resolver::resolve`].
    pub fn resolve(&self, input: &str) -> ResolveResult<Vec<Label>> {
        resolver::resolve(self, input)
    }

    /// Best output for `input`, rendered as text. See
    /// [`resolver::resolve_str`].
    pub fn resolve_str(&self, input: &str) -> ResolveResult<String> {
        resolver::resolve_str(self, input)
    }
}

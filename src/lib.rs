//! # kazakh-fst
//!
//! Context-dependent rewrite rules compiled to finite-state transducers.
//!
//! A rule `φ → ψ / λ __ ρ` rewrites occurrences of `φ` that appear after
//! `λ` and before `ρ`. Rules are compiled individually to weighted
//! transducers, composed in order into a single cascade, and applied to an
//! input string by composing with the input's linear acceptor and taking
//! the best path. Rules use obligatory, leftmost, longest-match semantics,
//! the convention of two-level and Xerox-style rewrite compilers.
//!
//! Two Kazakh pipelines (2017 Latin script) ship with the crate:
//! grapheme-to-phoneme conversion and inflectional morphology.
//!
//! ## Example
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kazakh_fst::prelude::*;
//!
//! let g2p = Phonology::new()?;
//! assert_eq!(g2p.to_phoneme("seniń")?, "senɪŋ");
//!
//! let morph = Morphology::new()?;
//! assert_eq!(morph.inflect("bala+3-POSS+DAT")?, "balasyna");
//! # Ok(())
//! # }
//! ```
//!
//! Custom rule sets are built the same way:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kazakh_fst::prelude::*;
//!
//! let alphabet = Alphabet::builder("abc").symbols(["a", "b", "c"]).build()?;
//! let cascade = Cascade::new("demo", alphabet)
//!     .rule(Rule::new("a-to-b", SubstitutionMap::cross("a", "b")).left_context("c"))
//!     .compile()?;
//! assert_eq!(cascade.resolve_str("caa")?, "cba");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alphabet;
pub mod automaton;
pub mod cascade;
pub mod error;
pub mod kazakh;
pub mod pattern;
pub mod pipeline;
pub mod resolver;
pub mod rewrite;

/// Command-line front end
#[cfg(feature = "cli")]
pub mod cli;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::alphabet::{Alphabet, Label, BOS, EOS, EPSILON};
    pub use crate::automaton::{Automaton, Transition, Weight};
    pub use crate::cascade::{Cascade, CompiledCascade, Stage};
    pub use crate::error::{CompileError, CompileResult, ResolveError, ResolveResult};
    pub use crate::kazakh::{Morphology, Phonology};
    pub use crate::pattern::Pattern;
    pub use crate::pipeline::{
        build_morphology_pipeline, build_phonology_pipeline, build_pipeline, PipelineHandle,
        RuleTable,
    };
    pub use crate::rewrite::{RewriteMode, Rule, SubstitutionMap};
}

//! Error types for rule compilation and resolution.
//!
//! Compilation errors are fatal to the pipeline being built: a cascade that
//! failed to compile is never handed to the resolver. Resolution errors are
//! per call and leave the compiled cascade untouched.

use thiserror::Error;

/// Errors raised while compiling patterns, rules or cascades.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Two automata over different alphabets were combined, or a pattern
    /// referenced text that is not spelled by the alphabet.
    #[error("alphabet mismatch in `{alphabet}`: {detail}")]
    AlphabetMismatch {
        /// Name of the alphabet the operation was expecting.
        alphabet: String,
        /// What did not fit.
        detail: String,
    },

    /// A substitution map has entries that cannot be resolved unambiguously.
    #[error("conflicting substitution in rule `{rule}`: input `{input}` {reason}")]
    ConflictingSubstitution {
        /// Name of the offending rule.
        rule: String,
        /// Spelling of the offending input sequence.
        input: String,
        /// Why the entry was rejected.
        reason: &'static str,
    },

    /// A compiled rule, pattern or cascade accepts no string at all.
    #[error("`{what}` accepts no strings")]
    EmptyLanguage {
        /// Name of the rule, pattern or cascade stage.
        what: String,
    },
}

/// Errors raised while resolving a single input against a compiled cascade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The input contains text that is not a symbol of the cascade's alphabet.
    #[error("invalid symbol `{symbol}` at byte offset {offset}")]
    InvalidSymbol {
        /// The text that could not be tokenized.
        symbol: String,
        /// Byte offset of that text in the input.
        offset: usize,
    },

    /// The input is well formed but no path through the cascade accepts it.
    #[error("no valid transduction for `{input}`")]
    NoValidTransduction {
        /// The rejected input.
        input: String,
    },
}

/// A specialized `Result` type for compilation.
pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// A specialized `Result` type for resolution.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

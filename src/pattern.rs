//! Regular patterns over an [`Alphabet`] and their compilation to automata.
//!
//! A [`Pattern`] is a plain value: it is built once (usually by a rule table),
//! can be cloned and shared freely, and is compiled against an alphabet only
//! when a rule or cascade needs it. Literals are written as text and split
//! into symbols by the alphabet's longest-match tokenizer, so `"sh"` is one
//! symbol in an alphabet that has it and two symbols otherwise.
//!
//! # Example
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kazakh_fst::alphabet::Alphabet;
//! use kazakh_fst::pattern::Pattern;
//!
//! let alphabet = Alphabet::builder("demo").symbols(["a", "o", "u", "y", "t"]).build()?;
//!
//! // a back vowel, then anything
//! let after_back = Pattern::one_of(["a", "o", "u", "y"]).then(Pattern::any_star());
//!
//! // word-initial position, usable as a left context
//! let initial = Pattern::bos();
//! assert_eq!(initial.to_string(), "[BOS]");
//!
//! let acceptor = after_back.compile(&alphabet)?;
//! assert!(acceptor.is_acceptor());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::alphabet::{Alphabet, Label, BOS, EOS};
use crate::automaton::ops::union_all;
use crate::automaton::{closure, concat, optimize, Automaton};
use crate::error::{CompileError, CompileResult};

/// A regular expression over symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Pattern {
    /// The empty string.
    Empty,
    /// A symbol sequence, spelled as text.
    Literal(String),
    /// Any single ordinary symbol.
    Any,
    /// The start-of-sequence sentinel.
    Bos,
    /// The end-of-sequence sentinel.
    Eos,
    /// Any of the alternatives. An empty list matches nothing.
    Union(Vec<Pattern>),
    /// The parts in sequence.
    Concat(Vec<Pattern>),
    /// Zero or more repetitions.
    Closure(Box<Pattern>),
}

impl Default for Pattern {
    fn default() -> Self {
        Pattern::Empty
    }
}

impl Pattern {
    /// The empty string.
    pub fn empty() -> Self {
        Pattern::Empty
    }

    /// A literal symbol sequence.
    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    /// Union of literals.
    pub fn one_of<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Pattern::Union(items.into_iter().map(|s| Pattern::Literal(s.into())).collect())
    }

    /// The wildcard.
    pub fn any() -> Self {
        Pattern::Any
    }

    /// `Σ*`, the rest of a word.
    pub fn any_star() -> Self {
        Pattern::Closure(Box::new(Pattern::Any))
    }

    /// Start-of-sequence anchor.
    pub fn bos() -> Self {
        Pattern::Bos
    }

    /// End-of-sequence anchor.
    pub fn eos() -> Self {
        Pattern::Eos
    }

    /// `self` followed by `next`.
    pub fn then(self, next: Pattern) -> Self {
        match self {
            Pattern::Empty => next,
            Pattern::Concat(mut parts) => {
                parts.push(next);
                Pattern::Concat(parts)
            }
            other => Pattern::Concat(vec![other, next]),
        }
    }

    /// `self` or `other`.
    pub fn or(self, other: Pattern) -> Self {
        match self {
            Pattern::Union(mut alternatives) => {
                alternatives.push(other);
                Pattern::Union(alternatives)
            }
            first => Pattern::Union(vec![first, other]),
        }
    }

    /// Zero or more repetitions of `self`.
    pub fn star(self) -> Self {
        Pattern::Closure(Box::new(self))
    }

    /// True if this is the empty-string pattern, i.e. an absent context.
    pub fn is_empty(&self) -> bool {
        matches!(self, Pattern::Empty)
    }

    /// Compile to a minimal acceptor.
    ///
    /// # Errors
    ///
    /// - [`CompileError::AlphabetMismatch`] if a literal is not spelled by
    ///   the alphabet
    /// - [`CompileError::EmptyLanguage`] if the pattern matches nothing
    pub fn compile(&self, alphabet: &Arc<Alphabet>) -> CompileResult<Automaton> {
        optimize(&self.build(alphabet)?, &self.to_string())
    }

    /// Compile without optimizing. Used when the acceptor is only an
    /// intermediate piece of a larger construction.
    pub(crate) fn build(&self, alphabet: &Arc<Alphabet>) -> CompileResult<Automaton> {
        match self {
            Pattern::Empty => Ok(Automaton::epsilon(alphabet.clone())),
            Pattern::Literal(text) => {
                let labels = tokenize_literal(alphabet, text)?;
                Ok(Automaton::linear(alphabet.clone(), &labels))
            }
            Pattern::Any => Ok(Automaton::any_symbol(alphabet.clone())),
            Pattern::Bos => Ok(Automaton::symbol_set(alphabet.clone(), &[BOS])),
            Pattern::Eos => Ok(Automaton::symbol_set(alphabet.clone(), &[EOS])),
            Pattern::Union(alternatives) => {
                let built = alternatives
                    .iter()
                    .map(|p| p.build(alphabet))
                    .collect::<CompileResult<Vec<_>>>()?;
                union_all(alphabet, &built)
            }
            Pattern::Concat(parts) => {
                let mut result = Automaton::epsilon(alphabet.clone());
                for part in parts {
                    result = concat(&result, &part.build(alphabet)?)?;
                }
                Ok(result)
            }
            Pattern::Closure(inner) => Ok(closure(&inner.build(alphabet)?)),
        }
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        if text.is_empty() {
            Pattern::Empty
        } else {
            Pattern::Literal(text.to_string())
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Empty => write!(f, "\"\""),
            Pattern::Literal(text) => write!(f, "\"{}\"", text),
            Pattern::Any => write!(f, "."),
            Pattern::Bos => write!(f, "[BOS]"),
            Pattern::Eos => write!(f, "[EOS]"),
            Pattern::Union(alternatives) => {
                write!(f, "(")?;
                for (i, p) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ")")
            }
            Pattern::Concat(parts) => {
                for p in parts {
                    write!(f, "{}", p)?;
                }
                Ok(())
            }
            Pattern::Closure(inner) => write!(f, "({})*", inner),
        }
    }
}

/// Tokenize rule text, reporting failures as alphabet mismatches.
pub(crate) fn tokenize_literal(alphabet: &Alphabet, text: &str) -> CompileResult<Vec<Label>> {
    alphabet
        .tokenize(text)
        .map_err(|e| CompileError::AlphabetMismatch {
            alphabet: alphabet.name().to_string(),
            detail: format!("`{}` in `{}` is not a symbol", e.symbol, text),
        })
}

/// Transducer mapping exactly `input` to exactly `output`.
pub fn cross(alphabet: &Arc<Alphabet>, input: &str, output: &str) -> CompileResult<Automaton> {
    let i = tokenize_literal(alphabet, input)?;
    let o = tokenize_literal(alphabet, output)?;
    Ok(Automaton::cross(alphabet.clone(), &i, &o))
}

/// Transducer for a finite relation: the union of one [`cross`] per pair,
/// optimized.
pub fn string_map<'a, I>(alphabet: &Arc<Alphabet>, pairs: I) -> CompileResult<Automaton>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let crosses = pairs
        .into_iter()
        .map(|(i, o)| cross(alphabet, i, o))
        .collect::<CompileResult<Vec<_>>>()?;
    optimize(&union_all(alphabet, &crosses)?, "string map")
}

//! Context-dependent rewrite rules.
//!
//! A [`Rule`] rewrites occurrences of the inputs of its [`SubstitutionMap`]
//! when the text to the left matches the left context and the text to the
//! right matches the right context:
//!
//! ```text
//! input → output / left __ right
//! ```
//!
//! # Semantics
//!
//! Rules scan left to right and never overlap:
//!
//! - **Leftmost**: the first position where some entry matches (with both
//!   contexts satisfied) is rewritten first, then scanning resumes right
//!   after the rewritten span.
//! - **Longest match**: among entries matching at one position, the longest
//!   input whose right context holds wins.
//! - **Left context on the output**: the left context is tested against
//!   `[BOS]` followed by what the rule has produced so far, so an earlier
//!   rewrite can feed a later one.
//! - **Right context on the input**: the right context is tested against the
//!   unread input followed by `[EOS]`.
//! - [`RewriteMode::Obligatory`] rules must rewrite every such occurrence and
//!   therefore map each input to exactly one output.
//!   [`RewriteMode::Optional`] rules may also leave any occurrence unchanged.
//!
//! Rules are compiled once into an [`Automaton`] by
//! [`compile_rule`] and are immutable afterwards.
//!
//! # Example
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kazakh_fst::alphabet::Alphabet;
//! use kazakh_fst::pattern::Pattern;
//! use kazakh_fst::rewrite::{Rule, SubstitutionMap};
//!
//! let alphabet = Alphabet::builder("demo").symbols(["a", "ý", "w"]).build()?;
//!
//! // ý → w at the start of a word
//! let rule = Rule::new("initial-glide", SubstitutionMap::cross("ý", "w"))
//!     .left_context(Pattern::bos());
//!
//! let fst = rule.compile(&alphabet)?;
//! assert!(!fst.is_empty());
//! # Ok(())
//! # }
//! ```

mod compiler;
mod context;

pub use compiler::compile_rule;

use std::sync::Arc;

use crate::alphabet::Alphabet;
use crate::automaton::Automaton;
use crate::error::CompileResult;
use crate::pattern::{self, Pattern};

/// Whether matching occurrences must be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RewriteMode {
    /// Every occurrence in context is rewritten.
    #[default]
    Obligatory,
    /// Occurrences in context may be rewritten or left alone.
    Optional,
}

/// Ordered `(input, output)` pairs rewritten simultaneously by one rule.
///
/// Inputs must be non-empty and distinct. An input may be a prefix of
/// another; the longer one wins where both match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct SubstitutionMap {
    entries: Vec<(String, String)>,
}

impl SubstitutionMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with a single entry.
    pub fn cross(input: impl Into<String>, output: impl Into<String>) -> Self {
        SubstitutionMap::new().with(input, output)
    }

    /// Map from a list of pairs, in order.
    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        SubstitutionMap {
            entries: pairs
                .into_iter()
                .map(|(a, b)| (a.into(), b.into()))
                .collect(),
        }
    }

    /// Append an entry.
    pub fn with(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.entries.push((input.into(), output.into()));
        self
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The map as a context-free transducer (see [`pattern::string_map`]).
    pub fn to_automaton(&self, alphabet: &Arc<Alphabet>) -> CompileResult<Automaton> {
        pattern::string_map(
            alphabet,
            self.entries.iter().map(|(a, b)| (a.as_str(), b.as_str())),
        )
    }
}

/// A named context-dependent rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Rule {
    /// Name used in logs and errors.
    pub name: String,
    /// What to rewrite.
    pub map: SubstitutionMap,
    /// Pattern that must end right before an occurrence.
    #[cfg_attr(feature = "serialization", serde(default))]
    pub left: Pattern,
    /// Pattern that must start right after an occurrence.
    #[cfg_attr(feature = "serialization", serde(default))]
    pub right: Pattern,
    /// Obligatory or optional.
    #[cfg_attr(feature = "serialization", serde(default))]
    pub mode: RewriteMode,
}

impl Rule {
    /// Obligatory rule with empty contexts.
    pub fn new(name: impl Into<String>, map: SubstitutionMap) -> Self {
        Rule {
            name: name.into(),
            map,
            left: Pattern::Empty,
            right: Pattern::Empty,
            mode: RewriteMode::Obligatory,
        }
    }

    /// Set the left context.
    pub fn left_context(mut self, pattern: impl Into<Pattern>) -> Self {
        self.left = pattern.into();
        self
    }

    /// Set the right context.
    pub fn right_context(mut self, pattern: impl Into<Pattern>) -> Self {
        self.right = pattern.into();
        self
    }

    /// Set the rewrite mode.
    pub fn mode(mut self, mode: RewriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for `mode(RewriteMode::Optional)`.
    pub fn optional(self) -> Self {
        self.mode(RewriteMode::Optional)
    }

    /// Compile the rule over `alphabet`. See [`compile_rule`].
    pub fn compile(&self, alphabet: &Arc<Alphabet>) -> CompileResult<Automaton> {
        compile_rule(self, alphabet)
    }
}

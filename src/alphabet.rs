//! Symbol tables shared by every automaton of a pipeline.
//!
//! An [`Alphabet`] maps the spellings of atomic symbols (graphemes, phonemes
//! or tag characters) to integer labels. Label `0` is reserved for epsilon and
//! two more labels for the [`BOS`] / [`EOS`] sentinels that anchor context
//! patterns to word boundaries; ordinary symbols start after them.
//!
//! Spellings are matched longest-first during tokenization, so a symbol may be
//! spelled with several code points (a base letter plus a combining accent),
//! and aliases let several spellings share one label:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kazakh_fst::alphabet::Alphabet;
//!
//! let sigma = Alphabet::builder("demo")
//!     .symbols(["a", "b", "\u{fd}"])
//!     .alias("y\u{301}", "\u{fd}")
//!     .build()?;
//!
//! let precomposed = sigma.tokenize("a\u{fd}")?;
//! let decomposed = sigma.tokenize("ay\u{301}")?;
//! assert_eq!(precomposed, decomposed);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::error::{CompileError, CompileResult};

/// Integer label of a symbol on a transducer tape.
pub type Label = u32;

/// The empty label.
pub const EPSILON: Label = 0;

/// Start-of-sequence sentinel, only meaningful in left contexts.
pub const BOS: Label = 1;

/// End-of-sequence sentinel, only meaningful in right contexts.
pub const EOS: Label = 2;

const FIRST_SYMBOL: Label = 3;

/// Text that could not be split into symbols of an alphabet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("`{symbol}` at byte offset {offset} is not in alphabet `{alphabet}`")]
pub struct TokenizeError {
    /// Name of the alphabet.
    pub alphabet: String,
    /// The first character that matched no spelling.
    pub symbol: String,
    /// Byte offset of that character.
    pub offset: usize,
}

/// A finite symbol table plus the BOS/EOS sentinels.
///
/// Alphabets are immutable once built and shared through [`Arc`]. Two
/// alphabets are compatible when they are the same allocation or compare
/// equal (same name, same spellings, same labels).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    name: String,
    symbols: Vec<Box<str>>,
    spellings: FxHashMap<Box<str>, Label>,
    max_chars: usize,
}

impl Alphabet {
    /// Start building an alphabet with the given name.
    pub fn builder(name: impl Into<String>) -> AlphabetBuilder {
        AlphabetBuilder {
            name: name.into(),
            symbols: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of ordinary symbols (sentinels and epsilon excluded).
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when the alphabet has no ordinary symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Labels of all ordinary symbols in ascending order.
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        (0..self.symbols.len() as Label).map(|i| i + FIRST_SYMBOL)
    }

    /// True if `label` is an ordinary symbol of this alphabet.
    #[inline]
    pub fn contains(&self, label: Label) -> bool {
        label >= FIRST_SYMBOL && ((label - FIRST_SYMBOL) as usize) < self.symbols.len()
    }

    /// Label of a spelling (canonical or alias).
    pub fn label(&self, spelling: &str) -> Option<Label> {
        self.spellings.get(spelling).copied()
    }

    /// Canonical spelling of a label. Epsilon has none.
    pub fn symbol(&self, label: Label) -> Option<&str> {
        match label {
            EPSILON => None,
            BOS => Some("[BOS]"),
            EOS => Some("[EOS]"),
            _ => self
                .symbols
                .get((label - FIRST_SYMBOL) as usize)
                .map(|s| s.as_ref()),
        }
    }

    /// Split `text` into labels, always taking the longest spelling that
    /// matches at the current position.
    pub fn tokenize(&self, text: &str) -> Result<Vec<Label>, TokenizeError> {
        let mut labels = Vec::with_capacity(text.len());
        let mut offset = 0;

        while offset < text.len() {
            let rest = &text[offset..];
            let ends: SmallVec<[usize; 8]> = rest
                .char_indices()
                .take(self.max_chars)
                .map(|(i, c)| i + c.len_utf8())
                .collect();

            let found = ends
                .iter()
                .rev()
                .find_map(|&end| self.spellings.get(&rest[..end]).map(|&l| (l, end)));

            match found {
                Some((label, end)) => {
                    labels.push(label);
                    offset += end;
                }
                None => {
                    let symbol = rest.chars().next().map(String::from).unwrap_or_default();
                    return Err(TokenizeError {
                        alphabet: self.name.clone(),
                        symbol,
                        offset,
                    });
                }
            }
        }

        Ok(labels)
    }

    /// Concatenate the canonical spellings of `labels`, skipping epsilon and
    /// the sentinels.
    pub fn render(&self, labels: &[Label]) -> String {
        labels
            .iter()
            .filter(|&&l| self.contains(l))
            .filter_map(|&l| self.symbol(l))
            .collect()
    }

    /// True when automata over `a` and `b` may be combined.
    pub fn compatible(a: &Arc<Alphabet>, b: &Arc<Alphabet>) -> bool {
        Arc::ptr_eq(a, b) || **a == **b
    }

    /// Fail with [`CompileError::AlphabetMismatch`] unless `a` and `b` are
    /// compatible.
    pub fn ensure_compatible(a: &Arc<Alphabet>, b: &Arc<Alphabet>) -> CompileResult<()> {
        if Alphabet::compatible(a, b) {
            Ok(())
        } else {
            Err(CompileError::AlphabetMismatch {
                alphabet: a.name.clone(),
                detail: format!("cannot combine with alphabet `{}`", b.name),
            })
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (i, s) in self.symbols.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "}}")
    }
}

/// Builder for [`Alphabet`].
#[derive(Debug, Clone)]
pub struct AlphabetBuilder {
    name: String,
    symbols: Vec<String>,
    aliases: Vec<(String, String)>,
}

impl AlphabetBuilder {
    /// Add a symbol. Repeated spellings are ignored.
    pub fn symbol(mut self, spelling: impl Into<String>) -> Self {
        self.symbols.push(spelling.into());
        self
    }

    /// Add several symbols.
    pub fn symbols<I, S>(mut self, spellings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols.extend(spellings.into_iter().map(Into::into));
        self
    }

    /// Let `spelling` tokenize to the same label as the symbol `canonical`.
    pub fn alias(mut self, spelling: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.push((spelling.into(), canonical.into()));
        self
    }

    /// Freeze the table.
    ///
    /// Fails with [`CompileError::AlphabetMismatch`] when a symbol is empty
    /// or an alias points at a spelling that is not a symbol.
    pub fn build(self) -> CompileResult<Arc<Alphabet>> {
        let mut symbols: Vec<Box<str>> = Vec::with_capacity(self.symbols.len());
        let mut spellings: FxHashMap<Box<str>, Label> = FxHashMap::default();
        let mut max_chars = 1;

        for s in self.symbols {
            if s.is_empty() {
                return Err(CompileError::AlphabetMismatch {
                    alphabet: self.name,
                    detail: "empty symbol spelling".to_string(),
                });
            }
            if spellings.contains_key(s.as_str()) {
                continue;
            }
            let label = symbols.len() as Label + FIRST_SYMBOL;
            max_chars = max_chars.max(s.chars().count());
            let s: Box<str> = s.into_boxed_str();
            spellings.insert(s.clone(), label);
            symbols.push(s);
        }

        for (alias, canonical) in self.aliases {
            let Some(&label) = spellings.get(canonical.as_str()) else {
                return Err(CompileError::AlphabetMismatch {
                    alphabet: self.name,
                    detail: format!("alias `{}` targets unknown symbol `{}`", alias, canonical),
                });
            };
            if alias.is_empty() {
                continue;
            }
            max_chars = max_chars.max(alias.chars().count());
            spellings.entry(alias.into_boxed_str()).or_insert(label);
        }

        Ok(Arc::new(Alphabet {
            name: self.name,
            symbols,
            spellings,
            max_chars,
        }))
    }
}

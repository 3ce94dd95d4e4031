//! Grapheme-to-phoneme rules.
//!
//! One context-free substitution maps letters to phonemes, then a few
//! positional rules adjust the glide `ý` for vowel harmony and mark
//! word-initial `q`, `o` and `ó`. The glide rules condition on the output of
//! the first rule, so the order of the table is significant.

use std::sync::Arc;

use super::{acute_aliases, symbol_chars};
use crate::cascade::CompiledCascade;
use crate::error::{CompileResult, ResolveResult};
use crate::pattern::Pattern;
use crate::pipeline::{build_phonology_pipeline, RuleTable};
use crate::rewrite::{Rule, SubstitutionMap};

const GRAPHEMES: [&str; 33] = [
    "a", "o", "u", "y", "á", "e", "i", "ó", "ú", "ý", "b", "d", "g", "f", "ǵ", "h", "ı", "j", "k",
    "l", "m", "n", "ń", "p", "q", "r", "s", "t", "v", "x", "z", "sh", "ch",
];

const PHONEMES: [&str; 37] = [
    "a", "æ", "b", "d", "e", "f", "g", "ɣ", "h", "ɪ", "j", "k", "l", "m", "n", "ŋ", "o", "œ", "p",
    "q", "ɾ", "s", "ʃ", "t", "tɕ", "u", "v", "χ", "y", "z", "ʒ", "ɯ", "w", "uw", "yw", "ɣʷ", "ɜʷ",
];

const LETTER_TO_PHONEME: [(&str, &str); 13] = [
    ("y", "ɯ"),
    ("á", "æ"),
    ("i", "ɪ"),
    ("ó", "œ"),
    ("ú", "y"),
    ("ǵ", "ɣ"),
    ("ı", "j"),
    ("j", "ʒ"),
    ("ń", "ŋ"),
    ("r", "ɾ"),
    ("x", "χ"),
    ("sh", "ʃ"),
    ("ch", "tɕ"),
];

fn back_vowel() -> Pattern {
    Pattern::one_of(["a", "o", "u", "y"])
}

fn front_vowel() -> Pattern {
    Pattern::one_of(["á", "e", "i", "ó", "ú"])
}

/// The grapheme-to-phoneme rule table.
pub fn phonology_table() -> RuleTable {
    let symbols = symbol_chars(GRAPHEMES.iter().chain(PHONEMES.iter()).copied());
    let aliases = acute_aliases(&symbols);

    let rules = vec![
        Rule::new("letter-to-phoneme", SubstitutionMap::from_pairs(LETTER_TO_PHONEME)),
        Rule::new("glide-after-back-vowel", SubstitutionMap::cross("ý", "uw"))
            .left_context(back_vowel().then(Pattern::any_star())),
        Rule::new("glide-after-front-vowel", SubstitutionMap::cross("ý", "yw"))
            .left_context(front_vowel().then(Pattern::any_star())),
        Rule::new("initial-glide", SubstitutionMap::cross("ý", "w")).left_context(Pattern::bos()),
        Rule::new("initial-q", SubstitutionMap::cross("q", "qχ")).left_context(Pattern::bos()),
        Rule::new("initial-o", SubstitutionMap::cross("o", "ɣʷ")).left_context(Pattern::bos()),
        Rule::new("initial-oe", SubstitutionMap::cross("œ", "ɜʷ")).left_context(Pattern::bos()),
    ];

    RuleTable {
        name: "kazakh-phonology".to_string(),
        symbols,
        aliases,
        input_filter: Some(Pattern::one_of(GRAPHEMES).star()),
        output_filter: Some(Pattern::one_of(PHONEMES).star()),
        rules,
    }
}

/// Kazakh grapheme-to-phoneme converter.
///
/// Cheap to clone; clones share one compiled cascade.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kazakh_fst::kazakh::Phonology;
///
/// let g2p = Phonology::new()?;
/// assert_eq!(g2p.to_phoneme("qazaqstan")?, "qχazaqstan");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Phonology {
    cascade: Arc<CompiledCascade>,
}

impl Phonology {
    /// Compile the built-in table.
    pub fn new() -> CompileResult<Self> {
        Self::from_table(&phonology_table())
    }

    /// Compile a replacement table.
    pub fn from_table(table: &RuleTable) -> CompileResult<Self> {
        Ok(Phonology {
            cascade: Arc::new(build_phonology_pipeline(table)?),
        })
    }

    /// Phonemic transcription of `word`.
    ///
    /// # Errors
    ///
    /// - `InvalidSymbol` for characters outside the alphabet (digits,
    ///   punctuation, Cyrillic)
    /// - `NoValidTransduction` for symbols of the alphabet that are not
    ///   graphemes, such as phoneme-only letters in the input
    pub fn to_phoneme(&self, word: &str) -> ResolveResult<String> {
        self.cascade.resolve_str(word)
    }

    /// The compiled cascade.
    pub fn cascade(&self) -> &Arc<CompiledCascade> {
        &self.cascade
    }
}

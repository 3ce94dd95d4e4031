//! Kazakh rule tables (2017 Latin script).
//!
//! Two pipelines are provided:
//!
//! - [`Phonology`] - grapheme-to-phoneme conversion
//! - [`Morphology`] - inflection of a lemma followed by `+TAG` affixes
//!
//! Both are ordinary [`RuleTable`](crate::pipeline::RuleTable)s; the engine
//! knows nothing about Kazakh. The tables cover the standard (non-city)
//! dialect and are not exhaustive.
//!
//! Accented letters are stored precomposed (`ý`, `ǵ`, `ń`, `á`, `ó`, `ú`).
//! The decomposed spellings (base letter plus U+0301) tokenize to the same
//! symbols, so input in either normalization form is accepted and output is
//! always precomposed.

mod morphology;
mod phonology;

pub use morphology::{morphology_table, Morphology};
pub use phonology::{phonology_table, Phonology};

/// Decomposed spellings of the acute-accented letters, as
/// `(alias, canonical)` pairs.
const ACUTE_ALIASES: [(&str, &str); 6] = [
    ("a\u{301}", "\u{e1}"),
    ("o\u{301}", "\u{f3}"),
    ("u\u{301}", "\u{fa}"),
    ("y\u{301}", "\u{fd}"),
    ("g\u{301}", "\u{1f5}"),
    ("n\u{301}", "\u{144}"),
];

/// Aliases for every accented letter that `symbols` contains.
fn acute_aliases(symbols: &[String]) -> Vec<(String, String)> {
    ACUTE_ALIASES
        .iter()
        .filter(|(_, canonical)| symbols.iter().any(|s| s == canonical))
        .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
        .collect()
}

/// Distinct characters of `inventory`, in first-seen order. Multi-letter
/// units such as `sh` or `tɕ` become sequences of single-character symbols.
fn symbol_chars<'a, I>(inventory: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut symbols: Vec<String> = Vec::new();
    for unit in inventory {
        for c in unit.chars() {
            let c = c.to_string();
            if !symbols.contains(&c) {
                symbols.push(c);
            }
        }
    }
    symbols
}

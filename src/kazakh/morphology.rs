//! Inflection rules.
//!
//! Input is a lemma followed by zero or more affix tags, for example
//! `bala+PLR+1SING-POSS`. Each group of rules realizes one tag, choosing
//! the affix allomorph by vowel harmony (front or back, decided by the
//! nearest vowel on the left) and by the class of the preceding consonant.
//!
//! Some possessive rules leave a `^` marker before a following case tag;
//! the case rules that come later consume `^+TAG` together and choose the
//! pronominal `n` forms (`balasyna`, not `balasyǵa`).
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `+PLR` | plural |
//! | `+1SING-POSS` | 1st person singular possessive |
//! | `+1PLR-POSS` | 1st person plural possessive |
//! | `+2SING-POSS` | 2nd person singular possessive |
//! | `+2PLR-POSS` | 2nd person plural possessive |
//! | `+3-POSS` | 3rd person possessive |
//! | `+NEG` | negative |
//! | `+CAUSE` | causative |
//! | `+PASS` | passive |
//! | `+ACC` | accusative |
//! | `+DAT` | dative |
//! | `+GEN` | genitive |
//! | `+ABL` | ablative |
//! | `+LOC` | locative |
//! | `+INS` | instrumental |
//! | `+PRES-PTCP` | present participle |
//! | `+PAST-PTCP` | past participle |

use std::sync::Arc;

use super::{acute_aliases, symbol_chars};
use crate::cascade::CompiledCascade;
use crate::error::{CompileResult, ResolveResult};
use crate::pattern::Pattern;
use crate::pipeline::{build_morphology_pipeline, RuleTable};
use crate::rewrite::{Rule, SubstitutionMap};

const VOWELS: [&str; 9] = ["a", "o", "u", "y", "á", "e", "i", "ó", "ú"];

const CONSONANTS: [&str; 24] = [
    "ý", "b", "d", "f", "g", "ǵ", "h", "ı", "j", "k", "l", "m", "n", "ń", "p", "q", "r", "s",
    "t", "v", "x", "z", "sh", "ch",
];

const TAG_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ+123-^";

fn vowel() -> Pattern {
    Pattern::one_of(VOWELS)
}

fn consonant() -> Pattern {
    Pattern::one_of(CONSONANTS)
}

/// Front vowel, optionally followed by the glide `ı`. A word-initial `ı`
/// also counts as front.
fn front() -> Pattern {
    Pattern::one_of(["á", "e", "i", "ó", "ú", "áı", "eı", "iı", "óı", "úı"])
        .or(Pattern::bos().then(Pattern::literal("ı")))
}

fn back() -> Pattern {
    Pattern::one_of(["a", "o", "u", "y", "aı", "oı", "uı", "yı"])
}

fn nasal() -> Pattern {
    Pattern::one_of(["m", "n", "ń"])
}

fn liquid() -> Pattern {
    Pattern::one_of(["l", "ı", "ý"])
}

fn voiced_fricative() -> Pattern {
    Pattern::one_of(["z", "j", "v"])
}

fn liquid_or_fricative() -> Pattern {
    Pattern::one_of(["z", "j", "v", "r", "l", "ı", "ý"])
}

fn sonorant_or_fricative() -> Pattern {
    Pattern::one_of(["v", "ı", "ý", "r", "l", "m", "n", "ń", "z", "j"])
}

/// Consonants treated as voiceless for affix assimilation. Voiced stops are
/// included because they devoice in coda position.
fn voiceless() -> Pattern {
    Pattern::one_of(["b", "p", "g", "k", "f", "h", "d", "q", "s", "t", "x", "sh", "ch"])
}

fn any() -> Pattern {
    Pattern::any_star()
}

/// `first` then `second`.
fn seq(first: Pattern, second: Pattern) -> Pattern {
    first.then(second)
}

fn rules(group: &str, specs: Vec<(SubstitutionMap, Pattern, Pattern)>) -> Vec<Rule> {
    specs
        .into_iter()
        .enumerate()
        .map(|(i, (map, left, right))| {
            Rule::new(format!("{}-{}", group, i + 1), map)
                .left_context(left)
                .right_context(right)
        })
        .collect()
}

fn cross(input: &str, output: &str) -> SubstitutionMap {
    SubstitutionMap::cross(input, output)
}

fn plural() -> Vec<Rule> {
    let e = Pattern::empty;
    rules(
        "plural",
        vec![
            (cross("+PLR", "ler"), front(), e()),
            (cross("+PLR", "lar"), back(), e()),
            (cross("+PLR", "der"), seq(front(), sonorant_or_fricative()), e()),
            (cross("+PLR", "dar"), seq(back(), sonorant_or_fricative()), e()),
            (cross("+PLR", "ter"), seq(front(), voiceless()), e()),
            (cross("+PLR", "tar"), seq(back(), voiceless()), e()),
        ],
    )
}

fn possessive() -> Vec<Rule> {
    let e = Pattern::empty;
    let loc = || Pattern::literal("+LOC");
    let abl = || Pattern::literal("+ABL");
    let dat = || Pattern::literal("+DAT");

    rules(
        "possessive",
        vec![
            (cross("+3-POSS", "si^"), front(), loc()),
            (cross("+3-POSS", "sy^"), back(), loc()),
            (cross("+3-POSS", "i^"), seq(front(), consonant()), loc()),
            (cross("+3-POSS", "y^"), seq(back(), consonant()), loc()),
            (cross("+3-POSS", "si^"), front(), abl()),
            (cross("+3-POSS", "sy^"), back(), abl()),
            (cross("+3-POSS", "i^"), seq(front(), consonant()), abl()),
            (cross("+3-POSS", "y^"), seq(back(), consonant()), abl()),
            (
                SubstitutionMap::from_pairs([("+1SING-POSS", "m^"), ("+2SING-POSS", "ń^")]),
                vowel(),
                dat(),
            ),
            (
                SubstitutionMap::from_pairs([
                    ("+1PLR-POSS", "miz^"),
                    ("+2PLR-POSS", "ńiz^"),
                    ("+3-POSS", "si^"),
                ]),
                front(),
                dat(),
            ),
            (
                SubstitutionMap::from_pairs([
                    ("+1PLR-POSS", "myz^"),
                    ("+2PLR-POSS", "ńyz^"),
                    ("+3-POSS", "sy^"),
                ]),
                back(),
                dat(),
            ),
            (
                SubstitutionMap::from_pairs([
                    ("+1SING-POSS", "im^"),
                    ("+1PLR-POSS", "imiz^"),
                    ("+2SING-POSS", "iń^"),
                    ("+2PLR-POSS", "ińiz^"),
                    ("+3-POSS", "i^"),
                ]),
                seq(front(), consonant()),
                dat(),
            ),
            (
                SubstitutionMap::from_pairs([
                    ("+1SING-POSS", "ym^"),
                    ("+1PLR-POSS", "ymyz^"),
                    ("+2SING-POSS", "yń^"),
                    ("+2PLR-POSS", "yńyz^"),
                    ("+3-POSS", "y^"),
                ]),
                seq(back(), consonant()),
                dat(),
            ),
            (
                SubstitutionMap::from_pairs([("+1SING-POSS", "m"), ("+2SING-POSS", "ń")]),
                vowel(),
                e(),
            ),
            (
                SubstitutionMap::from_pairs([
                    ("+1PLR-POSS", "miz"),
                    ("+2PLR-POSS", "ńiz"),
                    ("+3-POSS", "si"),
                ]),
                front(),
                e(),
            ),
            (
                SubstitutionMap::from_pairs([
                    ("+1PLR-POSS", "myz"),
                    ("+2PLR-POSS", "ńyz"),
                    ("+3-POSS", "sy"),
                ]),
                back(),
                e(),
            ),
            (
                SubstitutionMap::from_pairs([
                    ("+1SING-POSS", "im"),
                    ("+1PLR-POSS", "imiz"),
                    ("+2SING-POSS", "iń"),
                    ("+2PLR-POSS", "ińiz"),
                    ("+3-POSS", "i"),
                ]),
                seq(front(), consonant()),
                e(),
            ),
            (
                SubstitutionMap::from_pairs([
                    ("+1SING-POSS", "ym"),
                    ("+1PLR-POSS", "ymyz"),
                    ("+2SING-POSS", "yń"),
                    ("+2PLR-POSS", "yńyz"),
                    ("+3-POSS", "y"),
                ]),
                seq(back(), consonant()),
                e(),
            ),
        ],
    )
}

fn negative() -> Vec<Rule> {
    let e = Pattern::empty;
    rules(
        "negative",
        vec![
            (cross("ý+NEG", "meý"), front().or(seq(front(), liquid())), e()),
            (cross("ý+NEG", "maý"), back().or(seq(back(), liquid())), e()),
            (
                cross("ý+NEG", "beý"),
                seq(front(), nasal()).or(seq(front(), voiced_fricative())),
                e(),
            ),
            (
                cross("ý+NEG", "baý"),
                seq(back(), nasal()).or(seq(back(), voiced_fricative())),
                e(),
            ),
            (cross("ý+NEG", "peý"), seq(front(), voiceless()), e()),
            (cross("ý+NEG", "paý"), seq(back(), voiceless()), e()),
        ],
    )
}

fn causative() -> Vec<Rule> {
    let e = Pattern::empty;
    rules(
        "causative",
        vec![
            (cross("ý+CAUSE", "tý"), vowel(), e()),
            (cross("ý+CAUSE", "tirý"), seq(front(), voiceless()), e()),
            (cross("ý+CAUSE", "tyrý"), seq(back(), voiceless()), e()),
            (cross("ý+CAUSE", "dirý"), seq(front(), any()), e()),
            (cross("ý+CAUSE", "dyrý"), seq(back(), any()), e()),
        ],
    )
}

fn passive() -> Vec<Rule> {
    let e = Pattern::empty;
    rules(
        "passive",
        vec![
            (cross("ý+PASS", "iný"), seq(front(), Pattern::literal("l")), e()),
            (cross("ý+PASS", "yný"), seq(back(), Pattern::literal("l")), e()),
            (cross("ý+PASS", "ilý"), seq(front(), any()), e()),
            (cross("ý+PASS", "ylý"), seq(back(), any()), e()),
        ],
    )
}

fn accusative() -> Vec<Rule> {
    let e = Pattern::empty;
    rules(
        "accusative",
        vec![
            (
                cross("+ACC", "ti"),
                seq(front(), voiceless()).or(seq(front(), any()).then(voiceless())),
                e(),
            ),
            (
                cross("+ACC", "ty"),
                seq(back(), voiceless()).or(seq(back(), any()).then(voiceless())),
                e(),
            ),
            (cross("+ACC", "ni"), front(), e()),
            (cross("+ACC", "ny"), back(), e()),
            (cross("^+ACC", "n"), e(), Pattern::eos()),
            (cross("+ACC", "di"), seq(front(), any()), e()),
            (cross("+ACC", "dy"), seq(back(), any()), e()),
        ],
    )
}

fn dative() -> Vec<Rule> {
    let e = Pattern::empty;
    rules(
        "dative",
        vec![
            (cross("^+DAT", "ne"), front(), e()),
            (cross("^+DAT", "na"), back(), e()),
            (cross("^+DAT", "e"), seq(front(), any()), e()),
            (cross("^+DAT", "a"), seq(back(), any()), e()),
            (cross("+DAT", "ge"), front().or(seq(front(), sonorant_or_fricative())), e()),
            (cross("+DAT", "ǵa"), back().or(seq(back(), sonorant_or_fricative())), e()),
            (cross("+DAT", "ke"), seq(front(), consonant()), e()),
            (cross("+DAT", "qa"), seq(back(), consonant()), e()),
        ],
    )
}

fn genitive() -> Vec<Rule> {
    let e = Pattern::empty;
    rules(
        "genitive",
        vec![
            (cross("+GEN", "niń"), front().or(seq(front(), nasal())), e()),
            (cross("+GEN", "nyń"), back().or(seq(back(), nasal())), e()),
            (cross("+GEN", "diń"), seq(front(), liquid_or_fricative()), e()),
            (cross("+GEN", "dyń"), seq(back(), liquid_or_fricative()), e()),
            (
                cross("+GEN", "tiń"),
                seq(front(), voiceless()).or(seq(front(), any())),
                e(),
            ),
            (
                cross("+GEN", "tyń"),
                seq(back(), voiceless()).or(seq(back(), any())),
                e(),
            ),
        ],
    )
}

fn locative() -> Vec<Rule> {
    let e = Pattern::empty;
    rules(
        "locative",
        vec![
            (cross("^+LOC", "nde"), front(), e()),
            (cross("^+LOC", "nda"), back(), e()),
            (cross("+LOC", "te"), seq(front(), voiceless()), e()),
            (cross("+LOC", "ta"), seq(back(), voiceless()), e()),
            (cross("+LOC", "de"), front().or(seq(front(), any())), e()),
            (cross("+LOC", "da"), back().or(seq(back(), any())), e()),
        ],
    )
}

fn ablative() -> Vec<Rule> {
    let e = Pattern::empty;
    rules(
        "ablative",
        vec![
            (cross("^+ABL", "nen"), front(), e()),
            (cross("^+ABL", "nan"), back(), e()),
            (cross("+ABL", "den"), front().or(seq(front(), liquid_or_fricative())), e()),
            (cross("+ABL", "dan"), back().or(seq(back(), liquid_or_fricative())), e()),
            (cross("+ABL", "nen"), seq(front(), nasal()), e()),
            (cross("+ABL", "nan"), seq(back(), nasal()), e()),
            (
                cross("+ABL", "ten"),
                seq(front(), voiceless()).or(seq(front(), any()).then(voiceless())),
                e(),
            ),
            (
                cross("+ABL", "tan"),
                seq(back(), voiceless()).or(seq(back(), any()).then(voiceless())),
                e(),
            ),
        ],
    )
}

fn instrumental() -> Vec<Rule> {
    let e = Pattern::empty;
    rules(
        "instrumental",
        vec![
            (
                cross("+INS", "men"),
                vowel().or(nasal()).or(Pattern::one_of(["l", "r"])),
                e(),
            ),
            (cross("+INS", "ben"), Pattern::one_of(["z", "j"]), e()),
            (cross("+INS", "pen"), voiceless(), e()),
        ],
    )
}

fn present_participle() -> Vec<Rule> {
    let e = Pattern::empty;
    rules(
        "present-participle",
        vec![
            (cross("ý+PRES-PTCP", "ıetin"), front(), e()),
            (cross("ý+PRES-PTCP", "ıatyn"), back(), e()),
            (cross("ý+PRES-PTCP", "etin"), seq(front(), consonant()), e()),
            (cross("ý+PRES-PTCP", "atyn"), seq(back(), consonant()), e()),
        ],
    )
}

fn past_participle() -> Vec<Rule> {
    let e = Pattern::empty;
    rules(
        "past-participle",
        vec![
            (
                cross("ý+PAST-PTCP", "gen"),
                front().or(seq(front(), sonorant_or_fricative())),
                e(),
            ),
            (
                cross("ý+PAST-PTCP", "ǵan"),
                back().or(seq(back(), sonorant_or_fricative())),
                e(),
            ),
            (cross("ý+PAST-PTCP", "ken"), seq(front(), voiceless()), e()),
            (cross("ý+PAST-PTCP", "qan"), seq(back(), voiceless()), e()),
        ],
    )
}

/// The inflection rule table.
///
/// There is no input filter: any symbol sequence is accepted. The output
/// filter admits only letters, so a tag that no rule consumed makes the
/// word fail to resolve.
pub fn morphology_table() -> RuleTable {
    let tag_chars: Vec<String> = TAG_CHARS.chars().map(String::from).collect();
    let symbols = symbol_chars(
        VOWELS
            .iter()
            .chain(CONSONANTS.iter())
            .copied()
            .chain(tag_chars.iter().map(String::as_str)),
    );
    let aliases = acute_aliases(&symbols);

    let groups = [
        plural(),
        possessive(),
        negative(),
        causative(),
        passive(),
        accusative(),
        dative(),
        genitive(),
        locative(),
        ablative(),
        instrumental(),
        present_participle(),
        past_participle(),
    ];

    RuleTable {
        name: "kazakh-morphology".to_string(),
        symbols,
        aliases,
        input_filter: None,
        output_filter: Some(vowel().or(consonant()).star()),
        rules: groups.into_iter().flatten().collect(),
    }
}

/// Kazakh inflection generator.
///
/// Cheap to clone; clones share one compiled cascade.
///
/// # Example
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use kazakh_fst::kazakh::Morphology;
///
/// let morph = Morphology::new()?;
/// assert_eq!(morph.inflect("bala+PLR+1SING-POSS")?, "balalarym");
/// assert_eq!(morph.inflect("jazý+CAUSE")?, "jazdyrý");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Morphology {
    cascade: Arc<CompiledCascade>,
}

impl Morphology {
    /// Compile the built-in table.
    pub fn new() -> CompileResult<Self> {
        Self::from_table(&morphology_table())
    }

    /// Compile a replacement table.
    pub fn from_table(table: &RuleTable) -> CompileResult<Self> {
        Ok(Morphology {
            cascade: Arc::new(build_morphology_pipeline(table)?),
        })
    }

    /// Surface form of a tagged word such as `kirpi+3-POSS+LOC`.
    ///
    /// # Errors
    ///
    /// - `InvalidSymbol` for characters outside the alphabet
    /// - `NoValidTransduction` for unknown tags or tag combinations the
    ///   rules do not realize
    pub fn inflect(&self, tagged_word: &str) -> ResolveResult<String> {
        self.cascade.resolve_str(tagged_word)
    }

    /// The compiled cascade.
    pub fn cascade(&self) -> &Arc<CompiledCascade> {
        &self.cascade
    }
}

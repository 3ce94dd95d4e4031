//! Inflection with the built-in Kazakh table

use kazakh_fst::prelude::*;
use std::sync::OnceLock;

fn morph() -> &'static Morphology {
    static MORPH: OnceLock<Morphology> = OnceLock::new();
    MORPH.get_or_init(|| Morphology::new().expect("morphology table compiles"))
}

fn assert_morph(tagged: &str, surface: &str) {
    assert_eq!(morph().inflect(tagged).unwrap(), surface, "inflection of {}", tagged);
}

#[test]
fn test_plural() {
    assert_morph("bala+PLR", "balalar");
    assert_morph("kirpi+PLR", "kirpiler");
    assert_morph("sóz+PLR", "sózder");
    assert_morph("adam+PLR", "adamdar");
    assert_morph("mektep+PLR", "mektepter");
    assert_morph("qazaq+PLR", "qazaqtar");
}

#[test]
fn test_possessive() {
    assert_morph("bala+1SING-POSS", "balam");
    assert_morph("bala+PLR+1SING-POSS", "balalarym");
    assert_morph("adam+2SING-POSS", "adamyń");
    assert_morph("adam+PLR+2SING-POSS", "adamdaryń");
    assert_morph("mektep+1PLR-POSS", "mektepimiz");
    assert_morph("qala+1PLR-POSS", "qalamyz");
    assert_morph("bala+2PLR-POSS", "balańyz");
    assert_morph("bala+PLR+2PLR-POSS", "balalaryńyz");
    assert_morph("kirpi+3-POSS", "kirpisi");
    assert_morph("kirpi+PLR+3-POSS", "kirpileri");
}

#[test]
fn test_possessive_before_case() {
    assert_morph("bala+1SING-POSS+DAT", "balama");
    assert_morph("kirpi+1PLR-POSS+DAT", "kirpimize");
    assert_morph("sóz+2SING-POSS+DAT", "sózińe");
    assert_morph("bala+3-POSS+DAT", "balasyna");
    assert_morph("bala+3-POSS+LOC", "balasynda");
    assert_morph("kirpi+3-POSS+LOC", "kirpisinde");
    assert_morph("bala+3-POSS+ABL", "balasynan");
    assert_morph("kirpi+3-POSS+ABL", "kirpisinen");
}

#[test]
fn test_negative() {
    assert_morph("sený+NEG", "senbeý");
    assert_morph("jazý+NEG", "jazbaý");
    assert_morph("qulý+NEG", "qulmaý");
    assert_morph("jeý+NEG", "jemeý");
    assert_morph("satý+NEG", "satpaý");
    assert_morph("kótý+NEG", "kótpeý");
}

#[test]
fn test_causative() {
    assert_morph("sený+CAUSE", "sendirý");
    assert_morph("jazý+CAUSE", "jazdyrý");
    assert_morph("qulý+CAUSE", "quldyrý");
    assert_morph("jeý+CAUSE", "jetý");
    assert_morph("satý+CAUSE", "sattyrý");
    assert_morph("kótý+CAUSE", "kóttirý");
}

#[test]
fn test_passive() {
    assert_morph("sený+PASS", "senilý");
    assert_morph("alý+PASS", "alyný");
    assert_morph("jazý+PASS", "jazylý");
    assert_morph("qulý+PASS", "qulyný");
}

#[test]
fn test_present_participle() {
    assert_morph("sený+PRES-PTCP", "senetin");
    assert_morph("alý+PRES-PTCP", "alatyn");
    assert_morph("jeý+PRES-PTCP", "jeıetin");
}

#[test]
fn test_past_participle() {
    assert_morph("sený+PAST-PTCP", "sengen");
    assert_morph("jazý+PAST-PTCP", "jazǵan");
    assert_morph("jeý+PAST-PTCP", "jegen");
    assert_morph("satý+PAST-PTCP", "satqan");
    assert_morph("kótý+PAST-PTCP", "kótken");
}

#[test]
fn test_accusative() {
    assert_morph("qala+ACC", "qalany");
    assert_morph("qazaq+ACC", "qazaqty");
    assert_morph("sóz+ACC", "sózdi");
    assert_morph("adam+ACC", "adamdy");
    assert_morph("shymkent+ACC", "shymkentti");
}

#[test]
fn test_genitive() {
    assert_morph("qala+GEN", "qalanyń");
    assert_morph("shymkent+GEN", "shymkenttiń");
    assert_morph("sóz+GEN", "sózdiń");
    assert_morph("qazaq+GEN", "qazaqtyń");
}

#[test]
fn test_dative() {
    assert_morph("bala+DAT", "balaǵa");
    assert_morph("qazaq+DAT", "qazaqqa");
    assert_morph("sóz+DAT", "sózge");
    assert_morph("mektep+DAT", "mektepke");
}

#[test]
fn test_locative() {
    assert_morph("qala+LOC", "qalada");
    assert_morph("kól+LOC", "kólde");
    assert_morph("saıt+LOC", "saıtta");
    assert_morph("mektep+LOC", "mektepte");
}

#[test]
fn test_ablative() {
    assert_morph("qala+ABL", "qaladan");
    assert_morph("qazaqstan+ABL", "qazaqstannan");
    assert_morph("shymkent+ABL", "shymkentten");
    assert_morph("kól+ABL", "kólden");
}

#[test]
fn test_instrumental() {
    assert_morph("qala+INS", "qalamen");
    assert_morph("qazaqstan+ABL+INS", "qazaqstannanmen");
    assert_morph("sóz+INS", "sózben");
    assert_morph("mektep+INS", "mekteppen");
}

#[test]
fn test_plural_possessive_before_dative() {
    assert_morph("mektep+1PLR-POSS", "mektepimiz");
    assert_morph("mektep+1PLR-POSS+DAT", "mektepimize");
    assert_morph("qazaq+1PLR-POSS+DAT", "qazaqymyza");
    assert_morph("adam+3-POSS+LOC", "adamynda");
}

#[test]
fn test_bare_lemma_passes_through() {
    assert_morph("kitap", "kitap");
    assert_morph("jeý", "jeý");
}

#[test]
fn test_decomposed_accents_are_accepted() {
    assert_morph("so\u{301}z+DAT", "sózge");
    assert_morph("saty\u{301}+NEG", "satpaý");
}

#[test]
fn test_unknown_tag_has_no_transduction() {
    assert_eq!(
        morph().inflect("bala+XYZ"),
        Err(ResolveError::NoValidTransduction {
            input: "bala+XYZ".to_string()
        })
    );
}

#[test]
fn test_invalid_symbol() {
    assert_eq!(
        morph().inflect("bala+PLR!"),
        Err(ResolveError::InvalidSymbol {
            symbol: "!".to_string(),
            offset: 8
        })
    );
}

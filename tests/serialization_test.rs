//! Rule tables as JSON configuration

#![cfg(feature = "serialization")]

use kazakh_fst::kazakh::{morphology_table, phonology_table};
use kazakh_fst::prelude::*;

#[test]
fn test_phonology_table_json_roundtrip() {
    let table = phonology_table();
    let json = table.to_json().expect("Failed to serialize table");
    let parsed = RuleTable::from_json(&json).expect("Failed to parse table");

    assert_eq!(parsed, table);

    let g2p = Phonology::from_table(&parsed).unwrap();
    assert_eq!(g2p.to_phoneme("seniń").unwrap(), "senɪŋ");
}

#[test]
fn test_morphology_table_json_roundtrip() {
    let table = morphology_table();
    let json = table.to_json().expect("Failed to serialize table");
    let parsed = RuleTable::from_json(&json).expect("Failed to parse table");

    assert_eq!(parsed, table);
    assert_eq!(parsed.rules.len(), table.rules.len());
}

#[test]
fn test_handwritten_table() {
    let json = r#"{
        "name": "abc",
        "symbols": ["a", "b", "c"],
        "rules": [
            {
                "name": "a-to-b",
                "map": [["a", "b"]],
                "left": { "literal": "c" }
            },
            {
                "name": "maybe-c",
                "map": [["c", "a"]],
                "right": "eos",
                "mode": "optional"
            }
        ]
    }"#;

    let table = RuleTable::from_json(json).unwrap();
    assert!(table.aliases.is_empty());
    assert_eq!(table.input_filter, None);
    assert_eq!(table.rules[0].right, Pattern::Empty);
    assert_eq!(table.rules[1].mode, RewriteMode::Optional);

    let cascade = build_pipeline(&table).unwrap();
    assert_eq!(cascade.resolve_str("caa").unwrap(), "cba");
}

#[test]
fn test_malformed_table_is_rejected() {
    assert!(RuleTable::from_json(r#"{ "name": "x" }"#).is_err());
    assert!(RuleTable::from_json(r#"{ "name": "x", "symbols": [], "rules": [{ "name": "r", "map": [], "left": { "regex": "a" } }] }"#).is_err());
}

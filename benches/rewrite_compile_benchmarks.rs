//! Benchmarks for rule and cascade compilation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kazakh_fst::kazakh::phonology_table;
use kazakh_fst::prelude::*;
use kazakh_fst::rewrite::compile_rule;
use std::sync::Arc;

fn sigma() -> Arc<Alphabet> {
    Alphabet::builder("latin")
        .symbols("abcdefghijklmnopqrstuvwxyz".chars().map(String::from))
        .build()
        .unwrap()
}

fn bench_single_rule(c: &mut Criterion) {
    let alphabet = sigma();
    let rules = [
        ("unconditional", Rule::new("a-to-b", SubstitutionMap::cross("a", "b"))),
        (
            "left_context",
            Rule::new("a-to-b", SubstitutionMap::cross("a", "b"))
                .left_context(Pattern::one_of(["e", "i"]).then(Pattern::any_star())),
        ),
        (
            "both_contexts",
            Rule::new("a-to-b", SubstitutionMap::cross("a", "b"))
                .left_context(Pattern::bos())
                .right_context(Pattern::literal("c").or(Pattern::eos())),
        ),
        (
            "overlapping_entries",
            Rule::new(
                "prefixes",
                SubstitutionMap::from_pairs([("a", "x"), ("ab", "y"), ("abc", "z")]),
            ),
        ),
        (
            "optional",
            Rule::new("a-to-b", SubstitutionMap::cross("a", "b")).optional(),
        ),
    ];

    let mut group = c.benchmark_group("compile_rule");
    for (name, rule) in rules.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), rule, |b, rule| {
            b.iter(|| compile_rule(black_box(rule), &alphabet))
        });
    }
    group.finish();
}

fn bench_cascade_depth(c: &mut Criterion) {
    let alphabet = sigma();
    let letters: Vec<char> = "abcdefghijklmnop".chars().collect();

    let mut group = c.benchmark_group("cascade_depth");
    group.sample_size(20);
    for depth in [1usize, 4, 8, 15] {
        let rules: Vec<Rule> = letters
            .windows(2)
            .take(depth)
            .map(|w| {
                Rule::new(
                    format!("{}-to-{}", w[0], w[1]),
                    SubstitutionMap::cross(w[0].to_string(), w[1].to_string()),
                )
                .left_context(Pattern::bos().or(Pattern::literal("x")))
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(depth), &rules, |b, rules| {
            b.iter(|| {
                Cascade::new("depth", Arc::clone(&alphabet))
                    .rules(rules.iter().cloned())
                    .compile()
            })
        });
    }
    group.finish();
}

fn bench_builtin_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("builtin_tables");
    group.sample_size(10);
    group.bench_function("phonology", |b| {
        b.iter(|| build_phonology_pipeline(black_box(&phonology_table())))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_single_rule,
    bench_cascade_depth,
    bench_builtin_tables,
);

criterion_main!(benches);

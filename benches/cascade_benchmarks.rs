//! Benchmarks for resolving words against compiled cascades.
//!
//! Covers:
//! - Grapheme-to-phoneme conversion by word length
//! - Inflection by number of affix tags
//! - Contended reads through a pipeline handle

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kazakh_fst::kazakh::phonology_table;
use kazakh_fst::prelude::*;
use std::sync::Arc;
use std::thread;

fn bench_g2p_word_length(c: &mut Criterion) {
    let g2p = Phonology::new().unwrap();
    let words = [
        ("short", "alý"),
        ("medium", "qazaqstan"),
        ("long", "balalarymyzǵa"),
        ("very_long", "qazaqstandyqtarymyzdyńǵa"),
    ];

    let mut group = c.benchmark_group("g2p_word_length");
    for (name, word) in words {
        group.throughput(Throughput::Elements(word.chars().count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), word, |b, word| {
            b.iter(|| g2p.to_phoneme(black_box(word)))
        });
    }
    group.finish();
}

fn bench_inflection_tags(c: &mut Criterion) {
    let morph = Morphology::new().unwrap();
    let words = [
        ("bare", "bala"),
        ("one_tag", "bala+PLR"),
        ("two_tags", "bala+PLR+1SING-POSS"),
        ("three_tags", "bala+PLR+3-POSS+DAT"),
    ];

    let mut group = c.benchmark_group("inflection_tags");
    for (name, word) in words {
        group.bench_with_input(BenchmarkId::from_parameter(name), word, |b, word| {
            b.iter(|| morph.inflect(black_box(word)))
        });
    }
    group.finish();
}

fn bench_rejection(c: &mut Criterion) {
    let morph = Morphology::new().unwrap();

    let mut group = c.benchmark_group("rejection");
    group.bench_function("unknown_tag", |b| {
        b.iter(|| morph.inflect(black_box("bala+XYZ")))
    });
    group.bench_function("invalid_symbol", |b| {
        b.iter(|| morph.inflect(black_box("bala!")))
    });
    group.finish();
}

fn bench_handle_contention(c: &mut Criterion) {
    let handle = Arc::new(PipelineHandle::new(
        build_phonology_pipeline(&phonology_table()).unwrap(),
    ));

    let mut group = c.benchmark_group("handle_contention");
    for threads in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| {
                let workers: Vec<_> = (0..threads)
                    .map(|_| {
                        let handle = Arc::clone(&handle);
                        thread::spawn(move || {
                            for _ in 0..10 {
                                black_box(handle.resolve_str("qazaqstan").ok());
                            }
                        })
                    })
                    .collect();
                for worker in workers {
                    worker.join().ok();
                }
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_g2p_word_length,
    bench_inflection_tags,
    bench_rejection,
    bench_handle_contention,
);

criterion_main!(benches);

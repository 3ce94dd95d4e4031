//! Concurrent resolution and pipeline replacement

use kazakh_fst::kazakh::phonology_table;
use kazakh_fst::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;

const NUM_READERS: usize = 4;

#[test]
fn test_parallel_resolution() {
    let g2p = Phonology::new().unwrap();
    let barrier = Arc::new(Barrier::new(NUM_READERS));

    let handles: Vec<_> = (0..NUM_READERS)
        .map(|_| {
            let g2p = g2p.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..50)
                    .map(|_| g2p.to_phoneme("qazaqstan").unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for output in handle.join().unwrap() {
            assert_eq!(output, "qχazaqstan");
        }
    }
}

#[test]
fn test_readers_see_whole_pipelines_during_replacement() {
    let original = phonology_table();
    let mut without_initial_q = original.clone();
    without_initial_q.rules.retain(|r| r.name != "initial-q");

    let handle = Arc::new(PipelineHandle::new(
        build_phonology_pipeline(&original).unwrap(),
    ));
    let alternate = Arc::new(build_phonology_pipeline(&without_initial_q).unwrap());
    let barrier = Arc::new(Barrier::new(NUM_READERS + 1));

    let readers: Vec<_> = (0..NUM_READERS)
        .map(|_| {
            let handle = Arc::clone(&handle);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..100 {
                    let output = handle.resolve_str("qazaqstan").unwrap();
                    assert!(
                        output == "qχazaqstan" || output == "qazaqstan",
                        "unexpected output {}",
                        output
                    );
                }
            })
        })
        .collect();

    let writer = {
        let handle = Arc::clone(&handle);
        let barrier = Arc::clone(&barrier);
        let original = build_phonology_pipeline(&original).unwrap();
        thread::spawn(move || {
            barrier.wait();
            for i in 0..20 {
                let next = if i % 2 == 0 {
                    (*alternate).clone()
                } else {
                    original.clone()
                };
                handle.replace(next);
            }
        })
    };

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(handle.resolve_str("qazaqstan").unwrap(), "qχazaqstan");
}

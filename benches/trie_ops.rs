//! Benchmarks for trie operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fuzzytrie::{AcceptAll, FuzzyTrie, PagingConfig, TrieConfig};

fn create_trie() -> FuzzyTrie {
    let config = TrieConfig {
        paging: PagingConfig {
            enabled: false,
            sweep_depth: 2,
            sweep_iterations: 2,
            node_threshold: 64,
            ..PagingConfig::default()
        },
        ..TrieConfig::default()
    };
    FuzzyTrie::with_config(config).unwrap()
}

fn generate_word_keys(n: usize) -> Vec<String> {
    let stems = ["catalog", "category", "cathedral", "romanus", "rubicon", "kitten", "sitting"];
    let tails = ["", "s", "ing", "ed", "er", "ly"];

    (0..n)
        .map(|i| {
            let stem = stems[i % stems.len()];
            let tail = tails[(i / stems.len()) % tails.len()];
            let id = i / (stems.len() * tails.len());
            format!("{}{}{}", stem, tail, id)
        })
        .collect()
}

fn filled(keys: &[String]) -> FuzzyTrie {
    let trie = create_trie();
    for (i, key) in keys.iter().enumerate() {
        trie.add(key, i.to_le_bytes()).unwrap();
    }
    trie
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");

    for size in [1_000, 10_000] {
        let keys = generate_word_keys(size);

        group.bench_with_input(BenchmarkId::new("FuzzyTrie", size), &keys, |b, keys| {
            b.iter(|| black_box(filled(keys)));
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [1_000, 10_000] {
        let trie = filled(&generate_word_keys(size));

        for typos in [0, 1, 2] {
            group.bench_with_input(
                BenchmarkId::new(format!("typos={}", typos), size),
                &typos,
                |b, &typos| {
                    b.iter(|| {
                        let results = trie.search("catalgo12", typos, 10, AcceptAll).unwrap();
                        black_box(results)
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_wildcard(c: &mut Criterion) {
    let mut group = c.benchmark_group("wildcard");

    for size in [1_000, 10_000] {
        let trie = filled(&generate_word_keys(size));

        for budget in [10, 100] {
            group.bench_with_input(BenchmarkId::new(format!("max={}", budget), size), &budget, |b, &budget| {
                b.iter(|| black_box(trie.search("cat*", 0, budget, AcceptAll).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_paged_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("paged_search");
    let keys = generate_word_keys(10_000);
    let trie = filled(&keys);

    // Every iteration pages the tree out and the search pulls its path back
    group.bench_function("sweep_then_search", |b| {
        b.iter(|| {
            trie.sweep_now().unwrap();
            black_box(trie.search("rubicons3", 1, 10, AcceptAll).unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_add, bench_search, bench_wildcard, bench_paged_search);
criterion_main!(benches);

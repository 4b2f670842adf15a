use criterion::{black_box, criterion_group, criterion_main, Criterion};

use linegrep::Matcher;

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    group.bench_function("literal_chain", |b| {
        b.iter(|| Matcher::compile(black_box("abcdefghij")).unwrap())
    });

    group.bench_function("nested_groups", |b| {
        b.iter(|| Matcher::compile(black_box("((a|b)+(c|d)*)+e")).unwrap())
    });

    group.bench_function("classes", |b| {
        b.iter(|| Matcher::compile(black_box("[a-f]+[^g-z]*[0-9]")).unwrap())
    });

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    let literal = Matcher::compile("needle").unwrap();
    let haystack = "hay needle hay ".repeat(64);
    group.bench_function("literal_in_long_line", |b| {
        b.iter(|| literal.scan(black_box(haystack.as_bytes())))
    });

    // Worst case for the multi-cursor scanner: every offset starts a match
    // and stays alive until the terminator.
    let overlapping = Matcher::compile("(a|b)*c").unwrap();
    let pathological = "ab".repeat(128) + "c";
    group.bench_function("dense_overlaps", |b| {
        b.iter(|| overlapping.scan(black_box(pathological.as_bytes())))
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_scan);
criterion_main!(benches);

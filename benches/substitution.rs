//! Translator Benchmarks
//!
//! Measures the substitution pass with and without the translation cache.
//!
//! Run with: cargo bench --bench substitution

use codeshift::{Language, PlanBuilder, Translator};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn python_source(lines: usize) -> String {
    (0..lines)
        .map(|i| match i % 4 {
            0 => format!("def f{}(x):", i),
            1 => "    if x is None:".to_string(),
            2 => "        print(len(x))".to_string(),
            _ => "    return True".to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");
    let plan = PlanBuilder::new().create_plan("", &Language::Python, &Language::JavaScript);

    for lines in [10, 100, 1000] {
        let source = python_source(lines);

        group.bench_with_input(BenchmarkId::new("uncached", lines), &source, |b, source| {
            b.iter(|| {
                let mut translator = Translator::new();
                black_box(translator.translate(black_box(source), &plan));
            });
        });

        group.bench_with_input(BenchmarkId::new("cached", lines), &source, |b, source| {
            let mut translator = Translator::new();
            translator.translate(source, &plan);
            b.iter(|| {
                black_box(translator.translate(black_box(source), &plan));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_translate);
criterion_main!(benches);

/// Benchmarks for path-context extraction.
///
/// Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pathminer::domain::deadline::Deadline;
use pathminer::domain::path::MergeLimits;
use pathminer::infrastructure::PythonExtractor;

/// A module with `functions` small functions, each mixing calls, arithmetic
/// and control flow.
fn synthetic_module(functions: usize) -> String {
    let mut source = String::from("import os\n\n");
    for index in 0..functions {
        source.push_str(&format!(
            "def handler_{index}(request, limit=10, *args, **kwargs):\n\
             \x20   total = 0\n\
             \x20   for item in request.items[:limit]:\n\
             \x20       if item.value > {index} and not item.hidden:\n\
             \x20           total += item.value * 2\n\
             \x20       else:\n\
             \x20           total -= len(args)\n\
             \x20   return {{'total': total, 'path': os.path.join('a', f'{{total}}')}}\n\n"
        ));
    }
    source
}

fn bench_extract_module(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract/module");
    let extractor = PythonExtractor::default();

    for functions in [1, 10, 50, 200] {
        let source = synthetic_module(functions);
        group.throughput(Throughput::Elements(functions as u64));
        group.bench_with_input(
            BenchmarkId::new("functions", functions),
            &source,
            |b, source| {
                b.iter(|| {
                    extractor
                        .extract_source(black_box(source), &Deadline::none())
                        .unwrap()
                })
            },
        );
    }

    group.finish();
}

fn bench_path_limits(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract/limits");
    let source = synthetic_module(20);

    for max_path_length in [4, 8, 12] {
        let extractor = PythonExtractor::new(MergeLimits {
            max_path_length,
            max_path_width: 2,
        });
        group.bench_with_input(
            BenchmarkId::new("max_path_length", max_path_length),
            &source,
            |b, source| {
                b.iter(|| {
                    extractor
                        .extract_source(black_box(source), &Deadline::none())
                        .unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_extract_module, bench_path_limits);
criterion_main!(benches);

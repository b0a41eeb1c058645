//! Performance benchmarks for the jsabstract built-ins
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jsabstract::{AnalysisOptions, Session, Value};

/// Benchmark: session creation (global object and built-in installation)
fn bench_session_start(c: &mut Criterion) {
    c.bench_function("session_start", |b| {
        b.iter(|| black_box(Session::new(AnalysisOptions::default())))
    });
}

/// Benchmark: JSON serialization and parsing
fn bench_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("json");

    for size in [10usize, 100, 1000] {
        let mut session = Session::new(AnalysisOptions::default());
        let items = (0..size)
            .map(|i| {
                let item = Value::new_object();
                if let Value::Object(obj) = &item {
                    obj.put("id", Value::Number(i as f64));
                    obj.put("name", Value::String("item".to_string()));
                    obj.put("tags", Value::new_array(vec![Value::Boolean(true), Value::Null]));
                }
                item
            })
            .collect();
        let data = Value::new_array(items);
        let json = session.global_object().get("JSON");
        let stringify = json.get_property("stringify");
        let parse = json.get_property("parse");
        let text = session
            .call(&stringify, &json, &[data.clone()])
            .normal_value()
            .unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("stringify", size), &data, |b, data| {
            b.iter(|| session.call(&stringify, &json, &[black_box(data.clone())]))
        });
        group.bench_with_input(BenchmarkId::new("parse", size), &text, |b, text| {
            b.iter(|| session.call(&parse, &json, &[black_box(text.clone())]))
        });
    }

    group.finish();
}

/// Benchmark: eval of small programs
fn bench_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval");

    group.bench_function("arithmetic", |b| {
        let mut session = Session::new(AnalysisOptions::default());
        let source = Value::String("1 + 2 * 3 - 4 / 2".to_string());
        b.iter(|| session.call_global("eval", &[black_box(source.clone())]))
    });

    group.bench_function("closure", |b| {
        let mut session = Session::new(AnalysisOptions::default());
        let source = Value::String(
            "function add(a) { return function (b) { return a + b; }; } add(1)(2)".to_string(),
        );
        b.iter(|| session.call_global("eval", &[black_box(source.clone())]))
    });

    group.bench_function("syntax_error_recovered", |b| {
        let mut session = Session::new(AnalysisOptions::default());
        let source = Value::String("var x = {".to_string());
        b.iter(|| {
            let completion = session.call_global("eval", &[black_box(source.clone())]);
            session.take_diagnostics();
            completion
        })
    });

    group.finish();
}

/// Benchmark: numeric and URI global functions
fn bench_global_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("globals");
    let mut session = Session::new(AnalysisOptions::default());

    let hex = [Value::String("  0x1fffff".to_string())];
    group.bench_function("parseInt", |b| {
        b.iter(|| session.call_global("parseInt", black_box(&hex)))
    });

    let float = [Value::String("3.14159e10xyz".to_string())];
    group.bench_function("parseFloat", |b| {
        b.iter(|| session.call_global("parseFloat", black_box(&float)))
    });

    let text = [Value::String("caf\u{e9} \u{4e2d}\u{6587} a+b=c&d/e?f".repeat(8))];
    group.bench_function("encodeURIComponent", |b| {
        b.iter(|| session.call_global("encodeURIComponent", black_box(&text)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_session_start,
    bench_json,
    bench_eval,
    bench_global_functions
);
criterion_main!(benches);

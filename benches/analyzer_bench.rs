//! Benchmarks for collection analysis
//!
//! Run with: cargo bench --bench analyzer_bench

use bson::{Document, doc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use docschema::inference::{CollectionAnalyzer, FieldAnalyzer, InferenceConfig, classify};
use docschema::relationships::ForeignKeyDetector;
use docschema::store::{IndexSpec, MemoryStore};

/// Generate sample order documents
fn generate_orders(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| {
            let status = ["open", "paid", "shipped", "cancelled"][i % 4];
            doc! {
                "_id": i as i64,
                "customer_id": (i % 50) as i64,
                "status": status,
                "total": 10.0 + i as f64 * 1.5,
                "tags": ["priority", "gift"],
                "created_at": format!("2024-01-{:02}T10:30:00Z", 1 + i % 28),
                "shipping": { "city": "Leeds", "zip": format!("LS{}", i % 20) },
                "tracking_id": format!("trk-{}", i),
            }
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    let document = generate_orders(1).remove(0);

    for (name, value) in document.iter() {
        group.bench_with_input(BenchmarkId::new("classify", name), value, |b, value| {
            b.iter(|| black_box(classify(value)));
        });
    }

    group.finish();
}

fn bench_field_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_analysis");

    for count in [10, 100, 500].iter() {
        let documents = generate_orders(*count);
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_with_input(BenchmarkId::new("flat", count), &documents, |b, documents| {
            b.iter(|| {
                let mut analyzer = FieldAnalyzer::new();
                analyzer.add_documents(documents);
                black_box(analyzer.finalize())
            });
        });

        let nested = InferenceConfig::builder().flatten_nested(true).build();
        group.bench_with_input(
            BenchmarkId::new("flatten_nested", count),
            &documents,
            |b, documents| {
                b.iter(|| {
                    let mut analyzer = FieldAnalyzer::with_config(nested.clone());
                    analyzer.add_documents(documents);
                    black_box(analyzer.finalize())
                });
            },
        );
    }

    group.finish();
}

fn bench_collection_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_analysis");
    let config = InferenceConfig::default();

    let mut store = MemoryStore::with_seed(42);
    store.insert_many("orders", generate_orders(1000));
    store.insert_many(
        "customers",
        (0..50).map(|i| doc! { "_id": i as i64, "name": format!("Customer {}", i) }),
    );
    store.create_index("orders", IndexSpec::single("customer_id", false));

    group.bench_function("analyze_orders", |b| {
        let analyzer = CollectionAnalyzer::new(&store, &config);
        b.iter(|| black_box(analyzer.analyze("orders", 100)))
    });

    let schemas = vec![
        CollectionAnalyzer::new(&store, &config)
            .analyze("orders", 100)
            .unwrap(),
        CollectionAnalyzer::new(&store, &config)
            .analyze("customers", 100)
            .unwrap(),
    ];
    group.bench_function("detect_foreign_keys", |b| {
        let detector = ForeignKeyDetector::new(&store, &config);
        b.iter(|| black_box(detector.detect(&schemas)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_classify,
    bench_field_analysis,
    bench_collection_analysis
);
criterion_main!(benches);

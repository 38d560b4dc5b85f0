//! Performance benchmarks for the reconciliation engine.
//!
//! The matcher is a local stub, so these numbers measure the engine alone:
//! - Billing table normalization
//! - Reconciliation of a single modified oligo
//! - Reconciliation of large orders, to check scaling in the line count
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use oligo_billing::calculation::{normalize_catalog, reconcile};
use oligo_billing::config::ConfigLoader;
use oligo_billing::error::EngineResult;
use oligo_billing::matching::BestMatch;
use oligo_billing::models::{OligoOrderLine, RawTable};
use rust_decimal::Decimal;

/// Stands in for the remote matcher: exact text match, else the first row.
struct LocalMatcher;

impl BestMatch for LocalMatcher {
    fn best_match_index(&self, candidates: &[&str], query: &str) -> EngineResult<usize> {
        Ok(candidates.iter().position(|c| *c == query).unwrap_or(0))
    }
}

const DYES: [&str; 6] = ["FAM", "HEX", "JOE", "CY5", "ROX", "TAMRA"];

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/rulebook.yaml").expect("Failed to load rulebook")
}

/// A billing table with both tiers and one modification row per dye.
fn create_billing_table() -> RawTable {
    let mut rows: Vec<Vec<String>> = vec![
        row("Modified primer synthesis 1 umoles", "1,000"),
        row("Modified primer synthesis 0.2 umoles", "600"),
        row("Modified 1 umoles oligo purification HPLC", "500"),
        row("Modified 0.2 umoles oligo purification HPLC", "350"),
    ];
    rows.extend(DYES.iter().map(|dye| row(&format!("5`{dye}-3`BHQ1"), "300")));
    rows.push(row("소계", "0"));
    rows.push(row("합계", "0"));

    RawTable {
        header: ["품명", "규격", "수량", "단가", "공급가액", "세액"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows,
    }
}

fn row(description: &str, price: &str) -> Vec<String> {
    vec![
        description.to_string(),
        String::new(),
        "1".to_string(),
        price.to_string(),
        price.to_string(),
        "0".to_string(),
    ]
}

/// Creates an order with `count` lines cycling through tiers and dyes.
fn create_order(count: usize) -> Vec<OligoOrderLine> {
    (0..count)
        .map(|i| {
            let amount = if i % 2 == 0 {
                Decimal::ONE
            } else {
                Decimal::new(2, 1)
            };
            let dye = DYES[i % DYES.len()];
            OligoOrderLine::new(format!("oligo_{i}"), amount, 18 + (i % 30) as u32, dye, "BHQ1")
        })
        .collect()
}

/// Benchmark: normalizing the extracted billing table.
fn bench_normalize(c: &mut Criterion) {
    let config = load_config();
    let raw = create_billing_table();

    c.bench_function("normalize_catalog", |b| {
        b.iter(|| black_box(normalize_catalog(black_box(&raw), config.catalog()).unwrap()))
    });
}

/// Benchmark: one modified oligo.
fn bench_single_line(c: &mut Criterion) {
    let config = load_config();
    let table = normalize_catalog(&create_billing_table(), config.catalog()).unwrap();
    let order = create_order(1);

    c.bench_function("reconcile_single_line", |b| {
        b.iter(|| {
            black_box(
                reconcile("bench", black_box(&order), &table, &LocalMatcher, config.pricing())
                    .unwrap(),
            )
        })
    });
}

/// Benchmark: various order sizes to understand scaling behavior.
fn bench_scaling(c: &mut Criterion) {
    let config = load_config();
    let table = normalize_catalog(&create_billing_table(), config.catalog()).unwrap();

    let mut group = c.benchmark_group("scaling");

    for line_count in [1, 10, 100, 1000].iter() {
        let order = create_order(*line_count);

        group.throughput(Throughput::Elements(*line_count as u64));
        group.bench_with_input(BenchmarkId::new("lines", line_count), &order, |b, order| {
            b.iter(|| {
                black_box(reconcile("bench", order, &table, &LocalMatcher, config.pricing()).unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_single_line, bench_scaling);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

use voltran_core::{MaterialId, OwnerId};
use voltran_infra::journal::{InMemoryJournal, Journal};
use voltran_infra::{DashboardAggregator, LedgerConfig, LedgerEngine};
use voltran_inventory::MaterialDraft;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn draft(name: String) -> MaterialDraft {
    MaterialDraft {
        name: Some(name),
        category: Some("Hardware".to_string()),
        quantity: Some(Decimal::from(1_000_000)),
        unit: Some("pcs".to_string()),
        min_stock: Some(Decimal::from(10)),
    }
}

/// Ledger with `materials` materials, each carrying `movements` inward/outward pairs.
fn seeded(
    rt: &Runtime,
    journal: Arc<dyn Journal>,
    materials: usize,
    movements: usize,
) -> (LedgerEngine, OwnerId, Vec<MaterialId>) {
    let ledger = LedgerEngine::open(&LedgerConfig::default(), journal).unwrap();
    let owner = OwnerId::new();
    let ids = rt.block_on(async {
        let mut ids = Vec::with_capacity(materials);
        for i in 0..materials {
            let m = ledger
                .materials()
                .create(owner, draft(format!("Material {i}")), Utc::now())
                .await
                .unwrap();
            let id = m.id_typed().to_string();
            for _ in 0..movements {
                ledger.record_inward(owner, &id, Decimal::from(5), "Acme", None, None).await.unwrap();
                ledger.record_outward(owner, &id, Decimal::from(3), "SiteA", None, None).await.unwrap();
            }
            ids.push(m.id_typed());
        }
        ids
    });
    (ledger, owner, ids)
}

fn bench_movement_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("movement_latency");
    group.sample_size(1000);
    let rt = runtime();

    group.bench_function("record_inward", |b| {
        let (ledger, owner, ids) = seeded(&rt, Arc::new(InMemoryJournal::new()), 1, 0);
        let id = ids[0].to_string();
        b.iter(|| {
            rt.block_on(ledger.record_inward(owner, &id, black_box(Decimal::ONE), "Acme", None, None))
                .unwrap();
        });
    });

    group.bench_function("record_outward", |b| {
        let (ledger, owner, ids) = seeded(&rt, Arc::new(InMemoryJournal::new()), 1, 0);
        let id = ids[0].to_string();
        b.iter(|| {
            rt.block_on(ledger.record_outward(owner, &id, black_box(Decimal::ONE), "SiteA", None, None))
                .unwrap();
        });
    });

    group.finish();
}

fn bench_journal_restore(c: &mut Criterion) {
    let mut group = c.benchmark_group("journal_restore");
    let rt = runtime();

    for movements in [10usize, 100, 1000].iter() {
        let journal: Arc<dyn Journal> = Arc::new(InMemoryJournal::new());
        seeded(&rt, journal.clone(), 10, *movements);
        let records = journal.load().unwrap().len();

        group.throughput(Throughput::Elements(records as u64));
        group.bench_with_input(BenchmarkId::from_parameter(movements), movements, |b, _| {
            b.iter(|| LedgerEngine::open(&LedgerConfig::default(), black_box(journal.clone())).unwrap());
        });
    }

    group.finish();
}

fn bench_dashboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard_aggregate");
    let rt = runtime();

    for materials in [10usize, 100].iter() {
        let (ledger, owner, _) = seeded(&rt, Arc::new(InMemoryJournal::new()), *materials, 20);
        let snapshot = rt.block_on(ledger.snapshot(owner)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(materials), materials, |b, _| {
            b.iter(|| DashboardAggregator::aggregate(black_box(&snapshot), Utc::now()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_movement_latency, bench_journal_restore, bench_dashboard);
criterion_main!(benches);

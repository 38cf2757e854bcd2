//! Benchmarks for presence classification

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use checkpoint_core::{CredentialId, Lane, Timestamp};
use checkpoint_state::{CredentialDirectory, EventLog, PresenceEngine};

fn roster(size: usize) -> CredentialDirectory {
    CredentialDirectory::new(
        (0..size).map(|i| (CredentialId::new(format!("{i:08X}")), format!("Person {i}"))),
        8,
    )
    .unwrap()
}

fn bench_resolve(c: &mut Criterion) {
    let directory = roster(1000);
    let known = CredentialId::new("000001f4ab");
    let unknown = CredentialId::new("FFFFFFFF");

    c.bench_function("directory_resolve_known", |b| {
        b.iter(|| black_box(directory.resolve(black_box(&known))))
    });
    c.bench_function("directory_resolve_unknown", |b| {
        b.iter(|| black_box(directory.resolve(black_box(&unknown))))
    });
}

fn bench_entry_exit_cycle(c: &mut Criterion) {
    let mut engine = PresenceEngine::new(roster(100));
    let id = CredentialId::new("0000002A");
    let mut now = Timestamp::from_ymd_hms(2026, 10, 19, 8, 0, 0).unwrap();

    c.bench_function("classify_entry_exit_cycle", |b| {
        b.iter(|| {
            now = now + Duration::from_secs(2);
            black_box(engine.classify(Lane::Entry, &id, now).unwrap());
            now = now + Duration::from_secs(2);
            black_box(engine.classify(Lane::Exit, &id, now).unwrap());
        })
    });
}

fn bench_log_append(c: &mut Criterion) {
    let mut log = EventLog::default();
    let now = Timestamp::from_ymd_hms(2026, 10, 19, 8, 0, 0).unwrap();

    c.bench_function("event_log_append", |b| {
        b.iter(|| log.append(black_box("Double entry: Person 42"), now))
    });
    c.bench_function("event_log_snapshot", |b| b.iter(|| black_box(log.snapshot())));
}

criterion_group!(
    benches,
    bench_resolve,
    bench_entry_exit_cycle,
    bench_log_append
);
criterion_main!(benches);

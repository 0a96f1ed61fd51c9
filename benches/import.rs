//! Benchmarks for field decoding and full imports.

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs, clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use secrecy::SecretString;
use std::hint::black_box;
use std::time::Duration;

use settings_import::io::encode_record;
use settings_import::{
    FieldCodec, ImportConfig, ImportRequest, ImportService, MemorySettingsStore,
};

const FIELDS_PER_ACCOUNT: usize = 40;

fn secret() -> SecretString {
    SecretString::from("bench passphrase".to_string())
}

fn build_export(accounts: usize) -> String {
    let codec = FieldCodec::new(&secret()).unwrap();
    let mut lines = Vec::with_capacity(accounts * FIELDS_PER_ACCOUNT);
    for a in 0..accounts {
        let id = format!("00000000-0000-0000-0000-{a:012}");
        lines.push(
            encode_record(&codec, &format!("{id}.accountNumber"), &a.to_string(), ':')
                .unwrap(),
        );
        for f in 1..FIELDS_PER_ACCOUNT {
            lines.push(
                encode_record(&codec, &format!("{id}.field{f}"), "some setting value", ':')
                    .unwrap(),
            );
        }
    }
    lines.join("\n")
}

fn bench_decode(c: &mut Criterion) {
    let codec = FieldCodec::new(&secret()).unwrap();
    let token = codec
        .encode("0f8fad5b-d9cb-469f-a165-70867728950e.folder.inbox.displayMode")
        .unwrap();

    c.bench_function("decode_field", |b| {
        b.iter(|| codec.decode(black_box(&token)).unwrap());
    });
}

fn bench_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("import");
    group.measurement_time(Duration::from_secs(5));
    let service = ImportService::new(ImportConfig::default());
    let secret = secret();

    for accounts in [1usize, 10, 50] {
        let data = build_export(accounts);
        group.throughput(Throughput::Elements((accounts * FIELDS_PER_ACCOUNT) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(accounts), &data, |b, data| {
            b.iter(|| {
                let mut store = MemorySettingsStore::new();
                service
                    .import(ImportRequest::new(black_box(data), &secret), &mut store)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_import);
criterion_main!(benches);

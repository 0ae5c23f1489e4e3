//! Archive write throughput over the block-size ladder.
//!
//! Feeds fixed-size blocks through an encrypting store-mode writer into a
//! discard sink, so the numbers reflect the framing/cipher pipeline rather
//! than disk speed.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use zipseal::sink::DiscardSink;
use zipseal::{ArchiveEntry, DeclaredSize, WriteOptions, ZipWriter};

const BLOCK_SIZES: [usize; 6] = [16, 64, 256, 1024, 8192, 16384];

/// Plaintext bytes pushed per iteration.
const BYTES_PER_ITER: usize = 1 << 20;

#[cfg(feature = "aes")]
fn bench_aes256_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("archive_aes256_store");

    for &block_size in &BLOCK_SIZES {
        let block = vec![0x41u8; block_size];
        let blocks = BYTES_PER_ITER / block_size;
        let total = (blocks * block_size) as u64;

        group.throughput(Throughput::Bytes(total));
        group.bench_with_input(BenchmarkId::new("block", block_size), &block_size, |b, _| {
            b.iter(|| {
                let options = WriteOptions::new().password("pass");
                let mut writer = ZipWriter::new(DiscardSink::new(), options);
                writer
                    .begin_entry(
                        ArchiveEntry::file("bench.bin", DeclaredSize::Known(total)).unwrap(),
                    )
                    .unwrap();
                for _ in 0..blocks {
                    writer.write(black_box(&block)).unwrap();
                }
                black_box(writer.finalize().unwrap())
            });
        });
    }

    group.finish();
}

fn bench_plain_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("archive_plain_store");

    for &block_size in &BLOCK_SIZES {
        let block = vec![0x41u8; block_size];
        let blocks = BYTES_PER_ITER / block_size;
        let total = (blocks * block_size) as u64;

        group.throughput(Throughput::Bytes(total));
        group.bench_with_input(BenchmarkId::new("block", block_size), &block_size, |b, _| {
            b.iter(|| {
                // A discard sink cannot seek, so the plain CRC patch is
                // avoided by measuring up to (not including) finalize.
                let mut writer = ZipWriter::new(DiscardSink::new(), WriteOptions::new());
                writer
                    .begin_entry(
                        ArchiveEntry::file("bench.bin", DeclaredSize::Known(total)).unwrap(),
                    )
                    .unwrap();
                for _ in 0..blocks {
                    writer.write(black_box(&block)).unwrap();
                }
                black_box(writer.into_sink().bytes_discarded())
            });
        });
    }

    group.finish();
}

#[cfg(feature = "aes")]
criterion_group!(benches, bench_aes256_store, bench_plain_store);
#[cfg(not(feature = "aes"))]
criterion_group!(benches, bench_plain_store);
criterion_main!(benches);

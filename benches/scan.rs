//! Scan throughput on a generated fixture tree.

use criterion::{criterion_group, criterion_main, Criterion};
use duscan::{scan, ScanOptions};
use std::fs;
use tempfile::TempDir;

fn build_fixture(dirs: usize, files_per_dir: usize) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for d in 0..dirs {
        let dir = tmp.path().join(format!("dir{:03}", d));
        fs::create_dir(&dir).unwrap();
        for f in 0..files_per_dir {
            fs::write(dir.join(format!("f{:03}", f)), vec![0u8; 256 * (f + 1)]).unwrap();
        }
    }
    tmp
}

fn bench_scan(c: &mut Criterion) {
    let fixture = build_fixture(24, 32);

    c.bench_function("scan_parallel", |b| {
        b.iter(|| scan(fixture.path(), ScanOptions::default()))
    });

    c.bench_function("scan_sequential", |b| {
        b.iter(|| {
            scan(
                fixture.path(),
                ScanOptions {
                    use_parallel: false,
                    ..ScanOptions::default()
                },
            )
        })
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);

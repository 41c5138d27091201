use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use treecpu::system::{MemoryTable, ProcessSnapshot, SnapshotDiffer, TreeDiscoverer};

/// Binary-heap shaped tree rooted at pid 1, so every process descends
/// from the root.
fn make_processes(n: usize, extra_ticks: u64) -> Vec<ProcessSnapshot> {
    (0..n)
        .map(|i| {
            let pid = i as u32 + 1;
            let ppid = if i == 0 { 0 } else { (i as u32 - 1) / 2 + 1 };
            ProcessSnapshot {
                pid,
                ppid,
                name: format!("proc_{i}"),
                user_ticks: (i as u64 % 97) * 10 + extra_ticks,
                system_ticks: (i as u64 % 13) * 3 + extra_ticks,
                start_ticks: Some(1_000 + i as u64),
            }
        })
        .collect()
}

fn bench_discover(c: &mut Criterion) {
    let mut group = c.benchmark_group("discover_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let discoverer = TreeDiscoverer::new(MemoryTable::new(make_processes(size, 0)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &discoverer, |b, d| {
            b.iter(|| {
                let tree = d.discover(black_box(1)).expect("memory table never fails");
                black_box(tree);
            })
        });
    }

    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_500_1000_2000");
    let differ = SnapshotDiffer::default();

    for size in [500usize, 1000, 2000] {
        let earlier = TreeDiscoverer::new(MemoryTable::new(make_processes(size, 0)))
            .discover(1)
            .expect("memory table never fails");
        let later = TreeDiscoverer::new(MemoryTable::new(make_processes(size, 5)))
            .discover(1)
            .expect("memory table never fails");
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(earlier, later),
            |b, (earlier, later)| {
                b.iter(|| {
                    let result = differ.diff(
                        black_box(earlier),
                        black_box(later),
                        Duration::from_secs(10),
                    );
                    black_box(result);
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_discover, bench_diff);
criterion_main!(benches);

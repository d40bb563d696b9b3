use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use crossbeam::channel as cbchan;
use std::hint::black_box;
use std::time::Duration;

use oneof::io::tier::Tier;
use oneof::prelude::{CancelToken, EndpointSet, Outcome, recv_one};

/// One ready endpoint at the far end of the set: measures the cost of building
/// and polling the case list for each tier, without any thread hand-off.
pub fn bench_recv_one(c: &mut Criterion) {
    let mut group = c.benchmark_group("recv_one_single_ready");

    for &n in &[1_usize, 4, 8, 12, 16, 17, 32, 64] {
        let (txs, rxs): (Vec<_>, Vec<_>) = (0..n).map(|_| cbchan::bounded::<u64>(1)).unzip();
        let set = EndpointSet::new(rxs);
        let cancel = CancelToken::new_root();
        let last = &txs[n - 1];

        group.bench_function(BenchmarkId::new(format!("{:?}", Tier::for_len(n)), n), |b| {
            b.iter(|| {
                last.send(black_box(7)).unwrap();
                match recv_one(&set, &cancel).unwrap() {
                    Outcome::Ready((index, v)) => black_box((index, v)),
                    Outcome::Cancelled => unreachable!(),
                }
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(3))
        .sample_size(20);
    targets = bench_recv_one
}
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use faceoff::{Comparator, Contender, Sampler, SamplerConfig, Side};
use std::hint::black_box;
use std::time::{Duration, Instant};

fn warmed_sampler(windows: usize) -> Sampler {
    let mut s = Sampler::new(
        Contender::new("a", "Alpha"),
        Side::Left,
        SamplerConfig::default(),
    )
    .unwrap();
    let mut t = Instant::now();
    for i in 0..windows {
        // Varied counts so scoring takes the general (nonzero-deviation) path.
        let events = 5 + (i % 7) as u64;
        for _ in 0..events {
            t += Duration::from_millis(10);
            s.record_event(t);
        }
        s.close_window();
    }
    s
}

fn bench_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler");

    group.bench_function("record_event", |b| {
        let base = warmed_sampler(16);
        b.iter(|| {
            let mut s = base.clone();
            // Well past the warmup timestamps, so every delta is a real gap.
            let mut t = Instant::now() + Duration::from_secs(3600);
            for _ in 0..1024 {
                t += Duration::from_millis(1);
                s.record_event(t);
            }
            black_box(s.bucket_len());
        })
    });

    // Scoring recomputes the baseline moments from the full history, so a
    // close costs more the longer the battle has run.
    for windows in [16usize, 256, 4096] {
        group.bench_with_input(
            BenchmarkId::new("close_window", windows),
            &windows,
            |b, &w| {
                let base = warmed_sampler(w);
                b.iter(|| {
                    let mut s = base.clone();
                    black_box(s.close_window());
                })
            },
        );
    }

    group.bench_function("comparator_tick", |b| {
        let cfg = SamplerConfig::default();
        let left = Sampler::new(Contender::new("rs", "Rust"), Side::Left, cfg.clone()).unwrap();
        let right = Sampler::new(Contender::new("go", "Go"), Side::Right, cfg).unwrap();
        let mut base = Comparator::new(left, right).unwrap();
        let mut t = Instant::now();
        for i in 0..64 {
            let events = 4 + (i % 5) as u64;
            for side in [Side::Left, Side::Right] {
                for _ in 0..events {
                    t += Duration::from_millis(10);
                    base.record_event(side, t);
                }
                base.close_window(side);
            }
        }
        b.iter(|| {
            let mut c2 = base.clone();
            black_box(c2.close_window(Side::Left));
        })
    });

    group.finish();
}

criterion_group!(benches, bench_sampler);
criterion_main!(benches);

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use urania::positions::resolve_positions;
use urania::time::J2000_JD;
use urania::{BodyId, BodyPosition, ChartEngine, EngineConfig, MeanElementsEphemeris};

fn positions_benchmark(c: &mut Criterion) {
    let eph = MeanElementsEphemeris::new();

    c.bench_function("resolve_positions_mean", |b| {
        b.iter(|| resolve_positions(&eph, black_box(J2000_JD), &BodyId::ALL))
    });
}

fn transit_window_benchmark(c: &mut Criterion) {
    let engine = ChartEngine::new(MeanElementsEphemeris::new(), EngineConfig::default()).unwrap();
    let natal = vec![
        BodyPosition::stationary(BodyId::Sun, 280.4),
        BodyPosition::stationary(BodyId::Moon, 223.3),
        BodyPosition::stationary(BodyId::Venus, 241.6),
    ];
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();

    c.bench_function("transits_one_quarter", |b| {
        b.iter(|| engine.compute_transits(black_box(&natal), start, end))
    });
}

criterion_group!(benches, positions_benchmark, transit_window_benchmark);
criterion_main!(benches);

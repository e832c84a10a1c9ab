use colorsense::config::SimulationConfig;
use colorsense::{calculate_color_temperature, RawRow, SensorRig, Session, SpectralChannels};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn benchmark_color_engine(c: &mut Criterion) {
    let channels = SpectralChannels::new(34.2, 38.9, 54.5, 61.1, 57.5, 48.5);
    c.bench_function("calculate_color_temperature", |b| {
        b.iter(|| calculate_color_temperature(black_box(&channels)))
    });
}

fn benchmark_session_tick(c: &mut Criterion) {
    let row = RawRow::from_channels(&SpectralChannels::new(34.2, 38.9, 54.5, 61.1, 57.5, 48.5));
    let mut session = Session::new();
    c.bench_function("session_process_row", |b| {
        b.iter(|| session.process_row(black_box(&row)))
    });

    let mut rig = SensorRig::new(&SimulationConfig {
        seed: Some(42),
        ..Default::default()
    });
    let mut session = Session::new();
    c.bench_function("simulated_tick", |b| {
        b.iter(|| {
            let frame = rig.step();
            session.process_frame(black_box(&frame))
        })
    });
}

criterion_group!(benches, benchmark_color_engine, benchmark_session_tick);
criterion_main!(benches);

//! Layout benchmarks: metrics cache construction and per-frame work.
//! Run: cargo bench

use std::rc::Rc;

use chrono::Weekday;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slanted::canvas::RecordingCanvas;
use slanted::clock::ClockFields;
use slanted::complications::{ComplicationData, ComplicationHolder, SlotId};
use slanted::geometry::Rect;
use slanted::measure::EstimateMeasurer;
use slanted::painter::WatchFacePainter;
use slanted::settings::Settings;
use slanted::veneer::Veneer;

fn holder() -> ComplicationHolder {
    let mut holder = ComplicationHolder::new();
    holder.on_data_update(
        SlotId(2021),
        Some(ComplicationData::ShortText {
            text: "72%".to_owned(),
            title: Some("BAT".to_owned()),
        }),
    );
    holder
}

fn bench_painter_build(c: &mut Criterion) {
    let veneer = Veneer::from_settings(&Settings::default(), false);
    let time = ClockFields::new(12, 34, 56, 14, Weekday::Fri);
    let holder = holder();

    let mut group = c.benchmark_group("layout_frame");
    group.sample_size(50);

    group.bench_function("painter_build_454", |b| {
        b.iter(|| {
            black_box(WatchFacePainter::new(
                veneer.clone(),
                Rect::from_size(454.0, 454.0),
                &time,
                &holder,
                Rc::new(EstimateMeasurer),
            ))
        });
    });

    let painter = WatchFacePainter::new(
        veneer.clone(),
        Rect::from_size(454.0, 454.0),
        &time,
        &holder,
        Rc::new(EstimateMeasurer),
    );

    group.bench_function("paint_data_per_second", |b| {
        let mut second = 0;
        b.iter(|| {
            second = (second + 1) % 60;
            let tick = ClockFields::new(12, 34, second, 14, Weekday::Fri);
            black_box(painter.paint_data(&tick))
        });
    });

    group.bench_function("draw_recorded_frame", |b| {
        b.iter(|| {
            let mut canvas = RecordingCanvas::new();
            painter.draw(&time, &mut canvas, &holder);
            black_box(canvas.ops.len())
        });
    });

    group.bench_function("hit_test", |b| {
        b.iter(|| black_box(painter.hit_test(black_box(380.0), black_box(250.0), &time)));
    });

    group.finish();
}

criterion_group!(benches, bench_painter_build);
criterion_main!(benches);

use std::cell::Cell;
use std::rc::Rc;

use chrono::Weekday;
use slanted::canvas::{CanvasOp, RecordingCanvas};
use slanted::clock::ClockFields;
use slanted::complications::{ComplicationData, ComplicationHolder, SlotId};
use slanted::face::{SlantedFace, TapOutcome};
use slanted::geometry::{rotate_point, Rect};
use slanted::measure::{EstimateMeasurer, TextMeasurer, TextSize, TextStyle};
use slanted::settings::Settings;

#[derive(Default)]
struct CountingMeasurer {
    calls: Cell<usize>,
}

impl TextMeasurer for CountingMeasurer {
    fn measure(&self, style: &TextStyle, text: &str) -> TextSize {
        self.calls.set(self.calls.get() + 1);
        EstimateMeasurer.measure(style, text)
    }
}

const BOUNDS: Rect = Rect::new(0.0, 0.0, 454.0, 454.0);

fn at(hour: u32, minute: u32, second: u32) -> ClockFields {
    ClockFields::new(hour, minute, second, 14, Weekday::Fri)
}

fn face_with(measurer: Rc<CountingMeasurer>) -> SlantedFace<ComplicationHolder> {
    SlantedFace::new(Settings::default(), ComplicationHolder::new(), measurer)
}

fn short_text(text: &str) -> Option<ComplicationData> {
    Some(ComplicationData::ShortText {
        text: text.to_owned(),
        title: None,
    })
}

#[test]
fn painters_rebuild_on_hour_change_only() {
    let measurer = Rc::new(CountingMeasurer::default());
    let mut face = face_with(measurer.clone());

    assert!(face.prepare(BOUNDS, &at(12, 34, 56)));
    assert!(measurer.calls.get() > 0);

    // the first frame memoizes today's date string
    let mut canvas = RecordingCanvas::new();
    face.render(&mut canvas, BOUNDS, &at(12, 34, 56));
    let after_build = measurer.calls.get();

    face.render(&mut canvas, BOUNDS, &at(12, 35, 0));
    face.render(&mut canvas, BOUNDS, &at(12, 59, 59));
    assert_eq!(measurer.calls.get(), after_build);

    assert!(face.prepare(BOUNDS, &at(13, 0, 0)));
    assert!(measurer.calls.get() > after_build);
}

#[test]
fn bounds_and_complication_changes_rebuild() {
    let mut face = face_with(Rc::default());
    let time = at(8, 0, 0);
    assert!(face.prepare(BOUNDS, &time));
    assert!(!face.prepare(BOUNDS, &time));
    assert!(face.prepare(Rect::from_size(400.0, 400.0), &time));

    face.update_complications(|holder| holder.on_data_update(SlotId(2021), short_text("3°")));
    assert!(face.prepare(Rect::from_size(400.0, 400.0), &time));

    // content change inside an already occupied slot keeps the layout
    face.update_complications(|holder| holder.on_data_update(SlotId(2021), short_text("4°")));
    assert!(!face.prepare(Rect::from_size(400.0, 400.0), &time));
}

#[test]
fn mode_switch_reuses_prepared_painters() {
    let mut face = face_with(Rc::default());
    let time = at(12, 34, 56);
    let mut active = RecordingCanvas::new();
    face.render(&mut active, BOUNDS, &time);
    assert!(active.texts().contains(&"56"));

    face.set_ambient(true);
    assert!(!face.prepare(BOUNDS, &time));
    let mut ambient = RecordingCanvas::new();
    face.render(&mut ambient, BOUNDS, &time);
    assert!(!ambient.texts().contains(&"56"));
    assert!(ambient.texts().contains(&"34"));
}

#[test]
fn settings_change_rebuilds_everything() {
    let mut face = face_with(Rc::default());
    let time = at(12, 34, 56);
    face.prepare(BOUNDS, &time);
    let before = face.painter().map(|painter| painter.veneer().angle());

    let settings = Settings {
        left_handed: false,
        ..Settings::default()
    };
    face.on_settings_changed(&settings);
    assert!(face.painter().is_none());
    assert!(face.prepare(BOUNDS, &time));
    assert_eq!(before, Some(20.0));
    assert_eq!(face.painter().map(|painter| painter.veneer().angle()), Some(-20.0));
}

#[test]
fn date_tap_highlights_until_cleared() {
    let mut face = face_with(Rc::default());
    let time = at(12, 34, 56);
    face.prepare(BOUNDS, &time);

    let (tap, date, seconds) = {
        let painter = face.painter().unwrap();
        let date = painter.date_rect(&time);
        let tap = rotate_point(date.center(), painter.rotation_center(), painter.veneer().angle());
        (tap, date, painter.seconds_rect(&time))
    };

    let TapOutcome::Agenda { highlight } = face.on_tap(tap.x, tap.y, &time) else {
        panic!("date tap should open the agenda");
    };
    let expected = date.union(&seconds).inset(-4.0, -4.0).round();
    assert_eq!(highlight, expected);
    assert_eq!(
        face.painter().and_then(|painter| painter.highlighted()).map(|outline| outline.rect),
        Some(expected)
    );

    let mut canvas = RecordingCanvas::new();
    face.render(&mut canvas, BOUNDS, &time);
    assert!(canvas
        .ops
        .iter()
        .any(|op| matches!(op, CanvasOp::Outline { outline, .. } if outline.rect == expected)));

    face.unhighlight();
    let mut canvas = RecordingCanvas::new();
    face.render(&mut canvas, BOUNDS, &time);
    assert!(!canvas.ops.iter().any(|op| matches!(op, CanvasOp::Outline { .. })));
}

#[test]
fn slot_tap_reports_the_slot() {
    let mut face = face_with(Rc::default());
    face.update_complications(|holder| holder.on_data_update(SlotId(2022), short_text("72%")));
    let time = at(12, 34, 56);
    face.prepare(BOUNDS, &time);

    let slot = face.slot_bounds().get(SlotId(2022)).to_rect();
    let painter = face.painter().unwrap();
    let tap = rotate_point(slot.center(), painter.rotation_center(), painter.veneer().angle());
    assert_eq!(
        face.on_tap(tap.x, tap.y, &time),
        TapOutcome::Complication {
            slot: SlotId(2022)
        }
    );
    assert_eq!(face.on_tap(1.0, 1.0, &time), TapOutcome::None);
}

#[test]
fn ambient_complications_follow_the_ambient_veneer() {
    let settings = Settings {
        colorful_ambient: false,
        ..Settings::default()
    };
    let mut face = SlantedFace::new(settings, ComplicationHolder::new(), Rc::new(EstimateMeasurer));
    face.update_complications(|holder| holder.on_data_update(SlotId(2021), short_text("72%")));
    face.set_ambient(true);

    let mut canvas = RecordingCanvas::new();
    face.render(&mut canvas, BOUNDS, &at(12, 0, 0));
    match canvas.text_op("72%") {
        Some(CanvasOp::Text { paint, .. }) => {
            assert_eq!(paint.color, slanted::veneer::Veneer::AMBIENT_COLOR)
        }
        other => panic!("complication text not drawn: {other:?}"),
    }
}

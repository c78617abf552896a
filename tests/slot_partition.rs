use std::rc::Rc;

use chrono::Weekday;
use slanted::clock::ClockFields;
use slanted::complications::{
    partition_slots, ComplicationData, ComplicationHolder, SlotId, MAX_NUMBER_OF_SLOTS,
};
use slanted::geometry::{IntRect, Rect};
use slanted::measure::EstimateMeasurer;
use slanted::painter::WatchFacePainter;
use slanted::settings::Settings;
use slanted::veneer::Veneer;

fn first_n_occupied(n: usize) -> Vec<(SlotId, bool)> {
    SlotId::all()
        .enumerate()
        .map(|(index, slot)| (slot, index < n))
        .collect()
}

#[test]
fn occupied_slots_stack_without_overlap_for_every_count() {
    let area = Rect::new(240.0, 270.0, 454.0, 420.0);
    for n in 0..=MAX_NUMBER_OF_SLOTS {
        let bounds = partition_slots(area, &first_n_occupied(n));
        let occupied = bounds.occupied().collect::<Vec<_>>();
        assert_eq!(occupied.len(), n);

        let inset = if n > 1 { 3 } else { 1 };
        let delta = (area.bottom - area.top) / n.max(1) as f32;
        for (position, (_, rect)) in occupied.iter().enumerate() {
            let top = area.top + delta * position as f32;
            assert_eq!(rect.left, area.left as i32);
            assert_eq!(rect.right, area.right as i32);
            assert_eq!(rect.top, top as i32);
            assert_eq!(rect.bottom, (top + delta) as i32 - inset);
            assert!(rect.bottom <= area.bottom as i32);
        }
        for pair in occupied.windows(2) {
            assert!(!pair[0].1.intersects(&pair[1].1), "{pair:?}");
            assert!(pair[0].1.bottom < pair[1].1.top);
        }
    }
}

#[test]
fn empty_middle_slot_reflows_the_rest() {
    let occupancy = [(SlotId(2021), true), (SlotId(2022), false), (SlotId(2023), true)];
    let bounds = partition_slots(Rect::new(0.0, 0.0, 200.0, 90.0), &occupancy);
    assert_eq!(bounds.get(SlotId(2021)), IntRect::new(0, 0, 200, 42));
    assert!(bounds.get(SlotId(2022)).is_empty());
    assert_eq!(bounds.get(SlotId(2023)), IntRect::new(0, 45, 200, 87));
}

#[test]
fn painter_reflows_when_a_provider_goes_away() {
    let mut holder = ComplicationHolder::new();
    for slot in SlotId::all() {
        holder.on_data_update(
            slot,
            Some(ComplicationData::ShortText {
                text: "1".to_owned(),
                title: None,
            }),
        );
    }
    let veneer = Veneer::from_settings(&Settings::default(), false);
    let time = ClockFields::new(10, 10, 10, 1, Weekday::Sun);
    let build = |holder: &ComplicationHolder| {
        WatchFacePainter::new(
            veneer.clone(),
            Rect::from_size(454.0, 454.0),
            &time,
            holder,
            Rc::new(EstimateMeasurer),
        )
    };

    let full = build(&holder).complication_bounds();
    assert_eq!(full.occupied().count(), 3);

    holder.on_data_update(SlotId(2022), None);
    let before = build(&holder);
    assert!(!before.should_update(&time, &holder));
    let reflowed = before.complication_bounds();
    assert!(reflowed.get(SlotId(2022)).is_empty());
    assert!(reflowed.get(SlotId(2021)).bottom < reflowed.get(SlotId(2023)).top);
    assert!(reflowed.get(SlotId(2023)).top < full.get(SlotId(2023)).top);
    assert!(reflowed.get(SlotId(2021)).height() > full.get(SlotId(2021)).height());
}

#[test]
fn larger_date_pushes_slots_down() {
    let mut holder = ComplicationHolder::new();
    holder.on_data_update(
        SlotId(2021),
        Some(ComplicationData::ShortText {
            text: "1".to_owned(),
            title: None,
        }),
    );
    let time = ClockFields::new(10, 10, 10, 1, Weekday::Sun);
    let top_for = |larger_date: bool| {
        let settings = Settings {
            larger_date,
            ..Settings::default()
        };
        WatchFacePainter::new(
            Veneer::from_settings(&settings, false),
            Rect::from_size(454.0, 454.0),
            &time,
            &holder,
            Rc::new(EstimateMeasurer),
        )
        .complication_bounds()
        .get(SlotId(2021))
        .top
    };
    assert!(top_for(true) > top_for(false));
}
